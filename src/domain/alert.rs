//! Clinical range alerts.

use serde::Serialize;

/// A monitored value found outside its clinical reference range.
///
/// Alerts are validation signals surfaced to the practitioner, never
/// errors: an out-of-range value does not stop the prediction.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    /// Monitored field name (e.g. `sys_bp`)
    pub field: &'static str,
    /// The observed value
    pub value: f64,
    /// Inclusive lower bound of the reference range
    pub min: f64,
    /// Inclusive upper bound of the reference range
    pub max: f64,
}

impl Alert {
    /// Human-readable alert line as shown in the report.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "{} ({}) outside reference range ({} - {})",
            self.field.to_uppercase(),
            self.value,
            self.min,
            self.max
        )
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}
