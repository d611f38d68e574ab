//! Clinical range validation.
//!
//! Compares each monitored vital and lab against a fixed reference range
//! and collects alerts for anything outside. Alerts are surfaced alongside
//! the diagnosis; they never stop a prediction.

use crate::domain::{Alert, PatientRecord};

/// Reference ranges for the eleven monitored fields, inclusive on both
/// ends. Iteration order is fixed and carries through to the alert list
/// (not severity-ranked).
pub const REFERENCE_RANGES: [(&str, f64, f64); 11] = [
    ("sys_bp", 90.0, 180.0),
    ("dia_bp", 60.0, 120.0),
    ("heart_rate", 60.0, 100.0),
    ("resp_rate", 12.0, 20.0),
    ("temperature", 36.0, 38.5),
    ("spo2", 92.0, 100.0),
    ("glucose", 70.0, 180.0),
    ("hba1c", 4.0, 10.0),
    ("creatinine", 0.6, 1.3),
    ("cholesterol", 125.0, 240.0),
    ("leukocytes", 4000.0, 11000.0),
];

/// Check every monitored field of the record against its reference range.
///
/// Pure function: no side effects beyond alert construction. Boundary
/// values are in range and raise no alert.
#[must_use]
pub fn validate(record: &PatientRecord) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for &(field, min, max) in &REFERENCE_RANGES {
        let value = monitored_value(record, field);
        if value < min || value > max {
            alerts.push(Alert {
                field,
                value,
                min,
                max,
            });
        }
    }
    if !alerts.is_empty() {
        tracing::debug!("{} clinical value(s) outside reference range", alerts.len());
    }
    alerts
}

fn monitored_value(record: &PatientRecord, field: &str) -> f64 {
    match field {
        "sys_bp" => record.vitals.sys_bp,
        "dia_bp" => record.vitals.dia_bp,
        "heart_rate" => record.vitals.heart_rate,
        "resp_rate" => record.vitals.resp_rate,
        "temperature" => record.vitals.temperature,
        "spo2" => record.vitals.spo2,
        "glucose" => record.labs.glucose,
        "hba1c" => record.labs.hba1c,
        "creatinine" => record.labs.creatinine,
        "cholesterol" => record.labs.cholesterol,
        "leukocytes" => record.labs.leukocytes,
        other => unreachable!("unmonitored field {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Labs, ResidenceArea, RiskHistory, Sex, Symptoms, Vitals};

    fn in_range_record() -> PatientRecord {
        PatientRecord {
            age: 45.0,
            sex: Sex::Female,
            area: ResidenceArea::Rural,
            district: 5.0,
            occupation: 8.0,
            illness_days: 7.0,
            weight_kg: 70.0,
            height_m: 1.65,
            vitals: Vitals {
                sys_bp: 120.0,
                dia_bp: 80.0,
                heart_rate: 80.0,
                resp_rate: 18.0,
                temperature: 37.0,
                spo2: 98.0,
            },
            labs: Labs {
                glucose: 100.0,
                hba1c: 5.7,
                creatinine: 1.0,
                cholesterol: 180.0,
                leukocytes: 7500.0,
            },
            history: RiskHistory::default(),
            symptoms: Symptoms::default(),
        }
    }

    #[test]
    fn test_in_range_record_raises_no_alerts() {
        assert!(validate(&in_range_record()).is_empty());
    }

    #[test]
    fn test_boundary_value_is_in_range() {
        let mut record = in_range_record();
        record.vitals.sys_bp = 90.0;
        assert!(validate(&record).is_empty());

        record.vitals.sys_bp = 180.0;
        assert!(validate(&record).is_empty());
    }

    #[test]
    fn test_below_range_alert_cites_range() {
        let mut record = in_range_record();
        record.vitals.sys_bp = 89.0;

        let alerts = validate(&record);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].field, "sys_bp");
        assert!((alerts[0].value - 89.0).abs() < f64::EPSILON);
        assert!((alerts[0].min - 90.0).abs() < f64::EPSILON);
        assert!((alerts[0].max - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_alert_order_follows_field_iteration_order() {
        let mut record = in_range_record();
        record.labs.glucose = 300.0; // later field
        record.vitals.dia_bp = 130.0; // earlier field

        let alerts = validate(&record);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].field, "dia_bp");
        assert_eq!(alerts[1].field, "glucose");
    }
}
