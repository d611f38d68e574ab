//! Diagnosis result types.
//!
//! Represents the ranked output of the multiclass differential-diagnosis
//! classifier (DM2, EDA, HTA, IRA).

use serde::{Deserialize, Serialize};

use super::Alert;

/// The four differential diagnosis classes.
///
/// Discriminants match the class indices of the trained classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnosis {
    /// Type-2 diabetes mellitus
    Dm2 = 0,
    /// Acute diarrheal disease
    Eda = 1,
    /// Hypertension
    Hta = 2,
    /// Acute respiratory infection
    Ira = 3,
}

impl Diagnosis {
    /// All classes in classifier index order.
    pub const ALL: [Self; 4] = [Self::Dm2, Self::Eda, Self::Hta, Self::Ira];

    /// Map a classifier class index to its diagnosis.
    #[must_use]
    pub fn from_class_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Short clinical label, as used in reports and training data.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Dm2 => "DM2",
            Self::Eda => "EDA",
            Self::Hta => "HTA",
            Self::Ira => "IRA",
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Dm2 => "Type-2 diabetes mellitus",
            Self::Eda => "Acute diarrheal disease",
            Self::Hta => "Hypertension",
            Self::Ira => "Acute respiratory infection",
        }
    }
}

impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Confidence tier derived from the principal diagnosis probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceTier {
    /// Probability >= 0.80
    High,
    /// Probability >= 0.60
    Medium,
    /// Anything below
    Low,
}

impl ConfidenceTier {
    /// Derive the tier from a probability using the fixed 0.80 / 0.60
    /// thresholds (inclusive).
    #[must_use]
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.80 {
            Self::High
        } else if p >= 0.60 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// One ranked entry: a diagnosis and its class probability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankedDiagnosis {
    pub diagnosis: Diagnosis,
    pub probability: f64,
}

/// Ranked classifier output for one encounter.
///
/// Held only for the current interaction; a new prediction replaces it
/// wholesale. Never persisted, so it only serializes outward.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisResult {
    /// Encounter-local identifier
    pub id: String,

    /// Top-3 diagnoses, strictly descending by probability
    pub ranked: Vec<RankedDiagnosis>,

    /// Confidence tier of the principal (first) diagnosis
    pub tier: ConfidenceTier,

    /// Clinical range alerts raised by the validator
    pub alerts: Vec<Alert>,

    /// Timestamp of the prediction
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl DiagnosisResult {
    /// Build a result from ranked entries and validator alerts.
    ///
    /// The caller guarantees `ranked` is non-empty and descending.
    #[must_use]
    pub fn new(ranked: Vec<RankedDiagnosis>, alerts: Vec<Alert>) -> Self {
        let top = ranked.first().map_or(0.0, |r| r.probability);
        Self {
            id: encounter_id(),
            ranked,
            tier: ConfidenceTier::from_probability(top),
            alerts,
            created_at: chrono::Utc::now(),
        }
    }

    /// The principal diagnosis (highest probability).
    #[must_use]
    pub fn principal(&self) -> RankedDiagnosis {
        self.ranked[0]
    }
}

/// Generate a UUID v4 encounter identifier using a CSPRNG.
///
/// ChaCha20Rng is seeded from OS entropy on every call so identifiers are
/// unpredictable across sessions.
fn encounter_id() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ConfidenceTier::from_probability(0.80), ConfidenceTier::High);
        assert_eq!(
            ConfidenceTier::from_probability(0.79999),
            ConfidenceTier::Medium
        );
        assert_eq!(
            ConfidenceTier::from_probability(0.60),
            ConfidenceTier::Medium
        );
        assert_eq!(ConfidenceTier::from_probability(0.5999), ConfidenceTier::Low);
    }

    #[test]
    fn test_class_index_mapping() {
        assert_eq!(Diagnosis::from_class_index(0), Some(Diagnosis::Dm2));
        assert_eq!(Diagnosis::from_class_index(1), Some(Diagnosis::Eda));
        assert_eq!(Diagnosis::from_class_index(2), Some(Diagnosis::Hta));
        assert_eq!(Diagnosis::from_class_index(3), Some(Diagnosis::Ira));
        assert_eq!(Diagnosis::from_class_index(4), None);
    }

    #[test]
    fn test_result_tier_follows_principal() {
        let ranked = vec![
            RankedDiagnosis {
                diagnosis: Diagnosis::Ira,
                probability: 0.85,
            },
            RankedDiagnosis {
                diagnosis: Diagnosis::Hta,
                probability: 0.10,
            },
            RankedDiagnosis {
                diagnosis: Diagnosis::Dm2,
                probability: 0.05,
            },
        ];
        let result = DiagnosisResult::new(ranked, Vec::new());

        assert_eq!(result.tier, ConfidenceTier::High);
        assert_eq!(result.principal().diagnosis, Diagnosis::Ira);
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn test_encounter_ids_are_unique() {
        let a = encounter_id();
        let b = encounter_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
