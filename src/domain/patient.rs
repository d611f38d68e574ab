//! Patient encounter types for differential diagnosis prediction.
//!
//! Field set mirrors the training schema of the Huancayo primary-care
//! dataset: demographics, vitals, labs, risk history and 29 symptom flags.

use serde::{Deserialize, Serialize};

/// Biological sex, encoded {female = 0, male = 1} at feature-build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Numeric code used by the training pipeline.
    #[must_use]
    pub fn code(self) -> f64 {
        match self {
            Self::Female => 0.0,
            Self::Male => 1.0,
        }
    }
}

/// Residence area, encoded {rural = 0, urban = 1}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidenceArea {
    Rural,
    Urban,
}

impl ResidenceArea {
    #[must_use]
    pub fn code(self) -> f64 {
        match self {
            Self::Rural => 0.0,
            Self::Urban => 1.0,
        }
    }
}

/// Vital signs for one encounter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vitals {
    /// Systolic blood pressure in mmHg
    pub sys_bp: f64,
    /// Diastolic blood pressure in mmHg
    pub dia_bp: f64,
    /// Heart rate in beats per minute
    pub heart_rate: f64,
    /// Respiratory rate in breaths per minute
    pub resp_rate: f64,
    /// Body temperature in degrees Celsius
    pub temperature: f64,
    /// Oxygen saturation in percent
    pub spo2: f64,
}

impl Vitals {
    /// Pulse pressure in mmHg. May be negative when diastolic exceeds
    /// systolic; downstream consumers expect the raw difference.
    #[must_use]
    pub fn pulse_pressure(&self) -> f64 {
        self.sys_bp - self.dia_bp
    }
}

/// Laboratory results for one encounter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Labs {
    /// Blood glucose in mg/dL
    pub glucose: f64,
    /// Glycated hemoglobin HbA1c in %
    pub hba1c: f64,
    /// Serum creatinine in mg/dL
    pub creatinine: f64,
    /// Total cholesterol in mg/dL
    pub cholesterol: f64,
    /// Leukocyte count in cells/µL
    pub leukocytes: f64,
}

/// Binary risk-factor history.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RiskHistory {
    pub smoking: bool,
    pub alcohol_use: bool,
    pub sedentary: bool,
    pub family_dm: bool,
    pub family_hta: bool,
}

/// The 29 symptom flags, grouped by clinical category.
///
/// Field order here matches [`SYMPTOM_NAMES`]; `flags()` relies on it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Symptoms {
    // Respiratory
    pub cough: bool,
    pub breathing_difficulty: bool,
    pub sore_throat: bool,
    pub nasal_congestion: bool,
    pub epistaxis: bool,
    // Digestive
    pub diarrhea: bool,
    pub abdominal_pain: bool,
    pub appetite_loss: bool,
    pub nausea: bool,
    pub vomiting: bool,
    // Metabolic
    pub polyuria: bool,
    pub polydipsia: bool,
    pub weight_loss: bool,
    pub polyphagia: bool,
    pub slow_healing: bool,
    pub frequent_infections: bool,
    // Cardiovascular
    pub palpitations: bool,
    pub chest_pain: bool,
    pub tinnitus: bool,
    // General
    pub headache: bool,
    pub dehydration: bool,
    pub blurred_vision: bool,
    pub fever: bool,
    pub chills: bool,
    pub weakness: bool,
    pub malaise: bool,
    pub dizziness: bool,
    pub fatigue: bool,
    pub asymptomatic: bool,
}

/// Symptom column names in training-schema order (prefix `symptom_`).
pub const SYMPTOM_NAMES: [&str; 29] = [
    "symptom_cough",
    "symptom_breathing_difficulty",
    "symptom_sore_throat",
    "symptom_nasal_congestion",
    "symptom_epistaxis",
    "symptom_diarrhea",
    "symptom_abdominal_pain",
    "symptom_appetite_loss",
    "symptom_nausea",
    "symptom_vomiting",
    "symptom_polyuria",
    "symptom_polydipsia",
    "symptom_weight_loss",
    "symptom_polyphagia",
    "symptom_slow_healing",
    "symptom_frequent_infections",
    "symptom_palpitations",
    "symptom_chest_pain",
    "symptom_tinnitus",
    "symptom_headache",
    "symptom_dehydration",
    "symptom_blurred_vision",
    "symptom_fever",
    "symptom_chills",
    "symptom_weakness",
    "symptom_malaise",
    "symptom_dizziness",
    "symptom_fatigue",
    "symptom_asymptomatic",
];

impl Symptoms {
    /// All flags in [`SYMPTOM_NAMES`] order.
    #[must_use]
    pub fn flags(&self) -> [bool; 29] {
        [
            self.cough,
            self.breathing_difficulty,
            self.sore_throat,
            self.nasal_congestion,
            self.epistaxis,
            self.diarrhea,
            self.abdominal_pain,
            self.appetite_loss,
            self.nausea,
            self.vomiting,
            self.polyuria,
            self.polydipsia,
            self.weight_loss,
            self.polyphagia,
            self.slow_healing,
            self.frequent_infections,
            self.palpitations,
            self.chest_pain,
            self.tinnitus,
            self.headache,
            self.dehydration,
            self.blurred_vision,
            self.fever,
            self.chills,
            self.weakness,
            self.malaise,
            self.dizziness,
            self.fatigue,
            self.asymptomatic,
        ]
    }

    /// Number of active symptoms.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.flags().iter().filter(|&&f| f).count()
    }
}

/// One clinical encounter's raw inputs.
///
/// Every field is mandatory: the surrounding form guarantees completeness,
/// so a constructed record is always ready for feature building. Widget
/// ranges (age 1-100, district/occupation 0-20, illness 0-365 days) are
/// enforced by the presentation layer and not re-checked here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Age in years
    pub age: f64,
    pub sex: Sex,
    pub area: ResidenceArea,
    /// District code (0-20)
    pub district: f64,
    /// Occupation code (0-20)
    pub occupation: f64,
    /// Illness duration in days
    pub illness_days: f64,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Height in metres
    pub height_m: f64,
    pub vitals: Vitals,
    pub labs: Labs,
    pub history: RiskHistory,
    pub symptoms: Symptoms,
}

impl PatientRecord {
    /// Body-mass index, rounded to two decimals as the training pipeline did.
    #[must_use]
    pub fn bmi(&self) -> f64 {
        let raw = self.weight_kg / (self.height_m * self.height_m);
        (raw * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PatientRecord {
        PatientRecord {
            age: 45.0,
            sex: Sex::Male,
            area: ResidenceArea::Urban,
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
    fn test_bmi_rounds_to_two_decimals() {
        let record = sample_record();
        // 70 / 1.65^2 = 25.7116... -> 25.71
        assert!((record.bmi() - 25.71).abs() < 1e-9);
    }

    #[test]
    fn test_pulse_pressure_can_be_negative() {
        let mut record = sample_record();
        record.vitals.sys_bp = 70.0;
        record.vitals.dia_bp = 90.0;
        assert!((record.vitals.pulse_pressure() - (-20.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_symptom_flags_match_names() {
        let symptoms = Symptoms {
            cough: true,
            asymptomatic: true,
            ..Symptoms::default()
        };

        let flags = symptoms.flags();
        assert_eq!(flags.len(), SYMPTOM_NAMES.len());
        assert!(flags[0]); // symptom_cough is first
        assert!(flags[28]); // symptom_asymptomatic is last
        assert_eq!(symptoms.active_count(), 2);
    }

    #[test]
    fn test_categorical_codes() {
        assert!((Sex::Female.code() - 0.0).abs() < f64::EPSILON);
        assert!((Sex::Male.code() - 1.0).abs() < f64::EPSILON);
        assert!((ResidenceArea::Rural.code() - 0.0).abs() < f64::EPSILON);
        assert!((ResidenceArea::Urban.code() - 1.0).abs() < f64::EPSILON);
    }
}
