//! Feature building: raw encounter fields to a model-ready numeric row.
//!
//! Deterministic and total for well-formed records. Categorical and
//! boolean fields encode to {0, 1}; pulse pressure and the BMI category
//! are derived here; assembly order comes from the loaded schema, never
//! from an assumed column list.

use crate::application::resources::FeatureSchema;
use crate::domain::{PatientRecord, SYMPTOM_NAMES};
use crate::PipelineError;

/// A single feature row in the classifier's column order.
///
/// Immutable once built; one vector corresponds to exactly one record.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Raw (pre-scaling) values in schema order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// BMI category bucket with half-open lower-inclusive boundaries
/// [0, 18.5, 24.9, 29.9, inf): a value exactly at a boundary falls into
/// the upper bucket, matching the training-time convention.
#[must_use]
pub fn bmi_category(bmi: f64) -> f64 {
    if bmi < 18.5 {
        0.0 // underweight
    } else if bmi < 24.9 {
        1.0 // normal
    } else if bmi < 29.9 {
        2.0 // overweight
    } else {
        3.0 // obese
    }
}

fn encode(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Assemble the feature row for one record in the schema's column order.
///
/// # Errors
/// Returns [`PipelineError::SchemaMismatch`] if the schema names a column
/// this builder does not know, which means the loaded model belongs to a
/// different training run.
pub fn build(record: &PatientRecord, schema: &FeatureSchema) -> Result<FeatureVector, PipelineError> {
    let mut values = Vec::with_capacity(schema.len());
    for column in schema.columns() {
        values.push(feature_value(record, column).ok_or_else(|| {
            PipelineError::SchemaMismatch(format!("model expects unknown feature column {column}"))
        })?);
    }
    Ok(FeatureVector { values })
}

fn feature_value(record: &PatientRecord, column: &str) -> Option<f64> {
    // Symptom columns share one lookup through the flag array.
    if let Some(i) = SYMPTOM_NAMES.iter().position(|&n| n == column) {
        return Some(encode(record.symptoms.flags()[i]));
    }

    let value = match column {
        "age" => record.age,
        "sex" => record.sex.code(),
        "area" => record.area.code(),
        "district" => record.district,
        "occupation" => record.occupation,
        "illness_days" => record.illness_days,
        "bmi" => record.bmi(),
        "bmi_category" => bmi_category(record.bmi()),
        "sys_bp" => record.vitals.sys_bp,
        "dia_bp" => record.vitals.dia_bp,
        "heart_rate" => record.vitals.heart_rate,
        "resp_rate" => record.vitals.resp_rate,
        "temperature" => record.vitals.temperature,
        "spo2" => record.vitals.spo2,
        "pulse_pressure" => record.vitals.pulse_pressure(),
        "glucose" => record.labs.glucose,
        "hba1c" => record.labs.hba1c,
        "creatinine" => record.labs.creatinine,
        "cholesterol" => record.labs.cholesterol,
        "leukocytes" => record.labs.leukocytes,
        "smoking" => encode(record.history.smoking),
        "alcohol_use" => encode(record.history.alcohol_use),
        "sedentary" => encode(record.history.sedentary),
        "family_dm" => encode(record.history.family_dm),
        "family_hta" => encode(record.history.family_hta),
        _ => return None,
    };
    Some(value)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Labs, ResidenceArea, RiskHistory, Sex, Symptoms, Vitals};

    fn sample_record() -> PatientRecord {
        PatientRecord {
            age: 45.0,
            sex: Sex::Male,
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
            history: RiskHistory {
                smoking: true,
                ..RiskHistory::default()
            },
            symptoms: Symptoms {
                cough: true,
                ..Symptoms::default()
            },
        }
    }

    fn schema_of(columns: &[&str]) -> FeatureSchema {
        FeatureSchema::new(columns.iter().map(|s| s.to_string()).collect(), Vec::new())
    }

    #[test]
    fn test_build_follows_schema_order() {
        let record = sample_record();

        let forward = build(&record, &schema_of(&["age", "sys_bp", "smoking"])).expect("builds");
        assert_eq!(forward.values(), &[45.0, 120.0, 1.0]);

        // Reordering the declared columns must change the output.
        let reversed = build(&record, &schema_of(&["smoking", "sys_bp", "age"])).expect("builds");
        assert_eq!(reversed.values(), &[1.0, 120.0, 45.0]);
        assert_ne!(forward, reversed);
    }

    #[test]
    fn test_pulse_pressure_is_signed_difference() {
        let mut record = sample_record();
        record.vitals.sys_bp = 70.0;
        record.vitals.dia_bp = 90.0;

        let vector = build(&record, &schema_of(&["pulse_pressure"])).expect("builds");
        assert_eq!(vector.values(), &[-20.0]);
    }

    #[test]
    fn test_bmi_category_boundaries_fall_upward() {
        assert!((bmi_category(18.4) - 0.0).abs() < f64::EPSILON);
        assert!((bmi_category(18.5) - 1.0).abs() < f64::EPSILON);
        assert!((bmi_category(24.9) - 2.0).abs() < f64::EPSILON);
        assert!((bmi_category(29.9) - 3.0).abs() < f64::EPSILON);
        assert!((bmi_category(35.0) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_symptom_columns_resolve() {
        let record = sample_record();
        let vector = build(
            &record,
            &schema_of(&["symptom_cough", "symptom_diarrhea"]),
        )
        .expect("builds");
        assert_eq!(vector.values(), &[1.0, 0.0]);
    }

    #[test]
    fn test_unknown_column_is_schema_mismatch() {
        let record = sample_record();
        let err = build(&record, &schema_of(&["age", "shoe_size"])).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch(_)));
    }
}
