//! Report assembly: diagnosis, alerts and attribution into a document.
//!
//! Pure formatting: every decision (ranking, tiers, alerts, attribution)
//! was made upstream. The assembler produces a layout-agnostic
//! [`ReportContext`] and hands it to whichever renderer is plugged in.

use crate::application::attribution::AttributionSet;
use crate::domain::DiagnosisResult;
use crate::ports::{ReportContext, ReportRenderer, ReportSection};
use crate::PipelineError;

const REPORT_TITLE: &str = "Clinical Diagnosis Support Report";

const DISCLAIMER: &str = "This report was generated by a clinical decision-support \
system. It does not replace the judgment of a medical professional.";

/// Suggested download filename for a report.
///
/// Embeds only the patient's age, as the surrounding system has no
/// stronger identifier to offer; collisions across same-age patients are
/// a known limitation.
#[must_use]
pub fn suggested_filename(age: f64) -> String {
    format!("diagnosis_report_{}.pdf", age as i64)
}

/// Assemble the report content for one prediction.
#[must_use]
pub fn assemble(result: &DiagnosisResult, attribution: Option<&AttributionSet>) -> ReportContext {
    let principal = result.principal();

    let mut sections = Vec::new();

    sections.push(ReportSection {
        heading: "Principal Diagnosis".into(),
        lines: vec![
            format!(
                "{} ({}) with {:.2}% confidence",
                principal.diagnosis,
                principal.diagnosis.description(),
                principal.probability * 100.0
            ),
            format!("Overall confidence level: {}", result.tier),
        ],
        highlighted: false,
    });

    let differentials: Vec<String> = result
        .ranked
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, entry)| {
            format!(
                "{}. {} ({:.2}%)",
                i + 1,
                entry.diagnosis,
                entry.probability * 100.0
            )
        })
        .collect();
    sections.push(ReportSection {
        heading: "Differential Diagnoses".into(),
        lines: differentials,
        highlighted: false,
    });

    if !result.alerts.is_empty() {
        sections.push(ReportSection {
            heading: "Clinical Alerts Identified".into(),
            lines: result.alerts.iter().map(|a| a.message()).collect(),
            highlighted: true,
        });
    }

    if let Some(set) = attribution {
        sections.push(ReportSection {
            heading: format!("Top Contributing Factors ({})", set.diagnosis),
            lines: set.entries.iter().map(|e| e.narrative()).collect(),
            highlighted: false,
        });
    }

    ReportContext {
        title: REPORT_TITLE.into(),
        sections,
        footer: DISCLAIMER.into(),
    }
}

/// Assemble and render in one step, returning the document bytes.
///
/// # Errors
/// Returns [`PipelineError::Render`] if the renderer backend fails.
pub fn generate(
    renderer: &dyn ReportRenderer,
    result: &DiagnosisResult,
    attribution: Option<&AttributionSet>,
) -> Result<Vec<u8>, PipelineError> {
    let context = assemble(result, attribution);
    let bytes = renderer.render(&context)?;
    tracing::debug!("Rendered report ({} bytes)", bytes.len());
    Ok(bytes)
}
