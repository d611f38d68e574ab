//! Report renderer port: trait for document generation.

use thiserror::Error;

/// Errors surfaced by report renderers.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document rendering failed: {0}")]
    Render(String),
}

/// A section of the assembled report: a heading plus body lines.
#[derive(Debug, Clone)]
pub struct ReportSection {
    pub heading: String,
    pub lines: Vec<String>,
    /// Rendered visually distinguished (alerts).
    pub highlighted: bool,
}

/// Fully assembled report content, layout-agnostic.
///
/// The assembler produces this; renderers only place text. No decision
/// logic lives behind this boundary.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub title: String,
    pub sections: Vec<ReportSection>,
    pub footer: String,
}

/// Trait for rendering an assembled report into a document byte buffer.
pub trait ReportRenderer: Send + Sync {
    /// Render the report, returning the document bytes (e.g. a PDF).
    ///
    /// # Errors
    /// Returns [`RenderError::Render`] if the backend fails.
    fn render(&self, report: &ReportContext) -> Result<Vec<u8>, RenderError>;
}
