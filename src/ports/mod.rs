//! Ports layer: trait definitions for external operations.
//!
//! Following hexagonal architecture, these traits define the boundaries
//! between the pipeline and external collaborators (model artifact,
//! attribution backend, document renderer).

mod classifier;
mod explainer;
mod report;

pub use classifier::{Classifier, ClassifierError, Scaler};
pub use explainer::Explainer;
pub use report::{RenderError, ReportContext, ReportRenderer, ReportSection};
