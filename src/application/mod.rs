//! Application layer: the deterministic inference pipeline.
//!
//! Data flow: raw record -> validator (side channel: alerts) ->
//! feature builder -> inference engine -> {attribution, report}.

mod attribution;
mod features;
mod inference;
mod report;
mod resources;
pub mod validator;

pub use attribution::{AttributionEntry, AttributionService, AttributionSet};
pub use features::{bmi_category, build, FeatureVector};
pub use inference::InferenceService;
pub use report::{assemble, generate, suggested_filename};
pub use resources::{FeatureSchema, ResourceBundle, ResourceError};
