//! Adapters layer: concrete implementations of the ports.
//!
//! - `forest`: JSON-exported tree ensemble (classifier, scaler, attribution)
//! - `pdf`: report rendering via `printpdf`
//! - `sanitize`: PII filtering for logs

pub mod forest;
pub mod pdf;
pub mod sanitize;
