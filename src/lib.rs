//! Cultivar: crop recommendation web service.
//!
//! Accepts seven soil/climate measurements over a form-encoded POST,
//! classifies them with a pre-trained random forest loaded from disk,
//! and returns the recommended crop as an HTML view or a downloadable
//! PDF report.
//!
//! # Quick Start
//!
//! ```no_run
//! use cultivar::server::{self, ServerConfig};
//!
//! let config = ServerConfig::default();
//! server::run(config).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`sanitize`]: field descriptors, numeric sanitization, and the
//!   validated [`sanitize::FeatureVector`]
//! - [`model`]: classifier and label-decoder artifacts, loaded once at
//!   startup and read-only thereafter
//! - [`report`]: single-page PDF layout
//! - [`server`]: axum router, handlers, and shared state
//! - [`error`]: the crate-wide error type

pub mod error;
pub mod model;
pub mod report;
pub mod sanitize;
pub mod server;

pub use error::{CultivarError, Result};
