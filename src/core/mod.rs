//! Core domain models for provisioning
//!
//! This module defines the fundamental data structures that represent
//! provisioning steps, the pipeline that sequences them, and run configuration.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod step;

pub use config::{RunConfig, Settings};
pub use error::ProvisionError;
pub use pipeline::*;
pub use state::*;
pub use step::*;
