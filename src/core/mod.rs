//! Core domain models for asmflow
//!
//! This module defines the fundamental data structures that represent
//! stages, their declared outputs, and the shared run configuration.

pub mod config;
pub mod manifest;
pub mod pipeline;
pub mod stage;

pub use config::*;
pub use manifest::*;
pub use pipeline::*;
pub use stage::*;
