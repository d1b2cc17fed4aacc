//! Admissions desk: interview scheduling and admission-decision engine.
//!
//! The interesting state lives in [`workflows::admissions`]; everything
//! else is the ambient service shell (configuration, telemetry, in-memory
//! infrastructure, HTTP error mapping).

pub mod config;
pub mod error;
pub mod infra;
pub mod telemetry;
pub mod workflows;
