//! Rubric-driven scoring of free-text argumentative answers.
//!
//! The [`scoring`] module holds the normalization pipeline; [`config`],
//! [`error`] and [`telemetry`] carry the service plumbing shared with the
//! `kritis-api` binary.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
