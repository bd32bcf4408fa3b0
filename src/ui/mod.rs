//! ui
//!
//! User-facing output.
//!
//! # Design
//!
//! Command results go through [`output`] so `--quiet` and `--debug` are
//! honored in one place. Structured diagnostics go through `tracing`
//! instead.

pub mod output;
