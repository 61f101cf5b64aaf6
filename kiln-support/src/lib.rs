//! # Kiln Support
//!
//! Shared utilities for the Kiln DI crates.
//!
//! This crate provides:
//! - Text rendering for build diagnostics (dependency arrows, bullet lists)
//! - "Did you mean?" suggestions for mistyped component identities

pub mod rendering;
