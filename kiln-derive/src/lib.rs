//! Derive macros for Kiln components.

pub use kiln_macros::Component;
