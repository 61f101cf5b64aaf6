//! Core container implementation for Kiln.

pub mod attempt;
pub mod binder;
pub mod catalog;
pub mod container;
pub mod error;
pub mod hint;
pub mod instance;
pub mod record;
pub mod resolver;
pub mod settings;
pub mod shape;

#[cfg(test)]
mod fixtures;

pub use catalog::{Catalog, Introspector};
pub use container::{BuildState, Container, prelude};
pub use error::{ErrorKind, KilnError, Result};
pub use hint::{Hint, Hints, Literal};
pub use instance::{Arguments, Instance};
pub use settings::Settings;
pub use shape::{Component, ComponentShape, ConstructError, Shape};

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}
