//! Error types for Kiln container operations.
//!
//! Every structural problem found during [`Container::build`] is reported
//! with the component that hit it and a hint about how to fix the
//! registration.
//!
//! [`Container::build`]: crate::container::Container::build

use std::fmt;

use kiln_support::rendering::{render_chain, render_list, shorten_type_name};

use crate::shape::ConstructError;

/// Main error type for all Kiln operations.
#[derive(Debug, thiserror::Error)]
pub enum KilnError {
    /// Lookup of an identity that has no built instance.
    #[error("{}", .0)]
    NotFound(NotFoundError),

    /// The introspector has no shape for the identity being registered.
    #[error("Unknown component: {identity}\n  Hint: derive `Component` for it or add its shape to the catalog")]
    UnknownComponent { identity: String },

    /// A component names itself as one of its own arguments.
    #[error(
        "Component {identity} cannot be constructed with itself as argument {position}"
    )]
    SelfReference { identity: String, position: usize },

    /// A capability argument has no usable implementation.
    #[error("{}", .0)]
    NoImplementation(CapabilityError),

    /// A capability argument has more than one implementation.
    #[error("{}", .0)]
    AmbiguousImplementation(AmbiguityError),

    /// Fewer arguments were materialized than the constructor requires.
    #[error(
        "Arguments do not match for {identity} ({required} required, {given} given)"
    )]
    ArityMismatch {
        identity: String,
        required: usize,
        given: usize,
    },

    /// The shape refused construction.
    #[error("Component {identity} does not have an accessible constructor")]
    NoAccessibleConstructor { identity: String },

    /// The constructor ran but rejected its arguments.
    #[error("Failed to construct {identity}: {source}")]
    ConstructionFailed {
        identity: String,
        #[source]
        source: ConstructError,
    },

    /// A built instance was requested as the wrong type.
    #[error(
        "Component {identity} is a {}, not a {}",
        shorten_type_name(.actual),
        shorten_type_name(.expected)
    )]
    TypeMismatch {
        identity: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The fixed-point loop stopped making progress.
    #[error("{}", .0)]
    UnresolvableGraph(UnresolvableGraphError),
}

/// Discriminant of [`KilnError`], convenient for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    UnknownComponent,
    SelfReference,
    NoImplementation,
    AmbiguousImplementation,
    ArityMismatch,
    NoAccessibleConstructor,
    ConstructionFailed,
    TypeMismatch,
    UnresolvableGraph,
}

impl KilnError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KilnError::NotFound(_) => ErrorKind::NotFound,
            KilnError::UnknownComponent { .. } => ErrorKind::UnknownComponent,
            KilnError::SelfReference { .. } => ErrorKind::SelfReference,
            KilnError::NoImplementation(_) => ErrorKind::NoImplementation,
            KilnError::AmbiguousImplementation(_) => ErrorKind::AmbiguousImplementation,
            KilnError::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            KilnError::NoAccessibleConstructor { .. } => ErrorKind::NoAccessibleConstructor,
            KilnError::ConstructionFailed { .. } => ErrorKind::ConstructionFailed,
            KilnError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            KilnError::UnresolvableGraph(_) => ErrorKind::UnresolvableGraph,
        }
    }
}

/// Error when nothing was built under the requested identity.
#[derive(Debug)]
pub struct NotFoundError {
    /// The identity that was requested
    pub identity: String,
    /// Registered identities that look similar
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No built instance for {}", self.identity)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:\n{}", render_list(&self.suggestions, 4))?;
        }

        write!(
            f,
            "\n  Hint: register {} and call .build() before looking it up",
            self.identity
        )
    }
}

/// Error for a capability argument with zero usable implementations.
#[derive(Debug)]
pub struct CapabilityError {
    pub capability: String,
    /// Component whose argument names the capability
    pub required_by: String,
    pub position: usize,
    /// Whether auto-wiring was enabled when the lookup happened
    pub auto_wiring: bool,
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "There is no concrete implementation for {} used by {} (argument {})",
            self.capability, self.required_by, self.position
        )?;
        if self.auto_wiring {
            write!(f, "\n  Hint: register a component implementing {}", self.capability)
        } else {
            write!(
                f,
                "\n  Hint: auto-wiring is disabled; enable it with .set_auto_wiring(true) or name a component instead"
            )
        }
    }
}

/// Error for a capability argument with several implementations.
#[derive(Debug)]
pub struct AmbiguityError {
    pub capability: String,
    pub required_by: String,
    pub position: usize,
    /// Every implementer, in registration order
    pub candidates: Vec<String>,
}

impl fmt::Display for AmbiguityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "There are multiple implementations for {} used by {} (argument {}):\n{}",
            self.capability,
            self.required_by,
            self.position,
            render_list(&self.candidates, 4)
        )?;
        write!(f, "\n  Hint: name the implementation you want in the argument hints")
    }
}

/// A component still unbuilt when the stall budget ran out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingComponent {
    pub identity: String,
    /// Identity it was deferred on during the last pass, if it got that far
    pub waiting_on: Option<String>,
}

/// Error when the fixed-point loop stalls for longer than the component count.
///
/// Lists every unbuilt component; a true cycle and a dependency that was
/// never registered look the same from inside the loop.
#[derive(Debug)]
pub struct UnresolvableGraphError {
    pub unbuilt: Vec<PendingComponent>,
    pub passes: usize,
}

impl UnresolvableGraphError {
    /// Identities of the unbuilt components, in registration order.
    pub fn identities(&self) -> Vec<&str> {
        self.unbuilt.iter().map(|p| p.identity.as_str()).collect()
    }
}

impl fmt::Display for UnresolvableGraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Can not instantiate some components (missing {}) after {} passes:",
            self.unbuilt.len(),
            self.passes
        )?;

        let lines: Vec<String> = self
            .unbuilt
            .iter()
            .map(|pending| match &pending.waiting_on {
                Some(dep) => render_chain(&[pending.identity.as_str(), dep.as_str()]),
                None => pending.identity.clone(),
            })
            .collect();
        write!(f, "\n{}", render_list(&lines, 4))?;

        write!(
            f,
            "\n  Hint: look for a dependency cycle or a dependency that was never registered"
        )
    }
}

/// Convenient Result type for Kiln operations.
pub type Result<T> = std::result::Result<T, KilnError>;
