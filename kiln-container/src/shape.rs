//! Component shapes: what the engine may know about a component.
//!
//! A [`Shape`] answers the questions the resolution engine asks about a
//! component without the engine knowing its Rust type: how many
//! constructor parameters are required, what type each parameter declares
//! (the auto-wiring source), which capabilities it implements, and how to
//! construct it from materialized [`Arguments`].
//!
//! [`ComponentShape`] is the stock implementation. Build one by hand with
//! [`ShapeBuilder`], or let `#[derive(Component)]` generate it.
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use kiln_container::shape::{ComponentShape, Shape};
//!
//! trait Transport: Send + Sync {}
//!
//! struct Smtp {
//!     host: String,
//! }
//! impl Transport for Smtp {}
//!
//! let shape = ComponentShape::builder::<Smtp>("Smtp")
//!     .param(None)
//!     .implements::<dyn Transport>("Transport", |smtp| smtp)
//!     .constructor(|args| Ok(Smtp { host: args.get(0)? }))
//!     .build();
//!
//! assert_eq!(shape.required_params(), 1);
//! assert!(shape.implements("Transport"));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::hint::{Hint, Hints};
use crate::instance::{Arguments, Instance};

/// Why a shape refused to construct.
#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    /// There is no constructor the container may call.
    #[error("no accessible constructor")]
    NoAccessibleConstructor,

    #[error("argument {position} is missing")]
    Missing { position: usize },

    #[error("argument {position} expected {expected}, found {found}")]
    Mismatch {
        position: usize,
        expected: &'static str,
        found: String,
    },

    /// The constructor itself failed.
    #[error(transparent)]
    Failed(Box<dyn std::error::Error + Send + Sync>),
}

impl ConstructError {
    /// Wraps an arbitrary constructor failure.
    pub fn failed(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ConstructError::Failed(error.into())
    }
}

/// Introspectable description of a component.
pub trait Shape: Send + Sync {
    /// Identity the component is registered under.
    fn identity(&self) -> &str;

    /// Number of parameters that must be supplied.
    fn required_params(&self) -> usize;

    /// Full Rust type name of the component.
    fn type_name(&self) -> &str;

    /// Declared type name per parameter; `None` where nothing can be wired.
    fn param_hints(&self) -> Vec<Option<String>>;

    /// True when the parameter at `position` may be left out.
    fn is_optional_param(&self, position: usize) -> bool {
        position >= self.required_params()
    }

    fn implements(&self, capability: &str) -> bool;

    /// Every capability this component implements.
    fn capabilities(&self) -> Vec<String>;

    /// Converts a built instance of this component into its `capability` view.
    fn upcast(&self, capability: &str, instance: &Instance) -> Option<Instance>;

    /// Hints declared on the component itself.
    fn annotation_hints(&self) -> Hints {
        Hints::new()
    }

    fn construct(&self, arguments: Arguments) -> Result<Instance, ConstructError>;
}

/// Implemented by `#[derive(Component)]`.
pub trait Component: Send + Sync + Sized + 'static {
    fn shape() -> ComponentShape;
}

type Caster = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;
type Constructor = Arc<dyn Fn(Arguments) -> Result<Instance, ConstructError> + Send + Sync>;

#[derive(Debug, Clone)]
struct Param {
    hint: Option<String>,
    optional: bool,
}

/// The stock [`Shape`] implementation.
#[derive(Clone)]
pub struct ComponentShape {
    identity: String,
    type_name: &'static str,
    params: Vec<Param>,
    capabilities: Vec<(String, Caster)>,
    annotations: Hints,
    constructor: Option<Constructor>,
}

impl ComponentShape {
    /// Starts a shape for values of type `T`.
    pub fn builder<T: Send + Sync + 'static>(identity: impl Into<String>) -> ShapeBuilder<T> {
        ShapeBuilder::new(identity)
    }

    /// Type name of the component this shape constructs.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl Shape for ComponentShape {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn required_params(&self) -> usize {
        self.params
            .iter()
            .rposition(|param| !param.optional)
            .map_or(0, |last| last + 1)
    }

    fn type_name(&self) -> &str {
        self.type_name
    }

    fn param_hints(&self) -> Vec<Option<String>> {
        self.params.iter().map(|param| param.hint.clone()).collect()
    }

    fn is_optional_param(&self, position: usize) -> bool {
        self.params.get(position).is_some_and(|param| param.optional)
    }

    fn implements(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|(name, _)| name == capability)
    }

    fn capabilities(&self) -> Vec<String> {
        self.capabilities.iter().map(|(name, _)| name.clone()).collect()
    }

    fn upcast(&self, capability: &str, instance: &Instance) -> Option<Instance> {
        self.capabilities
            .iter()
            .find(|(name, _)| name == capability)
            .and_then(|(_, cast)| cast(instance))
    }

    fn annotation_hints(&self) -> Hints {
        self.annotations.clone()
    }

    fn construct(&self, arguments: Arguments) -> Result<Instance, ConstructError> {
        match &self.constructor {
            Some(constructor) => constructor(arguments),
            None => Err(ConstructError::NoAccessibleConstructor),
        }
    }
}

impl fmt::Debug for ComponentShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentShape")
            .field("identity", &self.identity)
            .field("params", &self.params)
            .field("capabilities", &self.capabilities())
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

/// Builds a [`ComponentShape`] for `T`.
pub struct ShapeBuilder<T> {
    shape: ComponentShape,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ShapeBuilder<T> {
    fn new(identity: impl Into<String>) -> Self {
        Self {
            shape: ComponentShape {
                identity: identity.into(),
                type_name: std::any::type_name::<T>(),
                params: Vec::new(),
                capabilities: Vec::new(),
                annotations: Hints::new(),
                constructor: None,
            },
            _marker: PhantomData,
        }
    }

    /// Declares the next required parameter and its wireable type name.
    pub fn param(mut self, hint: Option<&str>) -> Self {
        self.shape.params.push(Param {
            hint: hint.map(str::to_owned),
            optional: false,
        });
        self
    }

    /// Declares the next parameter as optional.
    pub fn optional_param(mut self, hint: Option<&str>) -> Self {
        self.shape.params.push(Param {
            hint: hint.map(str::to_owned),
            optional: true,
        });
        self
    }

    /// Attaches an annotation hint to `position`.
    pub fn annotate(mut self, position: usize, hint: impl Into<Hint>) -> Self {
        self.shape.annotations.insert(position, hint);
        self
    }

    /// Declares that `T` implements `capability`, viewed as `C`.
    ///
    /// `cast` is usually the identity closure; the unsizing coercion to
    /// `Arc<dyn Trait>` happens at its return.
    pub fn implements<C>(
        mut self,
        capability: impl Into<String>,
        cast: impl Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    ) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let caster: Caster = Arc::new(move |instance: &Instance| {
            instance.downcast::<T>().map(|concrete| Instance::new(cast(concrete)))
        });
        self.shape.capabilities.push((capability.into(), caster));
        self
    }

    /// Sets the constructor. Without one, construction always fails with
    /// [`ConstructError::NoAccessibleConstructor`].
    pub fn constructor(
        mut self,
        constructor: impl Fn(&Arguments) -> Result<T, ConstructError> + Send + Sync + 'static,
    ) -> Self {
        self.shape.constructor = Some(Arc::new(move |arguments: Arguments| {
            constructor(&arguments).map(Instance::from_value)
        }));
        self
    }

    pub fn build(self) -> ComponentShape {
        self.shape
    }
}
