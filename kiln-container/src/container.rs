//! # The Container: heart of Kiln
//!
//! Registers components, resolves them in a fixed-point build loop, and
//! hands out the finished instances.
//!
//! # Architecture
//! ```text
//! register()/unregister()  ──>  records (dirty)
//!                                  │
//!                               build()
//!                                  │  analyze + merge hints, once per record
//!                                  ▼
//!                         ┌─> pass over unbuilt records ─┐
//!                         │   InstantiationAttempt each  │
//!                         └──── until all built ─────────┘
//!                                  │
//!                               get(identity)
//! ```
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use kiln_container::prelude::*;
//!
//! struct Config {
//!     sender: String,
//! }
//!
//! struct Mailer {
//!     config: Arc<Config>,
//! }
//!
//! let catalog = Catalog::builder()
//!     .component(
//!         ComponentShape::builder::<Config>("Config")
//!             .param(None)
//!             .constructor(|args| Ok(Config { sender: args.get(0)? }))
//!             .build(),
//!     )
//!     .component(
//!         ComponentShape::builder::<Mailer>("Mailer")
//!             .param(Some("Config"))
//!             .constructor(|args| Ok(Mailer { config: args.get(0)? }))
//!             .build(),
//!     )
//!     .build();
//!
//! let mut container = Container::with_introspector(Arc::new(catalog));
//! container.register("Mailer", [Hint::name("Config")]).unwrap();
//! container.register("Config", [Hint::text("ops@example.org")]).unwrap();
//! container.build().expect("Failed to build container");
//!
//! let mailer: Arc<Mailer> = container.get("Mailer").unwrap();
//! assert_eq!(mailer.config.sender, "ops@example.org");
//! ```

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info, instrument, warn};

use kiln_support::rendering::suggest_similar;

use crate::attempt::{Bindings, InstantiationAttempt, Outcome};
use crate::catalog::{Catalog, Introspector};
use crate::error::{
    KilnError, NotFoundError, PendingComponent, Result, UnresolvableGraphError,
};
use crate::hint::{Hint, Hints, Literal};
use crate::instance::Instance;
use crate::record::ComponentRecord;
use crate::resolver::ArgumentResolver;
use crate::settings::Settings;
use crate::shape::Shape;

/// Where the instance store stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// No successful build populated the store (never built, or the last build failed).
    Unbuilt,
    /// A build is running.
    Rebuilding,
    /// The store holds the result of the last successful build.
    Built,
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Dependency injection container with a fixed-point build.
///
/// Registration and build take `&mut self`, so registering while a build
/// runs is impossible by construction. Lookups hand out shared `Arc`s;
/// the container keeps ownership of every instance.
pub struct Container {
    introspector: Arc<dyn Introspector>,
    settings: Settings,
    records: IndexMap<String, ComponentRecord>,
    instances: HashMap<String, Instance>,
    needs_rebuild: bool,
    state: BuildState,
}

impl Container {
    /// A container backed by the global catalog of derived components.
    pub fn new() -> Self {
        Self::with_introspector(Catalog::global())
    }

    /// A container that asks `introspector` about component shapes.
    pub fn with_introspector(introspector: Arc<dyn Introspector>) -> Self {
        Self {
            introspector,
            settings: Settings::default(),
            records: IndexMap::new(),
            instances: HashMap::new(),
            needs_rebuild: true,
            state: BuildState::Unbuilt,
        }
    }

    /// Applies all feature toggles at once.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.set_auto_wiring(settings.auto_wiring);
        self.set_annotation_support(settings.annotations);
        self
    }

    // ── Registration ──

    /// Adds a component, or replaces the one registered under `identity`.
    ///
    /// A replaced component keeps its place in registration order.
    ///
    /// # Errors
    /// [`KilnError::UnknownComponent`] if the introspector has no shape
    /// for `identity`.
    pub fn register(&mut self, identity: &str, hints: impl Into<Hints>) -> Result<()> {
        let shape = self
            .introspector
            .introspect_shape(identity)
            .ok_or_else(|| KilnError::UnknownComponent {
                identity: identity.to_owned(),
            })?;

        let record = ComponentRecord::new(identity, hints.into(), shape);
        let replaced = self.records.insert(identity.to_owned(), record).is_some();

        debug!(identity, replaced, "Registered component");
        self.needs_rebuild = true;
        Ok(())
    }

    /// Removes a component. Returns whether it was registered.
    pub fn unregister(&mut self, identity: &str) -> bool {
        if self.records.shift_remove(identity).is_none() {
            return false;
        }

        debug!(identity, "Unregistered component");
        self.needs_rebuild = true;
        true
    }

    // ── Feature toggles ──

    /// Enables capability auto-wiring and type-derived hints.
    ///
    /// Changing the value marks the container for rebuild.
    pub fn set_auto_wiring(&mut self, enabled: bool) {
        if self.settings.auto_wiring != enabled {
            self.settings.auto_wiring = enabled;
            self.needs_rebuild = true;
        }
    }

    /// Whether auto-wiring is enabled.
    pub fn auto_wiring(&self) -> bool {
        self.settings.auto_wiring
    }

    /// Enables collection of hints declared on the components.
    ///
    /// Changing the value marks the container for rebuild.
    pub fn set_annotation_support(&mut self, enabled: bool) {
        if self.settings.annotations != enabled {
            self.settings.annotations = enabled;
            self.needs_rebuild = true;
        }
    }

    /// Whether annotation hints are collected.
    pub fn annotation_support(&self) -> bool {
        self.settings.annotations
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    // ── Build ──

    /// Builds every registered component.
    ///
    /// Does nothing when no registration changed since the last
    /// successful build. Otherwise starts from an empty instance store.
    ///
    /// # Errors
    /// The first structural error found, or
    /// [`KilnError::UnresolvableGraph`] when passes stop making progress.
    /// The container stays dirty after a failure.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(&mut self) -> Result<()> {
        if !self.needs_rebuild {
            debug!("Container is up to date, skipping build");
            return Ok(());
        }

        info!(
            registered = self.records.len(),
            auto_wiring = self.settings.auto_wiring,
            annotations = self.settings.annotations,
            "Building container"
        );

        self.state = BuildState::Rebuilding;
        self.instances.clear();
        self.analyze();

        match self.resolve() {
            Ok(passes) => {
                self.needs_rebuild = false;
                self.state = BuildState::Built;
                info!(instances = self.instances.len(), passes, "Container built successfully ✓");
                Ok(())
            }
            Err(error) => {
                self.state = BuildState::Unbuilt;
                warn!(
                    kind = ?error.kind(),
                    built = self.instances.len(),
                    "Container build failed"
                );
                Err(error)
            }
        }
    }

    /// Fills the derived hint sources and merges every record, once.
    fn analyze(&mut self) {
        let Settings { auto_wiring, annotations } = self.settings;

        for record in self.records.values_mut() {
            record.hints.auto_wiring = if auto_wiring {
                auto_wiring_hints(record.shape(), self.introspector.as_ref())
            } else {
                Hints::new()
            };
            record.hints.annotations = if annotations {
                self.introspector.annotation_hints(record.identity())
            } else {
                Hints::new()
            };
            ArgumentResolver::apply(record);
        }
    }

    /// Runs passes until everything is built. Returns the pass count.
    fn resolve(&mut self) -> Result<usize> {
        let total = self.records.len();
        let mut bindings = Bindings::default();
        let mut waiting: HashMap<String, String> = HashMap::new();
        let mut previous: Option<usize> = None;
        let mut stalled = 0;
        let mut passes = 0;

        while self.instances.len() < total {
            let built = self.instances.len();
            if previous == Some(built) {
                stalled += 1;
                if stalled > total {
                    return Err(self.unresolvable(&waiting, passes));
                }
            } else {
                stalled = 0;
                previous = Some(built);
            }

            passes += 1;
            for (identity, record) in &self.records {
                if self.instances.contains_key(identity) {
                    continue;
                }

                let outcome = InstantiationAttempt::new(
                    &self.records,
                    &self.instances,
                    self.introspector.as_ref(),
                    self.settings.auto_wiring,
                )
                .attempt(record, &mut bindings);

                match outcome {
                    Outcome::Built(instance) => {
                        waiting.remove(identity);
                        self.instances.insert(identity.clone(), instance);
                    }
                    Outcome::Deferred { waiting_on } => {
                        waiting.insert(identity.clone(), waiting_on);
                    }
                    Outcome::Failed(error) => return Err(error),
                }
            }

            debug!(
                pass = passes,
                built = self.instances.len(),
                remaining = total - self.instances.len(),
                bindings = bindings.len(),
                stalled,
                "Finished pass"
            );
        }

        Ok(passes)
    }

    fn unresolvable(&self, waiting: &HashMap<String, String>, passes: usize) -> KilnError {
        let unbuilt: Vec<PendingComponent> = self
            .records
            .keys()
            .filter(|identity| !self.instances.contains_key(*identity))
            .map(|identity| PendingComponent {
                identity: identity.clone(),
                waiting_on: waiting.get(identity).cloned(),
            })
            .collect();

        warn!(unbuilt = unbuilt.len(), passes, "Dependency graph did not converge");
        KilnError::UnresolvableGraph(UnresolvableGraphError { unbuilt, passes })
    }

    // ── Lookup ──

    /// Returns the built component under `identity` as `Arc<T>`.
    ///
    /// ```rust,ignore
    /// let mailer: Arc<Mailer> = container.get("Mailer")?;
    /// ```
    ///
    /// # Errors
    /// [`KilnError::NotFound`] unless the last build succeeded and built
    /// `identity`; [`KilnError::TypeMismatch`] if it is not a `T`.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, identity: &str) -> Result<Arc<T>> {
        let instance = self.instance(identity)?;
        instance.downcast::<T>().ok_or_else(|| KilnError::TypeMismatch {
            identity: identity.to_owned(),
            expected: type_name::<T>(),
            actual: instance.type_name(),
        })
    }

    /// Returns the type-erased instance under `identity`.
    pub fn instance(&self, identity: &str) -> Result<&Instance> {
        let found = match self.state {
            BuildState::Built => self.instances.get(identity),
            BuildState::Unbuilt | BuildState::Rebuilding => None,
        };

        found.ok_or_else(|| {
            KilnError::NotFound(NotFoundError {
                identity: identity.to_owned(),
                suggestions: self.find_suggestions(identity),
            })
        })
    }

    fn find_suggestions(&self, identity: &str) -> Vec<String> {
        let known: Vec<&str> = self.records.keys().map(String::as_str).collect();
        suggest_similar(identity, &known, 3)
    }

    // ── Introspection ──

    /// True when a registration changed since the last successful build.
    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.records.contains_key(identity)
    }

    pub fn record(&self, identity: &str) -> Option<&ComponentRecord> {
        self.records.get(identity)
    }

    /// Registered identities, in registration order.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Returns the number of registered components.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no components are registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.records.len())
            .field("built", &self.instances.len())
            .field("state", &self.state)
            .field("needs_rebuild", &self.needs_rebuild)
            .finish()
    }
}

/// Hints derived from the shape's declared parameter types.
///
/// Optional parameters with nothing to wire get `null`.
fn auto_wiring_hints(shape: &dyn Shape, introspector: &dyn Introspector) -> Hints {
    shape
        .param_hints()
        .into_iter()
        .enumerate()
        .filter_map(|(position, hint)| match hint {
            Some(name) => {
                let name = introspector.identity_for_type(&name).unwrap_or(name);
                Some((position, Hint::Name(name)))
            }
            None if shape.is_optional_param(position) => {
                Some((position, Hint::Literal(Literal::Null)))
            }
            None => None,
        })
        .collect()
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{BuildState, Container};
    pub use crate::catalog::{Catalog, Introspector};
    pub use crate::error::{ErrorKind, KilnError, Result};
    pub use crate::hint::{Hint, Hints, Literal};
    pub use crate::instance::{Arguments, Instance};
    pub use crate::settings::Settings;
    pub use crate::shape::{Component, ComponentShape, ConstructError, Shape};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
