//! The catalog of known component shapes and capability names.
//!
//! The container never inspects Rust types itself. It asks an
//! [`Introspector`] whether a name is a component or a capability, and for
//! a component's [`Shape`]. [`Catalog`] is the stock introspector.
//!
//! Shapes generated by `#[derive(Component)]` and names declared with
//! [`capability!`](crate::capability) are submitted through `inventory` and
//! collected into [`Catalog::global`] on first use.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use kiln_support::rendering::shorten_type_name;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::hint::Hints;
use crate::shape::{ComponentShape, Shape};

/// Answers the engine's questions about names and component shapes.
pub trait Introspector: Send + Sync {
    /// Shape of the component registered under `identity`, if known.
    fn introspect_shape(&self, identity: &str) -> Option<Arc<dyn Shape>>;

    /// True when `name` identifies a component, registered with the
    /// container or not.
    fn is_component(&self, name: &str) -> bool;

    /// True when `name` identifies a capability.
    fn is_capability(&self, name: &str) -> bool;

    /// Annotation hints for `identity`.
    fn annotation_hints(&self, identity: &str) -> Hints {
        self.introspect_shape(identity)
            .map(|shape| shape.annotation_hints())
            .unwrap_or_default()
    }

    /// Identity of the component whose Rust type is named `type_name`,
    /// when that type is registered under another identity.
    fn identity_for_type(&self, _type_name: &str) -> Option<String> {
        None
    }
}

/// Inventory entry submitted by `#[derive(Component)]`.
pub struct ShapeEntry {
    factory: fn() -> ComponentShape,
}

impl ShapeEntry {
    pub const fn new(factory: fn() -> ComponentShape) -> Self {
        Self { factory }
    }
}

inventory::collect!(ShapeEntry);

/// Inventory entry submitted by [`capability!`](crate::capability).
pub struct CapabilityEntry {
    name: &'static str,
}

impl CapabilityEntry {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

inventory::collect!(CapabilityEntry);

/// Declares capability names so they are known even with no implementer.
///
/// ```rust,ignore
/// pub trait Transport: Send + Sync {}
/// kiln::capability!(Transport);
/// ```
#[macro_export]
macro_rules! capability {
    ($($name:ident),+ $(,)?) => {
        $(
            $crate::__private::inventory::submit! {
                $crate::catalog::CapabilityEntry::new(stringify!($name))
            }
        )+
    };
}

static GLOBAL: Lazy<Arc<Catalog>> = Lazy::new(|| Arc::new(Catalog::from_inventory()));

/// Component shapes by identity, plus every known capability name.
#[derive(Default)]
pub struct Catalog {
    shapes: IndexMap<String, Arc<dyn Shape>>,
    capabilities: IndexSet<String>,
    /// Short type name -> identity, for shapes named differently from
    /// their type. `None` marks a type name claimed by two identities.
    aliases: IndexMap<String, Option<String>>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder { catalog: Catalog::default() }
    }

    /// The process-wide catalog assembled from `inventory` submissions.
    pub fn global() -> Arc<Catalog> {
        Arc::clone(&GLOBAL)
    }

    /// Collects every submitted shape and capability declaration.
    pub fn from_inventory() -> Self {
        let mut builder = Catalog::builder();
        for entry in inventory::iter::<ShapeEntry> {
            builder = builder.component((entry.factory)());
        }
        for entry in inventory::iter::<CapabilityEntry> {
            builder = builder.capability(entry.name);
        }
        let catalog = builder.build();
        debug!(
            components = catalog.shapes.len(),
            capabilities = catalog.capabilities.len(),
            "Collected catalog from inventory"
        );
        catalog
    }

    /// Component identities, in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    /// Capability names, in insertion order.
    pub fn capabilities(&self) -> impl Iterator<Item = &str> {
        self.capabilities.iter().map(String::as_str)
    }
}

impl Introspector for Catalog {
    fn introspect_shape(&self, identity: &str) -> Option<Arc<dyn Shape>> {
        self.shapes.get(identity).cloned()
    }

    fn is_component(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    fn is_capability(&self, name: &str) -> bool {
        self.capabilities.contains(name)
    }

    fn identity_for_type(&self, type_name: &str) -> Option<String> {
        if self.is_component(type_name) || self.is_capability(type_name) {
            return None;
        }
        self.aliases.get(type_name).cloned().flatten()
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("components", &self.shapes.keys().collect::<Vec<_>>())
            .field("capabilities", &self.capabilities)
            .field("aliases", &self.aliases)
            .finish()
    }
}

/// Assembles a [`Catalog`] by hand.
pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    /// Adds a shape; its implemented capabilities become known names.
    ///
    /// A second shape with the same identity replaces the first.
    pub fn component(self, shape: impl Shape + 'static) -> Self {
        self.shape(Arc::new(shape))
    }

    pub fn shape(mut self, shape: Arc<dyn Shape>) -> Self {
        let identity = shape.identity().to_owned();
        for capability in shape.capabilities() {
            self.catalog.capabilities.insert(capability);
        }
        let alias = shorten_type_name(shape.type_name());
        if alias != identity {
            self.alias(alias, &identity);
        }
        if self.catalog.shapes.insert(identity.clone(), shape).is_some() {
            warn!(identity = %identity, "Duplicate shape in catalog, keeping the last one");
        }
        self
    }

    fn alias(&mut self, type_name: String, identity: &str) {
        let target = match self.catalog.aliases.get(&type_name) {
            None => Some(identity.to_owned()),
            Some(Some(existing)) if existing == identity => return,
            Some(None) => return,
            Some(Some(_)) => {
                warn!(type_name = %type_name, "Type name used by several identities, not wiring by it");
                None
            }
        };
        self.catalog.aliases.insert(type_name, target);
    }

    /// Declares a capability name.
    pub fn capability(mut self, name: impl Into<String>) -> Self {
        self.catalog.capabilities.insert(name.into());
        self
    }

    pub fn build(self) -> Catalog {
        self.catalog
    }
}
