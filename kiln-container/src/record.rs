//! Component records: one per registered component.

use std::fmt;
use std::sync::Arc;

use crate::hint::{ArgumentSpec, HintSources, Hints};
use crate::shape::Shape;

/// Everything the container keeps about one registered component.
///
/// `hints` holds what was declared; `resolved` is the merged spec of the
/// current build, `None` until the merge has run.
#[derive(Clone)]
pub struct ComponentRecord {
    identity: String,
    pub(crate) hints: HintSources,
    pub(crate) resolved: Option<ArgumentSpec>,
    shape: Arc<dyn Shape>,
}

impl ComponentRecord {
    pub fn new(identity: impl Into<String>, manual: Hints, shape: Arc<dyn Shape>) -> Self {
        Self {
            identity: identity.into(),
            hints: HintSources::manual(manual),
            resolved: None,
            shape,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn hints(&self) -> &HintSources {
        &self.hints
    }

    /// The merged argument spec, once a build has merged this record.
    pub fn resolved(&self) -> Option<&ArgumentSpec> {
        self.resolved.as_ref()
    }

    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }
}

impl fmt::Debug for ComponentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRecord")
            .field("identity", &self.identity)
            .field("hints", &self.hints)
            .field("resolved", &self.resolved)
            .finish()
    }
}
