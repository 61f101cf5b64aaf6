//! Capability → implementation lookup over registered components.

use indexmap::IndexMap;
use tracing::trace;

use crate::record::ComponentRecord;

/// Finds registered implementers of a capability.
pub struct InterfaceBinder<'a> {
    records: &'a IndexMap<String, ComponentRecord>,
}

impl<'a> InterfaceBinder<'a> {
    pub fn new(records: &'a IndexMap<String, ComponentRecord>) -> Self {
        Self { records }
    }

    /// Identities of every registered component implementing `capability`,
    /// in registration order.
    pub fn implementations_of(&self, capability: &str) -> Vec<&'a str> {
        let found: Vec<&'a str> = self
            .records
            .values()
            .filter(|record| record.shape().implements(capability))
            .map(ComponentRecord::identity)
            .collect();
        trace!(capability, implementations = found.len(), "Scanned implementations");
        found
    }
}
