//! One instantiation attempt for one component.
//!
//! The attempt walks the component's merged argument spec and materializes
//! each position. A dependency that is registered but not built yet makes
//! the whole attempt [`Outcome::Deferred`]; the fixed-point loop retries it
//! on a later pass. Anything that can never succeed as declared is
//! [`Outcome::Failed`] and aborts the build.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::binder::InterfaceBinder;
use crate::catalog::Introspector;
use crate::error::{AmbiguityError, CapabilityError, KilnError};
use crate::hint::{ArgumentSpec, Hint, Literal};
use crate::instance::{Argument, Arguments, Instance};
use crate::record::ComponentRecord;
use crate::shape::ConstructError;

/// Result of a single attempt.
#[derive(Debug)]
pub enum Outcome {
    Built(Instance),
    /// Not buildable this pass; `waiting_on` is the unbuilt dependency.
    Deferred { waiting_on: String },
    Failed(KilnError),
}

/// Capability decisions memoized during one build.
///
/// Once a capability argument resolves to a single implementer, that
/// position is treated as a direct reference to the implementer for the
/// rest of the build. Kept apart from the records, which only hold what
/// was declared.
#[derive(Debug, Default)]
pub struct Bindings {
    bound: HashMap<(String, usize), String>,
}

impl Bindings {
    pub fn get(&self, identity: &str, position: usize) -> Option<&str> {
        self.bound
            .get(&(identity.to_owned(), position))
            .map(String::as_str)
    }

    pub fn bind(&mut self, identity: &str, position: usize, implementor: &str) {
        self.bound
            .insert((identity.to_owned(), position), implementor.to_owned());
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

enum Step {
    Ready(Argument),
    Defer(String),
}

/// Read-only view of the build state an attempt needs.
pub struct InstantiationAttempt<'a> {
    records: &'a IndexMap<String, ComponentRecord>,
    instances: &'a HashMap<String, Instance>,
    introspector: &'a dyn Introspector,
    auto_wiring: bool,
}

impl<'a> InstantiationAttempt<'a> {
    pub fn new(
        records: &'a IndexMap<String, ComponentRecord>,
        instances: &'a HashMap<String, Instance>,
        introspector: &'a dyn Introspector,
        auto_wiring: bool,
    ) -> Self {
        Self { records, instances, introspector, auto_wiring }
    }

    /// Tries to build `record` from what is available right now.
    pub fn attempt(&self, record: &ComponentRecord, bindings: &mut Bindings) -> Outcome {
        match self.try_build(record, bindings) {
            Ok(instance) => Outcome::Built(instance),
            Err(AttemptStop::Deferred(waiting_on)) => Outcome::Deferred { waiting_on },
            Err(AttemptStop::Failed(error)) => Outcome::Failed(error),
        }
    }

    fn try_build(
        &self,
        record: &ComponentRecord,
        bindings: &mut Bindings,
    ) -> Result<Instance, AttemptStop> {
        let identity = record.identity();
        let empty = ArgumentSpec::default();
        let spec = record.resolved().unwrap_or(&empty);

        let mut arguments = Arguments::new();
        for (position, hint) in spec.iter() {
            match self.materialize(identity, position, hint, bindings)? {
                Step::Ready(argument) => arguments.push(position, argument),
                Step::Defer(waiting_on) => {
                    trace!(identity, position, waiting_on = %waiting_on, "Deferred");
                    return Err(AttemptStop::Deferred(waiting_on));
                }
            }
        }

        let shape = record.shape();
        let required = shape.required_params();
        if required > arguments.len() {
            return Err(AttemptStop::Failed(KilnError::ArityMismatch {
                identity: identity.to_owned(),
                required,
                given: arguments.len(),
            }));
        }

        match shape.construct(arguments) {
            Ok(instance) => {
                trace!(identity, "Constructed");
                Ok(instance)
            }
            Err(ConstructError::NoAccessibleConstructor) => {
                Err(AttemptStop::Failed(KilnError::NoAccessibleConstructor {
                    identity: identity.to_owned(),
                }))
            }
            Err(source) => Err(AttemptStop::Failed(KilnError::ConstructionFailed {
                identity: identity.to_owned(),
                source,
            })),
        }
    }

    fn materialize(
        &self,
        identity: &str,
        position: usize,
        hint: &Hint,
        bindings: &mut Bindings,
    ) -> Result<Step, AttemptStop> {
        let name = match hint {
            Hint::Literal(literal) => return Ok(Step::Ready(Argument::Literal(literal.clone()))),
            Hint::Instance(instance) => return Ok(Step::Ready(Argument::Instance(instance.clone()))),
            Hint::Name(name) => name.as_str(),
        };

        if let Some(implementor) = bindings.get(identity, position) {
            let implementor = implementor.to_owned();
            return self.dependency(identity, position, &implementor, Some(name));
        }
        if self.introspector.is_component(name) {
            return self.dependency(identity, position, name, None);
        }
        if self.introspector.is_capability(name) {
            return self.capability(identity, position, name, bindings);
        }

        Ok(Step::Ready(Argument::Literal(Literal::Str(name.to_owned()))))
    }

    /// A direct reference to `target`, optionally viewed as `capability`.
    fn dependency(
        &self,
        identity: &str,
        position: usize,
        target: &str,
        capability: Option<&str>,
    ) -> Result<Step, AttemptStop> {
        if target == identity {
            warn!(identity, position, "Component references itself");
            return Err(AttemptStop::Failed(KilnError::SelfReference {
                identity: identity.to_owned(),
                position,
            }));
        }

        let Some(instance) = self.instances.get(target) else {
            return Ok(Step::Defer(target.to_owned()));
        };

        let capability = capability
            .map(str::to_owned)
            .or_else(|| self.declared_capability(identity, position));
        let argument = match capability {
            Some(capability) => self.view(target, &capability, instance),
            None => instance.clone(),
        };
        Ok(Step::Ready(Argument::Instance(argument)))
    }

    /// The capability `identity` declares as the type of `position`, if any.
    fn declared_capability(&self, identity: &str, position: usize) -> Option<String> {
        let declared = self
            .records
            .get(identity)?
            .shape()
            .param_hints()
            .into_iter()
            .nth(position)??;
        self.introspector.is_capability(&declared).then_some(declared)
    }

    fn capability(
        &self,
        identity: &str,
        position: usize,
        capability: &str,
        bindings: &mut Bindings,
    ) -> Result<Step, AttemptStop> {
        if !self.auto_wiring {
            warn!(identity, capability, "Capability argument with auto-wiring disabled");
            return Err(AttemptStop::Failed(KilnError::NoImplementation(CapabilityError {
                capability: capability.to_owned(),
                required_by: identity.to_owned(),
                position,
                auto_wiring: false,
            })));
        }

        let implementations = InterfaceBinder::new(self.records).implementations_of(capability);
        match implementations.as_slice() {
            [] => {
                warn!(identity, capability, "No implementation registered");
                Err(AttemptStop::Failed(KilnError::NoImplementation(CapabilityError {
                    capability: capability.to_owned(),
                    required_by: identity.to_owned(),
                    position,
                    auto_wiring: true,
                })))
            }
            [single] => match self.instances.get(*single) {
                Some(instance) => Ok(Step::Ready(Argument::Instance(
                    self.view(single, capability, instance),
                ))),
                None => {
                    debug!(identity, capability, implementor = %single, "Bound capability");
                    bindings.bind(identity, position, single);
                    Ok(Step::Defer((*single).to_owned()))
                }
            },
            candidates => {
                warn!(identity, capability, candidates = ?candidates, "Ambiguous capability");
                Err(AttemptStop::Failed(KilnError::AmbiguousImplementation(AmbiguityError {
                    capability: capability.to_owned(),
                    required_by: identity.to_owned(),
                    position,
                    candidates: candidates.iter().map(|c| (*c).to_owned()).collect(),
                })))
            }
        }
    }

    /// `instance` of `implementor`, seen through `capability`.
    fn view(&self, implementor: &str, capability: &str, instance: &Instance) -> Instance {
        self.records
            .get(implementor)
            .and_then(|record| record.shape().upcast(capability, instance))
            .unwrap_or_else(|| instance.clone())
    }
}

enum AttemptStop {
    Deferred(String),
    Failed(KilnError),
}
