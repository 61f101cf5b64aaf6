//! Built instances and the arguments handed to constructors.
//!
//! [`Instance`] is the type-erased handle the container stores. It always
//! wraps an `Arc<T>`, where `T` may be unsized, so a concrete component and
//! its trait-object view (`Arc<dyn Logger>`) travel through the same type.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use kiln_support::rendering::shorten_type_name;

use crate::hint::Literal;
use crate::shape::ConstructError;

/// Shared, type-erased handle to a built value.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    /// Wraps a shared value.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use kiln_container::instance::Instance;
    ///
    /// let instance = Instance::new(Arc::new(String::from("hello")));
    /// let value: Arc<String> = instance.downcast().unwrap();
    /// assert_eq!(*value, "hello");
    /// ```
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Wraps an owned value.
    pub fn from_value<T: Send + Sync + 'static>(value: T) -> Self {
        Self::new(Arc::new(value))
    }

    /// Returns the wrapped `Arc<T>` if this instance holds one.
    ///
    /// `T` must match exactly: a concrete component is `Arc<Concrete>`,
    /// its capability view is `Arc<dyn Capability>`.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }

    /// Full type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// True when both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance<{}>", shorten_type_name(self.type_name))
    }
}

/// A materialized constructor argument.
#[derive(Debug, Clone)]
pub enum Argument {
    Literal(Literal),
    Instance(Instance),
}

impl Argument {
    fn describe(&self) -> String {
        match self {
            Argument::Literal(literal) => literal.kind().to_string(),
            Argument::Instance(instance) => shorten_type_name(instance.type_name()),
        }
    }
}

/// Conversion from an [`Argument`] into a constructor parameter type.
pub trait FromArgument: Sized {
    fn from_argument(argument: &Argument) -> Option<Self>;
}

impl<T: ?Sized + Send + Sync + 'static> FromArgument for Arc<T> {
    fn from_argument(argument: &Argument) -> Option<Self> {
        match argument {
            Argument::Instance(instance) => instance.downcast::<T>(),
            Argument::Literal(_) => None,
        }
    }
}

impl FromArgument for String {
    fn from_argument(argument: &Argument) -> Option<Self> {
        match argument {
            Argument::Literal(Literal::Str(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromArgument for bool {
    fn from_argument(argument: &Argument) -> Option<Self> {
        match argument {
            Argument::Literal(Literal::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

impl FromArgument for f64 {
    fn from_argument(argument: &Argument) -> Option<Self> {
        match argument {
            Argument::Literal(Literal::Float(x)) => Some(*x),
            Argument::Literal(Literal::Int(i)) => Some(*i as f64),
            _ => None,
        }
    }
}

macro_rules! int_argument {
    ($($t:ty),*) => {
        $(
            impl FromArgument for $t {
                fn from_argument(argument: &Argument) -> Option<Self> {
                    match argument {
                        Argument::Literal(Literal::Int(i)) => <$t>::try_from(*i).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

int_argument!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: FromArgument> FromArgument for Option<T> {
    fn from_argument(argument: &Argument) -> Option<Self> {
        match argument {
            Argument::Literal(Literal::Null) => Some(None),
            other => T::from_argument(other).map(Some),
        }
    }
}

impl FromArgument for Literal {
    fn from_argument(argument: &Argument) -> Option<Self> {
        match argument {
            Argument::Literal(literal) => Some(literal.clone()),
            Argument::Instance(_) => None,
        }
    }
}

impl FromArgument for Instance {
    fn from_argument(argument: &Argument) -> Option<Self> {
        match argument {
            Argument::Instance(instance) => Some(instance.clone()),
            Argument::Literal(_) => None,
        }
    }
}

impl FromArgument for Argument {
    fn from_argument(argument: &Argument) -> Option<Self> {
        Some(argument.clone())
    }
}

/// Materialized arguments, keyed by their declared position.
///
/// Positions keep gaps from sparse hints; [`len`](Arguments::len) counts
/// only the arguments that are present.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    slots: Vec<(usize, Argument)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument. Positions must be pushed in ascending order.
    pub fn push(&mut self, position: usize, argument: Argument) {
        debug_assert!(self.slots.last().is_none_or(|(last, _)| *last < position));
        self.slots.push((position, argument));
    }

    pub fn with(mut self, position: usize, argument: Argument) -> Self {
        self.push(position, argument);
        self
    }

    /// The raw argument at `position`.
    pub fn argument(&self, position: usize) -> Option<&Argument> {
        self.slots
            .binary_search_by_key(&position, |(p, _)| *p)
            .ok()
            .map(|index| &self.slots[index].1)
    }

    /// Converts the argument at `position`.
    ///
    /// # Errors
    /// [`ConstructError::Missing`] if nothing is at `position`,
    /// [`ConstructError::Mismatch`] if it does not convert to `T`.
    pub fn get<T: FromArgument>(&self, position: usize) -> Result<T, ConstructError> {
        let argument = self
            .argument(position)
            .ok_or(ConstructError::Missing { position })?;
        T::from_argument(argument).ok_or_else(|| ConstructError::Mismatch {
            position,
            expected: type_name::<T>(),
            found: argument.describe(),
        })
    }

    /// Like [`get`](Arguments::get), but an absent position or a `null`
    /// literal yields `T::default()`.
    pub fn get_or_default<T: FromArgument + Default>(
        &self,
        position: usize,
    ) -> Result<T, ConstructError> {
        match self.argument(position) {
            None | Some(Argument::Literal(Literal::Null)) => Ok(T::default()),
            Some(_) => self.get(position),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Argument)> {
        self.slots.iter().map(|(position, argument)| (*position, argument))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    #[test]
    fn downcast_concrete() {
        let instance = Instance::from_value(English);
        assert!(instance.downcast::<English>().is_some());
        assert!(instance.downcast::<String>().is_none());
    }

    #[test]
    fn downcast_trait_object() {
        let greeter: Arc<dyn Greeter> = Arc::new(English);
        let instance = Instance::new(greeter);
        let back: Arc<dyn Greeter> = instance.downcast().unwrap();
        assert_eq!(back.greet(), "hello");
        assert!(instance.downcast::<English>().is_none());
    }

    #[test]
    fn clones_share_allocation() {
        let instance = Instance::from_value(1u8);
        let clone = instance.clone();
        assert!(instance.ptr_eq(&clone));
        assert!(!instance.ptr_eq(&Instance::from_value(1u8)));
    }

    #[test]
    fn arguments_keep_positions() {
        let args = Arguments::new()
            .with(0, Argument::Literal(Literal::Str("smtp".into())))
            .with(2, Argument::Literal(Literal::Int(25)));

        assert_eq!(args.len(), 2);
        assert_eq!(args.get::<String>(0).unwrap(), "smtp");
        assert_eq!(args.get::<u16>(2).unwrap(), 25);
        assert!(matches!(args.get::<u16>(1), Err(ConstructError::Missing { position: 1 })));
        assert_eq!(args.get_or_default::<u32>(1).unwrap(), 0);
    }

    #[test]
    fn argument_mismatch_reports_found_kind() {
        let args = Arguments::new().with(0, Argument::Literal(Literal::Bool(true)));
        match args.get::<String>(0) {
            Err(ConstructError::Mismatch { position, found, .. }) => {
                assert_eq!(position, 0);
                assert_eq!(found, "bool");
            }
            other => panic!("Expected Mismatch, got: {other:?}"),
        }
    }

    #[test]
    fn integers_are_range_checked() {
        let args = Arguments::new().with(0, Argument::Literal(Literal::Int(-1)));
        assert!(args.get::<u32>(0).is_err());
        assert_eq!(args.get::<i32>(0).unwrap(), -1);
        assert_eq!(args.get::<f64>(0).unwrap(), -1.0);
    }

    #[test]
    fn option_accepts_null() {
        let args = Arguments::new()
            .with(0, Argument::Literal(Literal::Null))
            .with(1, Argument::Literal(Literal::Int(4)));
        assert_eq!(args.get::<Option<i64>>(0).unwrap(), None);
        assert_eq!(args.get::<Option<i64>>(1).unwrap(), Some(4));
    }

    #[test]
    fn null_falls_back_to_default() {
        let args = Arguments::new().with(0, Argument::Literal(Literal::Null));
        assert_eq!(args.get_or_default::<u32>(0).unwrap(), 0);
        assert_eq!(args.get_or_default::<Option<String>>(0).unwrap(), None);
        assert!(args.get::<u32>(0).is_err());
    }
}
