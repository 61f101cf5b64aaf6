//! Argument hints: what a component says about each constructor position.
//!
//! A hint is either a literal used as-is, a pre-built [`Instance`], or a
//! name. Names are classified at build time: a known component identity
//! becomes a dependency, a known capability goes through auto-wiring, and
//! anything else is passed on as a string literal.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::instance::Instance;

/// A literal constructor argument.
///
/// Deserializes untagged, so `null`, `true`, `3`, `2.5` and `"text"` all map
/// to the obvious variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Literal {
    /// Short name of the variant, used in argument mismatch messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Null => "null",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "string",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Hint for a single argument position.
#[derive(Clone)]
pub enum Hint {
    /// Used as-is, never classified.
    Literal(Literal),
    /// Component identity, capability name, or (failing both) a string literal.
    Name(String),
    /// A value built outside the container.
    Instance(Instance),
}

impl Hint {
    /// A name to be classified at build time.
    pub fn name(name: impl Into<String>) -> Self {
        Hint::Name(name.into())
    }

    /// A string that is always passed through, even if it happens to
    /// match a component or capability name.
    pub fn text(text: impl Into<String>) -> Self {
        Hint::Literal(Literal::Str(text.into()))
    }

    /// Returns the name if this hint is [`Hint::Name`].
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Hint::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Debug for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::Literal(literal) => write!(f, "Literal({literal})"),
            Hint::Name(name) => write!(f, "Name({name})"),
            Hint::Instance(instance) => write!(f, "Instance({instance:?})"),
        }
    }
}

impl From<&str> for Hint {
    fn from(name: &str) -> Self {
        Hint::Name(name.to_owned())
    }
}

impl From<String> for Hint {
    fn from(name: String) -> Self {
        Hint::Name(name)
    }
}

impl From<Literal> for Hint {
    fn from(literal: Literal) -> Self {
        Hint::Literal(literal)
    }
}

impl From<Instance> for Hint {
    fn from(instance: Instance) -> Self {
        Hint::Instance(instance)
    }
}

impl From<bool> for Hint {
    fn from(value: bool) -> Self {
        Hint::Literal(Literal::Bool(value))
    }
}

impl From<f64> for Hint {
    fn from(value: f64) -> Self {
        Hint::Literal(Literal::Float(value))
    }
}

macro_rules! int_hint {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Hint {
                fn from(value: $t) -> Self {
                    Hint::Literal(Literal::Int(i64::from(value)))
                }
            }
        )*
    };
}

int_hint!(i8, i16, i32, i64, u8, u16, u32);

/// Position-indexed hints from a single source.
#[derive(Debug, Clone, Default)]
pub struct Hints {
    entries: BTreeMap<usize, Hint>,
}

impl Hints {
    /// No hints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hints at positions `0..n`, in order.
    ///
    /// ```
    /// use kiln_container::hint::{Hint, Hints};
    ///
    /// let hints = Hints::positional([Hint::name("Database"), Hint::from(30)]);
    /// assert_eq!(hints.len(), 2);
    /// ```
    pub fn positional(hints: impl IntoIterator<Item = Hint>) -> Self {
        hints.into_iter().enumerate().collect()
    }

    /// Adds (or replaces) the hint at `position`.
    pub fn with(mut self, position: usize, hint: impl Into<Hint>) -> Self {
        self.entries.insert(position, hint.into());
        self
    }

    pub fn insert(&mut self, position: usize, hint: impl Into<Hint>) {
        self.entries.insert(position, hint.into());
    }

    pub fn get(&self, position: usize) -> Option<&Hint> {
        self.entries.get(&position)
    }

    /// Positions in ascending order.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Hint)> {
        self.entries.iter().map(|(position, hint)| (*position, hint))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl FromIterator<(usize, Hint)> for Hints {
    fn from_iter<I: IntoIterator<Item = (usize, Hint)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl<const N: usize> From<[Hint; N]> for Hints {
    fn from(hints: [Hint; N]) -> Self {
        Hints::positional(hints)
    }
}

impl From<Vec<Hint>> for Hints {
    fn from(hints: Vec<Hint>) -> Self {
        Hints::positional(hints)
    }
}

/// The three hint sources of one component.
#[derive(Debug, Clone, Default)]
pub struct HintSources {
    /// Supplied at registration; highest precedence.
    pub manual: Hints,
    /// Collected from the component's declaration when annotation support is on.
    pub annotations: Hints,
    /// Derived from the constructor's declared parameter types when auto-wiring is on.
    pub auto_wiring: Hints,
}

impl HintSources {
    pub fn manual(manual: Hints) -> Self {
        Self { manual, ..Self::default() }
    }
}

/// Merged argument hints, ascending by position.
#[derive(Debug, Clone, Default)]
pub struct ArgumentSpec {
    slots: Vec<(usize, Hint)>,
}

impl ArgumentSpec {
    pub(crate) fn from_sorted(slots: Vec<(usize, Hint)>) -> Self {
        Self { slots }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Hint)> {
        self.slots.iter().map(|(position, hint)| (*position, hint))
    }

    pub fn get(&self, position: usize) -> Option<&Hint> {
        self.slots
            .binary_search_by_key(&position, |(p, _)| *p)
            .ok()
            .map(|index| &self.slots[index].1)
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

    #[test]
    fn str_converts_to_name() {
        assert_eq!(Hint::from("Database").as_name(), Some("Database"));
        assert!(Hint::text("Database").as_name().is_none());
    }

    #[test]
    fn positional_hints_are_numbered() {
        let hints = Hints::from([Hint::name("A"), Hint::from(7), Hint::from(true)]);
        let positions: Vec<usize> = hints.positions().collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert!(matches!(hints.get(1), Some(Hint::Literal(Literal::Int(7)))));
    }

    #[test]
    fn with_replaces_position() {
        let hints = Hints::new().with(3, "A").with(3, "B");
        assert_eq!(hints.len(), 1);
        assert_eq!(hints.get(3).and_then(Hint::as_name), Some("B"));
    }

    #[test]
    fn literal_deserializes_untagged() {
        let literals: Vec<Literal> =
            serde_json::from_str(r#"[null, true, 3, 2.5, "smtp://localhost"]"#).unwrap();
        assert_eq!(
            literals,
            vec![
                Literal::Null,
                Literal::Bool(true),
                Literal::Int(3),
                Literal::Float(2.5),
                Literal::Str("smtp://localhost".into()),
            ]
        );
    }

    #[test]
    fn spec_lookup_by_position() {
        let spec = ArgumentSpec::from_sorted(vec![(0, Hint::name("A")), (4, Hint::from(1))]);
        assert!(spec.get(4).is_some());
        assert!(spec.get(2).is_none());
        assert_eq!(spec.len(), 2);
    }
}
