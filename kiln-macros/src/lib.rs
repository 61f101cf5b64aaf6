//! Procedural macros for Kiln.
//!
//! Use them through the `kiln` crate; the generated code refers to
//! `::kiln` paths.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod component;

/// Derives `kiln::shape::Component` and submits the shape to the global
/// catalog.
///
/// Every field is one constructor parameter, in declaration order.
/// Fields typed `Arc<T>` or `Arc<dyn Trait>` carry the last path segment
/// as their auto-wiring hint.
///
/// # Attributes
///
/// On the struct:
/// - `name = "..."` registers under another identity (default: the struct name)
/// - `implements(TraitA, TraitB)` declares capabilities; each trait must be
///   `Send + Sync`
///
/// On a field:
/// - `inject = "..."` overrides the auto-wiring hint
/// - `optional` makes the parameter optional; the field needs `Default`.
///   `Option<..>` fields are optional without it.
/// - `hint = ...` declares an annotation hint, a string name or a literal
///
/// ```rust,ignore
/// #[derive(kiln::Component)]
/// #[component(implements(Transport))]
/// struct Smtp {
///     config: Arc<Config>,
///     #[component(optional, hint = 25)]
///     port: u16,
/// }
/// ```
#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::derive_component_impl(input).into()
}
