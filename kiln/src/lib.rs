//! # Kiln: a fixed-point dependency injection registry for Rust
//!
//! Register components by identity with optional argument hints, then
//! build them all at once. The build keeps making passes over the
//! components that are still missing until everything is constructed or
//! no further progress is possible.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kiln::prelude::*;
//!
//! #[derive(kiln::Component)]
//! struct Config {
//!     sender: String,
//! }
//!
//! #[derive(kiln::Component)]
//! struct Mailer {
//!     config: Arc<Config>,
//! }
//!
//! let mut container = Container::new();
//! container.set_auto_wiring(true);
//! container.register("Config", [Hint::text("ops@example.org")])?;
//! container.register("Mailer", Hints::new())?;
//! container.build()?;
//!
//! let mailer: Arc<Mailer> = container.get("Mailer")?;
//! ```

pub use kiln_container::*;
pub use kiln_derive::*;
pub use kiln_support::*;
