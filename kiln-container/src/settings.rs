//! Container feature toggles.
//!
//! [`Settings`] derives `serde` traits so a host application can keep it
//! inside its own configuration and hand it to
//! [`Container::with_settings`](crate::container::Container::with_settings).

use serde::{Deserialize, Serialize};

/// Feature toggles for a [`Container`](crate::container::Container).
///
/// Both default to off.
///
/// # Examples
/// ```
/// use kiln_container::settings::Settings;
///
/// let settings = Settings::default().auto_wiring(true);
/// assert!(settings.auto_wiring);
/// assert!(!settings.annotations);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Wire capability arguments to their single implementation, and
    /// derive hints from declared parameter types.
    pub auto_wiring: bool,
    /// Collect hints declared on the components themselves.
    pub annotations: bool,
}

impl Settings {
    pub fn auto_wiring(mut self, enabled: bool) -> Self {
        self.auto_wiring = enabled;
        self
    }

    pub fn annotations(mut self, enabled: bool) -> Self {
        self.annotations = enabled;
        self
    }
}
