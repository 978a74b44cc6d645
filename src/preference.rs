//! Light/dark display preference
//!
//! The preference is resolved once at startup (stored value, then the
//! platform's hint, then light) and persisted whenever the user changes it.

use crate::store::{KeyValueStore, StoreAdapter};
use serde::{Deserialize, Serialize};

/// Whether the presentation layer should render light or dark.
///
/// Stored as a JSON boolean where `true` means dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum DisplayPreference {
    #[default]
    Light,
    Dark,
}

impl DisplayPreference {
    /// Returns the opposite preference.
    pub fn toggled(self) -> Self {
        match self {
            DisplayPreference::Light => DisplayPreference::Dark,
            DisplayPreference::Dark => DisplayPreference::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == DisplayPreference::Dark
    }
}

impl From<bool> for DisplayPreference {
    fn from(dark: bool) -> Self {
        if dark {
            DisplayPreference::Dark
        } else {
            DisplayPreference::Light
        }
    }
}

impl From<DisplayPreference> for bool {
    fn from(preference: DisplayPreference) -> Self {
        preference.is_dark()
    }
}

/// Derives a platform default from the `COLORFGBG` terminal convention.
///
/// The variable holds `foreground;background` color indices (some terminals
/// insert a middle field). Background indices 0-6 and 8 are dark colors.
/// Returns `None` when the variable is missing or cannot be understood.
pub fn platform_default_from_colorfgbg(value: Option<&str>) -> Option<DisplayPreference> {
    let background = value?.rsplit(';').next()?.trim().parse::<u8>().ok()?;

    let dark = matches!(background, 0..=6 | 8);
    Some(DisplayPreference::from(dark))
}

/// The current preference together with the store it is persisted to.
#[derive(Debug)]
pub struct PreferenceState<S> {
    current: DisplayPreference,
    store: StoreAdapter<S>,
}

impl<S> PreferenceState<S>
where
    S: KeyValueStore,
{
    /// Resolves the startup preference.
    ///
    /// An explicitly stored value wins, then `platform_default`, then light.
    pub fn load(store: StoreAdapter<S>, platform_default: Option<DisplayPreference>) -> Self {
        let current = store
            .read_preference()
            .or(platform_default)
            .unwrap_or_default();

        tracing::debug!(dark = current.is_dark(), "display preference loaded");

        Self { current, store }
    }

    pub fn current(&self) -> DisplayPreference {
        self.current
    }

    /// Flips the preference and persists it, returning the new value.
    pub fn toggle(&mut self) -> DisplayPreference {
        self.set(self.current.toggled());
        self.current
    }

    /// Sets and persists an explicit preference.
    pub fn set(&mut self, preference: DisplayPreference) {
        self.current = preference;

        if let Err(e) = self.store.write_preference(preference) {
            tracing::warn!(error = %e, "failed to persist display preference");
        }
    }
}
