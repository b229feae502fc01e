//! Dark-mode preference, remembered for the browser session.

use std::collections::HashMap;

/// Session storage key.
pub const STORAGE_KEY: &str = "darkMode";
/// Class toggled on the root element.
pub const DARK_CLASS: &str = "dark-mode";
/// Class that suppresses transitions until the first frame.
pub const STATIC_CLASS: &str = "dark-mode-static";

/// Key/value storage scoped to the session.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Store that forgets everything with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }
}

/// The theme switch.
#[derive(Debug)]
pub struct ThemeToggle<S> {
    store: S,
    dark: bool,
}

impl<S: PreferenceStore> ThemeToggle<S> {
    /// Only the exact string `"true"` enables dark mode.
    pub fn load(store: S) -> Self {
        let dark = store.get(STORAGE_KEY).as_deref() == Some("true");
        Self { store, dark }
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn set_dark(&mut self, enabled: bool) {
        self.dark = enabled;
        self.store.set(STORAGE_KEY, if enabled { "true" } else { "false" });
    }

    pub fn toggle(&mut self) -> bool {
        self.set_dark(!self.dark);
        self.dark
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_light() {
        assert!(!ThemeToggle::load(MemoryStore::default()).is_dark());
    }

    #[test]
    fn persists_across_loads() {
        let mut toggle = ThemeToggle::load(MemoryStore::default());
        assert!(toggle.toggle());
        let store = toggle.store().clone();
        assert_eq!(store.get(STORAGE_KEY).as_deref(), Some("true"));
        assert!(ThemeToggle::load(store).is_dark());
    }

    #[test]
    fn garbage_is_light() {
        let mut store = MemoryStore::default();
        store.set(STORAGE_KEY, "yes");
        assert!(!ThemeToggle::load(store).is_dark());
    }
}
