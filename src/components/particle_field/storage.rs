//! Persisted theme preference.

use log::warn;

/// Storage key for the theme preference.
pub const THEME_KEY: &str = "jd-ink-theme";

/// Saved light/dark choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemePreference {
	Light,
	#[default]
	Dark,
}

impl ThemePreference {
	pub fn as_str(self) -> &'static str {
		match self {
			ThemePreference::Light => "light",
			ThemePreference::Dark => "dark",
		}
	}

	/// Anything other than `"light"` reads as dark.
	pub fn parse(s: &str) -> Self {
		if s == "light" {
			ThemePreference::Light
		} else {
			ThemePreference::Dark
		}
	}

	pub fn is_light(self) -> bool {
		self == ThemePreference::Light
	}

	pub fn toggled(self) -> Self {
		match self {
			ThemePreference::Light => ThemePreference::Dark,
			ThemePreference::Dark => ThemePreference::Light,
		}
	}
}

/// String key-value store the preference lives in.
pub trait PreferenceStore {
	fn read(&self, key: &str) -> Option<String>;
	fn write(&mut self, key: &str, value: &str);
}

pub fn load_theme(store: &impl PreferenceStore) -> ThemePreference {
	store
		.read(THEME_KEY)
		.map(|v| ThemePreference::parse(&v))
		.unwrap_or_default()
}

pub fn save_theme(store: &mut impl PreferenceStore, pref: ThemePreference) {
	store.write(THEME_KEY, pref.as_str());
}

/// Browser `localStorage`. Private browsing modes may deny access; reads
/// then return nothing and writes are dropped.
pub struct LocalStorage {
	storage: Option<web_sys::Storage>,
}

impl LocalStorage {
	pub fn open() -> Self {
		let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
		if storage.is_none() {
			warn!("ink-field: localStorage unavailable, theme will not persist");
		}
		Self { storage }
	}
}

impl PreferenceStore for LocalStorage {
	fn read(&self, key: &str) -> Option<String> {
		self.storage.as_ref()?.get_item(key).ok().flatten()
	}

	fn write(&mut self, key: &str, value: &str) {
		if let Some(storage) = &self.storage {
			if storage.set_item(key, value).is_err() {
				warn!("ink-field: failed to persist {}", key);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	#[derive(Default)]
	struct MemoryStore(HashMap<String, String>);

	impl PreferenceStore for MemoryStore {
		fn read(&self, key: &str) -> Option<String> {
			self.0.get(key).cloned()
		}

		fn write(&mut self, key: &str, value: &str) {
			self.0.insert(key.to_string(), value.to_string());
		}
	}

	#[test]
	fn missing_preference_is_dark() {
		assert_eq!(load_theme(&MemoryStore::default()), ThemePreference::Dark);
	}

	#[test]
	fn preference_round_trips_under_fixed_key() {
		let mut store = MemoryStore::default();
		save_theme(&mut store, ThemePreference::Light);
		assert_eq!(store.0.get(THEME_KEY).map(String::as_str), Some("light"));
		assert_eq!(load_theme(&store), ThemePreference::Light);

		save_theme(&mut store, ThemePreference::Light.toggled());
		assert_eq!(load_theme(&store), ThemePreference::Dark);
	}

	#[test]
	fn unknown_values_read_as_dark() {
		let mut store = MemoryStore::default();
		store.write(THEME_KEY, "sepia");
		assert_eq!(load_theme(&store), ThemePreference::Dark);
	}
}
