//! ink-field: animated particle-field background for a single-page portfolio.
//!
//! This crate provides a WASM canvas component that renders a drifting ink
//! particle field with proximity edges, pointer repulsion, click bursts and
//! light/dark theming.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::particle_field::{
	FieldConfig, FieldControls, FieldError, FieldHandle, FieldState, ParticleFieldCanvas, Settings,
	ThemeToggle,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("ink-field: logging initialized");
}

fn parse_config(json: &str) -> Result<FieldConfig, FieldError> {
	Ok(serde_json::from_str(json)?)
}

/// Load field configuration from a script element with id="field-config".
/// Expected format: JSON object, every key optional.
fn load_config() -> Option<FieldConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("field-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match parse_config(&json_text) {
		Ok(config) => {
			info!(
				"ink-field: loaded config ({} particles, distance {})",
				config.count, config.distance
			);
			Some(config)
		}
		Err(e) => {
			warn!("ink-field: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads the field config from the DOM and mounts the background, the theme
/// toggle and, when enabled, the control panel.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config().unwrap_or_default();
	let handle = FieldHandle::default();
	let controls = config.show_controls.then(|| {
		view! { <FieldControls handle=handle.clone() initial=Settings::from_config(&config, false) /> }
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Portfolio" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<ParticleFieldCanvas config=config.clone() handle=handle.clone() />
		<div class="hdr-right">
			<ThemeToggle handle=handle />
		</div>
		{controls}
	}
}
