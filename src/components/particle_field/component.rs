//! Leptos components wrapping the particle field canvas.
//!
//! The canvas component sizes a fixed, full-viewport canvas and wires up
//! window/document listeners for resize, visibility, pointer movement and
//! clicks. An animation loop runs via `requestAnimationFrame`, handing the
//! engine a theme snapshot and the 2D context each frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Document, Event, EventTarget, HtmlCanvasElement, MouseEvent, Window,
};

use super::config::{COUNT_MIN, DISTANCE_MAX, DISTANCE_MIN, FieldConfig, HARD_CAP, Settings};
use super::error::{FieldError, Result};
use super::state::FieldState;
use super::storage::{LocalStorage, ThemePreference, load_theme, save_theme};
use super::theme::ThemeState;
use super::viewport::Viewport;

/// Quiet period before a window resize is applied.
const RESIZE_DEBOUNCE_MS: i32 = 150;
/// Below this CSS width the page is treated as mobile.
const MOBILE_WIDTH: f64 = 768.0;

/// Shared access to a mounted field. Cheap to clone; every method is a no-op
/// until the canvas has attached (or when it never does, e.g. with reduced
/// motion requested).
#[derive(Clone, Default)]
pub struct FieldHandle(Rc<RefCell<Option<FieldState>>>);

impl FieldHandle {
	fn install(&self, state: FieldState) {
		*self.0.borrow_mut() = Some(state);
	}

	fn with<R>(&self, f: impl FnOnce(&mut FieldState) -> R) -> Option<R> {
		self.0.borrow_mut().as_mut().map(f)
	}

	pub fn is_attached(&self) -> bool {
		self.0.borrow().is_some()
	}

	pub fn set_count(&self, v: usize) {
		self.with(|s| s.set_count(v));
	}

	pub fn set_distance(&self, v: f64) {
		self.with(|s| s.set_distance(v));
	}

	pub fn set_speed(&self, v: f64) {
		self.with(|s| s.set_speed(v));
	}

	/// Returns the new paused flag, or `None` when no field is running.
	pub fn toggle_pause(&self) -> Option<bool> {
		self.with(FieldState::toggle_pause)
	}

	pub fn regenerate(&self) {
		self.with(FieldState::regenerate);
	}

	pub fn set_low_perf(&self, on: bool) {
		self.with(|s| s.set_low_perf(on));
	}

	pub fn update_colors(&self) {
		self.with(|s| s.update_colors());
	}
}

/// Event listeners and the frame callback, kept alive with the component.
struct Runtime {
	_listeners: Vec<Closure<dyn FnMut(Event)>>,
	_frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

fn media_matches(window: &Window, query: &str) -> bool {
	window
		.match_media(query)
		.ok()
		.flatten()
		.is_some_and(|m| m.matches())
}

fn window_size(window: &Window) -> (f64, f64) {
	let read = |v: std::result::Result<JsValue, JsValue>| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
	};
	(read(window.inner_width()), read(window.inner_height()))
}

fn is_mobile(window: &Window) -> bool {
	media_matches(window, "(hover: none)") || window_size(window).0 < MOBILE_WIDTH
}

fn measure(window: &Window, canvas: &HtmlCanvasElement, max_dpr: f64) -> Viewport {
	let (w, h) = window_size(window);
	let rect = canvas.get_bounding_client_rect();
	Viewport::new(w, h, window.device_pixel_ratio(), max_dpr).with_offset(rect.left(), rect.top())
}

/// Size the backing store by the capped DPR, keep the CSS size at the window
/// size, and scale the context so drawing happens in canvas space.
fn apply_size(canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d, viewport: &Viewport) {
	let (bw, bh) = viewport.backing_size();
	canvas.set_width(bw);
	canvas.set_height(bh);
	// Leptos' `ElementExt::style` shadows the inherent getter.
	let style = web_sys::HtmlElement::style(canvas);
	let _ = style.set_property("width", &format!("{}px", viewport.width));
	let _ = style.set_property("height", &format!("{}px", viewport.height));
	let _ = ctx.set_transform(viewport.dpr, 0.0, 0.0, viewport.dpr, 0.0, 0.0);
}

fn current_theme(document: &Document) -> ThemeState {
	ThemeState {
		light: document
			.body()
			.is_some_and(|b| b.class_list().contains("light")),
	}
}

fn listen(
	target: &EventTarget,
	event: &str,
	f: impl FnMut(Event) + 'static,
) -> Closure<dyn FnMut(Event)> {
	let cb = Closure::<dyn FnMut(Event)>::new(f);
	if target
		.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
		.is_err()
	{
		warn!("ink-field: could not listen for {}", event);
	}
	cb
}

/// Create the engine for `canvas` and start the frame loop. Returns
/// `Ok(None)` when the visitor prefers reduced motion.
fn attach(
	canvas: HtmlCanvasElement,
	config: FieldConfig,
	handle: FieldHandle,
) -> Result<Option<Runtime>> {
	let window = web_sys::window().ok_or(FieldError::NoWindow)?;
	let document = window.document().ok_or(FieldError::NoDocument)?;

	if media_matches(&window, "(prefers-reduced-motion: reduce)") {
		info!("ink-field: reduced motion requested, field disabled");
		return Ok(None);
	}

	let mut ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.ok()
		.flatten()
		.ok_or(FieldError::ContextUnavailable)?
		.dyn_into()
		.map_err(|_| FieldError::ContextUnavailable)?;

	let viewport = measure(&window, &canvas, config.max_dpr);
	apply_size(&canvas, &ctx, &viewport);

	let mobile = is_mobile(&window);
	let settings = Settings::from_config(&config, mobile);
	let max_dpr = config.max_dpr;
	handle.install(FieldState::new(
		config,
		settings,
		viewport,
		js_sys::Date::now() as u64,
	));
	handle.with(|s| s.set_hidden(document.hidden()));
	info!(
		"ink-field: attached ({} particles{})",
		handle.with(|s| s.store().len()).unwrap_or(0),
		if mobile { ", mobile" } else { "" }
	);

	let mut listeners = Vec::new();

	// Resize: cancel any pending apply and schedule a new one.
	let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let apply_resize = {
		let (pending, handle, canvas, ctx) =
			(pending.clone(), handle.clone(), canvas.clone(), ctx.clone());
		Closure::<dyn FnMut()>::new(move || {
			pending.set(None);
			let Some(win) = web_sys::window() else {
				return;
			};
			let viewport = measure(&win, &canvas, max_dpr);
			apply_size(&canvas, &ctx, &viewport);
			handle.with(|s| s.resize(viewport));
		})
	};
	{
		let win = window.clone();
		listeners.push(listen(&window, "resize", move |_| {
			if let Some(id) = pending.take() {
				win.clear_timeout_with_handle(id);
			}
			match win.set_timeout_with_callback_and_timeout_and_arguments_0(
				apply_resize.as_ref().unchecked_ref(),
				RESIZE_DEBOUNCE_MS,
			) {
				Ok(id) => pending.set(Some(id)),
				Err(_) => warn!("ink-field: could not schedule resize"),
			}
		}));
	}

	{
		let (handle, doc) = (handle.clone(), document.clone());
		listeners.push(listen(&document, "visibilitychange", move |_| {
			handle.with(|s| s.set_hidden(doc.hidden()));
		}));
	}

	{
		let handle = handle.clone();
		listeners.push(listen(&window, "mousemove", move |ev| {
			if let Some(ev) = ev.dyn_ref::<MouseEvent>() {
				handle.with(|s| s.set_pointer(ev.client_x() as f64, ev.client_y() as f64));
			}
		}));
	}

	{
		let handle = handle.clone();
		// `mouseleave` does not fire on `document` everywhere; the root element
		// reports the pointer leaving the page consistently.
		match document.document_element() {
			Some(root) => listeners.push(listen(&root, "mouseleave", move |_| {
				handle.with(FieldState::clear_pointer);
			})),
			None => warn!("ink-field: no root element, pointer is never cleared"),
		}
	}

	if !mobile {
		let handle = handle.clone();
		listeners.push(listen(&window, "click", move |ev| {
			if let Some(ev) = ev.dyn_ref::<MouseEvent>() {
				handle.with(|s| s.burst(ev.client_x() as f64, ev.client_y() as f64));
			}
		}));
	}

	let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let frame_inner = frame.clone();
	let handle_frame = handle.clone();
	*frame.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
		let theme = current_theme(&document);
		handle_frame.with(|s| s.frame(timestamp, theme, &mut ctx));
		// Keep the chain alive while paused so resuming is immediate.
		if let (Some(cb), Some(win)) = (frame_inner.borrow().as_ref(), web_sys::window()) {
			let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	}));
	if let Some(cb) = frame.borrow().as_ref() {
		let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
	}

	Ok(Some(Runtime {
		_listeners: listeners,
		_frame: frame,
	}))
}

/// Full-viewport animated particle background.
///
/// Pass a [`FieldHandle`] to drive the field from other components; pass a
/// config to override the defaults. The canvas ignores pointer events so the
/// page underneath stays interactive.
#[component]
pub fn ParticleFieldCanvas(
	#[prop(optional)] config: Option<FieldConfig>,
	#[prop(optional)] handle: Option<FieldHandle>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let config = config.unwrap_or_default();
	let handle = handle.unwrap_or_default();
	let runtime: Rc<RefCell<Option<Runtime>>> = Rc::new(RefCell::new(None));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if runtime.borrow().is_some() || handle.is_attached() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		match attach(canvas, config.clone(), handle.clone()) {
			Ok(rt) => *runtime.borrow_mut() = rt,
			Err(e) => warn!("ink-field: background disabled: {}", e),
		}
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="ink-field"
			aria-hidden="true"
			style="position: fixed; top: 0; left: 0; pointer-events: none; z-index: 0;"
		/>
	}
}

fn apply_theme(pref: ThemePreference) {
	let body = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.body());
	if let Some(body) = body {
		let _ = body.class_list().toggle_with_force("light", pref.is_light());
	}
}

/// Light/dark switch. Restores the saved preference on mount and persists
/// every change.
#[component]
pub fn ThemeToggle(#[prop(optional)] handle: Option<FieldHandle>) -> impl IntoView {
	let initial = load_theme(&LocalStorage::open());
	apply_theme(initial);
	let (theme, set_theme) = signal(initial);

	let on_click = move |_: MouseEvent| {
		let next = theme.get_untracked().toggled();
		apply_theme(next);
		save_theme(&mut LocalStorage::open(), next);
		set_theme.set(next);
		if let Some(h) = &handle {
			h.update_colors();
		}
	};

	view! {
		<button class="theme-toggle" aria-label="Toggle light/dark theme" on:click=on_click>
			<i class=move || if theme.get().is_light() { "fas fa-moon" } else { "fas fa-sun" } />
		</button>
	}
}

/// Sliders and toggles bound to the field's control API.
#[component]
pub fn FieldControls(handle: FieldHandle, initial: Settings) -> impl IntoView {
	let (paused, set_paused) = signal(initial.paused);
	let (h_count, h_distance, h_speed, h_low_perf, h_pause, h_regenerate) = (
		handle.clone(),
		handle.clone(),
		handle.clone(),
		handle.clone(),
		handle.clone(),
		handle,
	);

	view! {
		<div class="field-controls">
			<label>
				"Particles"
				<input
					type="range"
					min=COUNT_MIN.to_string()
					max=HARD_CAP.to_string()
					value=initial.count.to_string()
					on:input=move |ev| {
						if let Ok(v) = event_target_value(&ev).parse::<usize>() {
							h_count.set_count(v);
						}
					}
				/>
			</label>
			<label>
				"Distance"
				<input
					type="range"
					min=DISTANCE_MIN.to_string()
					max=DISTANCE_MAX.to_string()
					value=initial.distance.to_string()
					on:input=move |ev| {
						if let Ok(v) = event_target_value(&ev).parse::<f64>() {
							h_distance.set_distance(v);
						}
					}
				/>
			</label>
			<label>
				"Speed"
				<input
					type="range"
					min="0.05"
					max="3"
					step="0.05"
					value=initial.speed.to_string()
					on:input=move |ev| {
						if let Ok(v) = event_target_value(&ev).parse::<f64>() {
							h_speed.set_speed(v);
						}
					}
				/>
			</label>
			<label>
				<input
					type="checkbox"
					checked=initial.low_perf
					on:change=move |ev| h_low_perf.set_low_perf(event_target_checked(&ev))
				/>
				"Low performance"
			</label>
			<button on:click=move |_| {
				if let Some(now) = h_pause.toggle_pause() {
					set_paused.set(now);
				}
			}>{move || if paused.get() { "Resume" } else { "Pause" }}</button>
			<button on:click=move |_| h_regenerate.regenerate()>"Regenerate"</button>
		</div>
	}
}
