//! Animated particle-field background.
//!
//! Renders drifting particles on a full-viewport HTML canvas with:
//! - Proximity edges between particles, found through a per-frame spatial grid
//! - Pointer repulsion and click bursts
//! - Light/dark palettes driven by the page theme
//! - DPR capping, density scaling and an automatic low-performance mode
//! - Pausing while the page is hidden
//!
//! The engine ([`FieldState`]) has no browser dependency beyond drawing
//! through [`Surface`], so it runs headless in tests.
//!
//! # Example
//!
//! ```ignore
//! use ink_field::{FieldHandle, ParticleFieldCanvas, ThemeToggle};
//!
//! let handle = FieldHandle::default();
//! view! {
//!     <ParticleFieldCanvas handle=handle.clone() />
//!     <ThemeToggle handle=handle />
//! }
//! ```

mod budget;
mod component;
pub mod config;
mod error;
mod grid;
mod particles;
mod render;
mod state;
pub mod storage;
pub mod theme;
pub mod viewport;

pub use component::{FieldControls, FieldHandle, ParticleFieldCanvas, ThemeToggle};
pub use config::{FieldConfig, Settings};
pub use error::FieldError;
pub use render::{FrameStats, Surface};
pub use state::FieldState;
pub use theme::ThemeState;
