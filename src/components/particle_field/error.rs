//! Errors raised while attaching the field to the page.

use thiserror::Error;

/// Reasons the field cannot start. None of these are surfaced to the
/// visitor; the page simply renders without the background.
#[derive(Debug, Error)]
pub enum FieldError {
	/// Not running in a browser window.
	#[error("no window object")]
	NoWindow,

	/// Window without a document.
	#[error("no document")]
	NoDocument,

	/// The browser refused a 2D context.
	#[error("2d drawing context unavailable")]
	ContextUnavailable,

	/// The config element held malformed JSON.
	#[error("invalid field config: {0}")]
	Config(#[from] serde_json::Error),
}

/// Result type for page-attachment code.
pub type Result<T> = std::result::Result<T, FieldError>;
