//! Quotecard Engine
//!
//! A compositing and export pipeline for quote cards: a declarative theme
//! describes a single styled text composition (background, typography,
//! effects, layout), a compositor renders it together with the quote into a
//! supersampled pixel buffer, and an exporter turns that buffer into a PNG
//! or JPEG file or a clipboard image.
//!
//! # Features
//!
//! - **Pure model**: the theme is immutable per render; every mutation goes
//!   through a validated patch operation that returns a new value
//! - **Pixel-accurate output**: rendering happens at a fixed 2x supersample
//!   of the canvas size, independent of any on-screen preview scaling
//! - **Direct manipulation**: drag gestures translate into clamped,
//!   normalized positions through a pure state machine
//!
//! # Example
//!
//! ```no_run
//! use quotecard::{export, CardRenderer, ExportRequest, Theme};
//!
//! # fn main() -> quotecard::Result<()> {
//! let theme = Theme::default();
//! let mut renderer = CardRenderer::new();
//!
//! let card = renderer.render(&theme, "The best way out is always through.")?;
//! let path = export::export_to_file(&card, &ExportRequest::default(), std::path::Path::new("."))?;
//! println!("wrote {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod theme;
pub use theme::{
    builtin_presets, find_preset, Alignment, Background, CanvasPreset, Color, ImageSource,
    Position, TextEffects, Theme, ThemePatch, ThemePreset, CANVAS_PRESETS, FONT_FAMILIES,
};

pub mod drag;
pub use drag::{ContainerSize, DragController, PointerInput, PointerSource};

pub mod rendering;
pub use rendering::{CardRenderer, RenderedCard, SUPERSAMPLE};

pub mod export;
pub use export::{ExportFormat, ExportRequest};

pub mod clipboard;
pub use clipboard::copy_to_clipboard;

// Async-friendly editor session (worker-backed abstraction)
pub mod async_api;
pub use async_api::Editor;
