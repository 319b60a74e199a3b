//! # everblog-renderer
//!
//! Tera-based renderer that turns fetched notes into Hexo post files.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use everblog_core::FetchedNote;
//! use everblog_renderer::Renderer;
//!
//! fn render(note: &FetchedNote) {
//!     if let Ok(renderer) = Renderer::new() {
//!         if let Ok(post) = renderer.render_post(note) {
//!             println!("{}: {} bytes", note.name, post.len());
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::PostContext;
pub use engine::{Renderer, POST_TEMPLATE};
pub use error::RenderError;
