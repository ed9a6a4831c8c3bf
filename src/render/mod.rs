//! Render module: Turning buffers into terminal output.
//!
//! - [`Renderer`]: Front/back buffer pair, flushed to any `io::Write`
//! - [`render_diff`] / [`render_full`]: Cell-level diffing into ANSI sequences
//! - [`OutputBuffer`]: Frame-sized byte buffer for escape sequences

mod diff;
mod output;
mod renderer;

pub use diff::{render_diff, render_full, DiffState, FlushStats};
pub use output::OutputBuffer;
pub use renderer::{Renderer, RendererConfig};
