//! Shared value model for the saga test engine.
//!
//! Sagas yield [`Value`]s describing effects and are resumed with [`Value`]s
//! standing in for real side-effect results. This crate defines that model,
//! its conversions, and the function-aware renderer used in diagnostics.

mod render;
mod value;

pub use render::{render, render_compact};
pub use value::{Value, PUT_KEY};
