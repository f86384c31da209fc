//! Supermarket sales dashboard.
//!
//! [`data`] holds the load → filter → aggregate pipeline and has no UI
//! dependencies; [`app`], [`state`] and [`ui`] render it with egui.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
