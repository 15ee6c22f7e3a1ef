//! Interactive report over precomputed regression-model outputs.
//!
//! [`report`] holds the pure metrics engine; [`data`] loads and exports the
//! tables it works on; [`state`], [`ui`] and [`app`] render it with egui.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod report;
pub mod state;
pub mod ui;
