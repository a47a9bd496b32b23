//! Vasalytics: statistics dashboard for the Vasaloppet ski race.
//!
//! [`data`] loads and memoizes the race tables, [`stats`] derives the chart
//! summaries and [`ui`] draws them with egui.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod stats;
pub mod ui;
