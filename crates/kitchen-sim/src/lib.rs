//! # Kitchen Simulator
//!
//! The application around [`shelf_engine`]: loads settings, replays an
//! orders JSON file through the engine, and renders every lifecycle
//! event to the console.

pub mod feed;
pub mod render;
pub mod settings;
pub mod telemetry;

pub use feed::JsonOrderFeed;
pub use render::ConsoleSink;
pub use settings::SimSettings;
