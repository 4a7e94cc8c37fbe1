pub mod app;
pub mod cli;
pub mod clock;
pub mod engine;
pub mod format;
pub mod session;
pub mod settings;
pub mod view;

pub use engine::Stopwatch;
pub use settings::Settings;
