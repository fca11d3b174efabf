pub mod config;
pub mod disk;
pub mod logger;
pub mod settings;

pub use config::*;
pub use disk::{available_space, warn_if_low_space};
pub use logger::setup_logging;
pub use settings::{CatalogBackend, Settings};
