pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod ui;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::AppConfig;

pub use adapters::deepl::{DeepLClient, DeepLSettings};
pub use adapters::picker::DocumentPicker;
pub use adapters::probe::TcpProbe;
pub use crate::core::{connectivity::ConnectivityMonitor, orchestrator::TranslationOrchestrator};
pub use utils::error::{Result, TranslatorError};
