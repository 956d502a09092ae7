pub mod loader;
pub mod settings;

pub use loader::{file_to_config, parse_config};
pub use settings::{BrokerConfig, LogFormat, LoggingConfig};
