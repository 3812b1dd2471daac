//! Process bootstrap shared by the recipes binaries: layered configuration,
//! home directory resolution and logging.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, AppConfigProvider, AppSection, CliArgs, ConfigProvider,
    LoggingConfig, Section,
};
