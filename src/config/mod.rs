pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use cli::LocalStorage;
pub use toml_config::TrackerConfig;
