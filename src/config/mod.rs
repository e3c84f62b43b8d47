//! Configuration module for Vantage.
//!
//! Handles the config file, environment variables, and settings.

mod settings;

pub use settings::{
    expand_env_vars, ComparisonSettings, DatastoreSettings, LoggingSettings, Settings,
    SettingsError,
};
