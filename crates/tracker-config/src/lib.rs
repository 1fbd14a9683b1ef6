//! Configuration management for the issue tracker.
//!
//! Layers built-in defaults, an optional config file and `TRACKER_*`
//! environment variables into a typed [`TrackerConfig`].

pub mod config;

pub use config::{ConfigError, LogFormat, TrackerConfig, load_config};
