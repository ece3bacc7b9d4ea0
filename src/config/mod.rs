//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All keys are optional; the command line overrides whatever the file sets.
//!
//! # Example
//!
//! ```no_run
//! use sve_cardlist::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("cardlist.toml")).unwrap();
//! println!("Writing to: {}", config.output.path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, FetchConfig, OutputConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
