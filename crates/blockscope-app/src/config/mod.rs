//! Configuration file parsing for blockscope
//!
//! Settings live in `config.toml` under the platform config directory
//! (`~/.config/blockscope/config.toml` on Linux) unless a path is given.

pub mod settings;
pub mod types;

pub use settings::{default_config_path, init_config_file, load_settings_from};
pub use types::*;
