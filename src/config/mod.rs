//! Configuration: TOML file, precedence chain, validation and compiled rules.

pub mod keybindings;
pub mod loader;
pub mod rules;

pub use keybindings::KeyBindings;
pub use loader::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    ConfigError, ConfigFile, GroupSection, ResolvedConfig, StatusSection, TagSection,
};
pub use rules::{GroupRule, Rules, StatusRule, TagRule};
