pub mod args;
pub mod command;
pub mod config;
pub mod loader;

pub use args::{Args, Command};
pub use command::execute;
pub use config::{AllowlistConfig, SettingsFile};
pub use loader::PolicyLoader;
