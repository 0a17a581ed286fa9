pub mod editor;
pub mod model;
pub mod resolver;

pub use editor::{
    Mutation, clear_override, set_default_mode, set_override, set_show_system_apps,
};
pub use model::{DefaultMode, PolicyStore};
pub use resolver::{DEFAULT_HOST_PACKAGE, Resolution, Resolver, Route, classify};
