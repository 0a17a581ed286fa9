pub mod controller;
pub mod persist;
pub mod refresh;

pub use controller::{Listing, PolicyCommand, PolicyController, PolicyHandle};
pub use persist::{FileSettingsSink, SettingsSink};
pub use refresh::{fetch_catalog, refresh_listing, refresh_resolution};
