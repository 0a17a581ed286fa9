pub mod catalog;
pub mod cli;
pub mod error;
pub mod format;
pub mod policy;
pub mod runtime;
