pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod segy;

pub use error::{Error, Result};
