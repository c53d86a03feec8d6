pub mod histogram;
pub mod ingest;
pub mod layout;
pub mod matrix;
pub mod spectrum;
pub mod stats;
pub mod synthetic;
pub mod wiggle;
