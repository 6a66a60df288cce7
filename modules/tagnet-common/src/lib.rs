pub mod config;
pub mod error;
pub mod snapshot;
pub mod types;

pub use config::Config;
pub use error::{Result, TagnetError};
pub use snapshot::InputFile;
pub use types::*;
