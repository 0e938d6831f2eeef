pub mod config;
pub mod error;
pub mod facts;

pub use config::Config;
pub use error::*;
pub use facts::*;
