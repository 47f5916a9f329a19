pub mod config;
pub mod data;
pub mod error;
pub mod replay;
pub mod server;

pub use self::config::Config;
pub use error::ReplayError;
