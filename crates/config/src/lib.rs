// Configuration loading

pub mod error;
pub mod schema;

pub use error::ConfigError;
pub use schema::SchemaConfig;
