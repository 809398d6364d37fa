pub mod defaults;
pub mod schema;

pub use schema::{ModsConfig, Overrides};
