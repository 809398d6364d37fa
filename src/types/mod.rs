pub mod loader;
pub mod project;
