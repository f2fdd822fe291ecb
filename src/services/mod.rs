pub mod file_walker;
pub mod loader;
pub mod schema;
