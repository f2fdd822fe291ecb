pub mod config;
pub mod db;
pub mod timestamp;
pub mod validators;
