pub mod artist;
pub mod song;
pub mod songplay;
pub mod time;
pub mod user;
