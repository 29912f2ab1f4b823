pub mod analysis;
pub mod config;
pub mod feed;
pub mod registry;

pub mod error;
pub mod time;
