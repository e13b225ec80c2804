pub mod download;
pub mod metadata;
pub mod print;
pub mod search;
pub mod show_config;
pub mod validate_config;
