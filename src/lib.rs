pub mod algorithm;
pub mod config;
pub mod error;
pub mod input;
pub mod validate;
