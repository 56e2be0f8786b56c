//! config/mod.rs

pub mod dispatch_config;
pub mod smtp_config;
