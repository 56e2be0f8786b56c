//! tests/mod.rs

mod common;
