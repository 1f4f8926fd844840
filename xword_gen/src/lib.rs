#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod board;
pub mod cluster;
pub mod compat;
pub mod config;
pub mod connectivity;
pub mod generator;
pub mod search;
pub mod validate;
