#![doc = include_str!("../README.md")]
pub mod cache;
pub mod coordinator;
pub mod store;
pub mod types;
