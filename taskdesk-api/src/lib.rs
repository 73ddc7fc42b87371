#![doc = include_str!("../README.md")]
pub mod agent;
pub mod client;
mod error;
pub mod types;

pub use crate::error::{Error, Result};
pub use taskdesk_common as common;
pub use taskdesk_rest as rest;
