//! Data exchanged with the backend.
pub mod auth;
pub mod dashboard;
pub mod tasks;
