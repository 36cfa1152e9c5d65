//! Core types and the security facade.
//!
//! Sessions, token signing, audit logging and the error and model types
//! shared by every other module live here.

pub mod audit;
pub mod auth;
pub mod constants;
pub mod crypto;
pub mod errors;
pub mod models;
pub mod security_core;
pub mod session;
pub mod types;
