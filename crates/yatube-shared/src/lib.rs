//! # Yatube Shared
//!
//! Wire types shared by the HTTP handlers: JSON request/response bodies
//! and RFC 7807 error documents.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
