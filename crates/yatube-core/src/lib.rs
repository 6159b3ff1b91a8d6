//! # Yatube Core
//!
//! The domain layer of the Yatube blogging service.
//! This crate contains entities, validation and the declarative admin
//! configuration, with zero infrastructure dependencies.

pub mod admin;
pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;

pub use error::{DomainError, RepoError};
pub use pagination::Page;
