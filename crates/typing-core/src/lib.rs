//! Core traits and types for the typing note storage service.
//!
//! This crate defines the abstractions shared between the cloud adapters and
//! the HTTP layer:
//! - `Notestore` / `Sectionstore`: note and section CRUD
//! - `Auth` / `Userinfo`: OAuth signin workflow and token holder profile
//! - `Container`: per-request instance activation
//! - field validation and sanitization rules

pub mod container;
mod error;
mod note;
mod section;
mod signin;
pub mod validation;

pub use container::{Container, ContainerError, Instance, InstanceType};
pub use error::{Error, Result};
pub use note::{Note, Notestore, WritableNote};
pub use section::{Section, Sectionstore, WritableSection};
pub use signin::{Auth, Token, User, Userinfo};
