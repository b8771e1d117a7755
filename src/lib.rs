//! modelgate resolves logical model types (`basic`, `reasoning`, `vision`,
//! `code`) into ready-to-use chat-completion clients and renders prompt
//! templates into system messages.
//!
//! The [`factory::ClientFactory`] owns a per-kind cache so each logical type
//! is constructed at most once, even under concurrent first use.

pub mod config;
pub mod constants;
pub mod error;
pub mod factory;
pub mod message;
pub mod prompts;
pub mod provider;

pub use error::{Error, Result};
pub use factory::ClientFactory;
