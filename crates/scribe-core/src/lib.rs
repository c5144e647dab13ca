//! Core types and trait definitions for the Scribe blog platform.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The storage backend and the web layer both depend on it.

// Native `async fn` in traits; the store trait spells out `Send` futures itself.
#![allow(async_fn_in_trait)]

pub mod authoring;
pub mod error;
pub mod feed;
pub mod follow;
pub mod form;
pub mod model;
pub mod paginate;
pub mod store;

pub use error::{Error, Result};
