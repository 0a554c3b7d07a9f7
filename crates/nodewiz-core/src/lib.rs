//! Core types and trait definitions for the NodeWiz marketing site.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store backend and the web layer both depend on it.

// Native `async fn` in traits; the returned futures are spelled out as
// `impl Future + Send` where it matters.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod error;
pub mod store;
pub mod testimonial;
pub mod validate;

pub use error::{Error, Result};
