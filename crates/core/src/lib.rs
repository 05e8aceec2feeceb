//! Profile Hub Core - Shared types library.
//!
//! This crate provides the types shared by every Profile Hub component:
//! - `web` - The sign-in screen, profile form and `/api/submit` endpoint
//! - `integration-tests` - End-to-end tests driving the web binary
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no document store access. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Profile records, drafts, document shapes and principals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
