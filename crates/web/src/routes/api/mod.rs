//! JSON API routes.

pub mod submit;
