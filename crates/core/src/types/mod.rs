//! Core types for Profile Hub.
//!
//! This module provides type-safe wrappers for the profile domain.

pub mod id;
pub mod principal;
pub mod profile;

pub use id::ProfileId;
pub use principal::Principal;
pub use profile::{
    ProfileDocument, ProfileDraft, ProfileField, ProfileFields, ProfileRecord, ValidationError,
    age_from_f64,
};
