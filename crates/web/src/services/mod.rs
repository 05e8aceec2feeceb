//! Outbound services: the identity provider and the record store client.

pub mod identity;
pub mod records;

pub use identity::{AuthError, Authenticated, GoogleIdentity, IdentityProvider};
pub use records::{RecordError, RecordStoreClient};
