//! Session keys.
//!
//! The signed-in form state itself is [`crate::controller::SignedInForm`];
//! its absence under [`keys::PROFILE_FORM`] means the session is signed out.

/// Session keys for authentication and form state.
pub mod keys {
    /// Key for the signed-in form state.
    pub const PROFILE_FORM: &str = "profile_form";

    /// Key for Google OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "google_oauth_state";

    /// Key for Google OAuth nonce (`OpenID` Connect replay protection).
    pub const OAUTH_NONCE: &str = "google_oauth_nonce";
}
