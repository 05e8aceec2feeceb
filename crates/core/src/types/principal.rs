//! Signed-in identity.

use serde::{Deserialize, Serialize};

/// The authenticated identity returned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Display name from the identity provider profile, if shared.
    pub display_name: Option<String>,
    /// Verified email address.
    pub email: String,
}

impl Principal {
    /// Name used in the welcome banner: the display name, falling back to the email.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_prefers_display_name() {
        let principal = Principal {
            display_name: Some("Ada Lovelace".to_string()),
            email: "ada@example.com".to_string(),
        };
        assert_eq!(principal.greeting_name(), "Ada Lovelace");
    }

    #[test]
    fn test_greeting_falls_back_to_email() {
        let principal = Principal {
            display_name: Some(String::new()),
            email: "ada@example.com".to_string(),
        };
        assert_eq!(principal.greeting_name(), "ada@example.com");

        let principal = Principal {
            display_name: None,
            email: "ada@example.com".to_string(),
        };
        assert_eq!(principal.greeting_name(), "ada@example.com");
    }
}
