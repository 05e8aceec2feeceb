//! Profile records, drafts and stored document shapes.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::ProfileId;

/// The five business fields of a profile record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Name,
    Age,
    Email,
    Phone,
    Address,
}

impl ProfileField {
    /// All fields in form order.
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Age,
        Self::Email,
        Self::Phone,
        Self::Address,
    ];

    /// Document field name used by the store.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Age => "age",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Errors raised when a draft is not complete enough to be written.
///
/// Validation always happens before any store interaction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("{0} is required")]
    MissingField(ProfileField),
    /// The age is present but not a non-negative whole number.
    #[error("age must be a non-negative whole number (got {0:?})")]
    InvalidAge(String),
}

impl ValidationError {
    /// Message shown to the user when an action is blocked.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "Please fill all fields!",
            Self::InvalidAge(_) => "Age must be a non-negative whole number.",
        }
    }
}

/// Validated business fields of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub name: String,
    pub age: u32,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// A persisted profile: the store-assigned identifier plus its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: ProfileId,
    #[serde(flatten)]
    pub fields: ProfileFields,
}

impl ProfileRecord {
    /// Load this record back into an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> ProfileDraft {
        ProfileDraft {
            name: self.fields.name.clone(),
            age: self.fields.age.to_string(),
            email: self.fields.email.clone(),
            phone: self.fields.phone.clone(),
            address: self.fields.address.clone(),
        }
    }
}

/// The in-memory, not-yet-persisted values a user is editing.
///
/// Fields hold the raw text submitted by the form so that an invalid age can
/// be shown back to the user unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl Default for ProfileDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: "0".to_string(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
        }
    }
}

impl ProfileDraft {
    /// Check that every field is present and the age is a non-negative integer.
    ///
    /// # Errors
    ///
    /// Returns the first missing field in form order, or `InvalidAge` when the
    /// age text does not parse.
    pub fn validate(&self) -> Result<ProfileFields, ValidationError> {
        for field in ProfileField::ALL {
            if self.value(field).is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }

        let age = self
            .age
            .trim()
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidAge(self.age.clone()))?;

        Ok(ProfileFields {
            name: self.name.clone(),
            age,
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        })
    }

    /// Raw text of one field.
    #[must_use]
    pub fn value(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Age => &self.age,
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
            ProfileField::Address => &self.address,
        }
    }
}

/// Age from a JSON or Firestore double.
///
/// Only whole, non-negative values that fit in a `u32` are ages.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp
)] // range and fraction checked first
pub fn age_from_f64(value: f64) -> Option<u32> {
    (value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value)).then(|| value as u32)
}

/// A document as written to the profile collection.
///
/// The form writes full five-field records. The server submit endpoint writes
/// only `name` and `age`; readers treat the missing contact fields as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileDocument {
    Full(ProfileFields),
    NameAge { name: String, age: u32 },
}

impl ProfileDocument {
    /// Fields as they read back from the store.
    #[must_use]
    pub fn into_fields(self) -> ProfileFields {
        match self {
            Self::Full(fields) => fields,
            Self::NameAge { name, age } => ProfileFields {
                name,
                age,
                email: String::new(),
                phone: String::new(),
                address: String::new(),
            },
        }
    }
}
