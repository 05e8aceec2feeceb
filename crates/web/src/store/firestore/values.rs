//! Firestore REST document encoding.
//!
//! Firestore wraps every field in a typed value object
//! (`{"stringValue": "Ada"}`, `{"integerValue": "30"}`). Only the kinds the
//! profile collection uses are modelled; other kinds are ignored on read.

use std::collections::BTreeMap;

use profile_hub_core::{
    ProfileDocument, ProfileField, ProfileFields, ProfileId, ProfileRecord, age_from_f64,
};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// A typed Firestore value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    /// int64 values travel as decimal strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integer_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
}

impl Value {
    fn string(value: &str) -> Self {
        Self {
            string_value: Some(value.to_string()),
            ..Self::default()
        }
    }

    fn integer(value: u32) -> Self {
        Self {
            integer_value: Some(value.to_string()),
            ..Self::default()
        }
    }
}

/// Document resource as returned by the REST API.
#[derive(Debug, Default, Deserialize)]
pub struct Document {
    /// Full resource name: `projects/{p}/databases/(default)/documents/{collection}/{id}`.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

/// Body for create and patch requests.
#[derive(Debug, Serialize)]
pub struct DocumentBody {
    pub fields: BTreeMap<String, Value>,
}

/// Response of a collection list call.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    pub next_page_token: Option<String>,
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorStatus,
}

#[derive(Debug, Deserialize)]
pub struct ErrorStatus {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

/// Encode the business fields of a document.
pub fn encode_document(document: &ProfileDocument) -> DocumentBody {
    let mut fields = BTreeMap::new();
    match document {
        ProfileDocument::Full(full) => fields.extend(encode_fields(full)),
        ProfileDocument::NameAge { name, age } => {
            fields.insert(ProfileField::Name.key().to_string(), Value::string(name));
            fields.insert(ProfileField::Age.key().to_string(), Value::integer(*age));
        }
    }
    DocumentBody { fields }
}

/// Encode all five business fields.
pub fn encode_fields(fields: &ProfileFields) -> BTreeMap<String, Value> {
    BTreeMap::from([
        (ProfileField::Name.key().to_string(), Value::string(&fields.name)),
        (ProfileField::Age.key().to_string(), Value::integer(fields.age)),
        (ProfileField::Email.key().to_string(), Value::string(&fields.email)),
        (ProfileField::Phone.key().to_string(), Value::string(&fields.phone)),
        (ProfileField::Address.key().to_string(), Value::string(&fields.address)),
    ])
}

/// Last path segment of a document resource name.
pub fn document_id(name: &str) -> Result<ProfileId, StoreError> {
    name.rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(ProfileId::from)
        .ok_or_else(|| StoreError::Unavailable(format!("malformed document name: {name:?}")))
}

/// Decode a listed document into a record.
///
/// Contact fields missing from two-field submissions read as empty strings.
pub fn decode_document(document: Document) -> Result<ProfileRecord, StoreError> {
    let id = document_id(&document.name)?;
    let text = |field: ProfileField| {
        document
            .fields
            .get(field.key())
            .and_then(|value| value.string_value.clone())
            .unwrap_or_default()
    };

    let age = document
        .fields
        .get(ProfileField::Age.key())
        .map_or(Some(0), decode_age)
        .unwrap_or_else(|| {
            tracing::warn!(document = %id, "profile age is not a whole number, reading as 0");
            0
        });

    Ok(ProfileRecord {
        fields: ProfileFields {
            name: text(ProfileField::Name),
            age,
            email: text(ProfileField::Email),
            phone: text(ProfileField::Phone),
            address: text(ProfileField::Address),
        },
        id,
    })
}

/// Accept integer, whole non-negative double, or numeric string ages.
fn decode_age(value: &Value) -> Option<u32> {
    if let Some(integer) = &value.integer_value {
        return integer.parse().ok();
    }
    if let Some(double) = value.double_value {
        return age_from_f64(double);
    }
    value
        .string_value
        .as_deref()
        .and_then(|text| text.trim().parse().ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn document(json: serde_json::Value) -> Document {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_encode_full_document() {
        let body = encode_document(&ProfileDocument::Full(ProfileFields {
            name: "Ada".to_string(),
            age: 30,
            email: "a@x.com".to_string(),
            phone: "555".to_string(),
            address: "NYC".to_string(),
        }));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["fields"]["name"]["stringValue"], "Ada");
        assert_eq!(json["fields"]["age"]["integerValue"], "30");
        assert_eq!(json["fields"]["address"]["stringValue"], "NYC");
        assert!(json["fields"]["age"].get("stringValue").is_none());
    }

    #[test]
    fn test_encode_name_age_document() {
        let body = encode_document(&ProfileDocument::NameAge {
            name: "Bob".to_string(),
            age: 25,
        });
        assert_eq!(body.fields.len(), 2);
        assert_eq!(body.fields["age"].integer_value.as_deref(), Some("25"));
    }

    #[test]
    fn test_decode_full_document() {
        let record = decode_document(document(serde_json::json!({
            "name": "projects/demo/databases/(default)/documents/users/Xy12",
            "fields": {
                "name": {"stringValue": "Ada"},
                "age": {"integerValue": "30"},
                "email": {"stringValue": "a@x.com"},
                "phone": {"stringValue": "555"},
                "address": {"stringValue": "NYC"}
            },
            "createTime": "2025-01-01T00:00:00Z"
        })))
        .unwrap();

        assert_eq!(record.id.as_str(), "Xy12");
        assert_eq!(record.fields.name, "Ada");
        assert_eq!(record.fields.age, 30);
        assert_eq!(record.fields.address, "NYC");
    }

    #[test]
    fn test_decode_two_field_submission() {
        let record = decode_document(document(serde_json::json!({
            "name": "projects/demo/databases/(default)/documents/users/b0b",
            "fields": {
                "name": {"stringValue": "Bob"},
                "age": {"integerValue": "25"}
            }
        })))
        .unwrap();

        assert_eq!(record.fields.age, 25);
        assert!(record.fields.email.is_empty());
        assert!(record.fields.address.is_empty());
    }

    #[test]
    fn test_decode_age_variants() {
        let string_age = Value::string("31");
        assert_eq!(decode_age(&string_age), Some(31));

        let double_age = Value {
            double_value: Some(42.0),
            ..Value::default()
        };
        assert_eq!(decode_age(&double_age), Some(42));

        let fractional = Value {
            double_value: Some(4.5),
            ..Value::default()
        };
        assert_eq!(decode_age(&fractional), None);

        assert_eq!(decode_age(&Value::string("old")), None);
    }

    #[test]
    fn test_decode_unparseable_age_reads_zero() {
        let record = decode_document(document(serde_json::json!({
            "name": "projects/demo/databases/(default)/documents/users/q",
            "fields": {
                "name": {"stringValue": "Q"},
                "age": {"stringValue": "unknown"}
            }
        })))
        .unwrap();
        assert_eq!(record.fields.age, 0);
    }

    #[test]
    fn test_document_id_rejects_empty_name() {
        assert!(document_id("").is_err());
        assert_eq!(document_id("a/b/c").unwrap().as_str(), "c");
    }

    #[test]
    fn test_list_response_without_documents() {
        let response: ListDocumentsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.documents.is_empty());
        assert!(response.next_page_token.is_none());
    }
}
