//! Turning a raw JSON body into validated [`Fields`].

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::db::models::Fields;
use crate::errors::FieldErrors;

/// Key used for errors that concern the body as a whole.
pub const BODY: &str = "body";

/// Signature shared by every request validator.
pub type Validator = fn(Value) -> Result<Fields, FieldErrors>;

pub fn body_error(message: impl Into<String>) -> FieldErrors {
    FieldErrors::from([(BODY.to_string(), vec![message.into()])])
}

/// Flatten `validator` output into field name -> messages.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("The {field} field is invalid."),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Deserialize `body` as `T`, run its validation rules and hand back the fields it carries.
///
/// Fields the request type does not know are dropped; absent optional fields stay absent so
/// that updates only touch what the caller sent.
pub fn validate_payload<T>(body: Value) -> Result<Fields, FieldErrors>
where
    T: DeserializeOwned + Validate + Serialize,
{
    if !body.is_object() {
        return Err(body_error("The request body must be a JSON object."));
    }
    let payload: T = serde_json::from_value(body).map_err(|e| body_error(e.to_string()))?;
    payload.validate().map_err(|e| field_errors(&e))?;

    match serde_json::to_value(&payload) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(body_error("The request body must be a JSON object.")),
        Err(e) => Err(body_error(e.to_string())),
    }
}

/// Comma separated strings are accepted wherever a list of tags is.
pub mod tag_list {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
        let tags = match Option::<Raw>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(Raw::List(tags)) => tags,
            Some(Raw::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
        };
        Ok(Some(
            tags.into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
        ))
    }
}

/// Optional reference ids where `null` or an empty string clears the reference.
///
/// The outer `Option` tells "not sent" apart from "sent empty", so use with
/// `#[serde(default, skip_serializing_if = "Option::is_none")]`.
pub mod nullable_id {
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Some(None)),
            Some(raw) if raw.trim().is_empty() => Ok(Some(None)),
            Some(raw) => Uuid::parse_str(raw.trim())
                .map(|id| Some(Some(id)))
                .map_err(serde::de::Error::custom),
        }
    }

    pub fn serialize<S: Serializer>(value: &Option<Option<Uuid>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(Some(id)) => serializer.collect_str(id),
            _ => serializer.serialize_none(),
        }
    }
}
