use serde::Serialize;
use serde_json::Value;

use crate::config::SchemaVariant;
use crate::db::{NewFields, NewRecommendation};

/// The uniform response wrapper: every reply, success or failure, is
/// `{status, data}` and nothing else.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            data,
        }
    }
}

impl Envelope<&'static str> {
    pub fn failure(data: &'static str) -> Self {
        Self {
            status: Status::Failure,
            data,
        }
    }
}

/// Checks a candidate body against the active schema variant.
///
/// Every required field must be present with the right type; the optional
/// `message` may be a string, null, or absent, but nothing else. Unknown
/// extra fields are ignored. Returns `None` on any violation; the caller
/// turns that into the invalid-input failure.
pub fn parse_new_recommendation(variant: SchemaVariant, body: &Value) -> Option<NewRecommendation> {
    let obj = body.as_object()?;

    let link = obj.get("link")?.as_str()?.to_string();
    let kind = obj.get("type")?.as_str()?.to_string();

    let fields = match variant {
        SchemaVariant::Likes => NewFields::Likes {
            description: obj.get("description")?.as_str()?.to_string(),
            likes: obj.get("likes")?.as_i64()?,
        },
        SchemaVariant::Message => {
            let title = obj.get("title")?.as_str()?.to_string();
            let message = match obj.get("message") {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(_) => return None,
            };
            NewFields::Message { title, message }
        }
    };

    Some(NewRecommendation { link, kind, fields })
}
