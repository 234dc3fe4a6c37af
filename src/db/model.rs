use serde::Serialize;

/// A stored recommendation row. The variant-specific columns live in
/// [`RecommendationFields`]; `id`, `link` and `type` are common to both
/// table shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: i64,
    pub link: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: RecommendationFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecommendationFields {
    Likes {
        description: String,
        likes: i64,
    },
    Message {
        title: String,
        message: Option<String>,
    },
}

/// A validated candidate row, as accepted by create and update. The shape
/// must match the schema variant the store was opened with.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecommendation {
    pub link: String,
    pub kind: String,
    pub fields: NewFields,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewFields {
    Likes {
        description: String,
        likes: i64,
    },
    Message {
        title: String,
        message: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type DbResult<T> = Result<T, DbError>;
