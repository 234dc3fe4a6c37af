use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::info;

use super::model::*;
use super::repo::*;
use crate::config::SchemaVariant;

pub struct SqliteRepository {
    pool: SqlitePool,
    variant: SchemaVariant,
}

impl SqliteRepository {
    pub async fn new(db_path: &str, variant: SchemaVariant) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(db_path)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let repo = Self { pool, variant };

        repo.init_schema().await?;

        info!("Database initialized at {}", db_path);

        Ok(repo)
    }

    async fn init_schema(&self) -> DbResult<()> {
        let schema = match self.variant {
            SchemaVariant::Likes => include_str!("schema_likes.sql"),
            SchemaVariant::Message => include_str!("schema_message.sql"),
        };
        sqlx::query(schema).execute(&self.pool).await?;
        Ok(())
    }

    fn map_row(&self, row: &SqliteRow) -> Result<Recommendation, sqlx::Error> {
        let fields = match self.variant {
            SchemaVariant::Likes => RecommendationFields::Likes {
                description: row.try_get("description")?,
                likes: row.try_get("likes")?,
            },
            SchemaVariant::Message => RecommendationFields::Message {
                title: row.try_get("title")?,
                message: row.try_get("message")?,
            },
        };
        Ok(Recommendation {
            id: row.try_get("id")?,
            link: row.try_get("link")?,
            kind: row.try_get("type")?,
            fields,
        })
    }
}

/// Maps the UNIQUE constraint on `link` to a conflict. The advisory
/// pre-check in the handlers races with concurrent writers; this is the
/// enforcement that actually holds.
fn map_write_err(e: sqlx::Error, link: &str) -> DbError {
    match &e {
        sqlx::Error::Database(d) if d.is_unique_violation() => {
            DbError::Conflict(format!("link already taken: {}", link))
        }
        _ => DbError::Sqlx(e),
    }
}

#[async_trait]
impl RecommendationRepo for SqliteRepository {
    async fn list(&self) -> DbResult<Vec<Recommendation>> {
        let query = match self.variant {
            SchemaVariant::Likes => {
                "SELECT id, link, type, description, likes FROM recommendations ORDER BY likes DESC"
            }
            SchemaVariant::Message => {
                "SELECT id, link, type, title, message FROM recommendations"
            }
        };

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        let mut recs = Vec::with_capacity(rows.len());
        for row in &rows {
            recs.push(self.map_row(row)?);
        }
        Ok(recs)
    }

    async fn get(&self, id: i64) -> DbResult<Recommendation> {
        let query = match self.variant {
            SchemaVariant::Likes => {
                "SELECT id, link, type, description, likes FROM recommendations WHERE id = ?"
            }
            SchemaVariant::Message => {
                "SELECT id, link, type, title, message FROM recommendations WHERE id = ?"
            }
        };

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Recommendation not found: {}", id)))?;

        Ok(self.map_row(&row)?)
    }

    async fn find_id_by_link(&self, link: &str) -> DbResult<Option<i64>> {
        let result = sqlx::query_as::<_, (i64,)>("SELECT id FROM recommendations WHERE link = ?")
            .bind(link)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result.map(|r| r.0))
    }

    async fn insert(&self, rec: &NewRecommendation) -> DbResult<u64> {
        let result = match &rec.fields {
            NewFields::Likes { description, likes } => {
                sqlx::query(
                    "INSERT INTO recommendations (link, type, description, likes) VALUES (?, ?, ?, ?)",
                )
                .bind(&rec.link)
                .bind(&rec.kind)
                .bind(description)
                .bind(likes)
                .execute(&self.pool)
                .await
            }
            NewFields::Message { title, message } => {
                sqlx::query(
                    "INSERT INTO recommendations (link, type, title, message) VALUES (?, ?, ?, ?)",
                )
                .bind(&rec.link)
                .bind(&rec.kind)
                .bind(title)
                .bind(message)
                .execute(&self.pool)
                .await
            }
        };

        let result = result.map_err(|e| map_write_err(e, &rec.link))?;
        Ok(result.rows_affected())
    }

    async fn update(&self, id: i64, rec: &NewRecommendation) -> DbResult<u64> {
        let result = match &rec.fields {
            NewFields::Likes { description, likes } => {
                sqlx::query(
                    "UPDATE recommendations SET link = ?, type = ?, description = ?, likes = ? WHERE id = ?",
                )
                .bind(&rec.link)
                .bind(&rec.kind)
                .bind(description)
                .bind(likes)
                .bind(id)
                .execute(&self.pool)
                .await
            }
            NewFields::Message { title, message } => {
                sqlx::query(
                    "UPDATE recommendations SET link = ?, type = ?, title = ?, message = ? WHERE id = ?",
                )
                .bind(&rec.link)
                .bind(&rec.kind)
                .bind(title)
                .bind(message)
                .bind(id)
                .execute(&self.pool)
                .await
            }
        };

        let result = result.map_err(|e| map_write_err(e, &rec.link))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM recommendations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[tokio::test]
    async fn insert_then_get_roundtrip() {
        let repo = fresh_repo(SchemaVariant::Likes).await;

        let inserted = repo.insert(&likes_rec("http://x.test/a", 3)).await.unwrap();
        assert_eq!(inserted, 1);

        let rec = repo.get(1).await.unwrap();
        assert_eq!(rec.link, "http://x.test/a");
        assert_eq!(rec.kind, "article");
        assert_eq!(
            rec.fields,
            RecommendationFields::Likes {
                description: "a thing worth reading".to_string(),
                likes: 3,
            }
        );
    }

    #[tokio::test]
    async fn get_missing_row_is_not_found() {
        let repo = fresh_repo(SchemaVariant::Likes).await;
        match repo.get(42).await {
            Err(DbError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn duplicate_link_insert_is_conflict() {
        // This is the backstop for the advisory pre-check race: a second
        // insert that slipped past the check must still fail.
        let repo = fresh_repo(SchemaVariant::Likes).await;
        repo.insert(&likes_rec("http://x.test/dup", 1)).await.unwrap();

        match repo.insert(&likes_rec("http://x.test/dup", 2)).await {
            Err(DbError::Conflict(_)) => {}
            other => panic!("expected Conflict, got {:?}", other),
        }

        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_id_by_link() {
        let repo = fresh_repo(SchemaVariant::Likes).await;
        repo.insert(&likes_rec("http://x.test/b", 0)).await.unwrap();

        assert_eq!(repo.find_id_by_link("http://x.test/b").await.unwrap(), Some(1));
        assert_eq!(repo.find_id_by_link("http://x.test/nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_rewrites_every_field() {
        let repo = fresh_repo(SchemaVariant::Likes).await;
        repo.insert(&likes_rec("http://x.test/c", 1)).await.unwrap();

        let replacement = NewRecommendation {
            link: "http://x.test/c2".to_string(),
            kind: "video".to_string(),
            fields: NewFields::Likes {
                description: "replaced".to_string(),
                likes: 9,
            },
        };
        assert_eq!(repo.update(1, &replacement).await.unwrap(), 1);

        let rec = repo.get(1).await.unwrap();
        assert_eq!(rec.link, "http://x.test/c2");
        assert_eq!(rec.kind, "video");

        // No row with that id: zero rows affected, not an error.
        assert_eq!(repo.update(99, &replacement).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_reports_affected_rows() {
        let repo = fresh_repo(SchemaVariant::Likes).await;
        repo.insert(&likes_rec("http://x.test/d", 0)).await.unwrap();

        assert_eq!(repo.delete(1).await.unwrap(), 1);
        assert_eq!(repo.delete(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn message_variant_stores_optional_message() {
        let repo = fresh_repo(SchemaVariant::Message).await;

        let with_message = NewRecommendation {
            link: "http://x.test/m1".to_string(),
            kind: "note".to_string(),
            fields: NewFields::Message {
                title: "first".to_string(),
                message: Some("hello".to_string()),
            },
        };
        let without_message = NewRecommendation {
            link: "http://x.test/m2".to_string(),
            kind: "note".to_string(),
            fields: NewFields::Message {
                title: "second".to_string(),
                message: None,
            },
        };
        repo.insert(&with_message).await.unwrap();
        repo.insert(&without_message).await.unwrap();

        let rec = repo.get(2).await.unwrap();
        assert_eq!(
            rec.fields,
            RecommendationFields::Message {
                title: "second".to_string(),
                message: None,
            }
        );
    }
}
