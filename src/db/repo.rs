use async_trait::async_trait;

use super::model::*;

#[async_trait]
pub trait RecommendationRepo: Send + Sync {
    /// All rows, ordered by `likes` descending for the likes variant and
    /// in store order for the message variant.
    async fn list(&self) -> DbResult<Vec<Recommendation>>;
    async fn get(&self, id: i64) -> DbResult<Recommendation>;
    /// The id of the row holding `link`, if any. Used for the advisory
    /// uniqueness pre-check on create and update.
    async fn find_id_by_link(&self, link: &str) -> DbResult<Option<i64>>;
    /// Inserts a row; returns the number of rows inserted (always 1).
    async fn insert(&self, rec: &NewRecommendation) -> DbResult<u64>;
    /// Full-row rewrite by id; returns the number of rows affected
    /// (0 when no row matches the id).
    async fn update(&self, id: i64, rec: &NewRecommendation) -> DbResult<u64>;
    /// Returns the number of rows deleted (0 when no row matches).
    async fn delete(&self, id: i64) -> DbResult<u64>;
}
