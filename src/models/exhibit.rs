use serde::Serialize;
use sqlx::FromRow;

use crate::database::Database;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Exhibit {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub museum_id: i64,
}

impl Exhibit {
    pub async fn for_museum(museum_id: i64, db: &Database) -> Result<Vec<Exhibit>, sqlx::Error> {
        sqlx::query_as::<_, Exhibit>(
            "SELECT id, name, description, museum_id FROM exhibits WHERE museum_id = $1 ORDER BY id",
        )
        .bind(museum_id)
        .fetch_all(&db.pool)
        .await
    }
}
