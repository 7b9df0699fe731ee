use serde::Serialize;
use sqlx::FromRow;

use crate::database::Database;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Museum {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub location: String,
}

impl Museum {
    pub async fn all(db: &Database) -> Result<Vec<Museum>, sqlx::Error> {
        sqlx::query_as::<_, Museum>("SELECT id, name, image, location FROM museums ORDER BY id")
            .fetch_all(&db.pool)
            .await
    }

    pub async fn find(id: i64, db: &Database) -> Result<Option<Museum>, sqlx::Error> {
        sqlx::query_as::<_, Museum>("SELECT id, name, image, location FROM museums WHERE id = $1")
            .bind(id)
            .fetch_optional(&db.pool)
            .await
    }
}
