use serde::Serialize;
use sqlx::FromRow;

use crate::database::Database;

/// Booking-contact profile, at most one per user account.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Visitor {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Visitor {
    pub async fn for_user(user_id: i64, db: &Database) -> Result<Option<Visitor>, sqlx::Error> {
        sqlx::query_as::<_, Visitor>(
            "SELECT id, user_id, name, email, phone FROM visitors WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&db.pool)
        .await
    }

    /// Get the user's visitor profile, creating it with the supplied contact
    /// details when it does not exist yet. The unique index on `user_id`
    /// makes this safe against two concurrent first bookings; an existing
    /// profile keeps its original details.
    pub async fn get_or_create(
        user_id: i64,
        name: &str,
        email: &str,
        phone: &str,
        db: &Database,
    ) -> Result<Visitor, sqlx::Error> {
        sqlx::query_as::<_, Visitor>(
            "INSERT INTO visitors (user_id, name, email, phone)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id) DO UPDATE SET name = visitors.name
             RETURNING id, user_id, name, email, phone",
        )
        .bind(user_id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .fetch_one(&db.pool)
        .await
    }
}
