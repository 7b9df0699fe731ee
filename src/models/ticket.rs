use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::database::Database;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: i64,
    pub price: f64,
    pub issue_date: NaiveDateTime,
}

impl Ticket {
    /// Display label used as `ticket_type` in API payloads and templates.
    pub fn label(&self) -> String {
        ticket_label(self.id, self.price)
    }

    pub async fn all(db: &Database) -> Result<Vec<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>("SELECT id, price, issue_date FROM tickets ORDER BY id")
            .fetch_all(&db.pool)
            .await
    }

    pub async fn find(id: i64, db: &Database) -> Result<Option<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>("SELECT id, price, issue_date FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&db.pool)
            .await
    }

    /// Default ticket for chatbot bookings when the request names none:
    /// the lowest-id row in the table.
    pub async fn first_available(db: &Database) -> Result<Option<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(
            "SELECT id, price, issue_date FROM tickets ORDER BY id LIMIT 1",
        )
        .fetch_optional(&db.pool)
        .await
    }
}

pub fn ticket_label(id: i64, price: f64) -> String {
    format!("Ticket {} - {:.2}", id, price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_includes_id_and_two_decimal_price() {
        assert_eq!(ticket_label(3, 12.5), "Ticket 3 - 12.50");
        assert_eq!(ticket_label(1, 0.0), "Ticket 1 - 0.00");
    }
}
