use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;

use crate::database::Database;
use crate::models::ticket::ticket_label;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: i64,
    pub visitor_id: i64,
    pub ticket_id: i64,
    pub museum_id: i64,
    pub visit_date: NaiveDate,
    pub booking_date: NaiveDateTime,
}

/// A booking joined with its museum and ticket, as the listing and cancel
/// flows need it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingSummary {
    pub booking_id: i64,
    pub museum_name: String,
    pub museum_location: String,
    pub visit_date: NaiveDate,
    pub ticket_id: i64,
    pub ticket_price: f64,
    pub booking_date: NaiveDateTime,
}

impl BookingSummary {
    pub fn ticket_type(&self) -> String {
        ticket_label(self.ticket_id, self.ticket_price)
    }
}

impl Booking {
    pub async fn create(
        visitor_id: i64,
        ticket_id: i64,
        museum_id: i64,
        visit_date: NaiveDate,
        db: &Database,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (visitor_id, ticket_id, museum_id, visit_date)
             VALUES ($1, $2, $3, $4)
             RETURNING id, visitor_id, ticket_id, museum_id, visit_date, booking_date",
        )
        .bind(visitor_id)
        .bind(ticket_id)
        .bind(museum_id)
        .bind(visit_date)
        .fetch_one(&db.pool)
        .await
    }

    /// Guarded insert for the chatbot path: creates the booking only if the
    /// user holds no booking for this museum yet, in a single statement so
    /// two concurrent requests cannot both succeed. Returns the new id, or
    /// None when a booking already existed.
    pub async fn create_unless_existing(
        user_id: i64,
        visitor_id: i64,
        ticket_id: i64,
        museum_id: i64,
        visit_date: NaiveDate,
        db: &Database,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO bookings (visitor_id, ticket_id, museum_id, visit_date)
             SELECT $1, $2, $3, $4
             WHERE NOT EXISTS (
                 SELECT 1 FROM bookings b
                 JOIN visitors v ON v.id = b.visitor_id
                 WHERE v.user_id = $5 AND b.museum_id = $3
             )
             RETURNING id",
        )
        .bind(visitor_id)
        .bind(ticket_id)
        .bind(museum_id)
        .bind(visit_date)
        .bind(user_id)
        .fetch_optional(&db.pool)
        .await
    }

    pub async fn existing_for_museum(
        user_id: i64,
        museum_id: i64,
        db: &Database,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT b.id FROM bookings b
             JOIN visitors v ON v.id = b.visitor_id
             WHERE v.user_id = $1 AND b.museum_id = $2
             ORDER BY b.id
             LIMIT 1",
        )
        .bind(user_id)
        .bind(museum_id)
        .fetch_optional(&db.pool)
        .await
    }

    /// All of a user's bookings, in the model's default (visit_date,
    /// booking_date) order.
    pub async fn for_user(user_id: i64, db: &Database) -> Result<Vec<BookingSummary>, sqlx::Error> {
        sqlx::query_as::<_, BookingSummary>(
            "SELECT b.id AS booking_id,
                    m.name AS museum_name,
                    m.location AS museum_location,
                    b.visit_date,
                    t.id AS ticket_id,
                    t.price AS ticket_price,
                    b.booking_date
             FROM bookings b
             JOIN visitors v ON v.id = b.visitor_id
             JOIN museums m ON m.id = b.museum_id
             JOIN tickets t ON t.id = b.ticket_id
             WHERE v.user_id = $1
             ORDER BY b.visit_date, b.booking_date",
        )
        .bind(user_id)
        .fetch_all(&db.pool)
        .await
    }

    /// Fetch a booking only when it belongs to the given user. Ownership
    /// mismatches are indistinguishable from missing rows on purpose.
    pub async fn find_owned(
        booking_id: i64,
        user_id: i64,
        db: &Database,
    ) -> Result<Option<BookingSummary>, sqlx::Error> {
        sqlx::query_as::<_, BookingSummary>(
            "SELECT b.id AS booking_id,
                    m.name AS museum_name,
                    m.location AS museum_location,
                    b.visit_date,
                    t.id AS ticket_id,
                    t.price AS ticket_price,
                    b.booking_date
             FROM bookings b
             JOIN visitors v ON v.id = b.visitor_id
             JOIN museums m ON m.id = b.museum_id
             JOIN tickets t ON t.id = b.ticket_id
             WHERE b.id = $1 AND v.user_id = $2",
        )
        .bind(booking_id)
        .bind(user_id)
        .fetch_optional(&db.pool)
        .await
    }

    pub async fn delete(booking_id: i64, db: &Database) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id)
            .execute(&db.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_ticket_type_uses_display_label() {
        let summary = BookingSummary {
            booking_id: 1,
            museum_name: "Louvre".into(),
            museum_location: "Paris".into(),
            visit_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            ticket_id: 4,
            ticket_price: 25.0,
            booking_date: NaiveDate::from_ymd_opt(2026, 8, 30)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        };
        assert_eq!(summary.ticket_type(), "Ticket 4 - 25.00");
    }
}
