//! Incoming field validation for both HTML forms and JSON API payloads.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

/// Web registration form: username/email plus password with confirmation.
#[derive(Debug, Deserialize, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1, max = 150, message = "username must be 1-150 characters"))]
    pub username: String,
    #[validate(email(message = "enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password1: String,
    #[validate(must_match(other = "password1", message = "passwords do not match"))]
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Web booking form. The date and ticket fields arrive as raw strings so a
/// blank date or mangled ticket id re-renders the form with an error message
/// instead of being bounced by the form extractor.
#[derive(Debug, Deserialize, Validate)]
pub struct BookingForm {
    #[validate(length(min = 1, max = 100, message = "full name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 15, message = "phone must be 1-15 characters"))]
    pub phone: String,
    pub visit_date: String,
    pub ticket: String,
}

impl BookingForm {
    pub fn visit_date(&self) -> Option<NaiveDate> {
        self.visit_date.parse().ok()
    }

    pub fn ticket_id(&self) -> Option<i64> {
        self.ticket.parse().ok()
    }
}

/// Chatbot registration payload.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterApiRequest {
    #[validate(length(min = 1, max = 150, message = "username must be 1-150 characters"))]
    pub username: String,
    #[validate(email(message = "enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginApiRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenObtainRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRefreshRequest {
    pub refresh: String,
}

/// Optional chatbot booking payload; an absent body means "default ticket".
#[derive(Debug, Default, Deserialize)]
pub struct BookMuseumRequest {
    pub ticket_id: Option<i64>,
}

/// Flatten validator's nested error map into displayable messages.
pub fn error_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: invalid value", field),
            })
        })
        .collect();
    messages.sort();
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_registration_passes() {
        let form = RegistrationForm {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password1: "correct horse".into(),
            password2: "correct horse".into(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn mismatched_passwords_are_rejected() {
        let form = RegistrationForm {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password1: "correct horse".into(),
            password2: "battery staple".into(),
        };
        let errors = form.validate().unwrap_err();
        let messages = error_messages(&errors);
        assert!(messages.iter().any(|m| m.contains("passwords do not match")));
    }

    #[test]
    fn bad_email_is_rejected() {
        let form = RegisterApiRequest {
            username: "bob".into(),
            email: "not-an-email".into(),
            password: "long enough".into(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn overlong_phone_is_rejected() {
        let form = BookingForm {
            name: "Bob".into(),
            email: "bob@example.com".into(),
            phone: "0123456789012345".into(),
            visit_date: "2026-09-01".into(),
            ticket: "1".into(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
    }

    #[test]
    fn booking_form_parses_from_urlencoded() {
        let form: BookingForm = serde_urlencoded::from_str(
            "name=Bob&email=bob%40example.com&phone=555-1234&visit_date=2026-09-01&ticket=2",
        )
        .unwrap();
        assert_eq!(form.visit_date(), NaiveDate::from_ymd_opt(2026, 9, 1));
        assert_eq!(form.ticket_id(), Some(2));
    }

    // A browser submits visit_date= when the date input is left blank; the
    // form must still deserialize so the handler can report the field error
    #[test]
    fn blank_visit_date_deserializes_but_yields_no_date() {
        let form: BookingForm = serde_urlencoded::from_str(
            "name=Bob&email=bob%40example.com&phone=555&visit_date=&ticket=1",
        )
        .unwrap();
        assert!(form.visit_date().is_none());
        assert_eq!(form.ticket_id(), Some(1));
    }

    #[test]
    fn non_numeric_ticket_yields_no_id() {
        let form: BookingForm = serde_urlencoded::from_str(
            "name=Bob&email=bob%40example.com&phone=555&visit_date=2026-09-01&ticket=abc",
        )
        .unwrap();
        assert!(form.ticket_id().is_none());
    }
}
