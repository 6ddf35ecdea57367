//! Client-side validation of the user and attendance forms.

use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use regex::Regex;
use thiserror::Error;

use crate::types::{AttendanceStatus, EntityId, NewAttendance, NewUser};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Format produced by a `datetime-local` style input.
const LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Name is required.")]
    NameRequired,
    #[error("Enter a valid email address.")]
    InvalidEmail,
    #[error("Please select a user.")]
    UserRequired,
    #[error("Timestamp is required.")]
    TimestampRequired,
    #[error("Timestamp is not a valid date and time.")]
    InvalidTimestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
}

impl UserForm {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    pub fn validate(&self) -> Result<NewUser, Vec<FormError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FormError::NameRequired);
        }
        if !EMAIL_RE.is_match(&self.email) {
            errors.push(FormError::InvalidEmail);
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NewUser {
            name: self.name.clone(),
            email: self.email.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceForm {
    pub user_id: Option<EntityId>,
    pub status: AttendanceStatus,
    /// RFC 3339, or local time as `YYYY-MM-DDTHH:MM`.
    pub timestamp: String,
    pub notes: String,
}

impl Default for AttendanceForm {
    fn default() -> Self {
        Self {
            user_id: None,
            status: AttendanceStatus::Present,
            timestamp: Local::now().format(LOCAL_INPUT_FORMAT).to_string(),
            notes: String::new(),
        }
    }
}

/// Convert a form timestamp to a UTC ISO-8601 string.
pub fn to_utc_iso(input: &str) -> Result<String, FormError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FormError::TimestampRequired);
    }
    let utc: DateTime<Utc> = match DateTime::parse_from_rfc3339(input) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => {
            let naive = NaiveDateTime::parse_from_str(input, LOCAL_INPUT_FORMAT)
                .map_err(|_| FormError::InvalidTimestamp)?;
            Local
                .from_local_datetime(&naive)
                .earliest()
                .ok_or(FormError::InvalidTimestamp)?
                .with_timezone(&Utc)
        }
    };
    Ok(utc.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl AttendanceForm {
    pub fn validate(&self) -> Result<NewAttendance, Vec<FormError>> {
        let mut errors = Vec::new();
        if self.user_id.is_none() {
            errors.push(FormError::UserRequired);
        }
        let timestamp = to_utc_iso(&self.timestamp).map_err(|e| errors.push(e)).ok();

        match (self.user_id.clone(), timestamp) {
            (Some(user_id), Some(timestamp)) if errors.is_empty() => Ok(NewAttendance {
                user_id,
                status: Some(self.status.as_str().to_string()),
                date: None,
                timestamp: Some(timestamp),
                notes: Some(self.notes.clone()),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_user_form() {
        let user = UserForm::new("Ada Lovelace", "ada@example.com").validate().unwrap();
        assert_eq!(user.name, "Ada Lovelace");
    }

    #[test]
    fn blank_name_and_bad_email_both_reported() {
        let errors = UserForm::new("   ", "not-an-email").validate().unwrap_err();
        assert_eq!(errors, vec![FormError::NameRequired, FormError::InvalidEmail]);
    }

    #[test]
    fn email_needs_a_dot_in_domain() {
        assert!(UserForm::new("A", "a@localhost").validate().is_err());
        assert!(UserForm::new("A", "a b@x.io").validate().is_err());
    }

    #[test]
    fn attendance_form_requires_user_and_timestamp() {
        let form = AttendanceForm {
            user_id: None,
            timestamp: String::new(),
            ..AttendanceForm::default()
        };
        assert_eq!(
            form.validate().unwrap_err(),
            vec![FormError::UserRequired, FormError::TimestampRequired]
        );
    }

    #[test]
    fn rfc3339_timestamp_is_normalized_to_utc() {
        let form = AttendanceForm {
            user_id: Some(EntityId::Number(1)),
            status: AttendanceStatus::Late,
            timestamp: "2024-01-05T12:30:00+02:00".into(),
            notes: String::new(),
        };
        let input = form.validate().unwrap();
        assert_eq!(input.timestamp.as_deref(), Some("2024-01-05T10:30:00.000Z"));
        assert_eq!(input.status.as_deref(), Some("late"));
    }

    #[test]
    fn local_input_format_is_accepted() {
        let iso = to_utc_iso("2024-06-01T09:00").unwrap();
        assert!(DateTime::parse_from_rfc3339(&iso).is_ok());
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        assert_eq!(to_utc_iso("yesterday"), Err(FormError::InvalidTimestamp));
    }

    #[test]
    fn default_form_has_a_valid_timestamp() {
        let form = AttendanceForm {
            user_id: Some(EntityId::Number(1)),
            ..AttendanceForm::default()
        };
        assert!(form.validate().is_ok());
    }
}
