use chrono::{DateTime, Utc};
use serde::Serialize;

/// Fixed-width instant format: lexical order equals chronological order.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseValue {
    Absent,
    Accepted,
    Declined,
    Tentative,
    AttendedInPerson,
    AttendedViaConference,
}

impl ResponseValue {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ResponseValue::Absent => "absent",
            ResponseValue::Accepted => "accepted",
            ResponseValue::Declined => "declined",
            ResponseValue::Tentative => "tentative",
            ResponseValue::AttendedInPerson => "attended_in_person",
            ResponseValue::AttendedViaConference => "attended_via_conference",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "absent" => Some(ResponseValue::Absent),
            "accepted" => Some(ResponseValue::Accepted),
            "declined" => Some(ResponseValue::Declined),
            "tentative" => Some(ResponseValue::Tentative),
            "attended_in_person" => Some(ResponseValue::AttendedInPerson),
            "attended_via_conference" => Some(ResponseValue::AttendedViaConference),
            _ => None,
        }
    }

    /// Helper: accepts the RSVP button texts as well ("Accept", "Decline", ...)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "accept" | "yes" => Some(ResponseValue::Accepted),
            "decline" | "no" => Some(ResponseValue::Declined),
            "maybe" => Some(ResponseValue::Tentative),
            "in_person" | "in-person" => Some(ResponseValue::AttendedInPerson),
            "conference" | "remote" => Some(ResponseValue::AttendedViaConference),
            other => ResponseValue::from_db_str(other),
        }
    }
}

/// Whether a response targets the whole series or one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "occurrence_id")]
pub enum ResponseScope {
    Series,
    Occurrence(i64),
}

impl ResponseScope {
    pub fn occurrence_id(&self) -> Option<i64> {
        match self {
            ResponseScope::Series => None,
            ResponseScope::Occurrence(id) => Some(*id),
        }
    }

    pub fn from_column(occurrence_id: Option<i64>) -> Self {
        occurrence_id.map_or(ResponseScope::Series, ResponseScope::Occurrence)
    }
}

/// Immutable row of the response log.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResponseEntry {
    pub id: i64,
    pub series_id: i64,
    pub scope: ResponseScope, // ⇔ responses.occurrence_id (NULL = series-wide)
    pub subject_id: String,
    pub value: ResponseValue,
    pub note: String,
    pub created_at: String, // ⇔ responses.created_at (CREATED_AT_FORMAT)
}

/// A response about to be appended.
#[derive(Debug, Clone)]
pub struct NewResponse {
    pub series_id: i64,
    pub scope: ResponseScope,
    pub subject_id: String,
    pub value: ResponseValue,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl NewResponse {
    /// Build a response stamped with the current instant.
    pub fn new(
        series_id: i64,
        scope: ResponseScope,
        subject_id: impl Into<String>,
        value: ResponseValue,
    ) -> Self {
        Self {
            series_id,
            scope,
            subject_id: subject_id.into(),
            value,
            note: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn created_at_str(&self) -> String {
        self.created_at.format(CREATED_AT_FORMAT).to_string()
    }
}
