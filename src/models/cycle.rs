//! Cycle records
//!
//! The cycle-tracking collaborator owns these rows; this crate sees them as
//! event payload snapshots. Identifiers are correlation keys, not foreign
//! keys into this crate's stores.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A tracked menstrual cycle as published on the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// Identifier assigned by the cycle-tracking collaborator
    pub id: i64,

    /// Owning user, opaque correlation key
    pub user_id: i64,

    /// First day of the period
    pub start_date: NaiveDate,

    /// Last day of the period, absent while the period is ongoing
    pub end_date: Option<NaiveDate>,

    /// Days from this start to the next cycle's start, derived downstream
    pub cycle_length: Option<i32>,

    /// Inclusive day span of the period, derived downstream
    pub period_length: Option<i32>,

    /// Free-form user notes
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Symptoms logged against this cycle. Absent on the wire means none.
    #[serde(default)]
    pub symptoms: Vec<SymptomRecord>,
}

impl CycleRecord {
    /// Create a record with the minimal required fields
    pub fn new(id: i64, user_id: i64, start_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            start_date,
            end_date: None,
            cycle_length: None,
            period_length: None,
            notes: None,
            created_at: now,
            updated_at: now,
            symptoms: Vec::new(),
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A symptom logged against a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomRecord {
    pub id: i64,

    /// Cycle this symptom belongs to, correlation key
    pub cycle_id: i64,

    /// Day the symptom was observed
    pub date: NaiveDate,

    /// Free-form symptom label, e.g. "cramps" or "headache"
    pub symptom_type: String,

    /// Severity on a 1..=5 scale when the user rated it
    pub severity: Option<i32>,

    pub notes: Option<String>,
}
