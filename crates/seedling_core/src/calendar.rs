//! Calendar events shared between the user and the companion.

use crate::error::SessionError;
use crate::fresh_id;
use crate::session::Session;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// ISO calendar date, `YYYY-MM-DD`.
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_completed: bool,
}

impl CalendarEvent {
    pub fn new(title: &str, date: &str, description: Option<&str>) -> Result<Self, SessionError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SessionError::EmptyName("an event title"));
        }
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| SessionError::InvalidDate(date.to_string()))?;
        Ok(Self {
            id: fresh_id(),
            title: title.to_string(),
            date,
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            is_completed: false,
        })
    }
}

impl Session {
    pub fn add_event(&mut self, event: CalendarEvent) {
        self.calendar.push(event);
    }

    /// Flip completion; returns the new state.
    pub fn toggle_event(&mut self, id: &str) -> Result<bool, SessionError> {
        let event = self
            .calendar
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| SessionError::UnknownEvent(id.to_string()))?;
        event.is_completed = !event.is_completed;
        Ok(event.is_completed)
    }

    pub fn delete_event(&mut self, id: &str) -> Result<CalendarEvent, SessionError> {
        let pos = self
            .calendar
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| SessionError::UnknownEvent(id.to_string()))?;
        Ok(self.calendar.remove(pos))
    }
}
