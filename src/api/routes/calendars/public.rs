//! Public types for the calendars API
use serde::{Deserialize, Serialize};

use crate::access::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarSummary {
    pub id: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct CalendarList {
    pub calendars: Vec<CalendarSummary>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub calendar: CalendarSummary,
}

#[derive(Debug, Deserialize)]
pub struct CreateCalendarRequest {
    pub name: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameCalendarRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: Option<String>,
    pub role: Option<String>,
}
