//! Read-time expansion of stored event rows into their client-facing
//! view, including member resolution.

use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tokio_rusqlite::Connection;

use super::db::{self, EventRow, ProfileRow};
use super::public::{EventKind, EventMember, EventView};
use crate::access;

/// Parse a stored or submitted date. Accepts the canonical `YYYY-MM-DD`
/// form or a full RFC 3339 timestamp truncated to its date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

/// Canonical date string plus day-of-month. An unparseable stored value
/// falls back to `today`; writes validate their dates, so this only
/// triggers for rows that predate validation.
fn normalize_date(raw: &str, today: NaiveDate) -> (String, u32) {
    let date = parse_date(raw).unwrap_or(today);
    (date.format("%Y-%m-%d").to_string(), date.day())
}

fn display_name(full_name: Option<String>, fallback: &str) -> String {
    match full_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => fallback.to_string(),
    }
}

/// The owner always appears in the member list, even without a synced
/// profile row.
fn owner_entry(owner_id: &str, profile: Option<ProfileRow>) -> EventMember {
    match profile {
        Some(profile) => EventMember {
            id: profile.id,
            name: display_name(profile.full_name, "Owner"),
            avatar: profile.avatar_url,
        },
        None => EventMember {
            id: owner_id.to_string(),
            name: "Owner".to_string(),
            avatar: None,
        },
    }
}

/// Owner first, then the calendar members in store order, without
/// duplicate ids.
fn assemble_members(
    kind: EventKind,
    owner: EventMember,
    members: Vec<EventMember>,
) -> Vec<EventMember> {
    match kind {
        EventKind::Single => vec![owner],
        EventKind::Collaborative => {
            let mut seen = HashSet::new();
            let mut out = Vec::with_capacity(members.len() + 1);
            seen.insert(owner.id.clone());
            out.push(owner);
            for member in members {
                if seen.insert(member.id.clone()) {
                    out.push(member);
                }
            }
            out
        }
    }
}

/// Expand a stored event into its client-facing view. Collaborative
/// events list every accepted member of the calendar with the calendar
/// owner first; single events are attributed to the event owner alone.
pub async fn materialize(db: &Connection, row: EventRow) -> Result<EventView> {
    let (date, day) = normalize_date(&row.date, Utc::now().date_naive());

    let (owner_id, members) = match row.kind {
        EventKind::Collaborative => {
            let owner_id = access::db::calendar_owner(db, &row.calendar_id)
                .await?
                .unwrap_or_else(|| row.owner_id.clone());
            let members = db::accepted_member_profiles(db, &row.calendar_id)
                .await?
                .into_iter()
                .map(|profile| EventMember {
                    id: profile.id,
                    name: display_name(profile.full_name, "Member"),
                    avatar: profile.avatar_url,
                })
                .collect();
            (owner_id, members)
        }
        EventKind::Single => (row.owner_id.clone(), vec![]),
    };
    let owner = owner_entry(&owner_id, db::profile_by_id(db, &owner_id).await?);
    let members = assemble_members(row.kind, owner, members);

    Ok(EventView {
        id: row.id,
        calendar_id: row.calendar_id,
        owner_id: row.owner_id,
        title: row.title,
        status: row.status,
        date,
        day,
        time: row.time,
        kind: row.kind,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, name: &str) -> EventMember {
        EventMember {
            id: id.to_string(),
            name: name.to_string(),
            avatar: None,
        }
    }

    #[test]
    fn it_normalizes_dates_and_derives_day() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(
            normalize_date("2024-03-09", today),
            ("2024-03-09".to_string(), 9)
        );
        assert_eq!(
            normalize_date("2024-03-09T14:30:00+02:00", today),
            ("2024-03-09".to_string(), 9)
        );
    }

    #[test]
    fn it_falls_back_to_today_for_unparseable_dates() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(
            normalize_date("not-a-date", today),
            ("2024-06-01".to_string(), 1)
        );
        assert_eq!(normalize_date("", today), ("2024-06-01".to_string(), 1));
    }

    #[test]
    fn it_puts_the_owner_first_without_duplicates() {
        let members = assemble_members(
            EventKind::Collaborative,
            member("a", "Alice"),
            vec![member("b", "Bob"), member("a", "Alice"), member("c", "Cem")],
        );
        let ids: Vec<&str> = members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn it_reduces_single_events_to_the_owner() {
        let members = assemble_members(
            EventKind::Single,
            member("a", "Alice"),
            vec![member("b", "Bob")],
        );
        assert_eq!(members, vec![member("a", "Alice")]);
    }

    #[test]
    fn it_falls_back_to_placeholder_display_names() {
        assert_eq!(display_name(None, "Owner"), "Owner");
        assert_eq!(display_name(Some("  ".to_string()), "Member"), "Member");
        assert_eq!(display_name(Some("Ayşe".to_string()), "Member"), "Ayşe");
    }
}
