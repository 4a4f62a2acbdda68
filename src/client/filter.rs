//! Listing filters.
//!
//! Status filter, case-insensitive search over email and IP, newest first.
//! Timestamps are compared as instants, so offsets and fractional seconds
//! order correctly; unparseable timestamps sort last.

use std::cmp::Reverse;

use chrono::{DateTime, FixedOffset};

use crate::client::types::{RegistrationRequest, User, UserStatus};

fn created_at(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).ok()
}

fn matches_query(query: &str, email: &str, ip: &str) -> bool {
    query.is_empty()
        || email.to_lowercase().contains(query)
        || ip.to_lowercase().contains(query)
}

/// Filter and sort registration requests. `status` compares case-insensitively.
pub fn filter_requests(
    items: &[RegistrationRequest],
    status: Option<&str>,
    query: &str,
) -> Vec<RegistrationRequest> {
    let query = query.trim().to_lowercase();
    let mut out: Vec<RegistrationRequest> = items
        .iter()
        .filter(|r| status.map_or(true, |s| r.status.eq_ignore_ascii_case(s)))
        .filter(|r| matches_query(&query, r.email(), r.ip()))
        .cloned()
        .collect();
    out.sort_by_cached_key(|item| Reverse(created_at(&item.created_at)));
    out
}

/// Filter and sort users.
pub fn filter_users(items: &[User], status: Option<UserStatus>, query: &str) -> Vec<User> {
    let query = query.trim().to_lowercase();
    let mut out: Vec<User> = items
        .iter()
        .filter(|u| status.map_or(true, |s| u.status == s))
        .filter(|u| matches_query(&query, &u.email, u.ip()))
        .cloned()
        .collect();
    out.sort_by_cached_key(|item| Reverse(created_at(&item.created_at)));
    out
}
