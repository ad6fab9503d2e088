//! One-shot messages carried across a redirect
//!
//! The message text stays on the server; the client only holds a random id in
//! the `flash` cookie. Taking a message removes it.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub const COOKIE_NAME: &str = "flash";

const MAX_AGE_MINUTES: i64 = 10;

#[derive(Debug)]
struct Entry {
    created: DateTime<Utc>,
    message: String,
}

#[derive(Debug, Clone, Default)]
pub struct FlashStore {
    entries: Arc<Mutex<HashMap<Uuid, Entry>>>,
}

impl FlashStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a message and return the id to hand to the client.
    pub fn push(&self, message: impl Into<String>) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();

        let mut entries = self.entries.lock();
        // messages nobody came back for
        entries.retain(|_, e| now - e.created < Duration::minutes(MAX_AGE_MINUTES));
        entries.insert(
            id,
            Entry {
                created: now,
                message: message.into(),
            },
        );
        id
    }

    /// Remove and return a message, unless it has already expired.
    pub fn take(&self, id: &Uuid) -> Option<String> {
        let entry = self.entries.lock().remove(id)?;
        if Utc::now() - entry.created < Duration::minutes(MAX_AGE_MINUTES) {
            Some(entry.message)
        } else {
            None
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Find the flash id in the request's `Cookie` headers.
pub fn cookie_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn set_cookie(id: &Uuid) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        COOKIE_NAME,
        id.simple(),
        MAX_AGE_MINUTES * 60
    )
}

pub fn clear_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", COOKIE_NAME)
}
