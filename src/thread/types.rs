use std::collections::BTreeSet;

use serde::Serialize;

/// Sort position for messages whose Date header was missing or unparseable.
/// They sink to the chronological start of their thread.
pub const TIMESTAMP_FALLBACK: i64 = 0;

/// A single ingested message, immutable once built.
///
/// `content_path` is an opaque handle to the already-rendered message page
/// (relative to the archive root); the threading engine never looks inside it.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Resolved identifier, unique within a run (see `identity`)
    pub id: String,
    pub subject: String,
    pub sender: String,
    /// Raw Date header value, kept for display
    pub date: String,
    /// Unix timestamp parsed from the Date header, or `TIMESTAMP_FALLBACK`
    pub timestamp: i64,
    pub folder: String,
    /// Referenced ancestor identifiers, oldest first (see `refs`)
    #[serde(skip)]
    pub references: Vec<String>,
    /// Fixed-length Thread-Index conversation prefix, when present
    #[serde(skip)]
    pub conversation_key: Option<String>,
    pub content_path: String,
}

/// One flattened conversation: the real messages reachable from a forest
/// root, in chronological order.
#[derive(Debug, Clone, Serialize)]
pub struct Thread {
    pub messages: Vec<Message>,
    /// Union of member folder labels
    pub folders: BTreeSet<String>,
}

impl Thread {
    /// Chronologically latest member; threads are never built empty
    pub fn representative(&self) -> &Message {
        self.messages
            .last()
            .expect("threads always contain at least one message")
    }

    /// Ranking key: timestamp of the most recent member
    pub fn sort_key(&self) -> i64 {
        self.representative().timestamp
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
