//! Per-orchestrator navigation history

use chrono::{DateTime, Utc};
use genonav_protocol::GenomicLocation;

/// One successful navigation
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationEntry {
    pub location: GenomicLocation,
    pub timestamp: DateTime<Utc>,
}

/// Append-only log of successful navigations, oldest first
#[derive(Debug, Clone, Default)]
pub struct NavigationHistory {
    entries: Vec<NavigationEntry>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, location: GenomicLocation, timestamp: DateTime<Utc>) {
        self.entries.push(NavigationEntry {
            location,
            timestamp,
        });
    }

    /// The most recent `limit` entries, newest last
    pub fn recent(&self, limit: usize) -> &[NavigationEntry] {
        let skip = self.entries.len().saturating_sub(limit);
        &self.entries[skip..]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
