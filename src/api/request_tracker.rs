use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Charts that are rebuilt together from one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestGroup {
    Fill,
    /// Value and derivative charts share one range response.
    TimeSeries,
}

/// Generation stamp handed out when a load starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestTicket {
    pub group: RequestGroup,
    pub generation: u64,
}

/// Tags every load with a per-group generation so a response that arrives
/// after a newer request was issued can be recognized and dropped.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: IndexMap<RequestGroup, u64>,
}

impl RequestTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request for `group`, superseding every earlier ticket.
    pub fn issue(&mut self, group: RequestGroup) -> RequestTicket {
        let generation = self.latest.entry(group).or_insert(0);
        *generation += 1;
        RequestTicket {
            group,
            generation: *generation,
        }
    }

    #[must_use]
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.get(&ticket.group) == Some(&ticket.generation)
    }

    /// Like [`Self::is_current`], logging the drop of a superseded ticket.
    pub fn accept(&self, ticket: RequestTicket) -> bool {
        let current = self.is_current(ticket);
        if !current {
            debug!(
                group = ?ticket.group,
                generation = ticket.generation,
                latest = self.latest.get(&ticket.group).copied().unwrap_or(0),
                "stale response dropped"
            );
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestGroup, RequestTracker};

    #[test]
    fn newer_ticket_supersedes_older() {
        let mut tracker = RequestTracker::new();
        let first = tracker.issue(RequestGroup::TimeSeries);
        let second = tracker.issue(RequestGroup::TimeSeries);
        assert!(!tracker.accept(first));
        assert!(tracker.accept(second));
    }

    #[test]
    fn groups_are_independent() {
        let mut tracker = RequestTracker::new();
        let fill = tracker.issue(RequestGroup::Fill);
        let _ = tracker.issue(RequestGroup::TimeSeries);
        assert!(tracker.is_current(fill));
    }
}
