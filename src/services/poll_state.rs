//! Current poll and ballot for one session.

use tracing::{info, instrument};

use crate::models::ballot::Ballot;
use crate::models::poll::PollSnapshot;
use crate::models::suggestion::SuggestionList;
use crate::services::selector::select_votes;

/// Holds the current snapshot and the ballot computed from it. Last write wins.
#[derive(Debug, Clone)]
pub struct PollState {
    suggestions: SuggestionList,
    snapshot: Option<PollSnapshot>,
    ballot: Ballot,
}

impl PollState {
    pub fn new(suggestions: SuggestionList) -> Self {
        Self {
            suggestions,
            snapshot: None,
            ballot: Ballot::empty(),
        }
    }

    /// Replace the held snapshot and recompute the ballot from scratch.
    #[instrument(skip_all, fields(title = %snapshot.title, options = snapshot.options.len()))]
    pub fn apply_snapshot(&mut self, snapshot: PollSnapshot) -> &PollSnapshot {
        self.ballot = select_votes(&snapshot, &self.suggestions);
        info!(ballot = %self.ballot, votes = self.ballot.len(), "ballot computed");
        self.snapshot.insert(snapshot)
    }

    pub fn snapshot(&self) -> Option<&PollSnapshot> {
        self.snapshot.as_ref()
    }

    /// Ballot for the current snapshot; empty before any poll arrives.
    pub fn ballot(&self) -> &Ballot {
        &self.ballot
    }
}
