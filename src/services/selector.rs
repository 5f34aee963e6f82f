//! Vote selection: match suggestions against poll options by substring.

use tracing::debug;

use crate::models::ballot::Ballot;
use crate::models::poll::PollSnapshot;
use crate::models::suggestion::{normalize, SuggestionList};

/// Compute the ballot for `snapshot`.
///
/// Suggestions are walked in list order and, for each, every option in
/// snapshot order; each option whose normalized text contains the suggestion
/// contributes its label. An option matched by several suggestions appears
/// once per match.
pub fn select_votes(snapshot: &PollSnapshot, suggestions: &SuggestionList) -> Ballot {
    let texts: Vec<String> = snapshot.options.iter().map(|o| normalize(&o.text)).collect();
    let mut labels = Vec::new();
    for suggestion in suggestions.iter() {
        for (option, text) in snapshot.options.iter().zip(&texts) {
            if text.contains(suggestion) {
                debug!(
                    suggestion = %suggestion,
                    label = option.label.code(),
                    text = %option.text,
                    "suggestion matched"
                );
                labels.push(option.label);
            }
        }
    }
    Ballot::new(labels)
}
