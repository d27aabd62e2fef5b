//! Review-state bookkeeping and the PR status classifier.

use crate::gh::types::Review;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Latest review state recorded for one reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Pending,
}

impl ReviewState {
    /// Parse the state string `gh` reports. Anything unknown (DISMISSED,
    /// empty, future states) is treated as pending.
    pub fn parse(raw: &str) -> ReviewState {
        match raw {
            "APPROVED" => ReviewState::Approved,
            "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
            "COMMENTED" => ReviewState::Commented,
            _ => ReviewState::Pending,
        }
    }

    /// Emoji shown next to the reviewer login in report cells.
    pub fn emoji(self) -> &'static str {
        match self {
            ReviewState::Approved => "\u{2705}",
            ReviewState::ChangesRequested => "\u{274c}",
            ReviewState::Commented => "\u{1f4ac}",
            ReviewState::Pending => "\u{23f3}",
        }
    }
}

/// Overall status of a PR, derived from reviewer states and the draft flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrStatus {
    Draft,
    Approved,
    ChangesRequested,
    InReview,
    Unreviewed,
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrStatus::Draft => write!(f, "Draft"),
            PrStatus::Approved => write!(f, "Approved"),
            PrStatus::ChangesRequested => write!(f, "Changes Requested"),
            PrStatus::InReview => write!(f, "In Review"),
            PrStatus::Unreviewed => write!(f, "Unreviewed"),
        }
    }
}

/// Resolve each reviewer's latest state from the review history.
///
/// Reviewers with an outstanding review request start at (and stay) Pending:
/// a re-request invalidates their earlier verdict. Reviews are applied in
/// submittedAt order so the newest state per author wins.
pub fn latest_states(reviews: &[Review], requested: &[String]) -> BTreeMap<String, ReviewState> {
    let mut states: BTreeMap<String, ReviewState> = requested
        .iter()
        .filter(|login| !login.is_empty())
        .map(|login| (login.clone(), ReviewState::Pending))
        .collect();

    let mut ordered: Vec<&Review> = reviews.iter().collect();
    ordered.sort_by_key(|r| r.submitted_at);

    for review in ordered {
        let Some(login) = review.author.as_ref().map(|a| a.login.as_str()) else {
            continue;
        };
        if login.is_empty() || requested.iter().any(|r| r == login) {
            continue;
        }
        states.insert(login.to_string(), ReviewState::parse(&review.state));
    }
    states
}

/// Classify a PR from its reviewer states.
///
/// Precedence: draft short-circuits everything; any changes-requested beats
/// approval; approval needs either every required reviewer approved or every
/// known reviewer approved; any remaining state means the PR is in review;
/// an empty state map means it is unreviewed.
pub fn classify(
    states: &BTreeMap<String, ReviewState>,
    is_draft: bool,
    required: Option<&HashSet<String>>,
) -> PrStatus {
    if is_draft {
        return PrStatus::Draft;
    }
    if states
        .values()
        .any(|s| *s == ReviewState::ChangesRequested)
    {
        return PrStatus::ChangesRequested;
    }

    let required_approved = required.is_some_and(|req| {
        !req.is_empty()
            && req
                .iter()
                .all(|login| states.get(login) == Some(&ReviewState::Approved))
    });
    let all_approved =
        !states.is_empty() && states.values().all(|s| *s == ReviewState::Approved);
    if required_approved || all_approved {
        return PrStatus::Approved;
    }

    if !states.is_empty() {
        return PrStatus::InReview;
    }
    PrStatus::Unreviewed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gh::types::Actor;
    use chrono::{TimeZone, Utc};

    const ALL_STATES: [ReviewState; 4] = [
        ReviewState::Approved,
        ReviewState::ChangesRequested,
        ReviewState::Commented,
        ReviewState::Pending,
    ];

    fn states(pairs: &[(&str, ReviewState)]) -> BTreeMap<String, ReviewState> {
        pairs
            .iter()
            .map(|(login, state)| (login.to_string(), *state))
            .collect()
    }

    fn review(login: &str, state: &str, minute: u32) -> Review {
        Review {
            author: Some(Actor {
                login: login.to_string(),
            }),
            state: state.to_string(),
            submitted_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()),
        }
    }

    #[test]
    fn test_draft_short_circuits_everything() {
        for state in ALL_STATES {
            let map = states(&[("alice", state)]);
            assert_eq!(classify(&map, true, None), PrStatus::Draft);
        }
        assert_eq!(classify(&BTreeMap::new(), true, None), PrStatus::Draft);
    }

    #[test]
    fn test_changes_requested_beats_approval() {
        let map = states(&[
            ("alice", ReviewState::Approved),
            ("bob", ReviewState::ChangesRequested),
        ]);
        assert_eq!(classify(&map, false, None), PrStatus::ChangesRequested);
    }

    #[test]
    fn test_all_reviewers_approved() {
        let map = states(&[
            ("alice", ReviewState::Approved),
            ("bob", ReviewState::Approved),
        ]);
        assert_eq!(classify(&map, false, None), PrStatus::Approved);
    }

    #[test]
    fn test_partial_approval_is_in_review() {
        let map = states(&[
            ("alice", ReviewState::Approved),
            ("bob", ReviewState::Pending),
        ]);
        assert_eq!(classify(&map, false, None), PrStatus::InReview);
    }

    #[test]
    fn test_required_reviewers_approved_wins_over_stragglers() {
        let map = states(&[
            ("alice", ReviewState::Approved),
            ("bob", ReviewState::Pending),
        ]);
        let required: HashSet<String> = ["alice".to_string()].into();
        assert_eq!(classify(&map, false, Some(&required)), PrStatus::Approved);
    }

    #[test]
    fn test_required_reviewer_missing_from_states() {
        let map = states(&[("alice", ReviewState::Approved)]);
        let required: HashSet<String> = ["carol".to_string()].into();
        // carol never reviewed, but every known reviewer approved
        assert_eq!(classify(&map, false, Some(&required)), PrStatus::Approved);
    }

    #[test]
    fn test_required_reviewer_not_approved_and_others_pending() {
        let map = states(&[
            ("alice", ReviewState::Commented),
            ("carol", ReviewState::Pending),
        ]);
        let required: HashSet<String> = ["carol".to_string()].into();
        assert_eq!(classify(&map, false, Some(&required)), PrStatus::InReview);
    }

    #[test]
    fn test_empty_required_set_is_ignored() {
        let map = states(&[("alice", ReviewState::Pending)]);
        let required = HashSet::new();
        assert_eq!(classify(&map, false, Some(&required)), PrStatus::InReview);
    }

    #[test]
    fn test_no_states_is_unreviewed() {
        assert_eq!(classify(&BTreeMap::new(), false, None), PrStatus::Unreviewed);
    }

    /// Walk every two-reviewer state combination and check the expected
    /// label by the precedence rules.
    #[test]
    fn test_classifier_exhaustive_two_reviewers() {
        for a in ALL_STATES {
            for b in ALL_STATES {
                let map = states(&[("alice", a), ("bob", b)]);
                let got = classify(&map, false, None);
                let expected = if a == ReviewState::ChangesRequested
                    || b == ReviewState::ChangesRequested
                {
                    PrStatus::ChangesRequested
                } else if a == ReviewState::Approved && b == ReviewState::Approved {
                    PrStatus::Approved
                } else {
                    PrStatus::InReview
                };
                assert_eq!(got, expected, "states: {a:?}/{b:?}");
            }
        }
    }

    #[test]
    fn test_classifier_exhaustive_single_reviewer() {
        for state in ALL_STATES {
            let map = states(&[("alice", state)]);
            let expected = match state {
                ReviewState::Approved => PrStatus::Approved,
                ReviewState::ChangesRequested => PrStatus::ChangesRequested,
                _ => PrStatus::InReview,
            };
            assert_eq!(classify(&map, false, None), expected);
        }
    }

    #[test]
    fn test_latest_states_last_review_wins() {
        let reviews = vec![
            review("alice", "CHANGES_REQUESTED", 0),
            review("alice", "APPROVED", 30),
        ];
        let map = latest_states(&reviews, &[]);
        assert_eq!(map.get("alice"), Some(&ReviewState::Approved));
    }

    #[test]
    fn test_latest_states_ignores_submission_order_in_input() {
        let reviews = vec![
            review("alice", "APPROVED", 30),
            review("alice", "CHANGES_REQUESTED", 0),
        ];
        let map = latest_states(&reviews, &[]);
        assert_eq!(map.get("alice"), Some(&ReviewState::Approved));
    }

    #[test]
    fn test_latest_states_rerequested_reviewer_stays_pending() {
        let reviews = vec![review("alice", "APPROVED", 0)];
        let requested = vec!["alice".to_string()];
        let map = latest_states(&reviews, &requested);
        assert_eq!(map.get("alice"), Some(&ReviewState::Pending));
    }

    #[test]
    fn test_latest_states_skips_anonymous_reviews() {
        let reviews = vec![Review {
            author: None,
            state: "APPROVED".to_string(),
            submitted_at: None,
        }];
        assert!(latest_states(&reviews, &[]).is_empty());
    }

    #[test]
    fn test_latest_states_pending_review_sorts_first() {
        // A pending review has no timestamp and must not override a
        // later submitted verdict.
        let reviews = vec![
            Review {
                author: Some(Actor {
                    login: "alice".to_string(),
                }),
                state: "PENDING".to_string(),
                submitted_at: None,
            },
            review("alice", "APPROVED", 10),
        ];
        let map = latest_states(&reviews, &[]);
        assert_eq!(map.get("alice"), Some(&ReviewState::Approved));
    }

    #[test]
    fn test_review_state_parse_unknown_is_pending() {
        assert_eq!(ReviewState::parse("DISMISSED"), ReviewState::Pending);
        assert_eq!(ReviewState::parse(""), ReviewState::Pending);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(PrStatus::Draft.to_string(), "Draft");
        assert_eq!(PrStatus::ChangesRequested.to_string(), "Changes Requested");
        assert_eq!(PrStatus::InReview.to_string(), "In Review");
    }
}
