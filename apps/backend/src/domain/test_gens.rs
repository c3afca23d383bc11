//! Proptest strategies for match simulations.

use proptest::prelude::*;

use crate::domain::vote::Outcome;

/// One step a well-behaved client could take; actors are resolved against
/// the match at the time the step runs.
#[derive(Debug, Clone)]
pub enum Step {
    Propose { trick: usize },
    Report(Outcome),
    Vote { voter: usize, ballot: Outcome },
    /// A call from an arbitrary seat, legal or not.
    Stray { seat: usize, kind: u8, ballot: Outcome },
}

pub fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![Just(Outcome::Hit), Just(Outcome::Miss)]
}

pub fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0usize..6).prop_map(|trick| Step::Propose { trick }),
        4 => outcome().prop_map(Step::Report),
        4 => (0usize..4, outcome()).prop_map(|(voter, ballot)| Step::Vote { voter, ballot }),
        1 => (0usize..4, 0u8..3, outcome()).prop_map(|(seat, kind, ballot)| Step::Stray { seat, kind, ballot }),
    ]
}

pub fn player_count() -> impl Strategy<Value = usize> {
    2usize..=4
}
