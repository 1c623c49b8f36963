// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use num_rational::BigRational;

/// Numeric identifier of a candidate.
///
/// Identifiers are assigned in `[1, N]` for `N` registered candidates, in
/// the order of the reference candidate list.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CandidateId(pub u32);

// ******** Output data structures *********

/// The decision taken at the end of a counting round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RoundOutcome {
    /// A candidate reached the quota and took a seat.
    Elected {
        candidate: CandidateId,
        votes: BigRational,
        quota: BigRational,
    },
    /// No candidate reached the quota; the weakest one was eliminated.
    Eliminated {
        candidate: CandidateId,
        votes: BigRational,
    },
}

/// Statistics for one round.
///
/// The tally values include the fractional lower-rank tie-break weights, so
/// they should be read as "first-choice votes, tie-broken by lower ranks"
/// rather than literal vote totals.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    pub quota: BigRational,
    /// Weighted support per candidate, in candidate id order. Candidates
    /// with no remaining support tally at zero.
    pub tally: Vec<(CandidateId, BigRational)>,
    pub outcome: RoundOutcome,
    /// Voters whose ballots became exhausted during this round.
    pub exhausted: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TabulationResult {
    /// Exactly `seats` distinct candidates, in the order they were elected.
    pub winners: Vec<CandidateId>,
    pub round_stats: Vec<RoundStats>,
}

/// Errors that prevent the tabulation from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TabulationError {
    /// A ranking failed validation. The reason names the broken rule and
    /// the offending value.
    MalformedBallot { voter: String, reason: String },
    /// A ballot named a candidate absent from the reference list.
    UnknownCandidateName { voter: String, name: String },
    /// No candidate with nonzero support remains while seats are unfilled.
    NoViableCandidate { round: u32 },
    EmptyElection,
    InvalidSeatCount { seats: usize },
    NotEnoughCandidates { candidates: usize, seats: usize },
    MismatchedRankingLength { voter: String },
    /// The round loop exceeded its hard bound. This indicates a bug rather
    /// than bad input.
    NoConvergence,
}

impl Error for TabulationError {}

impl Display for TabulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TabulationError::MalformedBallot { voter, reason } => {
                write!(f, "{}'s ballot is invalid: {}", voter, reason)
            }
            TabulationError::UnknownCandidateName { voter, name } => {
                write!(f, "{}'s ballot has invalid candidate '{}'", voter, name)
            }
            TabulationError::NoViableCandidate { round } => {
                write!(f, "no candidate with nonzero support in round {}", round)
            }
            TabulationError::EmptyElection => write!(f, "no ballots were provided"),
            TabulationError::InvalidSeatCount { seats } => {
                write!(f, "invalid number of seats: {}", seats)
            }
            TabulationError::NotEnoughCandidates { candidates, seats } => {
                write!(
                    f,
                    "{} candidates cannot fill {} seats",
                    candidates, seats
                )
            }
            TabulationError::MismatchedRankingLength { voter } => {
                write!(f, "{}'s ballot has a different ranking length", voter)
            }
            TabulationError::NoConvergence => {
                write!(f, "tabulation did not converge within the round bound")
            }
        }
    }
}

// ********* Configuration **********

// The policy knobs cover the points where published STV rule sets disagree.
// The defaults follow first-choice-only surplus discounting and an exact
// rational quota comparison.

/// Which contributing ballots get their voting power discounted when their
/// candidate wins with a surplus.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SurplusTransferScope {
    /// Only ballots ranking the winner first. Ballots that merely
    /// tie-break through their 2nd or 3rd choice keep full power.
    FirstChoiceOnly,
    /// Every ballot that contributed weight, including tie-break ranks.
    AllContributors,
}

/// How the quota is computed from the live vote total.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum QuotaRule {
    /// Compare against the raw rational `total / (seats + 1)`.
    ExactFraction,
    /// Round the quota up to a whole number before comparing and
    /// transferring.
    CeilingInteger,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TabulationPolicy {
    pub transfer_scope: SurplusTransferScope,
    pub quota_rule: QuotaRule,
}

impl TabulationPolicy {
    pub const DEFAULT_POLICY: TabulationPolicy = TabulationPolicy {
        transfer_scope: SurplusTransferScope::FirstChoiceOnly,
        quota_rule: QuotaRule::ExactFraction,
    };
}
