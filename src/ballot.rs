use std::fmt::Display;

use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::config::{CandidateId, TabulationError};

/// One position of a ranking.
///
/// A position either names a candidate, was left blank by the voter, or
/// held a candidate who has since been eliminated. `Eliminated` is a
/// transient in-memory marker; external input can only produce the other
/// two.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RankEntry {
    Ranked(CandidateId),
    Blank,
    Eliminated,
}

/// The specific rule a ranking sequence broke.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RankingError {
    WrongLength { got: usize, expected: usize },
    InvalidCandidateNumber { value: u32 },
    DuplicateCandidate { value: u32 },
    NonTrailingBlank { position: usize },
}

impl Display for RankingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingError::WrongLength { got, expected } => write!(
                f,
                "ballot has incorrect length {} for {} candidates",
                got, expected
            ),
            RankingError::InvalidCandidateNumber { value } => {
                write!(f, "ballot has invalid candidate number {}", value)
            }
            RankingError::DuplicateCandidate { value } => write!(
                f,
                "ballot has more than one ranking for candidate number {}",
                value
            ),
            RankingError::NonTrailingBlank { position } => write!(
                f,
                "ballot has a non-trailing blank ranking at position {}",
                position
            ),
        }
    }
}

/// Checks that a ranking sequence is well-formed: one entry per rank
/// position, candidate numbers in `[1, N]` (`0` marks a blank), no
/// candidate ranked twice, and blanks only in the trailing positions.
pub fn validate_ranking(ranking: &[u32], candidate_count: usize) -> Result<(), RankingError> {
    if ranking.len() != candidate_count {
        return Err(RankingError::WrongLength {
            got: ranking.len(),
            expected: candidate_count,
        });
    }
    let mut seen = vec![false; candidate_count];
    let mut blank_seen = false;
    for (position, &value) in ranking.iter().enumerate() {
        if value as usize > candidate_count {
            return Err(RankingError::InvalidCandidateNumber { value });
        }
        if value == 0 {
            blank_seen = true;
            continue;
        }
        if seen[(value - 1) as usize] {
            return Err(RankingError::DuplicateCandidate { value });
        }
        seen[(value - 1) as usize] = true;
        if blank_seen {
            return Err(RankingError::NonTrailingBlank { position });
        }
    }
    Ok(())
}

/// A single voter's ballot: an immutable voter name plus the mutable
/// tabulation state (active ranking and current voting power).
///
/// The ranking length is fixed at the candidate count for the ballot's
/// lifetime; eliminations mark positions rather than removing them. Voting
/// power starts at the initial weight and only ever decreases.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    voter: String,
    ranking: Vec<RankEntry>,
    voting_power: BigRational,
}

impl Ballot {
    /// Builds a full-power ballot from a validated ranking sequence.
    /// `0` entries are blanks.
    pub fn new(
        voter: &str,
        ranking: &[u32],
        candidate_count: usize,
    ) -> Result<Ballot, TabulationError> {
        Ballot::with_weight(voter, ranking, candidate_count, BigRational::one())
    }

    /// Like [`Ballot::new`] with an externally supplied initial weight.
    pub fn with_weight(
        voter: &str,
        ranking: &[u32],
        candidate_count: usize,
        weight: BigRational,
    ) -> Result<Ballot, TabulationError> {
        validate_ranking(ranking, candidate_count).map_err(|e| {
            TabulationError::MalformedBallot {
                voter: voter.to_string(),
                reason: e.to_string(),
            }
        })?;
        if weight < BigRational::zero() {
            return Err(TabulationError::MalformedBallot {
                voter: voter.to_string(),
                reason: format!("ballot has negative weight {}", weight),
            });
        }
        let ranking = ranking
            .iter()
            .map(|&value| {
                if value == 0 {
                    RankEntry::Blank
                } else {
                    RankEntry::Ranked(CandidateId(value))
                }
            })
            .collect();
        Ok(Ballot {
            voter: voter.to_string(),
            ranking,
            voting_power: weight,
        })
    }

    pub fn voter(&self) -> &str {
        &self.voter
    }

    pub fn voting_power(&self) -> &BigRational {
        &self.voting_power
    }

    pub fn ranking_len(&self) -> usize {
        self.ranking.len()
    }

    /// The candidate at the n-th remaining rank position (1-indexed),
    /// skipping eliminated entries. Rank positions shift up as
    /// eliminations accumulate, so `n` is always relative to the remaining
    /// candidates. `None` once the active tail runs out.
    pub(crate) fn ranked_choice(&self, n: usize) -> Option<CandidateId> {
        if n == 0 {
            return None;
        }
        let mut remaining = n;
        for entry in &self.ranking {
            match entry {
                RankEntry::Eliminated => continue,
                // Blanks are trailing, so no active entry can follow.
                RankEntry::Blank => return None,
                RankEntry::Ranked(cid) => {
                    if remaining == 1 {
                        return Some(*cid);
                    }
                    remaining -= 1;
                }
            }
        }
        None
    }

    /// Marks every position held by `candidate` as eliminated. At most one
    /// position changes in a valid ranking. Idempotent.
    pub(crate) fn eliminate(&mut self, candidate: CandidateId) {
        for entry in self.ranking.iter_mut() {
            if *entry == RankEntry::Ranked(candidate) {
                *entry = RankEntry::Eliminated;
            }
        }
    }

    /// True iff no active ranking remains.
    pub(crate) fn is_exhausted(&self) -> bool {
        !self
            .ranking
            .iter()
            .any(|entry| matches!(entry, RankEntry::Ranked(_)))
    }

    pub(crate) fn scale_power(&mut self, factor: &BigRational) {
        self.voting_power *= factor;
    }

    pub(crate) fn clear_power(&mut self) {
        self.voting_power.set_zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_full_and_padded_rankings() {
        assert_eq!(validate_ranking(&[3, 1, 2, 4], 4), Ok(()));
        assert_eq!(validate_ranking(&[4, 2, 3, 0], 4), Ok(()));
        assert_eq!(validate_ranking(&[1, 0, 0, 0], 4), Ok(()));
        assert_eq!(validate_ranking(&[0, 0, 0, 0], 4), Ok(()));
    }

    #[test]
    fn validate_rejects_wrong_length() {
        assert_eq!(
            validate_ranking(&[1, 2, 3], 4),
            Err(RankingError::WrongLength {
                got: 3,
                expected: 4
            })
        );
    }

    #[test]
    fn validate_rejects_out_of_range_candidate() {
        assert_eq!(
            validate_ranking(&[1, 5, 0, 0], 4),
            Err(RankingError::InvalidCandidateNumber { value: 5 })
        );
    }

    #[test]
    fn validate_rejects_duplicate_candidate() {
        assert_eq!(
            validate_ranking(&[1, 2, 1, 0], 4),
            Err(RankingError::DuplicateCandidate { value: 1 })
        );
    }

    #[test]
    fn validate_rejects_non_trailing_blank() {
        assert_eq!(
            validate_ranking(&[1, 0, 2, 0], 4),
            Err(RankingError::NonTrailingBlank { position: 2 })
        );
    }

    #[test]
    fn ranked_choice_shifts_past_eliminations() {
        let mut b = Ballot::new("Alice", &[3, 1, 2, 4], 4).unwrap();
        assert_eq!(b.ranked_choice(1), Some(CandidateId(3)));
        assert_eq!(b.ranked_choice(2), Some(CandidateId(1)));

        b.eliminate(CandidateId(3));
        assert_eq!(b.ranked_choice(1), Some(CandidateId(1)));
        assert_eq!(b.ranked_choice(2), Some(CandidateId(2)));
        assert_eq!(b.ranked_choice(3), Some(CandidateId(4)));
        assert_eq!(b.ranked_choice(4), None);
    }

    #[test]
    fn ranked_choice_stops_at_blanks() {
        let b = Ballot::new("Bob", &[4, 2, 3, 0], 4).unwrap();
        assert_eq!(b.ranked_choice(3), Some(CandidateId(3)));
        assert_eq!(b.ranked_choice(4), None);
    }

    #[test]
    fn eliminate_is_idempotent() {
        let mut once = Ballot::new("Claire", &[1, 2, 0, 0], 4).unwrap();
        once.eliminate(CandidateId(2));
        let mut twice = once.clone();
        twice.eliminate(CandidateId(2));
        assert_eq!(once, twice);
    }

    #[test]
    fn single_choice_ballot_exhausts_on_elimination() {
        let mut b = Ballot::new("Claire", &[1, 0, 0, 0], 4).unwrap();
        assert!(!b.is_exhausted());
        b.eliminate(CandidateId(1));
        assert!(b.is_exhausted());
        // The blank-only ranking keeps its original length.
        assert_eq!(b.ranking_len(), 4);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let res = Ballot::with_weight(
            "Mallory",
            &[1, 0],
            2,
            BigRational::from_integer((-1).into()),
        );
        assert!(matches!(
            res,
            Err(TabulationError::MalformedBallot { .. })
        ));
    }
}
