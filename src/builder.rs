use log::warn;
use num_rational::BigRational;
use num_traits::One;

use crate::ballot::Ballot;
use crate::config::{CandidateId, TabulationError};

/// Converts human-readable ballots into numeric [`Ballot`] values.
///
/// The candidate reference list fixes the numeric identifiers: the first
/// name maps to candidate `1`, and so on. Ballots may rank fewer
/// candidates than the reference list; the trailing positions are filled
/// with blanks.
///
/// ```
/// use stv_voting::Builder;
///
/// let mut builder = Builder::new(&["Anna".to_string(), "Bob".to_string()])?;
/// builder.add_ballot("v1", &["Bob", "Anna"])?;
/// builder.add_ballot("v2", &["Anna"])?;
/// # Ok::<(), stv_voting::TabulationError>(())
/// ```
pub struct Builder {
    candidates: Vec<String>,
    ballots: Vec<Ballot>,
}

impl Builder {
    pub fn new(candidates: &[String]) -> Result<Builder, TabulationError> {
        if candidates.is_empty() {
            return Err(TabulationError::EmptyElection);
        }
        Ok(Builder {
            candidates: candidates.to_vec(),
            ballots: Vec::new(),
        })
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidate_id(&self, name: &str) -> Option<CandidateId> {
        self.candidates
            .iter()
            .position(|c| c == name)
            .map(|idx| CandidateId((idx + 1) as u32))
    }

    pub fn candidate_name(&self, candidate: CandidateId) -> Option<&str> {
        self.candidates
            .get((candidate.0 as usize).checked_sub(1)?)
            .map(|s| s.as_str())
    }

    /// Adds a full-power ballot. Choices are candidate names in preference
    /// order.
    ///
    /// A rejected ballot (unknown name or malformed ranking) is reported
    /// through the error and never enters tabulation; the builder itself
    /// stays usable.
    pub fn add_ballot(&mut self, voter: &str, choices: &[&str]) -> Result<(), TabulationError> {
        self.add_ballot_weighted(voter, choices, BigRational::one())
    }

    /// Adds a ballot with an explicit initial voting power.
    pub fn add_ballot_weighted(
        &mut self,
        voter: &str,
        choices: &[&str],
        weight: BigRational,
    ) -> Result<(), TabulationError> {
        let mut ranking: Vec<u32> = Vec::with_capacity(self.candidates.len());
        for name in choices {
            match self.candidate_id(name) {
                Some(cid) => ranking.push(cid.0),
                None => {
                    warn!("{}'s ballot has invalid candidate '{}'", voter, name);
                    return Err(TabulationError::UnknownCandidateName {
                        voter: voter.to_string(),
                        name: name.to_string(),
                    });
                }
            }
        }
        // Unranked tail positions are blanks. Over-long ballots are left
        // as-is for the validator to reject.
        if ranking.len() < self.candidates.len() {
            ranking.resize(self.candidates.len(), 0);
        }
        let ballot = Ballot::with_weight(voter, &ranking, self.candidates.len(), weight)?;
        self.ballots.push(ballot);
        Ok(())
    }

    /// The accepted ballots so far.
    pub fn ballots(&self) -> Vec<Ballot> {
        self.ballots.clone()
    }
}
