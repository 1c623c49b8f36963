mod ballot;
mod builder;
mod config;

use log::{debug, info};

use num_bigint::BigInt;
use num_traits::Zero;

pub use num_rational::BigRational;

pub use crate::ballot::{validate_ranking, Ballot, RankEntry, RankingError};
pub use crate::builder::Builder;
pub use crate::config::*;

// **** Private structures ****

/// The weighted support for one candidate across all ballots.
struct CandidateSupport {
    candidate: CandidateId,
    count: BigRational,
    /// Indices of the ballots ranking this candidate first.
    first_choice: Vec<usize>,
    /// Indices of the ballots contributing only tie-break weight.
    tie_break: Vec<usize>,
}

/// Weighted votes in favor of a candidate. The first ranked choice
/// contributes the ballot's full voting power; the 2nd and 3rd choices
/// contribute 1/1000 and 1/1000000 of it. The fractional ranks exist only
/// as a deterministic tie-break among first-choice counts and can never
/// overturn a genuine first-choice ordering.
fn votes_in_favor(ballots: &[Ballot], candidate: CandidateId) -> CandidateSupport {
    let thousandth = BigRational::new(BigInt::from(1), BigInt::from(1000));
    let millionth = BigRational::new(BigInt::from(1), BigInt::from(1_000_000));
    let mut count = BigRational::zero();
    let mut first_choice: Vec<usize> = Vec::new();
    let mut tie_break: Vec<usize> = Vec::new();
    for (idx, b) in ballots.iter().enumerate() {
        if b.ranked_choice(1) == Some(candidate) {
            count += b.voting_power();
            first_choice.push(idx);
        }
        if b.ranked_choice(2) == Some(candidate) {
            count += b.voting_power() * &thousandth;
            tie_break.push(idx);
        }
        if b.ranked_choice(3) == Some(candidate) {
            count += b.voting_power() * &millionth;
            tie_break.push(idx);
        }
    }
    CandidateSupport {
        candidate,
        count,
        first_choice,
        tie_break,
    }
}

fn compute_tally(ballots: &[Ballot], candidate_count: usize) -> Vec<CandidateSupport> {
    (1..=candidate_count as u32)
        .map(|id| votes_in_favor(ballots, CandidateId(id)))
        .collect()
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum Extreme {
    Max,
    Min,
}

/// The candidate with maximal or minimal weighted support. Candidates with
/// zero support are out of the running in both directions: a fully
/// eliminated or never-ranked candidate cannot be selected again. Ties go
/// to the lowest candidate id.
fn extreme_candidate(tally: &[CandidateSupport], mode: Extreme) -> Option<&CandidateSupport> {
    let mut best: Option<&CandidateSupport> = None;
    for support in tally.iter().filter(|s| !s.count.is_zero()) {
        let better = match best {
            None => true,
            Some(cur) => match mode {
                Extreme::Max => support.count > cur.count,
                Extreme::Min => support.count < cur.count,
            },
        };
        if better {
            best = Some(support);
        }
    }
    best
}

/// Runs the single-transferable-vote tabulation until all seats are filled.
///
/// Each round compares the strongest candidate's weighted support against
/// the Droop-style quota `total_vote / (seats + 1)`. At quota the candidate
/// takes a seat and the contributing ballots keep only their proportional
/// surplus; below quota the weakest candidate is eliminated and those
/// ballots flow to their next active choice. Ballots left with no active
/// choice sweep out of the live vote total, which shrinks the quota for
/// later rounds.
///
/// The engine takes ownership of the ballots for the duration of the run;
/// it emits no output beyond `log` narration and the returned round
/// statistics.
///
/// Arguments:
/// * `ballots` the validated ballots, all with the same ranking length
/// * `seats` the number of seats to fill, at least 1
/// * `policy` the surplus-transfer and quota rounding rules
pub fn tabulate(
    ballots: Vec<Ballot>,
    seats: usize,
    policy: &TabulationPolicy,
) -> Result<TabulationResult, TabulationError> {
    if seats == 0 {
        return Err(TabulationError::InvalidSeatCount { seats });
    }
    if ballots.is_empty() {
        return Err(TabulationError::EmptyElection);
    }
    let candidate_count = ballots[0].ranking_len();
    if let Some(b) = ballots.iter().find(|b| b.ranking_len() != candidate_count) {
        return Err(TabulationError::MismatchedRankingLength {
            voter: b.voter().to_string(),
        });
    }
    if candidate_count < seats {
        return Err(TabulationError::NotEnoughCandidates {
            candidates: candidate_count,
            seats,
        });
    }

    info!(
        "tabulate: {} seats, {} candidates, {} ballots",
        seats,
        candidate_count,
        ballots.len()
    );

    let mut ballots = ballots;
    // Ballots already swept out of the live total; the sweep must never
    // double-count one.
    let mut swept = vec![false; ballots.len()];
    let mut winners: Vec<CandidateId> = Vec::new();
    let mut round_stats: Vec<RoundStats> = Vec::new();
    // Each ballot contributes its initial weight. Only exhaustion shrinks
    // the live total; surplus consumed by a winner does not.
    let mut total_vote = ballots
        .iter()
        .fold(BigRational::zero(), |acc, b| acc + b.voting_power());
    let divisor = BigRational::from_integer(BigInt::from(seats as u64 + 1));

    // Every round permanently removes one candidate, so the loop is
    // bounded by the candidate pool, with slack for the seats.
    let round_bound = (candidate_count + seats) as u32;
    for round in 1..=round_bound {
        let quota = {
            let raw = &total_vote / &divisor;
            match policy.quota_rule {
                QuotaRule::ExactFraction => raw,
                QuotaRule::CeilingInteger => raw.ceil(),
            }
        };
        debug!("round {}: total vote {}, quota {}", round, total_vote, quota);

        let tally = compute_tally(&ballots, candidate_count);
        let top = extreme_candidate(&tally, Extreme::Max)
            .ok_or(TabulationError::NoViableCandidate { round })?;

        let outcome = if top.count >= quota {
            let elected = top.candidate;
            let votes = top.count.clone();
            info!(
                "round {}: win candidate {} ({} votes, quota {})",
                round, elected.0, votes, quota
            );
            winners.push(elected);
            // A contributing ballot keeps only its proportional surplus
            // above the quota; a ballot exactly at quota drops to zero.
            let factor = (&votes - &quota) / &votes;
            let contributors: Vec<usize> = match policy.transfer_scope {
                SurplusTransferScope::FirstChoiceOnly => top.first_choice.clone(),
                SurplusTransferScope::AllContributors => {
                    let mut all = top.first_choice.clone();
                    all.extend_from_slice(&top.tie_break);
                    all
                }
            };
            for b in ballots.iter_mut() {
                b.eliminate(elected);
            }
            for idx in contributors {
                ballots[idx].scale_power(&factor);
            }
            RoundOutcome::Elected {
                candidate: elected,
                votes,
                quota: quota.clone(),
            }
        } else {
            let bottom = extreme_candidate(&tally, Extreme::Min)
                .ok_or(TabulationError::NoViableCandidate { round })?;
            let eliminated = bottom.candidate;
            let votes = bottom.count.clone();
            info!(
                "round {}: elim candidate {} ({} votes)",
                round, eliminated.0, votes
            );
            // No power transfer: these ballots flow to their next active
            // rank because ranked choices skip eliminated entries.
            for b in ballots.iter_mut() {
                b.eliminate(eliminated);
            }
            RoundOutcome::Eliminated {
                candidate: eliminated,
                votes,
            }
        };

        // Exhaustion sweep: a ballot with no active choice left takes its
        // remaining power out of the live total, exactly once.
        let mut exhausted: Vec<String> = Vec::new();
        for (idx, b) in ballots.iter_mut().enumerate() {
            if !swept[idx] && b.is_exhausted() {
                swept[idx] = true;
                total_vote -= b.voting_power();
                b.clear_power();
                exhausted.push(b.voter().to_string());
            }
        }

        round_stats.push(RoundStats {
            round,
            quota,
            tally: tally
                .iter()
                .map(|s| (s.candidate, s.count.clone()))
                .collect(),
            outcome,
            exhausted,
        });

        if winners.len() == seats {
            info!("tabulate: winners {:?}", winners);
            return Ok(TabulationResult {
                winners,
                round_stats,
            });
        }
    }
    Err(TabulationError::NoConvergence)
}
