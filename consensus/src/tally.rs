//! Tally rules for both phases
//!
//! Pure functions over the values collected for a round. The driver feeds
//! them inbox snapshots; nothing here touches shared state.

use flipnet_core::Value;
use rand::Rng;

/// Outcome of the phase-2 tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTwoOutcome {
    /// Output is fixed to this bit.
    Decide(Value),
    /// Proposal for the next round.
    Adopt(Value),
}

/// Phase-1 majority over all N participants.
pub fn majority_threshold(total_nodes: usize) -> usize {
    total_nodes / 2 + 1
}

/// Phase-2 commit threshold over the assumed non-faulty count.
pub fn decision_threshold(total_nodes: usize, presumed_faulty: usize) -> usize {
    (total_nodes - presumed_faulty) / 2 + 1
}

/// Phase-2 adoption threshold over the assumed non-faulty count.
pub fn adoption_threshold(total_nodes: usize, presumed_faulty: usize) -> usize {
    (total_nodes - presumed_faulty) / 3 + 1
}

fn count_bits(own: Value, received: &[Value]) -> (usize, usize) {
    let mut zeros = 0;
    let mut ones = 0;
    for value in received.iter().copied().chain(std::iter::once(own)) {
        match value {
            Value::Zero => zeros += 1,
            Value::One => ones += 1,
            Value::Maybe => {}
        }
    }
    (zeros, ones)
}

/// Phase-1 tally: adopt a value seen by a strict majority of all N
/// participants, otherwise report no majority.
///
/// At most one value can reach `⌊N/2⌋ + 1` in a set of at most N values,
/// so no tie arises. `?` is never counted here.
pub fn phase_one(own: Value, received: &[Value], total_nodes: usize) -> Value {
    let (zeros, ones) = count_bits(own, received);
    let majority = majority_threshold(total_nodes);

    if zeros >= majority {
        Value::Zero
    } else if ones >= majority {
        Value::One
    } else {
        Value::Maybe
    }
}

/// Phase-2 tally: commit, adopt, or fall back to a fresh coin flip.
///
/// Rules in order, first match wins:
/// 1. a bit at the decision threshold that matches our own value decides;
/// 2. a bit at the adoption threshold becomes the next proposal;
/// 3. otherwise the next proposal is a uniform random bit, the escape
///    that breaks symmetry between rounds.
pub fn phase_two(
    own: Value,
    received: &[Value],
    total_nodes: usize,
    presumed_faulty: usize,
    rng: &mut impl Rng,
) -> PhaseTwoOutcome {
    let (zeros, ones) = count_bits(own, received);
    let decision = decision_threshold(total_nodes, presumed_faulty);
    let adoption = adoption_threshold(total_nodes, presumed_faulty);

    if zeros >= decision && own == Value::Zero {
        PhaseTwoOutcome::Decide(Value::Zero)
    } else if ones >= decision && own == Value::One {
        PhaseTwoOutcome::Decide(Value::One)
    } else if zeros >= adoption {
        PhaseTwoOutcome::Adopt(Value::Zero)
    } else if ones >= adoption {
        PhaseTwoOutcome::Adopt(Value::One)
    } else if rng.gen::<bool>() {
        PhaseTwoOutcome::Adopt(Value::One)
    } else {
        PhaseTwoOutcome::Adopt(Value::Zero)
    }
}
