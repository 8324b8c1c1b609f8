//! Wrong-answer generation.

use std::collections::BTreeSet;

use log::warn;
use rand::Rng;

/// Smallest upper bound for drawn distractor values.
const MIN_VALUE_CEILING: i32 = 20;

/// Draws up to `count` distinct positive values different from `answer`.
///
/// Values come uniformly from `[1, max(20, 2 * answer)]`. At most
/// `max_attempts` draws are made; when they run out the values found so far
/// are returned.
pub fn generate_distractors<R>(
    answer: i32,
    count: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Vec<i32>
where
    R: Rng + ?Sized,
{
    let ceiling = answer.saturating_mul(2).max(MIN_VALUE_CEILING);
    let mut seen = BTreeSet::new();
    let mut values = Vec::with_capacity(count);

    for _ in 0..max_attempts {
        if values.len() == count {
            break;
        }
        let candidate = rng.gen_range(1..=ceiling);
        if candidate != answer && seen.insert(candidate) {
            values.push(candidate);
        }
    }

    if values.len() < count {
        warn!(
            "generated {} of {count} distractors for {answer} after {max_attempts} draws",
            values.len()
        );
    }

    values
}
