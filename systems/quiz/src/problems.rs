//! Arithmetic problem generation.

use math_snake_core::{Operation, Problem};
use rand::Rng;

/// Lowest supported difficulty tier.
pub const MIN_TIER: u8 = 1;

/// Highest supported difficulty tier.
pub const MAX_TIER: u8 = 5;

/// Generates a problem for `operation` whose answer is a positive integer.
///
/// Operand ranges widen with `tier`, which is clamped to
/// `MIN_TIER..=MAX_TIER`.
pub fn generate_problem<R>(operation: Operation, tier: u8, rng: &mut R) -> Problem
where
    R: Rng + ?Sized,
{
    let tier = i32::from(tier.clamp(MIN_TIER, MAX_TIER));
    let symbol = operation.symbol();

    let (left, right, answer) = match operation {
        Operation::Add => {
            let a = rng.gen_range(1..=10 * tier);
            let b = rng.gen_range(1..=10 * tier);
            (a, b, a + b)
        }
        Operation::Subtract => {
            let a = rng.gen_range(2..=10 * tier + 1);
            let b = rng.gen_range(1..a);
            (a, b, a - b)
        }
        Operation::Multiply => {
            let a = rng.gen_range(1..=5 + tier);
            let b = rng.gen_range(1..=5 + tier);
            (a, b, a * b)
        }
        Operation::Divide => {
            let divisor = rng.gen_range(2..=5 + tier);
            let quotient = rng.gen_range(1..=5 + tier);
            (divisor * quotient, divisor, quotient)
        }
    };

    Problem::new(format!("{left} {symbol} {right} = ?"), answer)
}
