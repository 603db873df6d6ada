//! Seeded per-team random stream used for hit-chance resolution.
//!
//! Every team owns one stream for the whole life of a match. A stream is the
//! pair of its starting generator (`initial`, persisted for audit) and the live
//! generator (`current`), plus the number of draws consumed (`count`).
//!
//! # Determinism
//!
//! Each draw consumes exactly one 32-bit output of a PCG-XSH-RR 64/32
//! generator, so the *n*-th draw can be re-derived from `initial` alone by
//! jumping the generator ahead `n - 1` steps. Draws are never returned to the
//! stream: undoing a turn does not rewind `count`.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

/// Outcome of a single draw from a team's stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LuckDraw {
    /// 1-based ordinal of this draw within the team's stream.
    pub id: u32,
    /// Drawn value in `[0, 100)`.
    pub number: u8,
}

/// Live random stream for one team.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "PersistedRandomState", into = "PersistedRandomState")
)]
pub struct RandomState {
    count: u32,
    initial: Pcg32,
    current: Pcg32,
}

impl RandomState {
    /// Creates a fresh stream from a 64-bit seed.
    pub fn create(seed: u64) -> Self {
        Self::from_initial(Pcg32::seed_from_u64(seed), 0)
    }

    /// Resumes a stream from its persisted starting generator and draw count.
    ///
    /// The live generator is rebuilt by jumping `initial` ahead `count` steps,
    /// which yields exactly the generator the original game held.
    pub fn from_initial(initial: Pcg32, count: u32) -> Self {
        let mut current = initial.clone();
        current.advance(u64::from(count));
        Self {
            count,
            initial,
            current,
        }
    }

    /// Number of draws consumed so far.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Starting generator (persisted for audit).
    pub fn initial(&self) -> &Pcg32 {
        &self.initial
    }

    /// Consumes the next value of the stream.
    pub fn draw(&mut self) -> LuckDraw {
        self.count += 1;
        LuckDraw {
            id: self.count,
            number: to_percentile(self.current.next_u32()),
        }
    }

    /// Returns the value the next draw would produce without consuming it.
    pub fn peek(&self) -> u8 {
        to_percentile(self.current.clone().next_u32())
    }

    /// Re-derives draw `id` (1-based) from a starting generator alone.
    ///
    /// This is the audit primitive: it never consults the live generator.
    pub fn nth_draw(initial: &Pcg32, id: u32) -> u8 {
        debug_assert!(id >= 1, "draw ids are 1-based");
        let mut rng = initial.clone();
        rng.advance(u64::from(id.saturating_sub(1)));
        to_percentile(rng.next_u32())
    }
}

/// Maps a raw 32-bit output onto `[0, 100)` with a widening multiply.
#[inline]
fn to_percentile(value: u32) -> u8 {
    ((u64::from(value) * 100) >> 32) as u8
}

/// Persisted form of a stream: the live generator is derived, never stored.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedRandomState {
    count: u32,
    initial: Pcg32,
}

#[cfg(feature = "serde")]
impl From<PersistedRandomState> for RandomState {
    fn from(persisted: PersistedRandomState) -> Self {
        Self::from_initial(persisted.initial, persisted.count)
    }
}

#[cfg(feature = "serde")]
impl From<RandomState> for PersistedRandomState {
    fn from(state: RandomState) -> Self {
        Self {
            count: state.count,
            initial: state.initial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_are_percentiles_and_count_increments() {
        let mut stream = RandomState::create(7);
        for expected_id in 1..=500 {
            let draw = stream.draw();
            assert_eq!(draw.id, expected_id);
            assert!(draw.number < 100);
        }
        assert_eq!(stream.count(), 500);
    }

    #[test]
    fn same_seed_produces_same_sequence() {
        let mut a = RandomState::create(42);
        let mut b = RandomState::create(42);
        for _ in 0..64 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn nth_draw_matches_live_sequence() {
        let mut stream = RandomState::create(1234);
        let initial = stream.initial().clone();
        for _ in 0..40 {
            let draw = stream.draw();
            assert_eq!(RandomState::nth_draw(&initial, draw.id), draw.number);
        }
    }

    #[test]
    fn resume_from_initial_continues_bit_exactly() {
        let mut original = RandomState::create(99);
        for _ in 0..17 {
            original.draw();
        }

        let mut resumed = RandomState::from_initial(original.initial().clone(), original.count());
        assert_eq!(resumed, original);
        for _ in 0..10 {
            assert_eq!(resumed.draw(), original.draw());
        }
    }

    #[test]
    fn peek_does_not_consume() {
        let mut stream = RandomState::create(5);
        let peeked = stream.peek();
        assert_eq!(stream.count(), 0);
        assert_eq!(stream.draw().number, peeked);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn persisted_form_restores_live_generator() {
        let mut stream = RandomState::create(2024);
        for _ in 0..9 {
            stream.draw();
        }

        let json = serde_json::to_string(&stream).unwrap();
        assert!(!json.contains("current"));

        let mut restored: RandomState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.count(), 9);
        assert_eq!(restored.draw(), stream.draw());
    }
}
