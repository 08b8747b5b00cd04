//! Fast weighted coin flips for the randomized tree.
//!
//! [`choose`] returns `true` with probability `1 / (n + 1)`, threading a
//! caller-owned pseudo-random state so results are reproducible from a
//! fixed seed. For small `n` the decision avoids floating point entirely:
//! a uniformly random slot of [`MAX_N_TABLE`] is drawn and tested for
//! membership. Table entries record the largest `n` for which the slot is
//! a hit; the per-`n` hit counts were generated offline with an
//! error-carry rounding scheme, which makes the achieved probability
//! exactly `1 / (n + 1)` whenever `n + 1` divides the table length and
//! within one slot's resolution otherwise.

/// The largest `n` decided by table lookup. The table length
/// (`MAX_TABLE_INDEX + 1`) is a power of two so the uniform slot draw is a
/// bit mask.
pub(crate) const MAX_TABLE_INDEX: usize = 31;

const TABLE_LEN: usize = MAX_TABLE_INDEX + 1;

/// `MAX_N_TABLE[slot] >= n` makes `slot` a hit for `n`. For each `n`, the
/// number of hit slots approximates `TABLE_LEN / (n + 1)` with the
/// rounding error carried between successive `n`.
pub(crate) const MAX_N_TABLE: [u8; TABLE_LEN] = [
    0, 11, 1, 0, 3, 0, 0, 20, 2, 0, 1, 0, 6, 0, 0, 1, 31, 0, 0, 2, 8, 0, 1, 0, 0, 4, 0, 3, 0, 1, 0, 2,
];

/// Replacement state used when the caller's state is all zeroes, which is
/// a fixed point of xorshift.
const ZERO_STATE_ESCAPE: u32 = 0x2545_F491;

/// Advances the state with one xorshift32 step and returns the new value.
///
/// The update is a bijection on nonzero states, so a fixed seed yields a
/// fixed, full-period sequence.
#[inline]
pub(crate) fn next_state(state: &mut u32) -> u32 {
    let mut x = *state;
    if x == 0 {
        x = ZERO_STATE_ESCAPE;
    }
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

/// Returns `true` with probability `1 / (n + 1)`.
#[inline]
pub(crate) fn choose(n: usize, state: &mut u32) -> bool {
    if n <= MAX_TABLE_INDEX {
        // Top bits of xorshift are the better-mixed ones.
        let slot = (next_state(state) >> 27) as usize;
        usize::from(MAX_N_TABLE[slot]) >= n
    } else {
        #[allow(clippy::cast_precision_loss)]
        let uniform = f64::from(next_state(state)) / (f64::from(u32::MAX) + 1.0);
        uniform < 1.0 / ((n + 1) as f64)
    }
}

/// Returns a uniform draw from `0..bound`. `bound` must be nonzero.
#[inline]
pub(crate) fn next_below(bound: usize, state: &mut u32) -> usize {
    debug_assert!(bound > 0);
    // Modulo bias is negligible for the subtree sizes this is used with.
    (next_state(state) as usize) % bound
}
