use crate::FastMap;
use crate::U256_1;
use crate::error::MathError;
use crate::math::bit_math::{least_significant_bit, most_significant_bit};
use alloy_primitives::U256;

/// Splits a compressed tick (`tick / tick_spacing`) into its bitmap word
/// index and bit position within that word.
///
/// Negative ticks map to negative words, with `-1` landing on bit 255 of
/// word `-1`.
#[inline]
pub fn position(compressed: i32) -> (i16, u8) {
    ((compressed >> 8) as i16, (compressed & 0xff) as u8)
}

/// Returns the bitmap word stored at `word`, or zero if absent.
#[inline]
pub fn get_word(bitmap: &FastMap<i16, U256>, word: i16) -> U256 {
    bitmap.get(&word).copied().unwrap_or(U256::ZERO)
}

/// Toggles the initialized bit of `tick`.
///
/// Fails with `MathError::OutOfBounds` if `tick` is not a multiple of
/// `tick_spacing`. Words that become empty are dropped, so the map only
/// holds words with at least one initialized tick.
pub fn flip_tick(
    tick_bitmap: &mut FastMap<i16, U256>,
    tick: i32,
    tick_spacing: i32,
) -> Result<(), MathError> {
    if tick_spacing <= 0 {
        return Err(MathError::DivisionByZero);
    }
    if tick % tick_spacing != 0 {
        return Err(MathError::OutOfBounds);
    }

    let (word_pos, bit_pos) = position(tick / tick_spacing);
    let word = get_word(tick_bitmap, word_pos) ^ (U256_1 << bit_pos);
    if word.is_zero() {
        tick_bitmap.remove(&word_pos);
    } else {
        tick_bitmap.insert(word_pos, word);
    }
    Ok(())
}

/// Returns the next initialized tick contained in the same bitmap word as
/// `tick`, searching to the left (`lte`, at or below `tick`) or to the
/// right (strictly above `tick`).
///
/// When no initialized tick exists in the word, the word's boundary tick
/// is returned with `false`; the caller then steps across the boundary and
/// searches again. The returned tick may lie outside `[MIN_TICK, MAX_TICK]`
/// and should be clamped before use.
pub fn next_initialized_tick_within_one_word(
    bitmap: &FastMap<i16, U256>,
    tick: i32,
    tick_spacing: i32,
    lte: bool,
) -> Result<(i32, bool), MathError> {
    if tick_spacing <= 0 {
        return Err(MathError::DivisionByZero);
    }

    // round towards negative infinity
    let mut compressed = tick / tick_spacing;
    if tick < 0 && tick % tick_spacing != 0 {
        compressed -= 1;
    }

    if lte {
        let (word_pos, bit_pos) = position(compressed);
        // all bits at or to the right of bit_pos
        let mask = (U256_1 << bit_pos).wrapping_sub(U256_1) | (U256_1 << bit_pos);
        let masked = get_word(bitmap, word_pos) & mask;

        if masked.is_zero() {
            Ok(((compressed - bit_pos as i32) * tick_spacing, false))
        } else {
            let msb = most_significant_bit(masked)?;
            Ok(((compressed - (bit_pos - msb) as i32) * tick_spacing, true))
        }
    } else {
        let (word_pos, bit_pos) = position(compressed + 1);
        // all bits at or to the left of bit_pos
        let mask = !(U256_1 << bit_pos).wrapping_sub(U256_1);
        let masked = get_word(bitmap, word_pos) & mask;

        if masked.is_zero() {
            Ok(((compressed + 1 + (u8::MAX - bit_pos) as i32) * tick_spacing, false))
        } else {
            let lsb = least_significant_bit(masked)?;
            Ok(((compressed + 1 + (lsb - bit_pos) as i32) * tick_spacing, true))
        }
    }
}
