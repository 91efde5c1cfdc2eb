//! Message Validator.
//!
//! The low 6 bits of the content are a flag block:
//!
//! ```text
//!  bit 5   bit 4   bit 3   bit 2   bit 1   bit 0
//!  [ F5 ]  [ F4 ]  [ F3 ]  [ F2 ]  [ F1 ]  [ F0 ]
//! ```
//!
//! 1. F5 excludes F0..F4.
//! 2. F4 requires F3.
//! 3. F2 excludes F0..F1.
//!
//! Higher bits are free payload. Every mask is applied with a bounded-width
//! AND, so content wider than [`MESSAGE_MAX_BITS`] is rejected before any
//! rule is looked at.

use alloy_primitives::U256;
use thiserror::Error;
use tracing::debug;

/// Width of the bounded AND used for every mask.
pub const MESSAGE_MAX_BITS: usize = 254;

const FLAG_5: u64 = 0b100000;
const FLAGS_0_TO_4: u64 = 0b011111;
const FLAG_4: u64 = 0b010000;
const FLAG_3: u64 = 0b001000;
const FLAG_2: u64 = 0b000100;
const FLAGS_0_TO_1: u64 = 0b000011;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("content exceeds 254 bits ({bits} bits)")]
    ContentTooWide { bits: usize },
    #[error("Condition 1 failed")]
    Condition1Failed,
    #[error("Condition 2 failed")]
    Condition2Failed,
    #[error("Condition 3 failed")]
    Condition3Failed,
}

/// Message submitted through `send_message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Message {
    pub content: U256,
}

impl Message {
    pub fn new(content: U256) -> Self {
        Self { content }
    }

    /// Runs the validator on this message's content.
    pub fn check(&self) -> Result<(), MessageError> {
        validate(self.content)
    }
}

impl From<U256> for Message {
    fn from(content: U256) -> Self {
        Self { content }
    }
}

/// `value & mask` over [`MESSAGE_MAX_BITS`] bits; wider values are rejected.
pub fn bounded_and(value: U256, mask: U256) -> Result<U256, MessageError> {
    let bits = value.bit_len();
    if bits > MESSAGE_MAX_BITS {
        return Err(MessageError::ContentTooWide { bits });
    }
    Ok(value & mask)
}

/// Material implication over two masked reads: `premise != 0 -> holds`.
fn implies(premise: U256, holds: bool) -> bool {
    premise.is_zero() || holds
}

/// Checks the three flag rules in order and reports the first violation.
pub fn validate(content: U256) -> Result<(), MessageError> {
    let and = |mask: u64| bounded_and(content, U256::from(mask));

    // Condition 1: bit 5 is exclusive of bits 0..4
    let ok = implies(and(FLAG_5)?, and(FLAGS_0_TO_4)?.is_zero());
    if !ok {
        debug!(%content, "condition 1 violated");
        return Err(MessageError::Condition1Failed);
    }

    // Condition 2: bit 4 implies bit 3
    let ok = implies(and(FLAG_4)?, !and(FLAG_3)?.is_zero());
    if !ok {
        debug!(%content, "condition 2 violated");
        return Err(MessageError::Condition2Failed);
    }

    // Condition 3: bit 2 is exclusive of bits 0..1
    let ok = implies(and(FLAG_2)?, and(FLAGS_0_TO_1)?.is_zero());
    if !ok {
        debug!(%content, "condition 3 violated");
        return Err(MessageError::Condition3Failed);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(x: u64) -> Result<(), MessageError> {
        validate(U256::from(x))
    }

    /// Reference model over the low 6 bits.
    fn model(flags: u8) -> Result<(), MessageError> {
        let bit = |i: u8| flags & (1 << i) != 0;
        if bit(5) && flags & 0b011111 != 0 {
            return Err(MessageError::Condition1Failed);
        }
        if bit(4) && !bit(3) {
            return Err(MessageError::Condition2Failed);
        }
        if bit(2) && flags & 0b000011 != 0 {
            return Err(MessageError::Condition3Failed);
        }
        Ok(())
    }

    #[test]
    fn condition_1_violations() {
        for flags in [0b110000, 0b101000, 0b100100, 0b100010, 0b100001] {
            assert_eq!(v(flags), Err(MessageError::Condition1Failed), "{flags:#08b}");
        }
    }

    #[test]
    fn condition_2_violations() {
        assert_eq!(v(0b010000), Err(MessageError::Condition2Failed));
        assert_eq!(v(0b010100), Err(MessageError::Condition2Failed));
    }

    #[test]
    fn condition_3_violations() {
        for flags in [0b000110, 0b000101, 0b000111] {
            assert_eq!(v(flags), Err(MessageError::Condition3Failed), "{flags:#08b}");
        }
    }

    #[test]
    fn lowest_condition_reported_first() {
        // violates 1 and 2
        assert_eq!(v(0b110000), Err(MessageError::Condition1Failed));
        // violates 2 and 3
        assert_eq!(v(0b010101), Err(MessageError::Condition2Failed));
        // violates 1 and 3
        assert_eq!(v(0b100111), Err(MessageError::Condition1Failed));
    }

    #[test]
    fn accepted_flag_blocks() {
        for flags in [0, 0b100000, 0b011000, 0b011100, 0b001000, 0b000100, 0b000011, 0b011011] {
            assert_eq!(v(flags), Ok(()), "{flags:#08b}");
        }
    }

    #[test]
    fn payload_bits_are_ignored() {
        let content = U256::from(0b1111111100000000001111111111111000_011100u64);
        assert_eq!(validate(content), Ok(()));
        assert_eq!(Message::new(content).check(), Ok(()));
    }

    #[test]
    fn width_bound() {
        let widest = (U256::from(1u8) << (MESSAGE_MAX_BITS - 1)) | U256::from(0b011100u8);
        assert_eq!(validate(widest), Ok(()));

        let too_wide = U256::from(1u8) << MESSAGE_MAX_BITS;
        assert_eq!(
            validate(too_wide),
            Err(MessageError::ContentTooWide { bits: MESSAGE_MAX_BITS + 1 })
        );
        assert_eq!(
            bounded_and(U256::MAX, U256::from(1u8)),
            Err(MessageError::ContentTooWide { bits: 256 })
        );
    }

    #[test]
    fn error_labels() {
        assert_eq!(MessageError::Condition1Failed.to_string(), "Condition 1 failed");
        assert_eq!(MessageError::Condition2Failed.to_string(), "Condition 2 failed");
        assert_eq!(MessageError::Condition3Failed.to_string(), "Condition 3 failed");
    }

    proptest! {
        #[test]
        fn agrees_with_flag_model(payload in any::<u128>(), flags in 0u8..64) {
            let content = (U256::from(payload) << 6) | U256::from(flags);
            prop_assert_eq!(validate(content), model(flags));
        }

        #[test]
        fn only_low_six_bits_matter(high in any::<[u8; 31]>(), flags in 0u8..64) {
            let mut bytes = [0u8; 32];
            bytes[..31].copy_from_slice(&high);
            bytes[0] &= 0b0011_1111; // keep within 254 bits
            bytes[31] = flags;
            let content = U256::from_be_bytes(bytes);
            prop_assert_eq!(validate(content), model(flags));
        }
    }
}
