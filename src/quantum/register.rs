// src/quantum/register.rs
//! Classical bit storage written by measurements and read by conditions

use std::fmt;

use crate::error::{QuantumError, Result};

/// An indexed register of classical bits.
///
/// Every bit starts undefined and becomes 0 or 1 on its first write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassicalRegister {
    bits: Vec<Option<bool>>,
}

impl ClassicalRegister {
    /// Create a register of `size` undefined bits
    pub fn new(size: usize) -> Self {
        ClassicalRegister {
            bits: vec![None; size],
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Current value of a bit, `None` if it was never written
    pub fn get(&self, bit: usize) -> Result<Option<bool>> {
        self.bits
            .get(bit)
            .copied()
            .ok_or(QuantumError::ClassicalBitOutOfRange {
                bit,
                bit_count: self.bits.len(),
            })
    }

    /// Value of a bit that must already have been written
    pub fn read(&self, bit: usize) -> Result<bool> {
        self.get(bit)?.ok_or(QuantumError::UnmeasuredClassicalBit(bit))
    }

    /// Write a bit
    pub fn set(&mut self, bit: usize, value: bool) -> Result<()> {
        let bit_count = self.bits.len();
        let slot = self
            .bits
            .get_mut(bit)
            .ok_or(QuantumError::ClassicalBitOutOfRange { bit, bit_count })?;
        *slot = Some(value);
        Ok(())
    }

    /// Bit string with bit 0 rightmost; undefined bits print as `0`
    pub fn to_bit_string(&self) -> String {
        self.bits
            .iter()
            .rev()
            .map(|bit| if bit.unwrap_or(false) { '1' } else { '0' })
            .collect()
    }
}

impl fmt::Display for ClassicalRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bit_string())
    }
}
