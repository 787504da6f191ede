// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::crc::{
    Crc,
    CRC_32_ISO_HDLC,
};

//======================================================================================================================
// Constants
//======================================================================================================================

/// IEEE 802.3 generator polynomial, normal (MSB-first) form.
pub const CRC32_POLYNOMIAL: u32 = 0x04c1_1db7;

/// Generator polynomial in the bit-reflected form used by the LSB-first register.
const CRC32_POLYNOMIAL_REFLECTED: u32 = CRC32_POLYNOMIAL.reverse_bits();

/// Register value at the start of every frame.
pub const CRC32_INITIAL: u32 = 0xffff_ffff;

/// One-shot IEEE 802.3 CRC-32 (reflected, init and xor-out 0xFFFFFFFF).
static FCS_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

//======================================================================================================================
// Structures
//======================================================================================================================

/// Incremental CRC-32 accumulator folding one byte per cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crc32 {
    register: u32,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl Crc32 {
    pub const fn new() -> Self {
        Self {
            register: CRC32_INITIAL,
        }
    }

    pub fn reset(&mut self) {
        self.register = CRC32_INITIAL;
    }

    /// Folds `byte` into the register, least significant bit first.
    pub fn update(&mut self, byte: u8) {
        let mut register: u32 = self.register ^ u32::from(byte);
        for _ in 0..8 {
            register = if register & 1 != 0 {
                (register >> 1) ^ CRC32_POLYNOMIAL_REFLECTED
            } else {
                register >> 1
            };
        }
        self.register = register;
    }

    pub fn update_slice(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.update(*byte);
        }
    }

    /// Returns the checksum of every byte folded so far. Leaves the register untouched.
    pub fn finalize(&self) -> u32 {
        !self.register
    }

    /// [Self::finalize] as it goes on the wire, most significant byte first.
    pub fn fcs(&self) -> [u8; 4] {
        self.finalize().to_be_bytes()
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Computes the IEEE 802.3 CRC-32 of a whole buffer.
pub fn checksum(bytes: &[u8]) -> u32 {
    FCS_CRC.checksum(bytes)
}

/// Computes the IEEE 802.3 CRC-32 of the concatenation of `parts`.
pub fn checksum_parts(parts: &[&[u8]]) -> u32 {
    let mut digest = FCS_CRC.digest();
    for part in parts {
        digest.update(part);
    }
    digest.finalize()
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
