// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::fail::Fail;
use ::libc::EINVAL;
use ::std::{
    fmt,
    str::FromStr,
};

//======================================================================================================================
// Constants
//======================================================================================================================

/// Size of a MAC address in bytes.
pub const MAC_ADDRESS_SIZE: usize = 6;

//======================================================================================================================
// Structures
//======================================================================================================================

/// MAC Address
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct MacAddress(eui48::MacAddress);

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl MacAddress {
    pub const fn new(bytes: [u8; MAC_ADDRESS_SIZE]) -> Self {
        MacAddress(eui48::MacAddress::new(bytes))
    }

    /// Returns the array of bytes composing the target [MacAddress], first transmitted octet first.
    pub fn octets(&self) -> [u8; MAC_ADDRESS_SIZE] {
        self.0.to_array()
    }

    pub fn broadcast() -> MacAddress {
        MacAddress(eui48::MacAddress::broadcast())
    }

    pub fn nil() -> MacAddress {
        MacAddress(eui48::MacAddress::nil())
    }

    pub fn is_broadcast(self) -> bool {
        self.0.is_broadcast()
    }

    pub fn is_multicast(self) -> bool {
        self.0.is_multicast()
    }

    /// Parses a colon or dash separated MAC address (e.g. `aa:bb:cc:dd:ee:ff`).
    pub fn parse_canonical_str(canonical_macaddr_string: &str) -> Result<Self, Fail> {
        match eui48::MacAddress::parse_str(canonical_macaddr_string) {
            Ok(addr) => Ok(Self(addr)),
            Err(_) => {
                let cause: String = format!("failed to parse MAC Address (addr={:?})", canonical_macaddr_string);
                Err(Fail::new(EINVAL, &cause))
            },
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for MacAddress {
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_hex_string())
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MacAddress({})", &self.0.to_hex_string())
    }
}

impl FromStr for MacAddress {
    type Err = Fail;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MacAddress::parse_canonical_str(s)
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
