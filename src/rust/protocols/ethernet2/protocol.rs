// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

/// Largest EtherType value that still denotes an IEEE 802.3 payload length.
pub const ETHERTYPE_LENGTH_MAX: u16 = 1500;

/// Smallest EtherType value that denotes a protocol type.
pub const ETHERTYPE_TYPE_MIN: u16 = 0x0600;

/// Returns the payload length announced by `ether_type`, if it is a length rather than a type.
pub fn payload_length(ether_type: u16) -> Option<usize> {
    if ether_type <= ETHERTYPE_LENGTH_MAX {
        Some(usize::from(ether_type))
    } else {
        None
    }
}
