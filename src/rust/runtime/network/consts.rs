// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Constants
//======================================================================================================================

/// Largest payload carried by a standard Ethernet II frame. Jumbo frames are not supported.
pub const MAX_MTU: usize = 1500;

/// Default MTU.
pub const DEFAULT_MTU: usize = MAX_MTU;

/// Number of preamble bytes sent ahead of the start frame delimiter.
pub const PREAMBLE_LENGTH: usize = 7;

/// Preamble byte (alternating bit pattern).
pub const PREAMBLE_BYTE: u8 = 0x55;

/// Start Frame Delimiter.
pub const SFD_BYTE: u8 = 0xd5;

/// Size of the Frame Check Sequence.
pub const FCS_SIZE: usize = 4;

/// Minimum size of an Ethernet frame, from the destination address to the FCS.
/// See: IEEE 802.3 clause 4.4.2.
pub const MIN_FRAME_SIZE: usize = 64;
