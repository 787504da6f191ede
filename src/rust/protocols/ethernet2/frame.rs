// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use super::crc;
use crate::runtime::{
    fail::Fail,
    network::{
        consts::{
            FCS_SIZE,
            MAX_MTU,
        },
        types::MacAddress,
    },
};
use ::arrayvec::ArrayVec;
use ::libc::{
    EBADMSG,
    EMSGSIZE,
};
use ::std::fmt;

pub const ETHERNET2_HEADER_SIZE: usize = 14;
pub const MIN_PAYLOAD_SIZE: usize = 46;
pub const MAX_PAYLOAD_SIZE: usize = MAX_MTU;

/// Bounded payload storage.
pub type Payload = ArrayVec<u8, MAX_PAYLOAD_SIZE>;

/// An Ethernet II frame as seen above the codec: addresses, EtherType and payload. Preamble, SFD and FCS only
/// exist on the wire.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Frame {
    // Bytes 0..6
    dst_addr: MacAddress,
    // Bytes 6..12
    src_addr: MacAddress,
    // Bytes 12..14
    ether_type: u16,
    // Bytes 14..
    payload: Payload,
}

impl Frame {
    /// Creates a frame. Fails if `payload` does not fit in a standard Ethernet II frame.
    pub fn new(dst_addr: MacAddress, src_addr: MacAddress, ether_type: u16, payload: &[u8]) -> Result<Self, Fail> {
        let mut buf: Payload = Payload::new();
        if buf.try_extend_from_slice(payload).is_err() {
            let cause: String = format!(
                "payload too large (len={}, max={})",
                payload.len(),
                MAX_PAYLOAD_SIZE
            );
            warn!("new(): {}", cause);
            return Err(Fail::new(EMSGSIZE, &cause));
        }
        Ok(Self {
            dst_addr,
            src_addr,
            ether_type,
            payload: buf,
        })
    }

    /// Reassembles a frame from a received header and payload.
    pub(super) fn from_parts(header: &[u8; ETHERNET2_HEADER_SIZE], payload: Payload) -> Self {
        Self {
            dst_addr: MacAddress::new([header[0], header[1], header[2], header[3], header[4], header[5]]),
            src_addr: MacAddress::new([header[6], header[7], header[8], header[9], header[10], header[11]]),
            ether_type: u16::from_be_bytes([header[12], header[13]]),
            payload,
        }
    }

    /// Parses a stripped wire image (header, payload and FCS) and verifies its FCS.
    pub fn parse(buf: &[u8]) -> Result<Self, Fail> {
        if buf.len() < ETHERNET2_HEADER_SIZE + FCS_SIZE {
            return Err(Fail::new(EBADMSG, "frame too small"));
        }
        let (body, fcs) = buf.split_at(buf.len() - FCS_SIZE);
        let received: u32 = u32::from_be_bytes([fcs[0], fcs[1], fcs[2], fcs[3]]);
        let computed: u32 = crc::checksum(body);
        if received != computed {
            let cause: String = format!("bad FCS (computed={:#010x}, received={:#010x})", computed, received);
            return Err(Fail::new(EBADMSG, &cause));
        }

        let mut header: [u8; ETHERNET2_HEADER_SIZE] = [0; ETHERNET2_HEADER_SIZE];
        header.copy_from_slice(&body[..ETHERNET2_HEADER_SIZE]);
        let mut payload: Payload = Payload::new();
        if payload.try_extend_from_slice(&body[ETHERNET2_HEADER_SIZE..]).is_err() {
            return Err(Fail::new(EMSGSIZE, "payload too large"));
        }
        Ok(Self::from_parts(&header, payload))
    }

    /// Header as transmitted: destination, source, then EtherType high byte first.
    pub fn serialize_header(&self) -> [u8; ETHERNET2_HEADER_SIZE] {
        let mut buf: [u8; ETHERNET2_HEADER_SIZE] = [0; ETHERNET2_HEADER_SIZE];
        buf[0..6].copy_from_slice(&self.dst_addr.octets());
        buf[6..12].copy_from_slice(&self.src_addr.octets());
        buf[12..14].copy_from_slice(&self.ether_type.to_be_bytes());
        buf
    }

    /// CRC-32 over header and payload, i.e. the value carried in the FCS.
    pub fn fcs(&self) -> u32 {
        crc::checksum_parts(&[&self.serialize_header()[..], self.payload()])
    }

    /// Serializes the frame as it appears on the wire once preamble and SFD are stripped.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf: Vec<u8> = Vec::with_capacity(self.wire_len());
        buf.extend_from_slice(&self.serialize_header());
        buf.extend_from_slice(self.payload());
        buf.extend_from_slice(&self.fcs().to_be_bytes());
        buf
    }

    /// Length of the frame from the first destination byte to the last FCS byte.
    pub fn wire_len(&self) -> usize {
        ETHERNET2_HEADER_SIZE + self.payload.len() + FCS_SIZE
    }

    pub fn dst_addr(&self) -> MacAddress {
        self.dst_addr
    }

    pub fn src_addr(&self) -> MacAddress {
        self.src_addr
    }

    pub fn ether_type(&self) -> u16 {
        self.ether_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Appends zeros to the payload until it holds `len` bytes.
    pub(super) fn zero_extend(&mut self, len: usize) {
        while self.payload.len() < len && !self.payload.is_full() {
            self.payload.push(0);
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("dst_addr", &self.dst_addr)
            .field("src_addr", &self.src_addr)
            .field("ether_type", &format_args!("{:#06x}", self.ether_type))
            .field("payload_len", &self.payload.len())
            .finish()
    }
}
