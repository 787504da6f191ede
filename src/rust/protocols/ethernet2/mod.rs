// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod aligner;
pub mod crc;
mod decoder;
pub mod encoder;
mod frame;
pub mod padding;
mod protocol;

//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::{
    aligner::SfdAligner,
    crc::{
        checksum,
        Crc32,
    },
    decoder::{
        FrameDecoder,
        RxError,
        RxEvent,
        RxState,
        RxStats,
    },
    encoder::{
        encode,
        FrameEncoder,
        TxState,
        TxStats,
    },
    frame::{
        Frame,
        Payload,
        ETHERNET2_HEADER_SIZE,
        MAX_PAYLOAD_SIZE,
        MIN_PAYLOAD_SIZE,
    },
    protocol::{
        payload_length,
        ETHERTYPE_LENGTH_MAX,
        ETHERTYPE_TYPE_MIN,
    },
};
