// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod decoder;
mod encoder;

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::{
    fail::Fail,
    network::consts::MAX_MTU,
};
use ::libc::ERANGE;

//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::{
    decoder::{
        DecoderConfig,
        Delimiting,
    },
    encoder::EncoderConfig,
};

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Checks that `mtu` lies within the range supported by standard Ethernet II frames.
fn check_mtu(mtu: usize) -> Result<usize, Fail> {
    if mtu == 0 || mtu > MAX_MTU {
        let cause: String = format!("mtu out of range (mtu={}, max={})", mtu, MAX_MTU);
        error!("check_mtu(): {}", cause);
        return Err(Fail::new(ERANGE, &cause));
    }
    Ok(mtu)
}
