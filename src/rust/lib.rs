// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(clippy::all)]

#[macro_use]
extern crate log;

pub mod ethstream;
pub mod protocols;
pub mod runtime;

pub use self::{
    ethstream::config::Config,
    protocols::{
        ethernet2::{
            Crc32,
            Frame,
            FrameDecoder,
            FrameEncoder,
            RxError,
            RxEvent,
            RxState,
            SfdAligner,
            TxState,
        },
        layer1::StreamBeat,
    },
    runtime::{
        fail::Fail,
        network::types::MacAddress,
    },
};

//======================================================================================================================
// Macros
//======================================================================================================================

/// Ensures that two expressions are equivalent, bailing out of the enclosing `anyhow` context otherwise.
#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr $(,)?) => {{
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    ::anyhow::bail!(
                        r#"ensure failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`"#,
                        &*left_val,
                        &*right_val
                    )
                }
            },
        }
    }};
}

/// Ensures that two expressions are not equivalent, bailing out of the enclosing `anyhow` context otherwise.
#[macro_export]
macro_rules! ensure_neq {
    ($left:expr, $right:expr $(,)?) => {{
        match (&$left, &$right) {
            (left_val, right_val) => {
                if *left_val == *right_val {
                    ::anyhow::bail!(
                        r#"ensure failed: `(left != right)`
  left: `{:?}`,
 right: `{:?}`"#,
                        &*left_val,
                        &*right_val
                    )
                }
            },
        }
    }};
}
