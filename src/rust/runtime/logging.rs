// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::flexi_logger::{
    Logger,
    LoggerHandle,
};
use ::std::sync::{
    Once,
    OnceLock,
};

//======================================================================================================================
// Static Variables
//======================================================================================================================

/// Guardian to the logging initialize function.
static INIT_LOG: Once = Once::new();

/// Handle to the global logger. Dropping it would shut the logger down.
static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Log specification used when `RUST_LOG` is not set.
const DEFAULT_LOG_SPEC: &str = "info";

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Initializes logging features. The log specification is read from the `RUST_LOG` environment variable.
pub fn initialize() {
    INIT_LOG.call_once(|| {
        match Logger::try_with_env_or_str(DEFAULT_LOG_SPEC).and_then(|logger| logger.start()) {
            Ok(handle) => {
                let _ = LOGGER.set(handle);
            },
            Err(e) => eprintln!("initialize(): failed to start logger (error={:?})", e),
        }
    });
}
