// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

pub mod config;
pub mod consts;
pub mod types;
