// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

pub mod ethernet2;
pub mod layer1;
