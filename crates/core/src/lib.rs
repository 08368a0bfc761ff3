// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Herd Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! herd-core: process definitions and environment resolution for the
//! herd supervisor

pub mod definition;
pub mod env;

pub use definition::{ProcessDefinition, RestartBackoff};
pub use env::{merge_env, resolve, substitute, EnvMap};
