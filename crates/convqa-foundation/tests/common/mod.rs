//! Common test utilities shared across the `convqa-foundation` integration tests.
//!
//! This module is not a standalone test binary. It is declared with
//! `mod common;` inside each integration test file that needs it.

#![allow(dead_code)]

pub mod fakes;
pub mod scripted_model;
