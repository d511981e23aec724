//! Test helpers module
//!
//! Database setup, fake data and a mock AI gateway shared by the
//! integration tests.

#![allow(dead_code)]

pub mod ai_mock;
pub mod database_helper;
pub mod test_data;

pub use ai_mock::*;
pub use database_helper::*;
pub use test_data::*;
