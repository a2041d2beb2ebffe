//! Test fixtures for delivery-planner.
//!
//! Provides:
//! - Real Bristol-area postcode coordinates
//! - Travel-time service doubles that count and script their answers

#![allow(dead_code)]

pub mod bristol_locations;
pub mod services;

#[allow(unused_imports)]
pub use bristol_locations::*;
#[allow(unused_imports)]
pub use services::*;
