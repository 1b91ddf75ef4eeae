//! Test fixtures for route-planner.
//!
//! Provides:
//! - Real locations around the default trip (from OpenStreetMap)
//! - Recording map scene and notification sink
//! - Routing engines with scripted outcomes

#![allow(dead_code)]

pub mod locations;
pub mod mocks;

pub use locations::*;
pub use mocks::*;
