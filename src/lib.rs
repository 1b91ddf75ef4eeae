//! route-planner core
//!
//! Client-side orchestration for requesting a route from an external routing
//! capability, summarizing it, and presenting it on a map scene.

pub mod client;
pub mod config;
pub mod error;
pub mod geo;
pub mod haversine;
pub mod orchestrator;
pub mod osrm;
pub mod presenter;
pub mod request;
pub mod route;
pub mod summary;
pub mod traits;
