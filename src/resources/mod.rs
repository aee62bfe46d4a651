//! Long-lived data shared by the session and its systems.
//!
//! Overview
//! - `simconfig` – INI-backed simulation settings
//! - `tilemap` – static level geometry queried by collision and raycasts
//! - `worldtime` – simulation time and delta
pub mod simconfig;
pub mod tilemap;
pub mod worldtime;
