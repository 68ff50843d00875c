//! Smart Grid Dashboard Backend Library
//!
//! Data model, validation contracts and the RPC surface of the grid
//! monitoring dashboard:
//! - Users, devices, sensors and their readings
//! - Documents, chat conversations and dashboard tiles
//! - Alerts with an acknowledge/resolve lifecycle
//! - Dashboard statistics and exports

pub mod api;
pub mod config;
pub mod contracts;
pub mod db;
pub mod error;
pub mod models;
pub mod schema;
pub mod services;
pub mod validation;
