// lidar_core/src/lib.rs

// This file defines the public modules of your library.
pub mod config;
pub mod error;
pub mod messages;
pub mod models;
pub mod prelude;
pub mod scanning;
pub mod types;
