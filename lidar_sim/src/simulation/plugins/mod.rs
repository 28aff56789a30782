// lidar_sim/src/simulation/plugins/mod.rs

pub mod consumers;
pub mod debugging;
pub mod sensors;
pub mod world;
