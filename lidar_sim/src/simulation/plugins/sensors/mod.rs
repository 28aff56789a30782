// lidar_sim/src/simulation/plugins/sensors/mod.rs

pub mod raycasting;
pub mod rotating_lidar;
