// lidar_sim/src/simulation/plugins/consumers/mod.rs

pub mod scan_stats;
