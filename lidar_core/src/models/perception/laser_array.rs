// lidar_core/src/models/perception/laser_array.rs

use super::laser::Laser;
use crate::config::LidarSettings;
use crate::error::ConfigError;

/// Builds the ordered laser set described by `settings`.
///
/// The first half of the identifiers covers the lower FOV half, the second half the
/// upper one. Inside each half the beams are spread evenly, starting at half the FOV
/// and stepping down by `fov / half`, then the whole half is biased by its normal
/// angle. The converted offset is applied along the local down axis: lower lasers get
/// `-offset` and so start above the mount origin, upper lasers `+offset` below it.
pub fn build_laser_array(settings: &LidarSettings) -> Result<Vec<Laser>, ConfigError> {
    settings.validate()?;

    let half = settings.lasers_per_half();
    let upper_step = settings.upper_fov / half as f64;
    let lower_step = settings.lower_fov / half as f64;
    let mut upper_total = settings.upper_fov / 2.0;
    let mut lower_total = settings.lower_fov / 2.0;

    // User offset is given in centimeters-as-percent and split between the halves.
    let offset = (settings.offset / 100.0) / 2.0;

    let mut lasers = Vec::with_capacity(settings.number_of_lasers as usize);
    for id in 0..settings.number_of_lasers {
        if id < half {
            lasers.push(Laser::new(
                id,
                lower_total + settings.lower_normal,
                settings.ray_distance,
                -offset,
            ));
            lower_total -= lower_step;
        } else {
            lasers.push(Laser::new(
                id,
                upper_total - settings.upper_normal,
                settings.ray_distance,
                offset,
            ));
            upper_total -= upper_step;
        }
    }

    log::debug!(
        "Built {} lasers (lower {:.2}..{:.2} deg, upper {:.2}..{:.2} deg)",
        lasers.len(),
        settings.lower_fov / 2.0 + settings.lower_normal,
        settings.lower_fov / 2.0 + settings.lower_normal - lower_step * (half - 1) as f64,
        settings.upper_fov / 2.0 - settings.upper_normal,
        settings.upper_fov / 2.0 - settings.upper_normal - upper_step * (half - 1) as f64,
    );

    Ok(lasers)
}
