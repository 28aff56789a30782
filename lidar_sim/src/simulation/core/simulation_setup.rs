// lidar_sim/src/simulation/core/simulation_setup.rs

use std::time::Duration;

use crate::prelude::*;
use crate::simulation::core::events::{ApplyLidarSettings, ScanEvent, SetLidarPaused};

pub struct SimulationSetupPlugin;

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        let simulation = app
            .world()
            .get_resource::<ScenarioConfig>()
            .map(|config| config.simulation.clone())
            .unwrap_or_default();

        app.add_event::<ScanEvent>()
            .add_event::<ApplyLidarSettings>()
            .add_event::<SetLidarPaused>();

        let tick_rate_hz = if simulation.tick_rate_hz.is_finite() && simulation.tick_rate_hz > 0.0 {
            simulation.tick_rate_hz
        } else {
            let fallback = SimulationSection::default().tick_rate_hz;
            warn!(
                "Invalid tick_rate_hz {}, falling back to {} Hz.",
                simulation.tick_rate_hz, fallback
            );
            fallback
        };

        // The sensors' notion of "dt" is exactly this fixed timestep.
        app.insert_resource(Time::<Fixed>::from_duration(Duration::from_secs_f64(
            1.0 / tick_rate_hz,
        )));
        app.insert_resource(SimulationDuration(simulation.duration_seconds));

        // --- CONFIGURE THE SPAWNING PIPELINE ---
        app.configure_sets(
            OnEnter(AppState::SceneBuilding),
            (
                SceneBuildSet::World,
                SceneBuildSet::Sensors,
                SceneBuildSet::Finalize,
            )
                .chain(),
        )
        .add_systems(
            OnEnter(AppState::SceneBuilding),
            transition_to_running.in_set(SceneBuildSet::Finalize),
        );

        // --- RUNTIME ---
        app.configure_sets(
            FixedUpdate,
            (SimulationSet::Sensors, SimulationSet::Consumers).chain(),
        )
        .add_systems(
            Update,
            (
                keyboard_pause_toggle.run_if(resource_exists::<ButtonInput<KeyCode>>),
                apply_pause_requests,
                exit_after_duration,
            )
                .chain()
                .run_if(in_state(AppState::Running).or(in_state(AppState::Paused))),
        );
    }
}

/// How long the run lasts in simulated seconds. `None` runs until the window closes.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimulationDuration(pub Option<f64>);

/// This simple system runs once at the end of the `OnEnter(SceneBuilding)` chain.
fn transition_to_running(mut next_state: ResMut<NextState<AppState>>) {
    info!("Scene building complete. Transitioning to Running state.");
    next_state.set(AppState::Running);
}

/// Space toggles between `Running` and `Paused` in windowed mode.
fn keyboard_pause_toggle(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<AppState>>,
    mut pause_writer: EventWriter<SetLidarPaused>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        pause_writer.write(SetLidarPaused(*state.get() != AppState::Paused));
    }
}

fn apply_pause_requests(
    mut requests: EventReader<SetLidarPaused>,
    state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    // Only the latest request in a frame matters.
    let Some(SetLidarPaused(paused)) = requests.read().last().copied() else {
        return;
    };
    match (state.get(), paused) {
        (AppState::Running, true) => next_state.set(AppState::Paused),
        (AppState::Paused, false) => next_state.set(AppState::Running),
        _ => {}
    }
}

fn exit_after_duration(
    duration: Res<SimulationDuration>,
    time: Res<Time<Fixed>>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(limit) = duration.0 else {
        return;
    };
    if time.elapsed_secs_f64() >= limit {
        info!("Reached configured duration of {:.2}s. Exiting.", limit);
        exit.write(AppExit::Success);
    }
}
