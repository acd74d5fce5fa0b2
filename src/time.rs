//! Game clock advancement.
//!
//! Handles progression of simulation time based on scale and pause state.

use bevy::prelude::*;

use crate::types::SimulationTime;

/// Plugin providing time advancement functionality.
pub struct TimePlugin;

impl Plugin for TimePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationTime>()
            .add_systems(Update, advance_time);
    }
}

/// Advance simulation time based on scale and pause state.
///
/// `scale` is the number of simulation seconds per real second.
fn advance_time(mut sim_time: ResMut<SimulationTime>, time: Res<Time>) {
    if sim_time.paused {
        return;
    }

    let dt = time.delta_secs_f64() * sim_time.scale;
    sim_time.current += dt;
}
