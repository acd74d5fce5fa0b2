//! Game driver: one universe, one ship, one clock.
//!
//! [`Game`] ties the generated universe to the player's ship and is
//! available as a Bevy resource. [`GamePlugin`] keeps the ship in step with
//! [`SimulationTime`].

use std::sync::Arc;

use bevy::math::DVec2;
use bevy::prelude::*;
use rand::Rng;

use crate::config::{GameSettings, SCALE_BASE, SimulationConfig, THRUST_SCALE, WorldConfig};
use crate::generator::{GeneratedBodies, GenerationError, PlanetGenerator};
use crate::geometry::{Point, angle_y2m};
use crate::outcome::TrajectoryOutcome;
use crate::physics::Universe;
use crate::ship::{Ship, ShipError};
use crate::types::{SimulationTime, exp_scale};

/// Errors from game commands.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Ship(#[from] ShipError),

    #[error("thrust exponent {0} out of range")]
    ThrustScale(f64),
}

/// A running game.
#[derive(Resource, Debug)]
pub struct Game {
    settings: GameSettings,
    world: WorldConfig,
    universe: Arc<Universe>,
    ship: Ship,
    last_update: f64,
}

impl Game {
    /// Generate a new universe and put a ship on the start body.
    pub fn build<R: Rng + ?Sized>(
        settings: GameSettings,
        world: WorldConfig,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let GeneratedBodies { bodies } =
            PlanetGenerator::new(settings.clone(), world).run(rng)?;
        let universe = Universe::new(bodies, world.rect, settings.gravity_constant());
        Self::from_universe(Arc::new(universe), settings, world)
    }

    /// Start a game in an existing universe.
    pub fn from_universe(
        universe: Arc<Universe>,
        settings: GameSettings,
        world: WorldConfig,
    ) -> Result<Self, GameError> {
        let ship = Self::new_ship(&universe, &world)?;
        info!(
            "New game with {} bodies, G = {:.4e}",
            universe.bodies().len(),
            universe.gravity()
        );
        Ok(Self {
            settings,
            world,
            universe,
            ship,
            last_update: 0.0,
        })
    }

    fn new_ship(universe: &Arc<Universe>, world: &WorldConfig) -> Result<Ship, ShipError> {
        Ship::new(
            universe.clone(),
            world.simulation(),
            GeneratedBodies::START,
            0.0,
            0.0,
        )
    }

    /// Same universe, fresh ship.
    pub fn restart(&mut self) -> Result<(), GameError> {
        self.ship = Self::new_ship(&self.universe, &self.world)?;
        self.last_update = 0.0;
        info!("Game restarted");
        Ok(())
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn world(&self) -> &WorldConfig {
        &self.world
    }

    pub fn simulation(&self) -> SimulationConfig {
        self.world.simulation()
    }

    pub fn universe(&self) -> &Arc<Universe> {
        &self.universe
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    /// Game time of the last update.
    pub fn last_update(&self) -> f64 {
        self.last_update
    }

    /// A clock running at the configured animation speed.
    pub fn clock(&self) -> SimulationTime {
        SimulationTime::starting_at(0.0, self.settings.animation_speed())
    }

    /// Launch the ship with `thrust` (m/s) at game time `t`.
    pub fn launch(&mut self, thrust: f64, t: f64) -> Result<(), GameError> {
        self.ship.launch(thrust, t)?;
        Ok(())
    }

    /// Thrust for exponent `s`: the escape speed of the body the ship rests
    /// on, scaled by `1.3^s`.
    pub fn thrust_for(&self, s: f64) -> Result<f64, GameError> {
        if !(-THRUST_SCALE..=THRUST_SCALE).contains(&s) {
            return Err(GameError::ThrustScale(s));
        }
        let orbit = self.ship.orbit().ok_or(ShipError::NotInOrbit)?;
        let escape = orbit.body().escape_speed(self.universe.gravity(), None);
        Ok(exp_scale(escape, s, SCALE_BASE))
    }

    /// Launch at `t` with thrust exponent `s`. Returns the thrust used.
    pub fn launch_scaled(&mut self, t: f64, s: f64) -> Result<f64, GameError> {
        let thrust = self.thrust_for(s)?;
        self.launch(thrust, t)?;
        Ok(thrust)
    }

    /// Advance the game to `t`.
    pub fn update(&mut self, t: f64) -> Option<TrajectoryOutcome> {
        self.last_update = t;
        let outcome = self.ship.update(t);
        if let Some(TrajectoryOutcome::Landed {
            body: GeneratedBodies::TARGET,
            ..
        }) = outcome
        {
            info!("Target reached after {} launches", self.ship.launches());
        }
        outcome
    }

    /// Unit vectors from each body's center towards its pole at `t`.
    pub fn pole_vectors(&self, t: f64) -> Vec<DVec2> {
        self.universe
            .bodies()
            .iter()
            .map(|b| DVec2::from_angle(angle_y2m(b.angle_at(t))))
            .collect()
    }

    pub fn ship_position(&self, t: f64) -> Option<Point> {
        self.ship.position_at(t)
    }

    /// Returns true if the ship rests on the target body.
    pub fn reached_target(&self) -> bool {
        self.ship.is_on(GeneratedBodies::TARGET)
    }
}

/// Plugin advancing the game with the simulation clock.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationTime>()
            .add_systems(PostUpdate, update_game);
    }
}

/// Bring the ship up to the current simulation time.
fn update_game(game: Option<ResMut<Game>>, sim_time: Res<SimulationTime>) {
    let Some(mut game) = game else {
        return;
    };
    if sim_time.current > game.last_update() {
        game.update(sim_time.current);
    }
}
