//! Random placement of bodies.
//!
//! ```text
//! +-----+-------------------------------+-----+
//! |     |                               |     |
//! |  S  |          planet area          |  T  |
//! |     |                               |     |
//! +-----+-------------------------------+-----+
//! ```
//!
//! The start body sits in the left band, the target body in the right band,
//! every other body in the planet area between them. No two bodies are
//! closer than the sum of their radii times the spread factor.

use bevy::log::{debug, info};
use bevy::math::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{BodyTemplate, ConfigError, GameSettings, WorldConfig};
use crate::geometry::{Point, Rect};
use crate::physics::{Body, BodyCategory};

/// Complete placement runs before giving up.
pub const MAX_ATTEMPTS: usize = 5;

/// Random positions tried per body within one run.
pub const PLACEMENT_TRIES: usize = 1000;

/// Start and target bodies are kept this fraction of the height away from
/// the top and bottom edges.
const EDGE_MARGIN: f64 = 0.2;

/// Errors from body generation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("could not place all bodies in {attempts} attempts")]
    Infeasible { attempts: usize },

    #[error(transparent)]
    Settings(#[from] ConfigError),
}

/// Bodies of a new universe.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedBodies {
    /// Start body first, target body second.
    pub bodies: Vec<Body>,
}

impl GeneratedBodies {
    /// Index of the start body.
    pub const START: usize = 0;
    /// Index of the target body.
    pub const TARGET: usize = 1;

    pub fn start(&self) -> &Body {
        &self.bodies[Self::START]
    }

    pub fn target(&self) -> &Body {
        &self.bodies[Self::TARGET]
    }
}

/// Places bodies according to the game settings.
#[derive(Clone, Debug)]
pub struct PlanetGenerator {
    settings: GameSettings,
    world: WorldConfig,
}

impl PlanetGenerator {
    pub fn new(settings: GameSettings, world: WorldConfig) -> Self {
        Self { settings, world }
    }

    /// Generate with a generator seeded from `seed`.
    ///
    /// The same seed and settings always give the same bodies.
    pub fn run_seeded(&self, seed: u64) -> Result<GeneratedBodies, GenerationError> {
        self.run(&mut ChaCha8Rng::seed_from_u64(seed))
    }

    /// Generate all bodies.
    ///
    /// Categories are placed largest first. When a body finds no free spot,
    /// the whole run starts over, start and target included.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GeneratedBodies, GenerationError> {
        self.settings.validate()?;
        self.world.validate()?;

        for attempt in 1..=MAX_ATTEMPTS {
            if let Some(bodies) = self.attempt(rng) {
                info!(
                    "Generated {} bodies (attempt {attempt})",
                    bodies.len()
                );
                return Ok(GeneratedBodies { bodies });
            }
            debug!("Body placement attempt {attempt} failed");
        }

        Err(GenerationError::Infeasible {
            attempts: MAX_ATTEMPTS,
        })
    }

    fn attempt<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Vec<Body>> {
        let rect = self.world.rect;
        let normal = self.settings.template(BodyCategory::Normal);

        let start_x = rect.min.x + self.world.start_area_width / 2.0;
        let target_x = rect.max.x - self.world.target_area_width / 2.0;
        let mut bodies = vec![
            self.make_body(&normal, DVec2::new(start_x, self.edge_y(rng)), rng),
            self.make_body(&normal, DVec2::new(target_x, self.edge_y(rng)), rng),
        ];

        let planet_rect = self.world.planet_rect();
        for category in BodyCategory::PLACEMENT_ORDER {
            let template = self.settings.template(category);
            for _ in 0..template.count {
                let pos = self.place(&template, &planet_rect, &bodies, rng)?;
                bodies.push(self.make_body(&template, pos, rng));
            }
        }
        Some(bodies)
    }

    /// A free spot for a body of `template`, if one turns up.
    fn place<R: Rng + ?Sized>(
        &self,
        template: &BodyTemplate,
        area: &Rect,
        placed: &[Body],
        rng: &mut R,
    ) -> Option<Point> {
        let spread = self.settings.planet_spread;
        let inner = area.inset(template.radius * spread)?;

        (0..PLACEMENT_TRIES)
            .map(|_| random_point(&inner, rng))
            .find(|&p| {
                placed.iter().all(|b| {
                    p.distance(b.center()) >= (template.radius + b.radius()) * spread
                })
            })
    }

    fn make_body<R: Rng + ?Sized>(&self, template: &BodyTemplate, pos: Point, rng: &mut R) -> Body {
        let rotation = match template.category {
            BodyCategory::Black => 0.0,
            _ => self.random_rotation(rng),
        };
        Body::new(template.category, pos, template.radius, rotation, template.density)
    }

    /// Base rotation, randomly scaled by 0.5 to 1.5 and randomly reversed.
    fn random_rotation<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let speed = self.settings.planet_rotation() * rng.gen_range(0.5..=1.5);
        if rng.gen_bool(0.5) { speed } else { -speed }
    }

    fn edge_y<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let rect = self.world.rect;
        let margin = rect.height() * EDGE_MARGIN;
        rng.gen_range(rect.min.y + margin..=rect.max.y - margin)
    }
}

fn random_point<R: Rng + ?Sized>(rect: &Rect, rng: &mut R) -> Point {
    DVec2::new(
        rng.gen_range(rect.min.x..=rect.max.x),
        rng.gen_range(rect.min.y..=rect.max.y),
    )
}
