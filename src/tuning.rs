//! Data-driven game balance
//!
//! Every tunable the simulation and the generator read lives in [`Tuning`].
//! Values are fixed once a world is built; there is no hot reload.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Inclusive random range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draw a value from the range (returns `min` for a collapsed range)
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min < 0.0 || self.max < self.min || !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::InvalidRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn check_fraction(&self, field: &'static str) -> Result<(), ConfigError> {
        self.check(field)?;
        for value in [self.min, self.max] {
            if value <= 0.0 || value > 1.0 {
                return Err(ConfigError::InvalidFraction { field, value });
            }
        }
        Ok(())
    }
}

/// Simulation and generation constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    // === World ===
    /// Playfield width (world units)
    pub screen_width: f32,
    /// Height of one generated chunk
    pub chunk_height: f32,
    /// Platforms stay at least this far from the side edges
    pub margin: f32,

    // === Body ===
    pub body_width: f32,
    pub body_height: f32,
    /// Horizontal acceleration toward input direction (units/s²)
    pub acceleration: f32,
    /// Horizontal deceleration with no input (units/s²)
    pub friction: f32,
    pub max_speed_x: f32,
    pub max_speed_y: f32,
    /// Vertical acceleration, negative pulls down (units/s²)
    pub gravity: f32,
    /// Jump charge gained per second of held jump
    pub charge_rate: f32,
    /// Charge cap, also the take-off velocity of a full jump
    pub max_charge: f32,
    /// Recovery after a jump before charging can start again (s)
    pub jump_cooldown: f32,
    /// Movement lockout after a side hit (s)
    pub stun_duration: f32,
    /// Horizontal velocity multiplier applied on a side hit
    pub bounce_force: f32,
    /// Distance within which a grounded body stays glued to a slanted surface
    pub ground_snap: f32,

    // === Jump envelope (what the generator may ask of the body) ===
    pub max_jump_height: f32,
    pub max_jump_width: f32,
    /// Vertical advance per path step, as a fraction of `max_jump_height`
    pub jump_height_fraction: Span,
    /// Horizontal displacement per path step, as a fraction of `max_jump_width`
    pub jump_width_fraction: Span,
    /// Horizontal stretch per chunk index
    pub difficulty_per_chunk: f32,
    /// Upper bound on the horizontal stretch
    pub difficulty_cap: f32,

    // === Platforms ===
    pub platform_width: Span,
    pub platform_thickness: f32,
    /// Largest rise (either sign) of a path platform
    pub max_rise: f32,
    /// Extra width for platforms reached by a long horizontal jump
    pub ledge_grace: f32,
    /// Padding added to each side of both boxes in the overlap check
    pub padding_x: f32,
    pub padding_y: f32,
    /// Minimum vertical gap between horizontally overlapping surfaces
    pub headroom_clearance: f32,
    pub wall_probability: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,

    // === Generator loop ===
    /// Upward cursor nudge after a rejected candidate
    pub retry_nudge: f32,
    /// The path loop stops once both cursors reach `chunk_top - safety_margin`
    pub safety_margin: f32,
    /// Bottom of the full-width ground in chunk 0
    pub ground_y: f32,
    pub ground_thickness: f32,
    /// Anchor start X positions on the ground, as fractions of `screen_width`
    pub anchor_start: [f32; 2],

    // === Decoys ===
    pub decoys_per_chunk: usize,
    pub decoy_width: Span,
    pub decoy_max_rise: f32,
    pub hole_probability: f32,
    /// Hole width as a fraction of the decoy width
    pub hole_fraction: Span,

    // === Frame pacing ===
    /// Longest real frame time fed to the accumulator (s)
    pub max_frame_time: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            screen_width: 800.0,
            chunk_height: 600.0,
            margin: 100.0,

            body_width: 40.0,
            body_height: 60.0,
            acceleration: 2000.0,
            friction: 1800.0,
            max_speed_x: 300.0,
            max_speed_y: 1200.0,
            gravity: -1800.0,
            charge_rate: 1600.0,
            max_charge: 900.0,
            jump_cooldown: 0.15,
            stun_duration: 0.3,
            bounce_force: 0.6,
            ground_snap: 4.0,

            max_jump_height: 200.0,
            max_jump_width: 250.0,
            jump_height_fraction: Span::new(0.65, 0.85),
            jump_width_fraction: Span::new(0.2, 0.8),
            difficulty_per_chunk: 0.02,
            difficulty_cap: 1.2,

            platform_width: Span::new(100.0, 150.0),
            platform_thickness: 18.0,
            max_rise: 20.0,
            ledge_grace: 40.0,
            padding_x: 10.0,
            padding_y: 10.0,
            headroom_clearance: 80.0,
            wall_probability: 0.25,
            wall_height: 50.0,
            wall_thickness: 12.0,

            retry_nudge: 10.0,
            safety_margin: 100.0,
            ground_y: 50.0,
            ground_thickness: 50.0,
            anchor_start: [0.3, 0.7],

            decoys_per_chunk: 2,
            decoy_width: Span::new(80.0, 120.0),
            decoy_max_rise: 30.0,
            hole_probability: 0.35,
            hole_fraction: Span::new(0.25, 0.4),

            max_frame_time: 0.25,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Top of the chunk-0 ground, where the body and both anchors start
    pub fn ground_top(&self) -> f32 {
        self.ground_y + self.ground_thickness
    }

    /// Highest jump the physics can produce: v² / 2g
    pub fn reachable_height(&self) -> f32 {
        self.max_charge * self.max_charge / (2.0 * self.gravity.abs())
    }

    /// Horizontal distance covered at full speed during a full jump's airtime
    pub fn reachable_width(&self) -> f32 {
        2.0 * self.max_charge / self.gravity.abs() * self.max_speed_x
    }

    /// Reject configurations the simulation cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("screen_width", self.screen_width),
            ("chunk_height", self.chunk_height),
            ("body_width", self.body_width),
            ("body_height", self.body_height),
            ("acceleration", self.acceleration),
            ("friction", self.friction),
            ("max_speed_x", self.max_speed_x),
            ("max_speed_y", self.max_speed_y),
            ("charge_rate", self.charge_rate),
            ("max_charge", self.max_charge),
            ("bounce_force", self.bounce_force),
            ("max_jump_height", self.max_jump_height),
            ("max_jump_width", self.max_jump_width),
            ("platform_thickness", self.platform_thickness),
            ("retry_nudge", self.retry_nudge),
            ("ground_thickness", self.ground_thickness),
            ("wall_height", self.wall_height),
            ("wall_thickness", self.wall_thickness),
            ("max_frame_time", self.max_frame_time),
            ("difficulty_cap", self.difficulty_cap),
            ("gravity (magnitude)", -self.gravity),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 || value.is_infinite() {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let non_negative = [
            ("margin", self.margin),
            ("jump_cooldown", self.jump_cooldown),
            ("stun_duration", self.stun_duration),
            ("ground_snap", self.ground_snap),
            ("max_rise", self.max_rise),
            ("ledge_grace", self.ledge_grace),
            ("padding_x", self.padding_x),
            ("padding_y", self.padding_y),
            ("safety_margin", self.safety_margin),
            ("difficulty_per_chunk", self.difficulty_per_chunk),
            ("decoy_max_rise", self.decoy_max_rise),
        ];
        for (field, value) in non_negative {
            if value < 0.0 || !value.is_finite() {
                return Err(ConfigError::InvalidRange {
                    field,
                    min: value,
                    max: value,
                });
            }
        }

        if 2.0 * self.margin >= self.screen_width {
            return Err(ConfigError::InvalidRange {
                field: "margin",
                min: self.margin,
                max: self.screen_width - self.margin,
            });
        }
        if self.safety_margin >= self.chunk_height {
            return Err(ConfigError::InvalidRange {
                field: "safety_margin",
                min: self.safety_margin,
                max: self.chunk_height,
            });
        }

        self.jump_height_fraction.check_fraction("jump_height_fraction")?;
        self.jump_width_fraction.check_fraction("jump_width_fraction")?;
        self.hole_fraction.check_fraction("hole_fraction")?;
        self.platform_width.check("platform_width")?;
        self.decoy_width.check("decoy_width")?;

        for (field, value) in [
            ("wall_probability", self.wall_probability),
            ("hole_probability", self.hole_probability),
            ("anchor_start[0]", self.anchor_start[0]),
            ("anchor_start[1]", self.anchor_start[1]),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidFraction { field, value });
            }
        }

        if self.headroom_clearance < self.body_height {
            return Err(ConfigError::InsufficientHeadroom {
                clearance: self.headroom_clearance,
                body_height: self.body_height,
            });
        }
        if self.max_charge > self.max_speed_y {
            return Err(ConfigError::Unreachable {
                what: "max_charge under the vertical speed cap",
                required: self.max_charge,
                reachable: self.max_speed_y,
            });
        }
        if self.max_jump_height > self.reachable_height() {
            return Err(ConfigError::Unreachable {
                what: "max_jump_height",
                required: self.max_jump_height,
                reachable: self.reachable_height(),
            });
        }
        if self.max_jump_width > self.reachable_width() {
            return Err(ConfigError::Unreachable {
                what: "max_jump_width",
                required: self.max_jump_width,
                reachable: self.reachable_width(),
            });
        }
        Ok(())
    }
}
