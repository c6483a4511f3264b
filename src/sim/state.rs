//! World state and core simulation types
//!
//! Everything that evolves during a run lives in [`World`]. Two worlds built
//! from the same seed and tuning, fed the same inputs, stay bit-identical.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{MotionBody, MotionState};
use super::generator::ChunkGenerator;
use super::stream::{ChunkStream, Viewport};
use super::surface::{Rect, Surface};
use super::tick::FixedStep;
use crate::consts::SIM_DT;
use crate::error::ConfigError;
use crate::tuning::Tuning;

/// Height above the ground the player spawns at
const SPAWN_DROP: f32 = 20.0;
/// Spawn X
const SPAWN_X: f32 = 100.0;

/// The controlled entity: owns its position and composes a motion body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Bottom-left corner
    pub position: Vec2,
    pub size: Vec2,
    pub body: MotionBody,
}

impl Player {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            body: MotionBody::default(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.position, self.size)
    }
}

/// Read-only view handed to the renderer once per frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub body: Rect,
    pub state: MotionState,
    pub charge: f32,
    pub current_chunk: i32,
    pub surfaces: Vec<Surface>,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub seed: u64,
    pub tuning: Tuning,
    pub player: Player,
    pub stream: ChunkStream,
    pub stepper: FixedStep,
    /// Physics steps taken so far
    pub time_ticks: u64,
}

impl World {
    /// Validate the tuning, generate the first two chunks and spawn the player
    pub fn new(seed: u64, tuning: Tuning, viewport: &mut impl Viewport) -> Result<Self, ConfigError> {
        tuning.validate()?;

        let mut stream = ChunkStream::new(ChunkGenerator::new(seed, tuning.clone()), tuning.chunk_height);
        stream.prime(viewport);

        let player = Player::new(
            Vec2::new(SPAWN_X, tuning.ground_top() + SPAWN_DROP),
            Vec2::new(tuning.body_width, tuning.body_height),
        );
        log::info!("World created (seed {})", seed);

        Ok(Self {
            seed,
            tuning,
            player,
            stream,
            stepper: FixedStep::new(SIM_DT),
            time_ticks: 0,
        })
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            tick: self.time_ticks,
            body: self.player.rect(),
            state: self.player.body.state,
            charge: self.player.body.charge(),
            current_chunk: self.stream.current(),
            surfaces: self.stream.active_surfaces().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoViewport;

    impl Viewport for NoViewport {
        fn center_on_chunk(&mut self, _index: i32, _center_y: f32) {}
    }

    #[test]
    fn test_new_world_spawns_above_ground() {
        let world = World::new(1, Tuning::default(), &mut NoViewport).unwrap();
        assert_eq!(world.player.position, Vec2::new(100.0, 120.0));
        assert_eq!(world.player.body.state, MotionState::Airborne);
        assert_eq!(world.stream.loaded_indices(), vec![0, 1]);
    }

    #[test]
    fn test_bad_tuning_fails_at_init() {
        let tuning = Tuning {
            max_jump_width: 0.0,
            ..Default::default()
        };
        assert!(World::new(1, tuning, &mut NoViewport).is_err());
    }

    #[test]
    fn test_snapshot_serializes() {
        let world = World::new(5, Tuning::default(), &mut NoViewport).unwrap();
        let snapshot = world.snapshot();
        assert!(!snapshot.surfaces.is_empty());
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"current_chunk\":0"));
    }
}
