//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (one PCG stream per chunk)
//! - Ordered containers wherever iteration order reaches the physics
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod generator;
pub mod state;
pub mod stream;
pub mod surface;
pub mod tick;

pub use body::{Action, BodyEvent, InputSnapshot, InputSource, MotionBody, MotionState};
pub use collision::{Contact, resolve, resolve_flat, resolve_slanted, rests_on};
pub use generator::{Anchor, ChunkGenerator, GeneratedChunk, PathStep, is_valid_placement};
pub use state::{Player, RenderSnapshot, World};
pub use stream::{Chunk, ChunkStream, StreamChange, Viewport};
pub use surface::{Hole, Rect, Surface, SurfaceKind};
pub use tick::{FixedStep, FrameReport, run_frame, tick};
