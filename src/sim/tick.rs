//! Fixed timestep simulation tick
//!
//! Real frame time feeds an accumulator that is drained in constant steps,
//! so trajectories depend only on the input sequence, never on frame rate.

use serde::{Deserialize, Serialize};

use super::body::{BodyEvent, InputSnapshot};
use super::collision::{Contact, resolve, rests_on};
use super::state::World;
use super::stream::{StreamChange, Viewport};

/// Converts variable frame time into whole simulation steps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedStep {
    dt: f32,
    accumulator: f32,
}

impl FixedStep {
    pub fn new(dt: f32) -> Self {
        Self { dt, accumulator: 0.0 }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Time carried over to the next frame, always in `[0, dt)` after draining
    pub fn residual(&self) -> f32 {
        self.accumulator
    }

    /// Add a frame's elapsed time (clamped to `[0, max_frame_time]`)
    pub fn accumulate(&mut self, frame_time: f32, max_frame_time: f32) {
        self.accumulator += frame_time.clamp(0.0, max_frame_time);
    }

    /// Take one step's worth of time if available
    pub fn consume(&mut self) -> bool {
        if self.accumulator >= self.dt {
            self.accumulator -= self.dt;
            true
        } else {
            false
        }
    }
}

/// What happened during one rendered frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub steps: u32,
    pub stream: Option<StreamChange>,
}

/// Advance the world by one fixed physics step
pub fn tick(world: &mut World, input: &InputSnapshot, dt: f32) {
    let World {
        tuning,
        player,
        stream,
        time_ticks,
        ..
    } = world;

    let prev = player.position;
    player.body.step(&mut player.position, input, tuning, dt);

    // Playfield sides
    let max_x = tuning.screen_width - player.size.x;
    if player.position.x < 0.0 || player.position.x > max_x {
        player.position.x = player.position.x.clamp(0.0, max_x);
        player.body.velocity.x = 0.0;
    }

    let snap = if player.body.is_grounded() {
        tuning.ground_snap
    } else {
        0.0
    };

    // Every active surface is queried; only the first landing counts
    let mut landed = false;
    for surface in stream.active_surfaces() {
        let mut position = player.position;
        let mut velocity = player.body.velocity;
        let contact = resolve(&mut position, &mut velocity, player.size, prev, surface, snap);
        if contact == Contact::None || (landed && contact == Contact::LandedOnTop) {
            continue;
        }
        log::trace!("tick {}: {:?} with {:?}", time_ticks, contact, surface.kind);
        player.position = position;
        player.body.velocity = velocity;
        player.body.on_contact(contact, tuning);
        landed |= contact == Contact::LandedOnTop;
    }

    if !landed && player.body.is_grounded() {
        let supported = stream
            .active_surfaces()
            .any(|s| rests_on(player.position, player.size, s));
        if !supported {
            player.body.apply(BodyEvent::LeftGround, tuning);
        }
    }

    *time_ticks += 1;
}

/// Run one rendered frame: drain the accumulator, then re-evaluate streaming once
pub fn run_frame(
    world: &mut World,
    frame_time: f32,
    input: InputSnapshot,
    viewport: &mut impl Viewport,
) -> FrameReport {
    world
        .stepper
        .accumulate(frame_time, world.tuning.max_frame_time);

    let mut steps = 0;
    while world.stepper.consume() {
        let dt = world.stepper.dt();
        tick(world, &input, dt);
        steps += 1;
    }

    let stream = world.stream.update(world.player.position.y, viewport);
    FrameReport { steps, stream }
}
