//! Motion body: velocity, jump charge and timers for the controlled entity
//!
//! The body never owns a position. [`MotionBody::step`] integrates into a
//! position the caller owns, so the same component can drive any entity.
//!
//! Legal transitions:
//! - `Idle` -> `Charging`: grounded, jump held, cooldown expired
//! - `Charging` -> `Airborne`: jump released, take-off at the accumulated charge
//! - `Airborne` -> `Idle`: top landing reported by the resolver
//! - any -> `Stunned`: side contact reported by the resolver
//! - `Stunned` -> `Idle` / `Airborne`: stun timer expired

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::VELOCITY_EPSILON;
use crate::tuning::Tuning;

use super::collision::Contact;

/// Logical actions the input collaborator can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
}

/// Anything that can answer "is this action held right now"
pub trait InputSource {
    fn is_down(&self, action: Action) -> bool;
}

/// Input state sampled once per frame, reused for every physics step in it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl InputSnapshot {
    pub fn sample(source: &impl InputSource) -> Self {
        Self {
            left: source.is_down(Action::MoveLeft),
            right: source.is_down(Action::MoveRight),
            jump: source.is_down(Action::Jump),
        }
    }

    /// Horizontal direction in [-1, 1]
    pub fn axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.left {
            axis -= 1.0;
        }
        if self.right {
            axis += 1.0;
        }
        axis
    }
}

/// Movement state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionState {
    /// Grounded, free to walk (covers standing and moving)
    Idle,
    /// Grounded, accumulating jump power
    Charging { charge: f32 },
    /// In the air after a jump, a fall or a knock-back
    Airborne,
    /// Recovering from a side hit; horizontal input is ignored
    Stunned { remaining: f32, grounded: bool },
}

impl MotionState {
    pub fn is_grounded(&self) -> bool {
        match self {
            MotionState::Idle | MotionState::Charging { .. } => true,
            MotionState::Airborne => false,
            MotionState::Stunned { grounded, .. } => *grounded,
        }
    }
}

/// Everything that can move the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyEvent {
    /// Jump input held for `dt` seconds
    JumpHeld { dt: f32 },
    JumpReleased,
    Landed,
    /// No supporting surface under a grounded body
    LeftGround,
    HitSide,
    StunExpired,
}

/// Velocity, charge and timers of the controlled body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionBody {
    pub velocity: Vec2,
    pub state: MotionState,
    /// Seconds before charging may start again
    pub jump_cooldown: f32,
}

impl Default for MotionBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            state: MotionState::Airborne,
            jump_cooldown: 0.0,
        }
    }
}

impl MotionBody {
    pub fn is_grounded(&self) -> bool {
        self.state.is_grounded()
    }

    pub fn is_charging(&self) -> bool {
        matches!(self.state, MotionState::Charging { .. })
    }

    /// Accumulated jump charge (zero outside `Charging`)
    pub fn charge(&self) -> f32 {
        match self.state {
            MotionState::Charging { charge } => charge,
            _ => 0.0,
        }
    }

    pub fn stun_timer(&self) -> f32 {
        match self.state {
            MotionState::Stunned { remaining, .. } => remaining,
            _ => 0.0,
        }
    }

    /// Single transition function; events that are illegal in the current
    /// state leave it untouched
    pub fn apply(&mut self, event: BodyEvent, tuning: &Tuning) {
        use BodyEvent as E;
        use MotionState as S;

        let next = match (self.state, event) {
            (S::Idle, E::JumpHeld { dt }) if self.jump_cooldown <= 0.0 => S::Charging {
                charge: (tuning.charge_rate * dt).min(tuning.max_charge),
            },
            (S::Charging { charge }, E::JumpHeld { dt }) => S::Charging {
                charge: (charge + tuning.charge_rate * dt).min(tuning.max_charge),
            },
            (S::Charging { charge }, E::JumpReleased) => {
                self.velocity.y = charge;
                self.jump_cooldown = tuning.jump_cooldown;
                S::Airborne
            }
            (S::Airborne, E::Landed) => S::Idle,
            (S::Stunned { remaining, .. }, E::Landed) => S::Stunned {
                remaining,
                grounded: true,
            },
            (S::Idle | S::Charging { .. }, E::LeftGround) => S::Airborne,
            (S::Stunned { remaining, .. }, E::LeftGround) => S::Stunned {
                remaining,
                grounded: false,
            },
            (state, E::HitSide) => {
                self.velocity.x *= tuning.bounce_force;
                S::Stunned {
                    remaining: tuning.stun_duration,
                    grounded: state.is_grounded(),
                }
            }
            (S::Stunned { grounded, .. }, E::StunExpired) => {
                if grounded {
                    S::Idle
                } else {
                    S::Airborne
                }
            }
            (state, _) => state,
        };

        if next != self.state {
            log::debug!("body {:?} --{:?}--> {:?}", self.state, event, next);
        }
        self.state = next;
    }

    /// Feed a resolver result into the state machine
    pub fn on_contact(&mut self, contact: Contact, tuning: &Tuning) {
        match contact {
            Contact::LandedOnTop => self.apply(BodyEvent::Landed, tuning),
            Contact::HitSide => self.apply(BodyEvent::HitSide, tuning),
            Contact::HitBottom | Contact::None => {}
        }
    }

    /// Advance one fixed step, integrating into `position`
    pub fn step(&mut self, position: &mut Vec2, input: &InputSnapshot, tuning: &Tuning, dt: f32) {
        // Timers
        self.jump_cooldown = (self.jump_cooldown - dt).max(0.0);
        if let MotionState::Stunned { remaining, grounded } = self.state {
            let remaining = (remaining - dt).max(0.0);
            self.state = MotionState::Stunned { remaining, grounded };
            if remaining <= 0.0 {
                self.apply(BodyEvent::StunExpired, tuning);
            }
        }

        // Charge / release
        if input.jump {
            self.apply(BodyEvent::JumpHeld { dt }, tuning);
        } else {
            self.apply(BodyEvent::JumpReleased, tuning);
        }

        // Horizontal
        let locked = matches!(
            self.state,
            MotionState::Charging { .. } | MotionState::Stunned { .. }
        );
        let axis = if locked { 0.0 } else { input.axis() };
        if axis != 0.0 {
            self.velocity.x += axis * tuning.acceleration * dt;
        } else if self.velocity.x > 0.0 {
            self.velocity.x = (self.velocity.x - tuning.friction * dt).max(0.0);
        } else if self.velocity.x < 0.0 {
            self.velocity.x = (self.velocity.x + tuning.friction * dt).min(0.0);
        }

        // Vertical
        if !self.is_grounded() {
            self.velocity.y += tuning.gravity * dt;
        }

        self.velocity.x = self.velocity.x.clamp(-tuning.max_speed_x, tuning.max_speed_x);
        self.velocity.y = self.velocity.y.clamp(-tuning.max_speed_y, tuning.max_speed_y);

        *position += self.velocity * dt;

        // Kill micro-drift
        if self.velocity.x.abs() < VELOCITY_EPSILON {
            self.velocity.x = 0.0;
        }
        if self.velocity.y.abs() < VELOCITY_EPSILON {
            self.velocity.y = 0.0;
        }
    }
}
