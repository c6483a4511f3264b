//! Girder Climb headless replay
//!
//! Drives the simulation with a scripted input sequence at uneven frame
//! times and prints the final render snapshot as JSON. Rendering and real
//! input live in the host application.

#[cfg(not(target_arch = "wasm32"))]
mod replay {
    use girder_climb::sim::{Action, InputSnapshot, InputSource, Viewport, World, run_frame};
    use girder_climb::{ConfigError, Tuning};

    const DEFAULT_SEED: u64 = 0x6D1D_E12C;

    /// Frame times cycled through to mimic an unsteady display
    const FRAME_TIMES: [f32; 5] = [1.0 / 60.0, 1.0 / 144.0, 1.0 / 30.0, 0.02, 1.0 / 75.0];

    /// (seconds, left, right, jump)
    const SCRIPT: &[(f32, bool, bool, bool)] = &[
        (0.5, false, false, false),
        (0.4, false, true, false),
        (0.55, false, false, true),
        (1.2, false, true, false),
        (0.6, false, false, true),
        (1.0, true, false, false),
        (0.45, false, false, true),
        (1.5, false, false, false),
    ];

    /// Keys held for one script segment
    struct ScriptedKeys {
        left: bool,
        right: bool,
        jump: bool,
    }

    impl InputSource for ScriptedKeys {
        fn is_down(&self, action: Action) -> bool {
            match action {
                Action::MoveLeft => self.left,
                Action::MoveRight => self.right,
                Action::Jump => self.jump,
            }
        }
    }

    /// Camera stand-in that only logs where it would look
    #[derive(Default)]
    struct LoggingViewport {
        recenters: u32,
    }

    impl Viewport for LoggingViewport {
        fn center_on_chunk(&mut self, index: i32, center_y: f32) {
            self.recenters += 1;
            log::info!("Camera centered on chunk {} (y = {:.0})", index, center_y);
        }
    }

    pub fn run() -> Result<(), ConfigError> {
        let seed = std::env::args()
            .nth(1)
            .and_then(|arg| arg.parse().ok())
            .unwrap_or(DEFAULT_SEED);
        log::info!("Girder Climb replay starting (seed {})", seed);

        let mut viewport = LoggingViewport::default();
        let mut world = World::new(seed, Tuning::default(), &mut viewport)?;

        let mut frame = 0usize;
        for &(seconds, left, right, jump) in SCRIPT {
            let input = InputSnapshot::sample(&ScriptedKeys { left, right, jump });
            let mut elapsed = 0.0;
            while elapsed < seconds {
                let frame_time = FRAME_TIMES[frame % FRAME_TIMES.len()];
                frame += 1;
                elapsed += frame_time;

                let report = run_frame(&mut world, frame_time, input, &mut viewport);
                if let Some(change) = report.stream {
                    log::info!(
                        "Frame {}: now in chunk {} (unloaded {:?})",
                        frame,
                        change.current,
                        change.unloaded
                    );
                }
            }
            log::debug!(
                "Segment done at tick {}: pos ({:.1}, {:.1}) {:?}",
                world.time_ticks,
                world.player.position.x,
                world.player.position.y,
                world.player.body.state
            );
        }

        log::info!(
            "Replay finished: {} frames, {} ticks, {} chunks generated, {} recenters",
            frame,
            world.time_ticks,
            world.stream.generated_count(),
            viewport.recenters
        );

        let json = serde_json::to_string_pretty(&world.snapshot())?;
        println!("{}", json);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = replay::run() {
        log::error!("Replay failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is embedded by the host page; nothing to run here
}
