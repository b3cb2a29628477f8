//! Fixed-cadence driver
//!
//! Owns the simulation, feeds it the time elapsed since the previous tick and
//! hands each resulting frame to a sink (the renderer). The physics step never
//! sees a clock; the driver is the only place time is read.

use std::time::{Duration, Instant};

use crate::sim::{BallSnapshot, Scene, Simulation};

/// What the renderer gets each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Ticks since the driver started (first tick is 0)
    pub tick: u64,
    /// Milliseconds fed to the physics step
    pub elapsed_ms: u32,
    pub snapshot: BallSnapshot,
    pub radius: f32,
    /// Frame rate derived from the last interval (0 when no time passed)
    pub fps: u32,
}

/// Consumer of simulation frames
pub trait FrameSink {
    fn present(&mut self, scene: &Scene, frame: &Frame);
}

/// Sink that drops every frame
#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _scene: &Scene, _frame: &Frame) {}
}

/// Periodic driver around a simulation
pub struct Driver<S: FrameSink> {
    sim: Simulation,
    sink: S,
    tick_ms: u32,
    last_tick_ms: Option<u64>,
    ticks: u64,
}

impl<S: FrameSink> Driver<S> {
    /// Driver ticking at the simulation's configured period
    pub fn new(sim: Simulation, sink: S) -> Self {
        let tick_ms = sim.settings().tick_ms.max(1);
        Self {
            sim,
            sink,
            tick_ms,
            last_tick_ms: None,
            ticks: 0,
        }
    }

    pub fn tick_ms(&self) -> u32 {
        self.tick_ms
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (Simulation, S) {
        (self.sim, self.sink)
    }

    /// Run one tick at clock time `now_ms`
    ///
    /// The first tick sees zero elapsed time. A clock that goes backwards is
    /// treated as no time passing.
    pub fn tick(&mut self, now_ms: u64) -> Frame {
        let elapsed = self
            .last_tick_ms
            .map(|last| now_ms.saturating_sub(last))
            .unwrap_or(0);
        let elapsed_ms = u32::try_from(elapsed).unwrap_or(u32::MAX);
        self.last_tick_ms = Some(now_ms);

        self.sim.step(elapsed_ms);

        let fps = if elapsed_ms == 0 { 0 } else { 1000 / elapsed_ms };
        let frame = Frame {
            tick: self.ticks,
            elapsed_ms,
            snapshot: self.sim.snapshot(),
            radius: self.sim.ball().radius,
            fps,
        };
        self.ticks += 1;

        self.sink.present(self.sim.scene(), &frame);
        frame
    }

    /// Run on a virtual clock for `duration_ms`, one tick per period
    ///
    /// Returns the number of ticks run.
    pub fn run_for(&mut self, duration_ms: u64) -> u64 {
        let start = self.last_tick_ms.unwrap_or(0);
        let period = u64::from(self.tick_ms);
        let mut now = start;
        let mut count = 0;

        if self.last_tick_ms.is_none() {
            self.tick(now);
            count += 1;
        }
        while now + period <= start + duration_ms {
            now += period;
            self.tick(now);
            count += 1;
        }
        count
    }

    /// Run against the wall clock for `duration`, sleeping between ticks
    ///
    /// Wake times advance by a fixed period from the previous wake time, so
    /// a slow frame does not push the whole schedule back.
    pub fn run_realtime(&mut self, duration: Duration) -> u64 {
        let period = Duration::from_millis(u64::from(self.tick_ms));
        let origin = Instant::now();
        let base_ms = self.last_tick_ms.unwrap_or(0);
        let mut wake = origin;
        let mut count = 0;

        while wake.duration_since(origin) <= duration {
            let now = Instant::now();
            if wake > now {
                std::thread::sleep(wake - now);
            }
            let now_ms = base_ms + origin.elapsed().as_millis() as u64;
            self.tick(now_ms);
            count += 1;
            wake += period;
        }

        log::debug!("Ran {} ticks in {:?}", count, origin.elapsed());
        count
    }
}
