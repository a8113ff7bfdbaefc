//! Foreground sequencing: waiting for moves and the hand self-test.
//!
//! The foreground blocks on an embedded-hal `DelayNs`; the tick interrupt
//! keeps firing meanwhile and is what actually moves the hands. On a host
//! [`TickingDelay`] stands in for the interrupt by ticking the registry
//! while it "sleeps".

use embedded_hal::delay::DelayNs;

use crate::config::units::Degrees;
use crate::config::ClockConfig;
use crate::error::{MotorError, Result};
use crate::motion::Ramp;
use crate::motor::{HomeSensor, MotorId, MotorSet, SharedRegistry, StepperBackend};

/// Default bound for waiting on a move.
pub const DEFAULT_MOVE_TIMEOUT_MS: u32 = 5000;

/// Step period of the self-test moves.
pub const SELF_TEST_STEP_PERIOD: u16 = 4;

/// Pause after each self-test quarter turn.
pub const SELF_TEST_WAIT_MS: u32 = 1000;

const SELF_TEST_QUARTERS: usize = 4;

/// Foreground driver for a shared registry.
///
/// Generic over:
/// - `D`, `S`: backend and sensor of the registry
/// - `DELAY`: wait primitive (must implement `DelayNs`)
pub struct Sequencer<'a, D, S, DELAY>
where
    D: StepperBackend,
    S: HomeSensor,
    DELAY: DelayNs,
{
    registry: &'a SharedRegistry<D, S>,
    delay: DELAY,
    move_timeout_ms: u32,
}

impl<'a, D, S, DELAY> Sequencer<'a, D, S, DELAY>
where
    D: StepperBackend,
    S: HomeSensor,
    DELAY: DelayNs,
{
    /// Create a sequencer.
    pub fn new(registry: &'a SharedRegistry<D, S>, delay: DELAY) -> Self {
        Self {
            registry,
            delay,
            move_timeout_ms: DEFAULT_MOVE_TIMEOUT_MS,
        }
    }

    /// Bound for [`move_and_wait`](Self::move_and_wait).
    pub fn with_move_timeout(mut self, timeout_ms: u32) -> Self {
        self.move_timeout_ms = timeout_ms;
        self
    }

    /// The shared registry.
    #[inline]
    pub fn registry(&self) -> &'a SharedRegistry<D, S> {
        self.registry
    }

    /// Access the delay provider.
    #[inline]
    pub fn delay_mut(&mut self) -> &mut DELAY {
        &mut self.delay
    }

    /// Release the delay provider.
    pub fn release(self) -> DELAY {
        self.delay
    }

    /// Cooperative delay; ticks keep firing.
    #[inline]
    pub fn wait_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Wait until every listed motor is idle.
    ///
    /// Waits at least one poll interval, then polls every `poll_ms` until
    /// the set is idle or `limit_ms` has elapsed. Returns the elapsed time,
    /// as `Err` when the limit was hit first.
    pub fn wait_idle(&mut self, motors: &[MotorId], poll_ms: u32, limit_ms: u32) -> core::result::Result<u32, u32> {
        let poll_ms = poll_ms.max(1);
        let mut elapsed = 0u32;
        loop {
            self.delay.delay_ms(poll_ms);
            elapsed = elapsed.saturating_add(poll_ms);
            if self.registry.all_idle(motors) {
                return Ok(elapsed);
            }
            if elapsed >= limit_ms {
                return Err(elapsed);
            }
        }
    }

    /// Wait until the whole array is idle, polling every `poll_ms`.
    ///
    /// Returns the elapsed time. Gives up after the move timeout.
    pub fn move_and_wait(&mut self, poll_ms: u32) -> u32 {
        let all: MotorSet = self.registry.with(|registry| registry.ids().collect());
        match self.wait_idle(&all, poll_ms, self.move_timeout_ms) {
            Ok(elapsed) => elapsed,
            Err(elapsed) => {
                log_warn!("motors still moving after {} ms", elapsed);
                elapsed
            }
        }
    }

    /// Exercise every hand: four clockwise quarter turns, then four back.
    ///
    /// `clock` restricts the test to one clock; `None` runs all clocks
    /// together, one hand index at a time.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::ClockOutOfRange` for an unknown clock, before
    /// anything moves.
    pub fn self_test(&mut self, clock: Option<u8>) -> Result<()> {
        let layout = self.registry.with(|registry| registry.layout());
        if let Some(clock) = clock {
            if clock >= layout.clocks() {
                return Err(MotorError::ClockOutOfRange {
                    clock,
                    clocks: layout.clocks(),
                }
                .into());
            }
        }

        for hand in 0..layout.hands_per_clock() {
            let hands: MotorSet = self.registry.with(|registry| {
                (0..layout.clocks())
                    .filter(|c| clock.map_or(true, |only| only == *c))
                    .filter_map(|c| registry.id(c, hand).ok())
                    .collect()
            });
            if hands.is_empty() {
                continue;
            }
            log_info!("self-test hand {} on {} clock(s)", hand, hands.len());

            for quarter in [Degrees(90.0), Degrees(-90.0)] {
                for _ in 0..SELF_TEST_QUARTERS {
                    self.registry.with(|registry| {
                        hands.iter().try_for_each(|id| {
                            registry
                                .move_by_degrees(*id, quarter, SELF_TEST_STEP_PERIOD, Ramp::BOTH)
                                .map(|_| ())
                        })
                    })?;
                    self.move_and_wait(SELF_TEST_WAIT_MS);
                }
            }
        }
        Ok(())
    }
}

/// Host delay that ticks a shared registry while waiting.
///
/// Each elapsed tick period runs one registry tick, so moves progress at
/// the same rate as on hardware relative to the requested waits.
pub struct TickingDelay<'a, D, S>
where
    D: StepperBackend,
    S: HomeSensor,
{
    registry: &'a SharedRegistry<D, S>,
    tick_period_ns: u32,
    pending_ns: u32,
    elapsed_ns: u64,
}

impl<'a, D, S> TickingDelay<'a, D, S>
where
    D: StepperBackend,
    S: HomeSensor,
{
    /// Delay ticking at the configured tick period.
    pub fn new(registry: &'a SharedRegistry<D, S>, clock: &ClockConfig) -> Self {
        Self::with_tick_period_ns(registry, clock.tick_period_ns())
    }

    /// Delay ticking every `tick_period_ns` nanoseconds.
    pub fn with_tick_period_ns(registry: &'a SharedRegistry<D, S>, tick_period_ns: u32) -> Self {
        Self {
            registry,
            tick_period_ns: tick_period_ns.max(1),
            pending_ns: 0,
            elapsed_ns: 0,
        }
    }

    /// Total simulated time in milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl<D, S> DelayNs for TickingDelay<'_, D, S>
where
    D: StepperBackend,
    S: HomeSensor,
{
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns = self.elapsed_ns.saturating_add(ns as u64);
        let mut pending = self.pending_ns as u64 + ns as u64;
        let period = self.tick_period_ns as u64;
        while pending >= period {
            self.registry.tick();
            pending -= period;
        }
        // pending < period <= u32::MAX
        self.pending_ns = pending as u32;
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_ns(1_000_000);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::motor::{ClockLayout, EmulatedShaft, EmulatedStepper, MotorBuilder, MotorRegistry, NoSensor};

    type Shared<'a> = SharedRegistry<EmulatedStepper<'a>, NoSensor>;

    fn shared<'a>(shafts: &'a [EmulatedShaft], layout: ClockLayout) -> Shared<'a> {
        let mut registry = MotorRegistry::new(layout, 360);
        for (index, shaft) in shafts.iter().enumerate() {
            let motor = MotorBuilder::new()
                .id(MotorId(index as u8))
                .backend(shaft.stepper())
                .steps_per_revolution(360)
                .build()
                .unwrap();
            registry.register(motor).unwrap();
        }
        SharedRegistry::new(registry)
    }

    #[test]
    fn test_ticking_delay_rate() {
        let shafts = [EmulatedShaft::new(360)];
        let registry = shared(&shafts, ClockLayout::new(1, 1));
        registry.arm(MotorId(0), crate::motion::MoveCommand::new(100, 0)).unwrap();

        let mut delay = TickingDelay::with_tick_period_ns(&registry, 200_000);
        delay.delay_ms(4);
        // 5 ticks per millisecond, one step per tick
        assert_eq!(shafts[0].position(), 20);
        delay.delay_us(300);
        delay.delay_us(100);
        assert_eq!(shafts[0].position(), 22);
        assert_eq!(delay.elapsed_ms(), 4);
    }

    #[test]
    fn test_wait_idle_reports_limit() {
        let shafts = [EmulatedShaft::new(360)];
        let registry = shared(&shafts, ClockLayout::new(1, 1));
        let delay = TickingDelay::with_tick_period_ns(&registry, 200_000);
        let mut seq = Sequencer::new(&registry, delay);

        registry.arm(MotorId(0), crate::motion::MoveCommand::new(50, 0)).unwrap();
        assert_eq!(seq.wait_idle(&[MotorId(0)], 2, 100), Ok(10));

        registry.arm(MotorId(0), crate::motion::MoveCommand::new(1000, 0)).unwrap();
        assert_eq!(seq.wait_idle(&[MotorId(0)], 10, 30), Err(30));
        assert!(!registry.all_idle(&[MotorId(0)]));
    }

    #[test]
    fn test_self_test_returns_hands_home() {
        let shafts = [
            EmulatedShaft::new(360),
            EmulatedShaft::new(360),
            EmulatedShaft::new(360),
            EmulatedShaft::new(360),
        ];
        let registry = shared(&shafts, ClockLayout::new(2, 2));
        let delay = TickingDelay::with_tick_period_ns(&registry, 200_000);
        let mut seq = Sequencer::new(&registry, delay);

        seq.self_test(None).unwrap();

        for shaft in shafts.iter() {
            assert_eq!(shaft.position(), 0);
        }
        assert!(registry.with(|r| r.everything_idle()));
        // 16 quarter turns per hand index, each followed by at least one wait
        assert!(seq.release().elapsed_ms() >= 16 * SELF_TEST_WAIT_MS as u64);
    }

    #[test]
    fn test_self_test_single_clock() {
        let shafts = [
            EmulatedShaft::new(360),
            EmulatedShaft::new(360),
            EmulatedShaft::new(360),
            EmulatedShaft::new(360),
        ];
        let registry = shared(&shafts, ClockLayout::new(2, 2));
        let delay = TickingDelay::with_tick_period_ns(&registry, 200_000);
        let mut seq = Sequencer::new(&registry, delay);

        assert!(matches!(
            seq.self_test(Some(2)),
            Err(Error::Motor(MotorError::ClockOutOfRange { clock: 2, clocks: 2 }))
        ));
        seq.self_test(Some(1)).unwrap();
        assert!(registry.with(|r| r.everything_idle()));
    }
}
