//! Frame controller
//!
//! Owns every piece of mutable display state and turns one button snapshot
//! into at most one rendered frame per tick. The caller owns the sleeping:
//! [`TickOutcome`] says how long to wait before the next tick.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_hal::delay::DelayNs;

use crate::calendar::CalendarDateTime;
use crate::canvas::Canvas;
use crate::clock::{Backoff, ClockSource};
use crate::config::OrreryConfig;
use crate::ephemeris::Ephemeris;
use crate::hardware::traits::InputSource;
use crate::offset::{Buttons, InputOutcome, OffsetState};
use crate::render::{OrbitRenderer, Scene};

/// Why a frame was not drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameFault {
    /// No coordinates for the displayed date
    Ephemeris,
    /// Drawing or presenting failed
    Canvas,
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// A new frame is on the display
    Rendered,
    /// Nothing changed; sleep before the next tick
    Idle { sleep_ms: u32 },
    /// The clock had no time yet; retry after the delay
    ClockPending { retry_ms: u32 },
    /// The clock reported an error; retry after the delay
    ClockFailed { retry_ms: u32 },
    /// The frame was abandoned and will be retried next tick
    FrameSkipped(FrameFault),
    /// Quit was pressed
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    Idle,
    Dirty,
}

/// Per-tick orchestration of clock, input, ephemeris and renderer
pub struct FrameController<K, E> {
    clock: K,
    ephemeris: E,
    renderer: OrbitRenderer,
    state: OffsetState,
    now: Option<CalendarDateTime>,
    /// Ticks left before the clock is read again
    countdown: u32,
    backoff: Backoff,
    frame: FrameState,
}

impl<K, E> FrameController<K, E>
where
    K: ClockSource,
    E: Ephemeris,
{
    pub fn new(config: OrreryConfig, clock: K, ephemeris: E) -> Self {
        Self {
            clock,
            ephemeris,
            state: OffsetState::new(&config),
            renderer: OrbitRenderer::new(config),
            now: None,
            countdown: 0,
            backoff: Backoff::new(config.clock_retry_ms, config.clock_retry_max_ms),
            frame: FrameState::Dirty,
        }
    }

    pub fn config(&self) -> &OrreryConfig {
        self.renderer.config()
    }

    pub fn state(&self) -> &OffsetState {
        &self.state
    }

    /// Last time read from the clock
    pub fn now(&self) -> Option<CalendarDateTime> {
        self.now
    }

    /// The date on screen: cached now plus the day offset
    pub fn displayed_date(&self) -> Option<CalendarDateTime> {
        self.now.map(|now| now.plus_days(self.state.offset()))
    }

    pub fn clock_mut(&mut self) -> &mut K {
        &mut self.clock
    }

    /// Run one tick
    pub fn tick<C: Canvas>(&mut self, buttons: Buttons, canvas: &mut C) -> TickOutcome {
        if self.countdown == 0 {
            match self.clock.read() {
                Ok(now) => {
                    self.now = Some(now);
                    self.countdown = self.config().refresh_ticks();
                    self.backoff.reset();
                    self.frame = FrameState::Dirty;
                }
                // A failed refresh keeps the cached time and retries next tick
                Err(_) if self.now.is_some() => {}
                Err(_) if buttons.quit => return TickOutcome::Quit,
                Err(nb::Error::WouldBlock) => {
                    return TickOutcome::ClockPending {
                        retry_ms: self.backoff.next_delay(),
                    };
                }
                Err(nb::Error::Other(_)) => {
                    return TickOutcome::ClockFailed {
                        retry_ms: self.backoff.next_delay(),
                    };
                }
            }
        } else {
            self.countdown -= 1;
        }

        match self.state.process_input(buttons) {
            InputOutcome::Quit => return TickOutcome::Quit,
            InputOutcome::Changed => self.frame = FrameState::Dirty,
            InputOutcome::Unchanged => {}
        }

        if self.frame == FrameState::Idle {
            return TickOutcome::Idle {
                sleep_ms: self.config().idle_interval_ms,
            };
        }

        match self.render(canvas) {
            Ok(()) => {
                self.frame = FrameState::Idle;
                TickOutcome::Rendered
            }
            Err(fault) => TickOutcome::FrameSkipped(fault),
        }
    }

    fn render<C: Canvas>(&self, canvas: &mut C) -> Result<(), FrameFault> {
        let Some(date) = self.displayed_date() else {
            return Err(FrameFault::Ephemeris);
        };
        let samples = self
            .ephemeris
            .coordinates_at(&date)
            .map_err(|_| FrameFault::Ephemeris)?;
        let scene = Scene {
            date: &date,
            offset: self.state.offset(),
            color: self.state.color_mode(),
            playback: self.state.playback(),
            samples: &samples,
        };
        self.renderer
            .render_scene(&scene, canvas)
            .map_err(|_| FrameFault::Canvas)
    }

    /// Blank the display
    pub fn shutdown<C: Canvas>(&self, canvas: &mut C) -> Result<(), C::Error> {
        canvas.set_color(Rgb888::BLACK);
        canvas.clear()?;
        canvas.present()
    }

    /// Tick until quit, sleeping with `delay`, then blank the display
    pub fn run_blocking<I, C, D>(
        &mut self,
        input: &mut I,
        canvas: &mut C,
        delay: &mut D,
    ) -> Result<(), C::Error>
    where
        I: InputSource,
        C: Canvas,
        D: DelayNs,
    {
        loop {
            match self.tick(input.sample(), canvas) {
                TickOutcome::Quit => break,
                TickOutcome::Rendered => {}
                TickOutcome::Idle { sleep_ms } => delay.delay_ms(sleep_ms),
                TickOutcome::ClockPending { retry_ms } | TickOutcome::ClockFailed { retry_ms } => {
                    delay.delay_ms(retry_ms)
                }
                TickOutcome::FrameSkipped(_) => delay.delay_ms(self.config().idle_interval_ms),
            }
        }
        self.shutdown(canvas)
    }
}
