//! Date-offset state machine
//!
//! Owns the signed day offset added to the cached "now", the consecutive
//! press counter that drives the acceleration ramp, and the colour mode.
//! One call to [`OffsetState::process_input`] per tick.

use crate::config::OrreryConfig;

/// Snapshot of the four buttons for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons {
    /// Move the displayed date forwards
    pub advance: bool,
    /// Move the displayed date backwards
    pub retard: bool,
    /// Toggle night mode
    pub mode: bool,
    /// Leave the display loop
    pub quit: bool,
}

impl Buttons {
    /// Nothing pressed
    pub const NONE: Self = Self {
        advance: false,
        retard: false,
        mode: false,
        quit: false,
    };

    /// Any button asserted
    pub fn any(&self) -> bool {
        self.advance || self.retard || self.mode || self.quit
    }
}

/// Colour policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorMode {
    #[default]
    Normal,
    /// Everything drawn in red
    Night,
}

impl ColorMode {
    pub fn toggled(self) -> Self {
        match self {
            ColorMode::Normal => ColorMode::Night,
            ColorMode::Night => ColorMode::Normal,
        }
    }
}

/// Where date changes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Playback {
    /// Advance/retard buttons move the date
    #[default]
    Manual,
    /// The date advances on its own every tick
    Demo,
}

/// Combined view of colour mode and playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    Normal,
    Night,
    Demo,
}

/// Result of processing one input snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputOutcome {
    /// The scene must be redrawn
    Changed,
    /// Nothing visible changed
    Unchanged,
    /// Quit requested; nothing else was processed
    Quit,
}

/// Day offset, acceleration and mode state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OffsetState {
    offset: i32,
    consecutive: u32,
    color: ColorMode,
    playback: Playback,
    /// Mode button seen pressed and not yet released
    toggle_latched: bool,
    min_offset: i32,
    max_offset: i32,
    threshold: u32,
    demo_step: i32,
    demo_limit: i32,
}

impl OffsetState {
    /// Create the state machine from configuration
    ///
    /// The manual bounds always include 0 and the threshold is at least 1.
    pub fn new(config: &OrreryConfig) -> Self {
        Self {
            offset: 0,
            consecutive: 0,
            color: if config.start_in_night_mode {
                ColorMode::Night
            } else {
                ColorMode::Normal
            },
            playback: if config.demo {
                Playback::Demo
            } else {
                Playback::Manual
            },
            toggle_latched: false,
            min_offset: config.min_offset.min(0),
            max_offset: config.max_offset.max(0),
            threshold: config.speed_threshold.max(1),
            demo_step: config.demo_step,
            demo_limit: config.demo_limit,
        }
    }

    /// Start from an explicit offset (clamped to the manual bounds)
    pub fn with_offset(mut self, offset: i32) -> Self {
        self.offset = offset.clamp(self.min_offset, self.max_offset);
        self
    }

    /// Days added to "now"
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Uninterrupted advance/retard ticks so far
    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn display_mode(&self) -> DisplayMode {
        match (self.playback, self.color) {
            (Playback::Demo, _) => DisplayMode::Demo,
            (Playback::Manual, ColorMode::Normal) => DisplayMode::Normal,
            (Playback::Manual, ColorMode::Night) => DisplayMode::Night,
        }
    }

    /// Days moved per tick: doubles every `threshold` consecutive ticks
    pub fn speed(&self) -> i32 {
        let doublings = self.consecutive / self.threshold;
        // Saturate rather than overflow for absurdly long holds
        1i32.checked_shl(doublings).filter(|s| *s > 0).unwrap_or(i32::MAX)
    }

    /// Apply one input snapshot
    ///
    /// Rules are evaluated in priority order: quit, mode toggle, advance,
    /// retard, demo playback, idle.
    pub fn process_input(&mut self, buttons: Buttons) -> InputOutcome {
        if buttons.quit {
            return InputOutcome::Quit;
        }

        if buttons.mode {
            if self.toggle_latched {
                // Still held from the press that already toggled
                return match self.playback {
                    Playback::Demo => self.demo_advance(),
                    Playback::Manual => InputOutcome::Unchanged,
                };
            }
            self.toggle_latched = true;
            self.color = self.color.toggled();
            return InputOutcome::Changed;
        }
        self.toggle_latched = false;

        if self.playback == Playback::Manual {
            if buttons.advance && self.offset < self.max_offset {
                self.offset = self.offset.saturating_add(self.speed());
                if self.offset < self.max_offset {
                    self.consecutive = self.consecutive.saturating_add(1);
                } else {
                    self.offset = self.max_offset;
                }
                return InputOutcome::Changed;
            }

            if buttons.retard && self.offset > self.min_offset {
                self.offset = self.offset.saturating_sub(self.speed());
                if self.offset > self.min_offset {
                    self.consecutive = self.consecutive.saturating_add(1);
                } else {
                    self.offset = self.min_offset;
                }
                return InputOutcome::Changed;
            }
        } else {
            return self.demo_advance();
        }

        self.consecutive = 0;
        InputOutcome::Unchanged
    }

    /// One demo step, wrapping to 0 past the limit
    fn demo_advance(&mut self) -> InputOutcome {
        self.offset = self.offset.saturating_add(self.demo_step);
        if self.offset > self.demo_limit {
            self.offset = 0;
        }
        InputOutcome::Changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ADVANCE: Buttons = Buttons {
        advance: true,
        ..Buttons::NONE
    };
    const RETARD: Buttons = Buttons {
        retard: true,
        ..Buttons::NONE
    };
    const MODE: Buttons = Buttons {
        mode: true,
        ..Buttons::NONE
    };
    const QUIT: Buttons = Buttons {
        quit: true,
        ..Buttons::NONE
    };

    fn manual() -> OffsetState {
        OffsetState::new(&OrreryConfig::DEFAULT)
    }

    fn demo() -> OffsetState {
        OffsetState::new(&OrreryConfig {
            demo: true,
            ..OrreryConfig::DEFAULT
        })
    }

    #[test]
    fn test_single_press_moves_one_day() {
        let mut state = manual();
        assert_eq!(state.process_input(ADVANCE), InputOutcome::Changed);
        assert_eq!(state.offset(), 1);
        assert_eq!(state.consecutive(), 1);

        for _ in 0..5 {
            state.process_input(ADVANCE);
        }
        assert_eq!(state.offset(), 6);
        assert_eq!(state.speed(), 1);
    }

    #[test]
    fn test_speed_doubles_every_threshold() {
        let mut state = manual();
        for count in 0..30u32 {
            assert_eq!(state.consecutive(), count);
            assert_eq!(state.speed(), 1 << (count / 7));
            state.process_input(ADVANCE);
        }
    }

    #[test]
    fn test_speed_never_zero() {
        let mut state = manual();
        state.consecutive = u32::MAX;
        assert!(state.speed() > 0);
        state.consecutive = 31 * 7;
        assert!(state.speed() > 0);
    }

    #[test]
    fn test_release_resets_ramp() {
        let mut state = manual();
        for _ in 0..10 {
            state.process_input(ADVANCE);
        }
        assert_eq!(state.speed(), 2);

        assert_eq!(state.process_input(Buttons::NONE), InputOutcome::Unchanged);
        assert_eq!(state.consecutive(), 0);
        assert_eq!(state.speed(), 1);
    }

    #[test]
    fn test_advance_clamps_at_max_without_counting() {
        let mut state = manual().with_offset(365);
        state.consecutive = 14; // speed 4
        assert_eq!(state.process_input(ADVANCE), InputOutcome::Changed);
        assert_eq!(state.offset(), 366);
        assert_eq!(state.consecutive(), 14);

        // At the bound the press is ignored and counts as idle
        assert_eq!(state.process_input(ADVANCE), InputOutcome::Unchanged);
        assert_eq!(state.offset(), 366);
        assert_eq!(state.consecutive(), 0);
    }

    #[test]
    fn test_retard_clamps_at_min() {
        let mut state = manual().with_offset(-364);
        state.consecutive = 7; // speed 2
        assert_eq!(state.process_input(RETARD), InputOutcome::Changed);
        assert_eq!(state.offset(), -366);
        assert_eq!(state.consecutive(), 7);
        assert_eq!(state.process_input(RETARD), InputOutcome::Unchanged);
    }

    #[test]
    fn test_advance_wins_over_retard() {
        let mut state = manual();
        let both = Buttons {
            advance: true,
            retard: true,
            ..Buttons::NONE
        };
        state.process_input(both);
        assert_eq!(state.offset(), 1);
    }

    #[test]
    fn test_quit_changes_nothing() {
        let mut state = manual().with_offset(10);
        state.consecutive = 3;
        let everything = Buttons {
            advance: true,
            retard: true,
            mode: true,
            quit: true,
        };
        assert_eq!(state.process_input(everything), InputOutcome::Quit);
        assert_eq!(state.offset(), 10);
        assert_eq!(state.consecutive(), 3);
        assert_eq!(state.color_mode(), ColorMode::Night);
    }

    #[test]
    fn test_mode_toggles_once_per_press() {
        let mut state = manual();
        assert_eq!(state.color_mode(), ColorMode::Night);

        assert_eq!(state.process_input(MODE), InputOutcome::Changed);
        assert_eq!(state.color_mode(), ColorMode::Normal);

        // Held: no further toggles, and advance is not processed either
        for _ in 0..5 {
            let held = Buttons {
                advance: true,
                ..MODE
            };
            assert_eq!(state.process_input(held), InputOutcome::Unchanged);
        }
        assert_eq!(state.color_mode(), ColorMode::Normal);
        assert_eq!(state.offset(), 0);

        state.process_input(Buttons::NONE);
        assert_eq!(state.process_input(MODE), InputOutcome::Changed);
        assert_eq!(state.color_mode(), ColorMode::Night);
    }

    #[test]
    fn test_demo_ignores_manual_input() {
        let mut state = demo();
        assert_eq!(state.display_mode(), DisplayMode::Demo);
        assert_eq!(state.process_input(RETARD), InputOutcome::Changed);
        assert_eq!(state.offset(), 4);
        assert_eq!(state.process_input(Buttons::NONE), InputOutcome::Changed);
        assert_eq!(state.offset(), 8);
    }

    #[test]
    fn test_demo_wraps_to_zero() {
        let mut state = demo();
        state.offset = 3_648;
        assert_eq!(state.process_input(Buttons::NONE), InputOutcome::Changed);
        assert_eq!(state.offset(), 0);
        state.process_input(Buttons::NONE);
        assert_eq!(state.offset(), 4);
    }

    #[test]
    fn test_demo_reaching_limit_exactly_does_not_wrap() {
        let mut state = demo();
        state.offset = 3_646;
        state.process_input(Buttons::NONE);
        assert_eq!(state.offset(), 3_650);
        state.process_input(Buttons::NONE);
        assert_eq!(state.offset(), 0);
    }

    #[test]
    fn test_demo_keeps_playing_while_mode_held() {
        let mut state = demo();
        assert_eq!(state.process_input(MODE), InputOutcome::Changed);
        assert_eq!(state.color_mode(), ColorMode::Normal);
        assert_eq!(state.offset(), 0);

        for step in 1..=3 {
            assert_eq!(state.process_input(MODE), InputOutcome::Changed);
            assert_eq!(state.offset(), 4 * step);
        }
        assert_eq!(state.color_mode(), ColorMode::Normal);
    }

    #[test]
    fn test_display_mode() {
        let mut state = manual();
        assert_eq!(state.display_mode(), DisplayMode::Night);
        state.process_input(MODE);
        assert_eq!(state.display_mode(), DisplayMode::Normal);
    }

    proptest! {
        #[test]
        fn prop_advance_is_monotonic_and_bounded(presses in proptest::collection::vec(any::<bool>(), 0..400)) {
            let mut state = manual();
            let mut last = state.offset();
            for pressed in presses {
                let buttons = if pressed { ADVANCE } else { Buttons::NONE };
                state.process_input(buttons);
                prop_assert!(state.offset() >= last);
                prop_assert!(state.offset() <= 366);
                last = state.offset();
            }
        }

        #[test]
        fn prop_retard_is_monotonic_and_bounded(presses in proptest::collection::vec(any::<bool>(), 0..400)) {
            let mut state = manual();
            let mut last = state.offset();
            for pressed in presses {
                let buttons = if pressed { RETARD } else { Buttons::NONE };
                state.process_input(buttons);
                prop_assert!(state.offset() <= last);
                prop_assert!(state.offset() >= -366);
                last = state.offset();
            }
        }

        #[test]
        fn prop_speed_non_decreasing(a in 0u32..1_000, b in 0u32..1_000) {
            let mut low = manual();
            let mut high = manual();
            low.consecutive = a.min(b);
            high.consecutive = a.max(b);
            prop_assert!(low.speed() <= high.speed());
        }
    }
}
