//! Solar-system orrery for a small OLED panel
//!
//! The library holds everything that does not touch hardware: calendar
//! arithmetic, the date-offset state machine, the ephemeris, the circle
//! rasterizer, the scene renderer and the per-tick [`FrameController`].
//! Hardware reaches it through small traits ([`ClockSource`], [`Canvas`],
//! [`InputSource`]) so the whole display loop also runs on the host.
//!
//! The firmware in `src/bin/orrery.rs` wires those traits to an STM32F103
//! with an SSD1306 display and four push buttons.

#![cfg_attr(not(test), no_std)]

pub mod calendar;
pub mod canvas;
pub mod clock;
pub mod config;
pub mod controller;
pub mod ephemeris;
pub mod offset;
pub mod orbit;
pub mod raster;
pub mod render;

pub mod hardware {
    pub mod gpio_button;
    pub mod traits;
}

pub use calendar::{CalendarDateTime, CalendarError};
pub use canvas::{Canvas, FlushTarget, FrameBuffer, GraphicsCanvas};
pub use clock::{ClockSource, SoftRtc};
pub use config::OrreryConfig;
pub use controller::{FrameController, FrameFault, TickOutcome};
pub use ephemeris::{Ephemeris, EphemerisError, KeplerEphemeris, PlanetSample};
pub use hardware::traits::{Button, InputSource};
pub use offset::{Buttons, ColorMode, DisplayMode, InputOutcome, OffsetState, Playback};
