//! Build-time tunables for the orrery
//!
//! Everything the display logic needs to know about the panel, the input
//! ramp and the refresh cadence lives in [`OrreryConfig`]. The defaults are
//! sized for a 128x64 SSD1306; firmware overrides fields in a `const`.

/// Seconds in a day
pub const DAY_SECONDS: i64 = 86_400;

/// Orbit index of the observer's home planet (Earth)
pub const EARTH_ORBIT: usize = 2;

/// Orbits below this index are the rocky planets (drawn brighter)
pub const ROCKY_ORBITS: usize = 4;

/// Orrery configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OrreryConfig {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Radius step between consecutive orbits
    pub orbit_scale: u32,
    /// Radius added to every orbit
    pub orbit_margin: u32,
    /// Radius of the filled sun marker
    pub sun_radius: u32,
    /// Orbit highlighted as "home"
    pub home_orbit: usize,
    /// Text scale for the date and offset overlay (1 or 2)
    pub text_scale: u8,
    /// Furthest the date may be advanced (days)
    pub max_offset: i32,
    /// Furthest the date may be retarded (days, negative)
    pub min_offset: i32,
    /// Consecutive presses before the step size doubles
    pub speed_threshold: u32,
    /// Auto-advance instead of manual input
    pub demo: bool,
    /// Days added per tick in demo mode
    pub demo_step: i32,
    /// Demo offset after which playback starts again at 0
    pub demo_limit: i32,
    /// Start with the red-only night palette
    pub start_in_night_mode: bool,
    /// Sleep between idle ticks (ms)
    pub idle_interval_ms: u32,
    /// How often the clock is re-read (s)
    pub refresh_period_s: u32,
    /// First retry delay when the clock is not ready (ms)
    pub clock_retry_ms: u32,
    /// Upper bound for the clock retry backoff (ms)
    pub clock_retry_max_ms: u32,
}

impl OrreryConfig {
    /// Defaults for a 128x64 monochrome OLED
    pub const DEFAULT: Self = Self {
        width: 128,
        height: 64,
        orbit_scale: 3,
        orbit_margin: 2,
        sun_radius: 2,
        home_orbit: EARTH_ORBIT,
        text_scale: 1,
        max_offset: 366,
        min_offset: -366,
        speed_threshold: 7,
        demo: false,
        demo_step: 4,
        demo_limit: 3_650,
        start_in_night_mode: true,
        idle_interval_ms: 500,
        refresh_period_s: 3_600,
        clock_retry_ms: 250,
        clock_retry_max_ms: 2_000,
    };

    /// Display radius of an orbit
    pub const fn orbit_radius(&self, orbit: usize) -> u32 {
        self.orbit_scale * (orbit as u32 + 1) + self.orbit_margin
    }

    /// Screen position of the sun (canvas centre)
    pub const fn sun(&self) -> (i32, i32) {
        ((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Idle ticks between clock reads
    pub const fn refresh_ticks(&self) -> u32 {
        let interval = if self.idle_interval_ms == 0 {
            1
        } else {
            self.idle_interval_ms
        };
        (self.refresh_period_s * 1_000) / interval
    }
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
