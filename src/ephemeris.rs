//! Ephemeris gateway
//!
//! Maps a calendar date-time to one orbital-plane sample per planet, ordered
//! innermost to outermost. The display only uses the direction of each
//! sample, so a low-precision model is plenty.

use heapless::Vec;
use num_traits::Float;

use crate::calendar::{CalendarDateTime, CalendarError};

/// Planets drawn by the orrery
pub const PLANET_COUNT: usize = 8;

/// Epoch seconds of J2000.0 (2000-01-01T12:00:00)
const J2000_EPOCH: i64 = 946_728_000;

const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Heliocentric orbital-plane position of one planet (AU)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlanetSample {
    pub x: f32,
    pub y: f32,
}

impl PlanetSample {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One sample per planet, innermost first
pub type Samples = Vec<PlanetSample, PLANET_COUNT>;

/// Ephemeris errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EphemerisError {
    /// The requested date does not exist or is out of range
    InvalidDate(CalendarError),
}

impl From<CalendarError> for EphemerisError {
    fn from(err: CalendarError) -> Self {
        EphemerisError::InvalidDate(err)
    }
}

/// Source of planet positions
///
/// Implementations must be pure: the same date always yields the same
/// samples.
pub trait Ephemeris {
    type Error;

    /// Planet positions at the given UTC date and time
    fn coordinates(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> Result<Samples, Self::Error>;

    /// Planet positions at a calendar value
    fn coordinates_at(&self, date: &CalendarDateTime) -> Result<Samples, Self::Error> {
        self.coordinates(
            date.year(),
            date.month(),
            date.day(),
            date.hour(),
            date.minute(),
        )
    }
}

/// Keplerian elements at J2000 with secular rates per Julian century
#[derive(Debug, Clone, Copy)]
pub struct OrbitalElements {
    /// Semi-major axis (AU)
    pub a: f64,
    /// Eccentricity
    pub e: f64,
    /// Mean longitude (deg)
    pub l0: f64,
    /// Mean longitude rate (deg/century)
    pub l_dot: f64,
    /// Longitude of perihelion (deg)
    pub w0: f64,
    /// Longitude of perihelion rate (deg/century)
    pub w_dot: f64,
}

/// Approximate planetary elements (Standish 1992), Mercury to Neptune
pub const PLANET_ELEMENTS: [OrbitalElements; PLANET_COUNT] = [
    OrbitalElements { a: 0.38710, e: 0.20563, l0: 252.251, l_dot: 149_472.675, w0: 77.457, w_dot: 0.159 },
    OrbitalElements { a: 0.72333, e: 0.00677, l0: 181.980, l_dot: 58_517.816, w0: 131.564, w_dot: 0.053 },
    OrbitalElements { a: 1.00000, e: 0.01671, l0: 100.464, l_dot: 35_999.373, w0: 102.937, w_dot: 0.323 },
    OrbitalElements { a: 1.52368, e: 0.09340, l0: 355.453, l_dot: 19_140.300, w0: 336.060, w_dot: 0.443 },
    OrbitalElements { a: 5.20260, e: 0.04849, l0: 34.351, l_dot: 3_034.906, w0: 14.331, w_dot: 0.172 },
    OrbitalElements { a: 9.55491, e: 0.05551, l0: 50.077, l_dot: 1_222.114, w0: 93.057, w_dot: 0.312 },
    OrbitalElements { a: 19.21845, e: 0.04630, l0: 314.055, l_dot: 428.467, w0: 173.005, w_dot: 0.030 },
    OrbitalElements { a: 30.11039, e: 0.00899, l0: 304.349, l_dot: 218.486, w0: 48.120, w_dot: 0.012 },
];

/// Solve Kepler's equation `E - e sin E = M` by Newton iteration
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let mut ea = mean_anomaly;
    for _ in 0..15 {
        let delta = ea - eccentricity * Float::sin(ea) - mean_anomaly;
        ea -= delta / (1.0 - eccentricity * Float::cos(ea));
        if Float::abs(delta) < 1e-12 {
            break;
        }
    }
    ea
}

impl OrbitalElements {
    /// Heliocentric ecliptic position `t` Julian centuries after J2000
    pub fn position(&self, t: f64) -> (f64, f64) {
        let l = Float::to_radians(self.l0 + self.l_dot * t);
        let w = Float::to_radians(self.w0 + self.w_dot * t);
        let e = self.e;

        let ea = solve_kepler(l - w, e);
        let half = ea / 2.0;
        let true_anomaly = 2.0
            * Float::atan2(
                Float::sqrt(1.0 + e) * Float::sin(half),
                Float::sqrt(1.0 - e) * Float::cos(half),
            );
        let r = self.a * (1.0 - e * Float::cos(ea));
        let angle = true_anomaly + w;
        (r * Float::cos(angle), r * Float::sin(angle))
    }
}

/// Low-precision ephemeris from mean orbital elements
#[derive(Debug, Clone, Copy, Default)]
pub struct KeplerEphemeris;

impl Ephemeris for KeplerEphemeris {
    type Error = EphemerisError;

    fn coordinates(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> Result<Samples, EphemerisError> {
        let date = CalendarDateTime::new(year, month, day, hour, minute, 0)?;
        let days = (date.epoch_seconds() - J2000_EPOCH) as f64 / 86_400.0;
        let t = days / DAYS_PER_CENTURY;

        let mut samples = Samples::new();
        for elements in &PLANET_ELEMENTS {
            let (x, y) = elements.position(t);
            // PLANET_ELEMENTS has exactly PLANET_COUNT entries
            let _ = samples.push(PlanetSample::new(x as f32, y as f32));
        }
        Ok(samples)
    }
}
