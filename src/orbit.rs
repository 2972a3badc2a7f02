//! Orbit table and planet sprites
//!
//! Each planet is drawn as a handful of coloured points laid out on a 5x5
//! grid. Tables are flat `(dx, dy, r, g, b)` groups, grid origin top-left.

use embedded_graphics::pixelcolor::Rgb888;

use crate::config::OrreryConfig;
use crate::ephemeris::PLANET_COUNT;

/// Offset from a sprite's grid origin to its centre
pub const SPRITE_HALF_WIDTH: i32 = 2;

/// Values per sprite point
pub const SPRITE_STRIDE: usize = 5;

/// One point of a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpritePoint {
    pub dx: i32,
    pub dy: i32,
    pub color: Rgb888,
}

/// Flat `(dx, dy, r, g, b)` table
#[derive(Debug, Clone, Copy)]
pub struct Sprite(pub &'static [u8]);

impl Sprite {
    /// Points in table order
    pub fn points(&self) -> impl Iterator<Item = SpritePoint> + '_ {
        self.0.chunks_exact(SPRITE_STRIDE).map(|p| SpritePoint {
            dx: i32::from(p[0]),
            dy: i32::from(p[1]),
            color: Rgb888::new(p[2], p[3], p[4]),
        })
    }

    pub fn len(&self) -> usize {
        self.0.len() / SPRITE_STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[rustfmt::skip]
const MERCURY: &[u8] = &[
    2, 2, 170, 170, 170,
    3, 2, 120, 120, 120,
];

#[rustfmt::skip]
const VENUS: &[u8] = &[
    2, 1, 230, 200, 120,
    1, 2, 230, 200, 120,
    2, 2, 250, 230, 160,
    3, 2, 230, 200, 120,
    2, 3, 230, 200, 120,
];

#[rustfmt::skip]
const EARTH: &[u8] = &[
    2, 1,  40, 110, 230,
    1, 2,  40, 160,  60,
    2, 2,  40, 110, 230,
    3, 2,  40, 160,  60,
    2, 3,  40, 110, 230,
];

#[rustfmt::skip]
const MARS: &[u8] = &[
    2, 1, 200,  80,  40,
    1, 2, 200,  80,  40,
    2, 2, 230, 110,  60,
    3, 2, 200,  80,  40,
    2, 3, 200,  80,  40,
];

#[rustfmt::skip]
const JUPITER: &[u8] = &[
    1, 1, 210, 170, 120,  2, 1, 210, 170, 120,  3, 1, 210, 170, 120,
    1, 2, 170, 120,  80,  2, 2, 170, 120,  80,  3, 2, 170, 120,  80,
    1, 3, 210, 170, 120,  2, 3, 210, 170, 120,  3, 3, 210, 170, 120,
];

#[rustfmt::skip]
const SATURN: &[u8] = &[
    2, 1, 220, 200, 140,
    0, 2, 180, 160, 110,  1, 2, 220, 200, 140,  2, 2, 220, 200, 140,
    3, 2, 220, 200, 140,  4, 2, 180, 160, 110,
    2, 3, 220, 200, 140,
];

#[rustfmt::skip]
const URANUS: &[u8] = &[
    2, 1, 140, 200, 220,
    1, 2, 140, 200, 220,
    2, 2, 170, 220, 235,
    3, 2, 140, 200, 220,
    2, 3, 140, 200, 220,
];

#[rustfmt::skip]
const NEPTUNE: &[u8] = &[
    2, 1,  60,  90, 220,
    1, 2,  60,  90, 220,
    2, 2,  90, 120, 240,
    3, 2,  60,  90, 220,
    2, 3,  60,  90, 220,
];

/// Sprites indexed by orbit, Mercury first
pub const PLANET_SPRITES: [Sprite; PLANET_COUNT] = [
    Sprite(MERCURY),
    Sprite(VENUS),
    Sprite(EARTH),
    Sprite(MARS),
    Sprite(JUPITER),
    Sprite(SATURN),
    Sprite(URANUS),
    Sprite(NEPTUNE),
];

/// Fixed drawing parameters of one orbit
#[derive(Debug, Clone, Copy)]
pub struct OrbitSpec {
    /// 0 = innermost
    pub index: usize,
    /// Display radius in pixels
    pub radius: u32,
    pub sprite: Sprite,
}

impl OrbitSpec {
    /// Orbit `index` under `config`, `None` past the last planet
    pub fn new(config: &OrreryConfig, index: usize) -> Option<Self> {
        let sprite = *PLANET_SPRITES.get(index)?;
        Some(Self {
            index,
            radius: config.orbit_radius(index),
            sprite,
        })
    }
}
