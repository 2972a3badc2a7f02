//! Orbit and scene renderer
//!
//! Projects each planet's orbital-plane sample onto its fixed display orbit
//! and draws the whole scene: sun, date overlay, orbit outlines and planet
//! sprites. Every colour goes through the night-mode policy.

use core::fmt::Write;

use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::{Point, Size},
};
use heapless::String;
use num_traits::Float;

use crate::calendar::{CalendarDateTime, month_name};
use crate::canvas::{Canvas, font_for_scale};
use crate::config::{OrreryConfig, ROCKY_ORBITS};
use crate::ephemeris::PlanetSample;
use crate::offset::{ColorMode, Playback};
use crate::orbit::{OrbitSpec, SPRITE_HALF_WIDTH};
use crate::raster::outline_pixels;

const BACKGROUND: (u8, u8, u8) = (0, 0, 0);
const SUN: (u8, u8, u8) = (230, 230, 0);
const DATE_TEXT: (u8, u8, u8) = (200, 200, 200);
const OFFSET_TEXT: (u8, u8, u8) = (128, 128, 128);
const HOME_ORBIT: (u8, u8, u8) = (0, 150, 0);
const HOME_ORBIT_NIGHT: (u8, u8, u8) = (180, 0, 0);
const ROCKY_ORBIT: (u8, u8, u8) = (110, 110, 110);
const GIANT_ORBIT: (u8, u8, u8) = (10, 10, 10);
const HOME_SPRITE_NIGHT: u8 = 200;
const SPRITE_NIGHT: u8 = 150;

/// Longest overlay label: `"-2147483648 days"`
const LABEL_LEN: usize = 16;

/// Pen colour under the colour policy (night keeps only red)
pub fn pen(mode: ColorMode, (r, g, b): (u8, u8, u8)) -> Rgb888 {
    match mode {
        ColorMode::Normal => Rgb888::new(r, g, b),
        ColorMode::Night => Rgb888::new(r, 0, 0),
    }
}

/// Everything that varies between frames
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    /// Date being displayed (now plus offset)
    pub date: &'a CalendarDateTime,
    /// Day offset from now
    pub offset: i32,
    pub color: ColorMode,
    pub playback: Playback,
    /// Planet samples, innermost first
    pub samples: &'a [PlanetSample],
}

/// Draws orbits, planets and the full scene
#[derive(Debug, Clone)]
pub struct OrbitRenderer {
    config: OrreryConfig,
}

impl OrbitRenderer {
    pub fn new(config: OrreryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrreryConfig {
        &self.config
    }

    /// Screen position of a planet on an orbit of `radius` pixels
    ///
    /// The angle is `atan2(x, y)`: zero points "up" the orbital y axis, and
    /// the screen y axis is flipped.
    pub fn project(&self, radius: u32, sample: PlanetSample) -> (f32, f32) {
        let (sun_x, sun_y) = self.config.sun();
        let angle = Float::atan2(sample.x, sample.y);
        let radius = radius as f32;
        let x = radius * Float::sin(angle) + sun_x as f32;
        let y = self.config.height as f32 - (radius * Float::cos(angle) + sun_y as f32);
        (x, y)
    }

    /// Outline colour of an orbit
    pub fn orbit_color(&self, index: usize, mode: ColorMode) -> Rgb888 {
        if index == self.config.home_orbit {
            match mode {
                ColorMode::Normal => pen(mode, HOME_ORBIT),
                ColorMode::Night => pen(mode, HOME_ORBIT_NIGHT),
            }
        } else if index < ROCKY_ORBITS {
            pen(mode, ROCKY_ORBIT)
        } else {
            pen(mode, GIANT_ORBIT)
        }
    }

    /// Draw an orbit's outline around the sun
    pub fn render_orbit<C: Canvas>(
        &self,
        orbit: &OrbitSpec,
        mode: ColorMode,
        canvas: &mut C,
    ) -> Result<(), C::Error> {
        let (sun_x, sun_y) = self.config.sun();
        canvas.set_color(self.orbit_color(orbit.index, mode));
        for point in outline_pixels(Point::new(sun_x, sun_y), orbit.radius) {
            canvas.plot(point.x, point.y)?;
        }
        Ok(())
    }

    /// Stamp a planet's sprite at its projected position
    ///
    /// Sprite points left of or above the canvas are dropped; the canvas
    /// clips the right and bottom edges.
    pub fn render_planet<C: Canvas>(
        &self,
        orbit: &OrbitSpec,
        sample: PlanetSample,
        mode: ColorMode,
        canvas: &mut C,
    ) -> Result<(), C::Error> {
        let (px, py) = self.project(orbit.radius, sample);
        let night = if orbit.index == self.config.home_orbit {
            HOME_SPRITE_NIGHT
        } else {
            SPRITE_NIGHT
        };

        for point in orbit.sprite.points() {
            let x = (point.dx - SPRITE_HALF_WIDTH) as f32 + px;
            let y = (point.dy - SPRITE_HALF_WIDTH) as f32 + py;
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let color = match mode {
                ColorMode::Normal => point.color,
                ColorMode::Night => Rgb888::new(night, 0, 0),
            };
            canvas.set_color(color);
            canvas.plot(x as i32, y as i32)?;
        }
        Ok(())
    }

    /// Date and offset overlay
    fn render_text<C: Canvas>(&self, scene: &Scene<'_>, canvas: &mut C) -> Result<(), C::Error> {
        let scale = self.config.text_scale;
        let date = scene.date;

        // Width 0 puts day, month and year on separate lines
        let mut label: String<LABEL_LEN> = String::new();
        let _ = write!(
            label,
            "{:02} {} {}",
            date.day(),
            month_name(date.month()),
            date.year()
        );
        canvas.set_color(pen(scene.color, DATE_TEXT));
        canvas.text(&label, 0, 0, 0, scale)?;

        if scene.playback == Playback::Demo {
            return Ok(());
        }

        label.clear();
        if scene.offset == 0 {
            let _ = label.push_str("Now");
        } else {
            let _ = write!(label, "{:+} days", scene.offset);
        }
        let line_height = font_for_scale(scale).character_size.height;
        let y = self.config.height.saturating_sub(line_height) as i32;
        canvas.set_color(pen(scene.color, OFFSET_TEXT));
        canvas.text(&label, 0, y, self.config.width, scale)
    }

    /// Draw a complete frame and present it
    ///
    /// The canvas must be the size given in the configuration.
    pub fn render_scene<C: Canvas>(&self, scene: &Scene<'_>, canvas: &mut C) -> Result<(), C::Error> {
        debug_assert_eq!(
            canvas.size(),
            Size::new(self.config.width, self.config.height),
            "canvas does not match the configured panel"
        );
        let mode = scene.color;
        let (sun_x, sun_y) = self.config.sun();

        canvas.set_color(pen(mode, BACKGROUND));
        canvas.clear()?;

        canvas.set_color(pen(mode, SUN));
        canvas.filled_circle(sun_x, sun_y, self.config.sun_radius)?;

        // Text first so the planets are drawn over it
        self.render_text(scene, canvas)?;

        for (index, sample) in scene.samples.iter().enumerate() {
            let Some(orbit) = OrbitSpec::new(&self.config, index) else {
                break;
            };
            self.render_orbit(&orbit, mode, canvas)?;
            self.render_planet(&orbit, *sample, mode, canvas)?;
        }

        canvas.present()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::canvas::{FrameBuffer, GraphicsCanvas};
    use crate::ephemeris::{Ephemeris, KeplerEphemeris};
    use embedded_graphics::prelude::RgbColor;
    use std::vec::Vec;

    /// Records every plotted pixel with its colour
    #[derive(Default)]
    pub(crate) struct RecordingCanvas {
        pub color: Option<Rgb888>,
        pub plots: Vec<(i32, i32, Rgb888)>,
        pub texts: Vec<(std::string::String, i32, i32, Rgb888)>,
        pub clears: usize,
        pub presents: usize,
    }

    impl Canvas for RecordingCanvas {
        type Error = ();

        fn size(&self) -> Size {
            Size::new(128, 64)
        }

        fn set_color(&mut self, color: Rgb888) {
            self.color = Some(color);
        }

        fn clear(&mut self) -> Result<(), ()> {
            self.clears += 1;
            Ok(())
        }

        fn plot(&mut self, x: i32, y: i32) -> Result<(), ()> {
            self.plots.push((x, y, self.color.ok_or(())?));
            Ok(())
        }

        fn filled_circle(&mut self, _x: i32, _y: i32, _radius: u32) -> Result<(), ()> {
            Ok(())
        }

        fn text(&mut self, text: &str, x: i32, y: i32, _wrap: u32, _scale: u8) -> Result<(), ()> {
            self.texts.push((text.into(), x, y, self.color.ok_or(())?));
            Ok(())
        }

        fn present(&mut self) -> Result<(), ()> {
            self.presents += 1;
            Ok(())
        }
    }

    fn renderer() -> OrbitRenderer {
        OrbitRenderer::new(OrreryConfig::DEFAULT)
    }

    fn orbit(index: usize) -> OrbitSpec {
        OrbitSpec::new(&OrreryConfig::DEFAULT, index).unwrap()
    }

    #[test]
    fn test_project_up_and_right() {
        let r = renderer();
        // Orbital +y is up the screen
        let (x, y) = r.project(11, PlanetSample::new(0.0, 1.0));
        assert_eq!((x as i32, y as i32), (64, 21));

        // Orbital +x is to the right
        let (x, y) = r.project(11, PlanetSample::new(1.0, 0.0));
        assert_eq!((x.round() as i32, y.round() as i32), (75, 32));
    }

    #[test]
    fn test_project_uses_direction_only() {
        let r = renderer();
        let near = r.project(20, PlanetSample::new(0.3, -0.4));
        let far = r.project(20, PlanetSample::new(3.0, -4.0));
        assert!((near.0 - far.0).abs() < 1e-4);
        assert!((near.1 - far.1).abs() < 1e-4);
    }

    #[test]
    fn test_pen_night_keeps_red() {
        assert_eq!(
            pen(ColorMode::Night, (200, 100, 50)),
            Rgb888::new(200, 0, 0)
        );
        assert_eq!(
            pen(ColorMode::Normal, (200, 100, 50)),
            Rgb888::new(200, 100, 50)
        );
    }

    #[test]
    fn test_night_sprite_palette() {
        let r = renderer();
        for index in 0..8 {
            let mut canvas = RecordingCanvas::default();
            r.render_planet(&orbit(index), PlanetSample::new(0.5, 0.5), ColorMode::Night, &mut canvas)
                .unwrap();
            let expected = if index == 2 { 200 } else { 150 };
            assert!(!canvas.plots.is_empty());
            for (_, _, color) in &canvas.plots {
                assert_eq!(*color, Rgb888::new(expected, 0, 0));
            }
        }
    }

    #[test]
    fn test_normal_sprite_uses_table_colours() {
        let r = renderer();
        let mut canvas = RecordingCanvas::default();
        let earth = orbit(2);
        r.render_planet(&earth, PlanetSample::new(0.0, 1.0), ColorMode::Normal, &mut canvas)
            .unwrap();
        let expected: Vec<_> = earth.sprite.points().map(|p| p.color).collect();
        let plotted: Vec<_> = canvas.plots.iter().map(|p| p.2).collect();
        assert_eq!(plotted, expected);
    }

    #[test]
    fn test_home_orbit_outline_stands_out() {
        let r = renderer();
        for mode in [ColorMode::Normal, ColorMode::Night] {
            let home = r.orbit_color(2, mode);
            for other in [0, 1, 3, 4, 7] {
                assert_ne!(home, r.orbit_color(other, mode));
            }
        }
        assert_eq!(r.orbit_color(2, ColorMode::Night), Rgb888::new(180, 0, 0));
        assert_eq!(r.orbit_color(1, ColorMode::Night), Rgb888::new(110, 0, 0));
    }

    #[test]
    fn test_sprite_clipped_left_and_top() {
        let config = OrreryConfig {
            width: 20,
            height: 20,
            ..OrreryConfig::DEFAULT
        };
        let r = OrbitRenderer::new(config);
        let earth = OrbitSpec::new(&config, 2).unwrap();
        let mut canvas = RecordingCanvas::default();
        // Radius 11 around (10, 10): planet centre lands at x = -1
        r.render_planet(&earth, PlanetSample::new(-1.0, 0.0), ColorMode::Normal, &mut canvas)
            .unwrap();
        assert_eq!(canvas.plots.len(), 1);
        assert_eq!((canvas.plots[0].0, canvas.plots[0].1), (0, 10));
    }

    #[test]
    fn test_orbit_outline_on_radius() {
        let r = renderer();
        let mut canvas = RecordingCanvas::default();
        r.render_orbit(&orbit(7), ColorMode::Normal, &mut canvas).unwrap();
        assert!(!canvas.plots.is_empty());
        for (x, y, color) in &canvas.plots {
            let (dx, dy) = (x - 64, y - 32);
            let d2 = dx * dx + dy * dy;
            assert!((24 * 24..=27 * 27).contains(&d2));
            assert_eq!(*color, Rgb888::new(10, 10, 10));
        }
    }

    fn scene_for<'a>(
        date: &'a CalendarDateTime,
        samples: &'a [PlanetSample],
        offset: i32,
        playback: Playback,
    ) -> Scene<'a> {
        Scene {
            date,
            offset,
            color: ColorMode::Normal,
            playback,
            samples,
        }
    }

    #[test]
    fn test_scene_overlay_text() {
        let date = CalendarDateTime::new(2026, 10, 8, 12, 0, 0).unwrap();
        let samples = KeplerEphemeris.coordinates_at(&date).unwrap();
        let r = renderer();

        let mut canvas = RecordingCanvas::default();
        r.render_scene(&scene_for(&date, &samples, 0, Playback::Manual), &mut canvas)
            .unwrap();
        assert_eq!(canvas.texts[0].0, "08 Oct 2026");
        assert_eq!((canvas.texts[0].1, canvas.texts[0].2), (0, 0));
        assert_eq!(canvas.texts[1].0, "Now");
        assert_eq!(canvas.texts[1].2, 54);
        assert_eq!(canvas.clears, 1);
        assert_eq!(canvas.presents, 1);

        let mut canvas = RecordingCanvas::default();
        r.render_scene(&scene_for(&date, &samples, 12, Playback::Manual), &mut canvas)
            .unwrap();
        assert_eq!(canvas.texts[1].0, "+12 days");

        let mut canvas = RecordingCanvas::default();
        r.render_scene(&scene_for(&date, &samples, -3, Playback::Manual), &mut canvas)
            .unwrap();
        assert_eq!(canvas.texts[1].0, "-3 days");

        let mut canvas = RecordingCanvas::default();
        r.render_scene(&scene_for(&date, &samples, 40, Playback::Demo), &mut canvas)
            .unwrap();
        assert_eq!(canvas.texts.len(), 1);
    }

    #[test]
    fn test_offset_label_extremes_fit() {
        let date = CalendarDateTime::new(2026, 10, 8, 12, 0, 0).unwrap();
        let samples = KeplerEphemeris.coordinates_at(&date).unwrap();
        let r = renderer();

        for (offset, text) in [(i32::MIN, "-2147483648 days"), (i32::MAX, "+2147483647 days")] {
            let mut canvas = RecordingCanvas::default();
            r.render_scene(&scene_for(&date, &samples, offset, Playback::Manual), &mut canvas)
                .unwrap();
            assert_eq!(canvas.texts[1].0, text);
        }
        assert_eq!("-2147483648 days".len(), LABEL_LEN);
    }

    #[test]
    #[should_panic(expected = "canvas does not match")]
    fn test_scene_rejects_mismatched_canvas() {
        let config = OrreryConfig {
            width: 96,
            ..OrreryConfig::DEFAULT
        };
        let date = CalendarDateTime::new(2026, 10, 8, 12, 0, 0).unwrap();
        let samples = KeplerEphemeris.coordinates_at(&date).unwrap();
        let mut canvas = RecordingCanvas::default();
        let _ = OrbitRenderer::new(config)
            .render_scene(&scene_for(&date, &samples, 0, Playback::Manual), &mut canvas);
    }

    #[test]
    fn test_scene_is_pure_function_of_date() {
        let date = CalendarDateTime::new(2025, 3, 1, 6, 30, 0).unwrap();
        let samples = KeplerEphemeris.coordinates_at(&date).unwrap();
        let r = renderer();
        let scene = scene_for(&date, &samples, 5, Playback::Manual);

        let mut first = GraphicsCanvas::rgb(FrameBuffer::<128, 64>::new());
        let mut second = GraphicsCanvas::rgb(FrameBuffer::<128, 64>::new());
        r.render_scene(&scene, &mut first).unwrap();
        r.render_scene(&scene, &mut second).unwrap();
        r.render_scene(&scene, &mut second).unwrap();

        assert!(first.target().same_pixels(second.target()));
        assert_eq!(first.target().pixel(64, 32), Some(Rgb888::new(230, 230, 0)));
        assert_eq!(second.target().presents(), 2);
    }

    #[test]
    fn test_night_scene_has_no_green_or_blue() {
        let date = CalendarDateTime::new(2025, 3, 1, 6, 30, 0).unwrap();
        let samples = KeplerEphemeris.coordinates_at(&date).unwrap();
        let r = renderer();
        let scene = Scene {
            color: ColorMode::Night,
            ..scene_for(&date, &samples, 0, Playback::Manual)
        };

        let mut canvas = RecordingCanvas::default();
        r.render_scene(&scene, &mut canvas).unwrap();
        for (_, _, color) in &canvas.plots {
            assert_eq!((color.g(), color.b()), (0, 0));
        }
    }
}
