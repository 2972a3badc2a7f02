//! Pixel canvas
//!
//! [`Canvas`] is the small drawing surface the renderer needs: a pen colour,
//! single pixels, a filled circle, wrapped text and a present step.
//! [`GraphicsCanvas`] provides it on top of any `embedded-graphics`
//! [`DrawTarget`] that can also push a finished frame ([`FlushTarget`]).

use core::convert::Infallible;

use embedded_graphics::{
    mono_font::{
        MonoFont, MonoTextStyle,
        ascii::{FONT_6X10, FONT_10X20},
    },
    pixelcolor::{BinaryColor, Rgb888},
    prelude::*,
    primitives::{Circle, PrimitiveStyle},
    text::{Baseline, Text},
};

/// Drawing surface used by the renderer
///
/// Coordinates are pixels from the top-left corner; implementations clip
/// anything outside their bounds.
pub trait Canvas {
    type Error;

    /// Canvas size in pixels
    fn size(&self) -> Size;

    /// Set the pen colour for subsequent operations
    fn set_color(&mut self, color: Rgb888);

    /// Fill the whole canvas with the pen colour
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Set one pixel
    fn plot(&mut self, x: i32, y: i32) -> Result<(), Self::Error>;

    /// Filled circle of radius `radius` centred on `(x, y)`
    fn filled_circle(&mut self, x: i32, y: i32, radius: u32) -> Result<(), Self::Error>;

    /// Draw text with its top-left corner at `(x, y)`
    ///
    /// Lines wrap at spaces once they would exceed `wrap_width` pixels; a
    /// width of 0 puts every word on its own line. `scale` 1 is the small
    /// font, anything larger the big one.
    fn text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        wrap_width: u32,
        scale: u8,
    ) -> Result<(), Self::Error>;

    /// Push the finished frame to the display
    fn present(&mut self) -> Result<(), Self::Error>;
}

/// A draw target with an explicit frame flush
pub trait FlushTarget: DrawTarget {
    fn flush_frame(&mut self) -> Result<(), Self::Error>;
}

/// Font used for a text scale
pub fn font_for_scale(scale: u8) -> &'static MonoFont<'static> {
    if scale <= 1 { &FONT_6X10 } else { &FONT_10X20 }
}

/// Horizontal advance of one glyph
fn glyph_advance(font: &MonoFont<'_>) -> u32 {
    font.character_size.width + font.character_spacing
}

/// Pixel width of a run of text
fn text_width(text: &str, advance: u32) -> u32 {
    text.chars().count() as u32 * advance
}

/// Greedy word wrap, yielding slices of the source text
#[derive(Debug, Clone)]
pub struct WrappedLines<'a> {
    rest: &'a str,
    wrap_width: u32,
    advance: u32,
}

/// Split `text` into lines no wider than `wrap_width` pixels
///
/// Words longer than the width get a line of their own.
pub fn wrap_lines(text: &str, wrap_width: u32, advance: u32) -> WrappedLines<'_> {
    WrappedLines {
        rest: text.trim_matches(' '),
        wrap_width,
        advance,
    }
}

impl<'a> Iterator for WrappedLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        let mut end = self.rest.find(' ').unwrap_or(self.rest.len());
        while end < self.rest.len() {
            let next_end = self.rest[end + 1..]
                .find(' ')
                .map_or(self.rest.len(), |i| end + 1 + i);
            if text_width(&self.rest[..next_end], self.advance) > self.wrap_width {
                break;
            }
            end = next_end;
        }

        let line = &self.rest[..end];
        self.rest = self.rest[end..].trim_start_matches(' ');
        Some(line)
    }
}

/// [`Canvas`] over an `embedded-graphics` draw target
pub struct GraphicsCanvas<D: DrawTarget> {
    target: D,
    color: Rgb888,
    map: fn(Rgb888) -> D::Color,
}

impl<D: DrawTarget> GraphicsCanvas<D> {
    /// Wrap a draw target, converting pen colours with `map`
    pub fn new(target: D, map: fn(Rgb888) -> D::Color) -> Self {
        Self {
            target,
            color: Rgb888::BLACK,
            map,
        }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    fn pen(&self) -> D::Color {
        (self.map)(self.color)
    }
}

impl<D: DrawTarget<Color = Rgb888>> GraphicsCanvas<D> {
    /// Full-colour target, pen passed through unchanged
    pub fn rgb(target: D) -> Self {
        Self::new(target, core::convert::identity)
    }
}

/// Any lit colour is "on" for a monochrome panel
pub fn to_binary(color: Rgb888) -> BinaryColor {
    if color == Rgb888::BLACK {
        BinaryColor::Off
    } else {
        BinaryColor::On
    }
}

impl<D: FlushTarget> Canvas for GraphicsCanvas<D> {
    type Error = D::Error;

    fn size(&self) -> Size {
        self.target.bounding_box().size
    }

    fn set_color(&mut self, color: Rgb888) {
        self.color = color;
    }

    fn clear(&mut self) -> Result<(), D::Error> {
        let pen = self.pen();
        self.target.clear(pen)
    }

    fn plot(&mut self, x: i32, y: i32) -> Result<(), D::Error> {
        let point = Point::new(x, y);
        if !self.target.bounding_box().contains(point) {
            return Ok(());
        }
        let pen = self.pen();
        Pixel(point, pen).draw(&mut self.target)
    }

    fn filled_circle(&mut self, x: i32, y: i32, radius: u32) -> Result<(), D::Error> {
        let pen = self.pen();
        Circle::with_center(Point::new(x, y), radius * 2 + 1)
            .into_styled(PrimitiveStyle::with_fill(pen))
            .draw(&mut self.target)
    }

    fn text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        wrap_width: u32,
        scale: u8,
    ) -> Result<(), D::Error> {
        let font = font_for_scale(scale);
        let style = MonoTextStyle::new(font, self.pen());
        let line_height = font.character_size.height as i32;

        let mut top = y;
        for line in wrap_lines(text, wrap_width, glyph_advance(font)) {
            Text::with_baseline(line, Point::new(x, top), style, Baseline::Top)
                .draw(&mut self.target)?;
            top += line_height;
        }
        Ok(())
    }

    fn present(&mut self) -> Result<(), D::Error> {
        self.target.flush_frame()
    }
}

/// In-memory RGB frame for host builds and tests
#[derive(Clone)]
pub struct FrameBuffer<const W: usize, const H: usize> {
    pixels: [[Rgb888; W]; H],
    presents: u32,
}

impl<const W: usize, const H: usize> Default for FrameBuffer<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> FrameBuffer<W, H> {
    pub const fn new() -> Self {
        Self {
            pixels: [[Rgb888::BLACK; W]; H],
            presents: 0,
        }
    }

    /// Colour at a pixel, `None` outside the frame
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb888> {
        let row = self.pixels.get(usize::try_from(y).ok()?)?;
        row.get(usize::try_from(x).ok()?).copied()
    }

    /// Number of frames flushed so far
    pub fn presents(&self) -> u32 {
        self.presents
    }

    /// Number of pixels of a given colour
    pub fn count(&self, color: Rgb888) -> usize {
        self.pixels
            .iter()
            .flatten()
            .filter(|pixel| **pixel == color)
            .count()
    }

    /// Same picture, ignoring how often it was flushed
    pub fn same_pixels(&self, other: &Self) -> bool {
        self.pixels == other.pixels
    }
}

impl<const W: usize, const H: usize> OriginDimensions for FrameBuffer<W, H> {
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl<const W: usize, const H: usize> DrawTarget for FrameBuffer<W, H> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Infallible>
    where
        I: IntoIterator<Item = Pixel<Rgb888>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if let Some(pixel) = self.pixels.get_mut(y).and_then(|row| row.get_mut(x)) {
                *pixel = color;
            }
        }
        Ok(())
    }
}

impl<const W: usize, const H: usize> FlushTarget for FrameBuffer<W, H> {
    fn flush_frame(&mut self) -> Result<(), Infallible> {
        self.presents += 1;
        Ok(())
    }
}
