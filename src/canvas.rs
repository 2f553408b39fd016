use std::io::Write;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::color::Color;
use crate::consts::{ PPM_MAX_COLOR, PPM_LINE_WIDTH };

/// A canvas for drawing pixels.
///
/// The canvas stores the color seen through each pixel of a render. Colors
/// are kept unclamped; only serialization maps them into the output range.
///
/// For now, only PPM images are supported.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored row by row.
    pixels: Vec<Color>,
}

/// Maps a color channel onto `0..=PPM_MAX_COLOR`.
fn ppm_channel(c: f64) -> u32 {
    let max = PPM_MAX_COLOR as f64;
    (c * max).ceil().clamp(0.0, max) as u32
}

impl Canvas {
    /// Creates a new, black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// All pixels, row by row from the top left.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. `x` is the column of the pixel and
    /// `y` the row, both zero-indexed from the top left.
    ///
    /// # Examples
    ///
    /// Writing a pixel to the fourth column, second row on an 8-by-8 canvas:
    ///
    /// ```
    /// # use raytrace::color::Color;
    /// # use raytrace::canvas::Canvas;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// If the specified pixel location is out-of-bounds, `None` is returned.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Serializes the canvas as a plain PPM (`P3`) image.
    ///
    /// Each canvas row starts a new line. Within a row, values wrap at
    /// whitespace so that no line exceeds `PPM_LINE_WIDTH` characters. The
    /// output always ends with a newline.
    pub fn to_ppm(&self) -> String {
        let mut ppm = format!("P3\n{} {}\n{}\n",
            self.width, self.height, PPM_MAX_COLOR);

        if self.width == 0 {
            return ppm;
        }

        for row in self.pixels.chunks(self.width) {
            let mut line = String::new();

            for pixel in row {
                for channel in [pixel.r, pixel.g, pixel.b].iter() {
                    let value = ppm_channel(*channel).to_string();

                    // Move the value to a fresh line if it would not fit
                    if line.len() + 1 + value.len() > PPM_LINE_WIDTH {
                        ppm.push_str(&line);
                        ppm.push('\n');
                        line.clear();
                    }

                    if !line.is_empty() {
                        line.push(' ');
                    }
                    line.push_str(&value);
                }
            }

            ppm.push_str(&line);
            ppm.push('\n');
        }

        ppm
    }

    /// Writes the canvas as a PPM image to `out`.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(self.to_ppm().as_bytes())?;
        out.flush()?;

        Ok(())
    }

    /// Saves the canvas to a PPM file, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        debug!("writing {}x{} image to {}",
            self.width, self.height, path.as_ref().display());

        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!((c.width, c.height), (10, 20));
    assert_eq!(c.pixels().len(), 200);
    assert!(c.pixels().iter().all(|p| *p == Color::black()));
}

#[test]
fn read_and_write_pixels() {
    let mut c = Canvas::new(10, 20);
    let red = Color::rgb(1.0, 0.0, 0.0);
    c.write_pixel(2, 3, &red);

    assert_eq!(c.read_pixel(2, 3), Some(red));
    assert_eq!(c.read_pixel(3, 2), Some(Color::black()));
}

#[test]
fn out_of_bounds_pixels() {
    let mut c = Canvas::new(4, 4);
    c.write_pixel(4, 0, &Color::white());
    c.write_pixel(0, 4, &Color::white());

    assert_eq!(c.read_pixel(4, 0), None);
    assert!(c.pixels().iter().all(|p| *p == Color::black()));
}

#[test]
fn ppm_header() {
    let c = Canvas::new(5, 3);
    let ppm = c.to_ppm();
    let header: Vec<&str> = ppm.lines().take(3).collect();

    assert_eq!(header, vec!["P3", "5 3", "255"]);
}

#[test]
fn ppm_pixel_data() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0));

    let ppm = c.to_ppm();
    let body: Vec<&str> = ppm.lines().skip(3).collect();

    assert_eq!(body, vec![
        "255 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
        "0 0 0 0 0 0 0 128 0 0 0 0 0 0 0",
        "0 0 0 0 0 0 0 0 0 0 0 0 0 0 255",
    ]);
}

#[test]
fn ppm_splits_long_lines() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, &Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let ppm = c.to_ppm();
    let body: Vec<&str> = ppm.lines().skip(3).collect();

    assert_eq!(body, vec![
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204",
        "153 255 204 153 255 204 153 255 204 153 255 204 153",
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204",
        "153 255 204 153 255 204 153 255 204 153 255 204 153",
    ]);
    assert!(ppm.lines().all(|l| l.len() <= PPM_LINE_WIDTH));
}

#[test]
fn ppm_ends_with_newline() {
    let c = Canvas::new(5, 3);

    assert!(c.to_ppm().ends_with('\n'));
}

#[test]
fn write_ppm_to_buffer() {
    let mut c = Canvas::new(1, 1);
    c.write_pixel(0, 0, &Color::white());

    let mut buf: Vec<u8> = Vec::new();
    c.write_ppm(&mut buf).unwrap();

    assert_eq!(String::from_utf8(buf).unwrap(), "P3\n1 1\n255\n255 255 255\n");
}
