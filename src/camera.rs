use log::info;

use crate::error::{ TraceError, Result };
use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::color::Color;
use crate::world::World;
use crate::canvas::Canvas;

/// A camera record for generating a canvas.
///
/// This record gives a "frame" of the world. The camera sits at the origin of
/// its own space looking down `-z` at a view plane one unit away; `transform`
/// (typically a view transformation) orients the world relative to it.
///
/// The view plane geometry is derived from the canvas size and field of view
/// once, at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    hsize: usize,
    vsize: usize,
    field_of_view: f64,

    half_width: f64,
    half_height: f64,
    pixel_size: f64,

    transform: Matrix4D,
    inverse: Option<Matrix4D>,
}

impl Camera {
    /// Creates a camera with an identity transform.
    ///
    /// `hsize` and `vsize` are the canvas size in pixels; `field_of_view` is
    /// the horizontal or vertical angle (whichever is wider) the camera sees,
    /// in radians.
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64) -> Camera {
        let half_view = (field_of_view / 2.0).tan();
        let aspect = (hsize as f64) / (vsize as f64);

        let (half_width, half_height) = if aspect >= 1.0 {
            (half_view, half_view / aspect)
        } else {
            (half_view * aspect, half_view)
        };

        let pixel_size = half_width * 2.0 / (hsize as f64);

        Camera {
            hsize,
            vsize,
            field_of_view,
            half_width,
            half_height,
            pixel_size,
            transform: Matrix4D::identity(),
            inverse: Some(Matrix4D::identity()),
        }
    }

    pub fn hsize(&self) -> usize {
        self.hsize
    }

    pub fn vsize(&self) -> usize {
        self.vsize
    }

    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    pub fn half_height(&self) -> f64 {
        self.half_height
    }

    /// The world-space width of one pixel on the view plane.
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    /// Sets the world-to-camera transform.
    ///
    /// A singular transform is accepted here and reported by `ray_for_pixel`.
    pub fn set_transform(&mut self, transform: Matrix4D) {
        self.transform = transform;
        self.inverse = transform.inverse().ok();
    }

    /// Computes the world-space ray through the center of pixel `(px, py)`.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Result<Ray4D> {
        let tr_inv = self.inverse.ok_or_else(|| TraceError::NotInvertible {
            determinant: self.transform.determinant()
        })?;

        // Offsets from the edge of the canvas to the pixel's center
        let xoffset = (px as f64 + 0.5) * self.pixel_size;
        let yoffset = (py as f64 + 0.5) * self.pixel_size;

        // The untransformed coordinates of the pixel in camera space; the
        // camera looks toward -z, so +x is to the left
        let camera_x = self.half_width - xoffset;
        let camera_y = self.half_height - yoffset;

        // Using the camera matrix, transform the canvas point and origin,
        // computing the ray's direction vector
        let pixel = tr_inv * Tuple4D::point(camera_x, camera_y, -1.0);
        let origin = tr_inv * Tuple4D::origin();
        let direction = (pixel - origin).normalize();

        Ok(Ray4D::new(origin, direction))
    }

    /// Renders one row of pixels, left to right.
    pub fn render_row(&self, w: &World, y: usize) -> Result<Vec<Color>> {
        (0..self.hsize)
            .map(|x| w.color_at(self.ray_for_pixel(x, y)?))
            .collect()
    }

    /// Renders the world, one pixel at a time on the calling thread.
    pub fn render(&self, w: &World) -> Result<Canvas> {
        info!("rendering {}x{} on 1 thread", self.hsize, self.vsize);

        let mut image = Canvas::new(self.hsize, self.vsize);

        for y in 0..self.vsize {
            for (x, color) in self.render_row(w, y)?.iter().enumerate() {
                image.write_pixel(x, y, color);
            }
        }

        info!("render finished");
        Ok(image)
    }
}

#[test]
fn construct_camera() {
    let c = Camera::new(160, 120, std::f64::consts::PI / 2.0);

    assert_eq!(c.hsize(), 160);
    assert_eq!(c.vsize(), 120);
    assert_eq!(c.field_of_view(), std::f64::consts::PI / 2.0);
    assert_eq!(*c.transform(), Matrix4D::identity());
}

#[test]
fn pixel_size_horizontal_canvas() {
    let c = Camera::new(200, 125, std::f64::consts::PI / 2.0);

    assert!(crate::feq(c.pixel_size(), 0.01));
    assert!(crate::feq(c.half_width(), 1.0));
}

#[test]
fn pixel_size_vertical_canvas() {
    let c = Camera::new(125, 200, std::f64::consts::PI / 2.0);

    assert!(crate::feq(c.pixel_size(), 0.01));
    assert!(crate::feq(c.half_height(), 1.0));
}

#[test]
fn ray_through_center() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0);
    let r = c.ray_for_pixel(100, 50).unwrap();

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0);
    let r = c.ray_for_pixel(0, 0).unwrap();

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.66519, 0.33259, -0.66851));
}

#[test]
fn ray_when_camera_transformed() {
    let mut c = Camera::new(201, 101, std::f64::consts::PI / 2.0);
    c.set_transform(Matrix4D::rotation_y(std::f64::consts::PI / 4.0)
        * Matrix4D::translation(0.0, -2.0, 5.0));
    let r = c.ray_for_pixel(100, 50).unwrap();

    assert_eq!(r.origin, Tuple4D::point(0.0, 2.0, -5.0));
    assert_eq!(r.direction,
        Tuple4D::vector(2.0f64.sqrt() / 2.0, 0.0, -(2.0f64.sqrt() / 2.0)));
}

#[test]
fn ray_with_singular_camera() {
    let mut c = Camera::new(11, 11, std::f64::consts::PI / 2.0);
    c.set_transform(Matrix4D::scaling(0.0, 0.0, 0.0));

    assert!(matches!(c.ray_for_pixel(5, 5),
        Err(TraceError::NotInvertible { .. })));
    assert!(c.render(&World::default()).is_err());
}

#[test]
fn render_world_with_camera() {
    let w = World::default();
    let mut c = Camera::new(11, 11, std::f64::consts::PI / 2.0);

    let from = Tuple4D::point(0.0, 0.0, -5.0);
    let to = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    c.set_transform(Matrix4D::view_transform(from, to, up));

    let image = c.render(&w).unwrap();
    assert_eq!(image.read_pixel(5, 5).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855));
}
