//! Builders for the affine transformations used throughout the tracer.
//!
//! Every builder returns a fresh 4x4 `Matrix4D`. Transformations compose by
//! multiplication, and the rightmost matrix is applied first:
//! `translation * scaling` scales a point, then translates it.

use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;

impl Matrix4D {
    /// Instantiates a 4x4 translation matrix.
    ///
    /// This matrix offsets a point by `x`, `y` and `z`. Vectors are unaffected,
    /// since their `w` component is zero.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut trans = Self::identity();
        trans[(0, 3)] = x;
        trans[(1, 3)] = y;
        trans[(2, 3)] = z;

        trans
    }

    /// Instantiates a 4x4 scaling matrix.
    ///
    /// This matrix scales vectors or points by `x`, `y` and `z` along the X, Y
    /// and Z axes, respectively. A negative factor reflects across that axis.
    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut scale = Self::identity();
        scale[(0, 0)] = x;
        scale[(1, 1)] = y;
        scale[(2, 2)] = z;

        scale
    }

    /// Instantiates a 4x4 rotation matrix, rotating about the X axis.
    ///
    /// Follows the right-hand rule. Assumes that parameter `r` is in radians.
    ///
    /// # Examples
    ///
    /// Create a matrix to rotate a point 90 degrees about the X axis:
    ///
    /// ```
    /// # use raytrace::tuple::Tuple4D;
    /// # use raytrace::matrix::Matrix4D;
    /// let point = Tuple4D::point(0.0, 1.0, 0.0);
    /// let m = Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
    /// assert_eq!(m * point, Tuple4D::point(0.0, 0.0, 1.0));
    /// ```
    pub fn rotation_x(r: f64) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate[(1, 1)] =  r.cos();
        rotate[(1, 2)] = -r.sin();
        rotate[(2, 1)] =  r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Instantiates a 4x4 rotation matrix, rotating about the Y axis.
    ///
    /// # Examples
    ///
    /// ```
    /// # use raytrace::tuple::Tuple4D;
    /// # use raytrace::matrix::Matrix4D;
    /// let point = Tuple4D::point(1.0, 0.0, 0.0);
    /// let m = Matrix4D::rotation_y(std::f64::consts::PI / 2.0);
    /// assert_eq!(m * point, Tuple4D::point(0.0, 0.0, -1.0));
    /// ```
    pub fn rotation_y(r: f64) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 2)] =  r.sin();
        rotate[(2, 0)] = -r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Instantiates a 4x4 rotation matrix, rotating about the Z axis.
    ///
    /// # Examples
    ///
    /// ```
    /// # use raytrace::tuple::Tuple4D;
    /// # use raytrace::matrix::Matrix4D;
    /// let point = Tuple4D::point(0.0, 1.0, 0.0);
    /// let m = Matrix4D::rotation_z(std::f64::consts::PI / 2.0);
    /// assert_eq!(m * point, Tuple4D::point(-1.0, 0.0, 0.0));
    /// ```
    pub fn rotation_z(r: f64) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 1)] = -r.sin();
        rotate[(1, 0)] =  r.sin();
        rotate[(1, 1)] =  r.cos();

        rotate
    }

    /// Instantiates a 4x4 shearing matrix.
    ///
    /// A shear moves each coordinate in proportion to the other two. Parameter
    /// `xy` is how much `x` changes in proportion to `y`, `xz` how much `x`
    /// changes in proportion to `z`, and so on:
    ///
    /// ```text
    /// x' = x + xy*y + xz*z
    /// y' = y + yx*x + yz*z
    /// z' = z + zx*x + zy*y
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// # use raytrace::tuple::Tuple4D;
    /// # use raytrace::matrix::Matrix4D;
    /// let point = Tuple4D::point(2.0, 3.0, 4.0);
    /// let m = Matrix4D::shearing(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    /// assert_eq!(m * point, Tuple4D::point(5.0, 3.0, 4.0));
    /// ```
    pub fn shearing(xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64)
        -> Matrix4D {
        let mut shear = Self::identity();
        shear[(0, 1)] = xy;
        shear[(0, 2)] = xz;
        shear[(1, 0)] = yx;
        shear[(1, 2)] = yz;
        shear[(2, 0)] = zx;
        shear[(2, 1)] = zy;

        shear
    }

    /// Generates a view transformation.
    ///
    /// The `from` parameter is where the eye is, the `to` parameter is where
    /// the eye is looking, and the `up` parameter indicates roughly where "up"
    /// is in the world. The result maps world space into eye space, where the
    /// eye sits at the origin looking down `-z`.
    ///
    /// Note that the view transformation moves the *world* with respect to the
    /// eye, not the other way around.
    ///
    /// `from == to`, or `up` parallel to the line of sight, leaves no basis to
    /// build and produces NaN elements.
    ///
    /// ```
    /// # use raytrace::tuple::Tuple4D;
    /// # use raytrace::matrix::Matrix4D;
    /// let from = Tuple4D::point(0.0, 0.0, 8.0);
    /// let to = Tuple4D::point(0.0, 0.0, 0.0);
    /// let up = Tuple4D::vector(0.0, 1.0, 0.0);
    /// let view = Matrix4D::view_transform(from, to, up);
    /// assert_eq!(view, Matrix4D::translation(0.0, 0.0, -8.0));
    /// ```
    pub fn view_transform(from: Tuple4D, to: Tuple4D, up: Tuple4D) -> Matrix4D {
        let forward = (to - from).normalize();
        let left = forward.cross(&up.normalize()).normalize();
        let true_up = left.cross(&forward);

        let mut orientation = Matrix4D::identity();
        orientation[(0, 0)] = left.x;
        orientation[(0, 1)] = left.y;
        orientation[(0, 2)] = left.z;

        orientation[(1, 0)] = true_up.x;
        orientation[(1, 1)] = true_up.y;
        orientation[(1, 2)] = true_up.z;

        orientation[(2, 0)] = -forward.x;
        orientation[(2, 1)] = -forward.y;
        orientation[(2, 2)] = -forward.z;

        orientation * Matrix4D::translation(-from.x, -from.y, -from.z)
    }
}

#[test]
fn translation_moves_points() {
    let transform = Matrix4D::translation(5.0, -3.0, 2.0);
    let point = Tuple4D::point(-3.0, 4.0, 5.0);

    assert_eq!(transform * point, Tuple4D::point(2.0, 1.0, 7.0));
}

#[test]
fn translation_inverse() {
    let transform = Matrix4D::translation(5.0, -3.0, 2.0).inverse().unwrap();
    let point = Tuple4D::point(-3.0, 4.0, 5.0);

    assert_eq!(transform * point, Tuple4D::point(-8.0, 7.0, 3.0));
}

#[test]
fn translation_ignores_vectors() {
    let transform = Matrix4D::translation(5.0, -3.0, 2.0);
    let vector = Tuple4D::vector(-3.0, 4.0, 5.0);

    assert_eq!(transform * vector, vector);
}

#[test]
fn scaling_points_and_vectors() {
    let transform = Matrix4D::scaling(2.0, 3.0, 4.0);

    assert_eq!(transform * Tuple4D::point(-4.0, 6.0, 8.0),
        Tuple4D::point(-8.0, 18.0, 32.0));
    assert_eq!(transform * Tuple4D::vector(-4.0, 6.0, 8.0),
        Tuple4D::vector(-8.0, 18.0, 32.0));
}

#[test]
fn scaling_inverse() {
    let transform = Matrix4D::scaling(2.0, 3.0, 4.0).inverse().unwrap();
    let vector = Tuple4D::vector(-4.0, 6.0, 8.0);

    assert_eq!(transform * vector, Tuple4D::vector(-2.0, 2.0, 2.0));
}

#[test]
fn scaling_reflection() {
    let transform = Matrix4D::scaling(-1.0, 1.0, 1.0);
    let point = Tuple4D::point(2.0, 3.0, 4.0);

    assert_eq!(transform * point, Tuple4D::point(-2.0, 3.0, 4.0));
}

#[test]
fn rotate_x() {
    let half_quarter = Matrix4D::rotation_x(std::f64::consts::PI / 4.0);
    let full_quarter = Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
    let point = Tuple4D::point(0.0, 1.0, 0.0);

    assert_eq!(full_quarter * point,
        Tuple4D::point(0.0, 0.0, 1.0));
    assert_eq!(half_quarter * point,
        Tuple4D::point(0.0, 2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0));
    assert_eq!(half_quarter.inverse().unwrap() * point,
        Tuple4D::point(0.0, 2.0f64.sqrt() / 2.0, -(2.0f64.sqrt() / 2.0)));
}

#[test]
fn rotate_y() {
    let half_quarter = Matrix4D::rotation_y(std::f64::consts::PI / 4.0);
    let full_quarter = Matrix4D::rotation_y(std::f64::consts::PI / 2.0);
    let point = Tuple4D::point(0.0, 0.0, 1.0);

    assert_eq!(full_quarter * point,
        Tuple4D::point(1.0, 0.0, 0.0));
    assert_eq!(half_quarter * point,
        Tuple4D::point(2.0f64.sqrt() / 2.0, 0.0, 2.0f64.sqrt() / 2.0));
}

#[test]
fn rotate_z() {
    let half_quarter = Matrix4D::rotation_z(std::f64::consts::PI / 4.0);
    let full_quarter = Matrix4D::rotation_z(std::f64::consts::PI / 2.0);
    let point = Tuple4D::point(0.0, 1.0, 0.0);

    assert_eq!(full_quarter * point,
        Tuple4D::point(-1.0, 0.0, 0.0));
    assert_eq!(half_quarter * point,
        Tuple4D::point(-2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0, 0.0));
}

#[test]
fn shear_each_axis() {
    let point = Tuple4D::point(2.0, 3.0, 4.0);
    let cases = [
        ([1.0, 0.0, 0.0, 0.0, 0.0, 0.0], Tuple4D::point(5.0, 3.0, 4.0)),
        ([0.0, 1.0, 0.0, 0.0, 0.0, 0.0], Tuple4D::point(6.0, 3.0, 4.0)),
        ([0.0, 0.0, 1.0, 0.0, 0.0, 0.0], Tuple4D::point(2.0, 5.0, 4.0)),
        ([0.0, 0.0, 0.0, 1.0, 0.0, 0.0], Tuple4D::point(2.0, 7.0, 4.0)),
        ([0.0, 0.0, 0.0, 0.0, 1.0, 0.0], Tuple4D::point(2.0, 3.0, 6.0)),
        ([0.0, 0.0, 0.0, 0.0, 0.0, 1.0], Tuple4D::point(2.0, 3.0, 7.0)),
    ];

    for (k, expected) in cases.iter() {
        let m = Matrix4D::shearing(k[0], k[1], k[2], k[3], k[4], k[5]);
        assert_eq!(m * point, *expected);
    }
}

#[test]
fn transforms_undo_with_inverse() {
    let p = Tuple4D::point(-1.5, 2.25, 7.0);
    let transforms = [
        Matrix4D::translation(3.0, -4.0, 0.5),
        Matrix4D::scaling(0.5, 2.0, -3.0),
        Matrix4D::rotation_x(1.1),
        Matrix4D::rotation_y(-0.4),
        Matrix4D::rotation_z(2.9),
        Matrix4D::shearing(0.2, 0.0, 0.0, 1.5, 0.0, 0.3),
    ];

    for t in transforms.iter() {
        assert_eq!(t.inverse().unwrap() * (*t * p), p);
    }
}

#[test]
fn chained_transforms() {
    let a = Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
    let b = Matrix4D::scaling(5.0, 5.0, 5.0);
    let c = Matrix4D::translation(10.0, 5.0, 7.0);
    let p = Tuple4D::point(1.0, 0.0, 1.0);

    // Applied one at a time
    let p2 = a * p;
    assert_eq!(p2, Tuple4D::point(1.0, -1.0, 0.0));
    let p3 = b * p2;
    assert_eq!(p3, Tuple4D::point(5.0, -5.0, 0.0));
    assert_eq!(c * p3, Tuple4D::point(15.0, 0.0, 7.0));

    // Chained, in reverse order
    assert_eq!(c * b * a * p, Tuple4D::point(15.0, 0.0, 7.0));
}

#[test]
fn default_view() {
    let from = Tuple4D::point(0.0, 0.0, 0.0);
    let to = Tuple4D::point(0.0, 0.0, -1.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::identity(), Matrix4D::view_transform(from, to, up));
}

#[test]
fn positive_z_view() {
    let from = Tuple4D::point(0.0, 0.0, 0.0);
    let to = Tuple4D::point(0.0, 0.0, 1.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(from, to, up),
        Matrix4D::scaling(-1.0, 1.0, -1.0));
}

#[test]
fn view_moves_world() {
    let from = Tuple4D::point(0.0, 0.0, 8.0);
    let to = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(from, to, up),
        Matrix4D::translation(0.0, 0.0, -8.0));
}

#[test]
fn arbitrary_view() {
    let from = Tuple4D::point(1.0, 3.0, 2.0);
    let to = Tuple4D::point(4.0, -2.0, 8.0);
    let up = Tuple4D::vector(1.0, 1.0, 0.0);

    let a: Matrix4D = [  -0.51450, 0.51450,  0.68599, -2.40098,
                          0.77892, 0.61494,  0.12299, -2.86972,
                         -0.35857, 0.59761, -0.71714,  0.00000,
                         -0.00000, 0.00000,  0.00000,  1.00000, ].into();

    assert_eq!(Matrix4D::view_transform(from, to, up), a);
}

#[test]
fn view_basis_is_orthonormal_for_slanted_up() {
    let from = Tuple4D::point(1.0, 3.0, 2.0);
    let to = Tuple4D::point(4.0, -2.0, 8.0);
    let up = Tuple4D::vector(1.0, 1.0, 0.0);
    let view = Matrix4D::view_transform(from, to, up);

    let rows: Vec<Tuple4D> = (0..3).map(|r| {
        let row = view.row(r);
        Tuple4D::vector(row[0], row[1], row[2])
    }).collect();

    for (i, a) in rows.iter().enumerate() {
        assert!(crate::feq(a.magnitude(), 1.0));
        for b in rows.iter().skip(i + 1) {
            assert!(crate::feq(a.dot(b), 0.0));
        }
    }
}
