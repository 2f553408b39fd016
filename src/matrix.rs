use std::ops::{ Index, IndexMut, Mul };
use std::convert::From;

use crate::feq;
use crate::tuple::Tuple4D;
use crate::error::{ TraceError, Result };

/// A 2x2 matrix.
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Matrix2D {
    data: [f64; 4],
}

impl From<[f64; 4]> for Matrix2D {
    fn from(data: [f64; 4]) -> Matrix2D {
        Matrix2D { data }
    }
}

impl PartialEq for Matrix2D {
    fn eq(&self, other: &Matrix2D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Index<(usize, usize)> for Matrix2D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 2) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix2D {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[(index.0 * 2) + index.1]
    }
}

/// A 3x3 matrix.
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Matrix3D {
    data: [f64; 9],
}

impl From<[f64; 9]> for Matrix3D {
    fn from(data: [f64; 9]) -> Matrix3D {
        Matrix3D { data }
    }
}

impl PartialEq for Matrix3D {
    fn eq(&self, other: &Matrix3D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Index<(usize, usize)> for Matrix3D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 3) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix3D {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[(index.0 * 3) + index.1]
    }
}

/// A 4x4 matrix.
///
/// These matrices are used almost universally in the ray tracer logic.
/// Basically, these matrices encode transformations in 3D space, transforming
/// both vectors and points (`w` components of `0.0` and `1.0`, respectively).
/// The builders for specific transformations (translation, rotation, view
/// transforms, etc.) live in `crate::transform`.
///
/// Elements are stored row-major and addressed as `m[(row, col)]`. Equality
/// is approximate, element-wise, within `crate::consts::EPSILON`.
///
/// For methods which modify matrices, they are typically provided in pairs;
/// one which modifies the matrix in-place, and one which returns a new matrix.
/// For example, `transpose` and `transposition`.
///
/// # Examples
///
/// Creating an identity matrix:
///
/// ```
/// # use raytrace::matrix::Matrix4D;
/// let mat = Matrix4D::identity();
/// assert_eq!(mat.determinant(), 1.0);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Matrix4D {
    data: [f64; 16],
}

impl Matrix2D {
    /// Instantiates a 2x2 identity matrix.
    pub fn identity() -> Matrix2D {
        let mut buf = [0.0; 4];
        buf[0] = 1.0; buf[3] = 1.0;

        Matrix2D { data: buf }
    }

    /// Calculates the determinant of a `Matrix2D`.
    pub fn determinant(&self) -> f64 {
        self[(0, 0)] * self[(1, 1)] - self[(0, 1)] * self[(1, 0)]
    }
}

impl Matrix3D {
    /// Instantiates a 3x3 identity matrix.
    pub fn identity() -> Matrix3D {
        let mut buf = [0.0; 9];
        buf[0] = 1.0; buf[4] = 1.0; buf[8] = 1.0;

        Matrix3D { data: buf }
    }

    /// Returns the submatrix of a `Matrix3D`.
    ///
    /// A submatrix can be thought of as a matrix which "eliminates" a row and
    /// column of a larger matrix. For example, given the following 3x3 matrix:
    ///
    /// ```text
    /// [
    ///     1.0, 0.0, 2.0,
    ///     3.0, 1.0, 0.0,
    ///     1.0, 1.0, 1.0
    /// ]
    /// ```
    ///
    /// The corresponding submatrix for `row == 1`, `col == 2` (assuming zero
    /// index), would be a 2x2 matrix:
    ///
    /// ```text
    /// [
    ///     1.0, 0.0,
    ///     1.0, 1.0
    /// ]
    /// ```
    pub fn submatrix(&self, row: usize, col: usize) -> Matrix2D {
        let mut buf: [f64; 4] = [0.0; 4];
        let mut count = 0;

        for r in 0..3 {
            for c in 0..3 {
                if !(r == row || c == col) {
                    buf[count] = self[(r, c)];
                    count += 1;
                }
            }
        }

        Matrix2D { data: buf }
    }

    /// Returns the minor of a `Matrix3D` at row and column.
    ///
    /// The "minor" is the determinant of the submatrix at `row` and `col`.
    pub fn minor(&self, row: usize, col: usize) -> f64 {
        self.submatrix(row, col).determinant()
    }

    /// Returns the cofactor of a `Matrix3D` at row and column.
    ///
    /// The minor, negated when `row + col` is odd.
    pub fn cofactor(&self, row: usize, col: usize) -> f64 {
        let m = self.minor(row, col);
        m * if (row + col) % 2 == 0 { 1.0 } else { -1.0 }
    }

    /// Calculates the determinant of a `Matrix3D` by cofactor expansion along
    /// the first row.
    pub fn determinant(&self) -> f64 {
        let mut sum = 0.0;
        for c in 0..3 {
            sum += self[(0, c)] * self.cofactor(0, c);
        }

        sum
    }
}

/// Determines whether two `Matrix4D`s are equal.
///
/// Matrices are compared element-wise. Note that equality is approximate, as
/// `Matrix4D` elements are floating point numbers.
impl PartialEq for Matrix4D {
    fn eq(&self, other: &Matrix4D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Matrix4D {
    /// Creates a new `Matrix4D`. All elements are initialized to `0.0`.
    pub fn new() -> Matrix4D {
        Matrix4D { data: [0.0; 16] }
    }

    /// Instantiates a 4x4 identity matrix.
    pub fn identity() -> Matrix4D {
        let mut buf = [0.0; 16];
        buf[0] = 1.0; buf[5] = 1.0; buf[10] = 1.0; buf[15] = 1.0;

        Matrix4D { data: buf }
    }

    /// Returns row `r` of the matrix.
    pub fn row(&self, r: usize) -> [f64; 4] {
        [self[(r, 0)], self[(r, 1)], self[(r, 2)], self[(r, 3)]]
    }

    /// Returns column `c` of the matrix.
    pub fn column(&self, c: usize) -> [f64; 4] {
        [self[(0, c)], self[(1, c)], self[(2, c)], self[(3, c)]]
    }

    /// Turns a matrix into its own transpose.
    ///
    /// The transpose of a matrix is roughly defined by the following formula
    /// (given matrix `A`, create transpose matrix `A^T`):
    ///
    /// ```latex
    /// A^T_{ij} = A_{ji}
    /// ```
    pub fn transpose(&mut self) {
        *self = self.transposition();
    }

    /// Produces the transpose of a matrix, returning a new matrix as a result.
    pub fn transposition(&self) -> Matrix4D {
        let mut buf = *self;

        for r in 0..4 {
            for c in (r+1)..4 {
                let tmp = buf[(r, c)];
                buf[(r, c)] = buf[(c, r)];
                buf[(c, r)] = tmp;
            }
        }

        buf
    }

    /// Returns the submatrix of a `Matrix4D`, removing `row` and `col`.
    ///
    /// For example, given the following 4x4 matrix:
    ///
    /// ```text
    /// [
    ///     1.0, 0.0, 2.0, 0.0,
    ///     3.0, 1.0, 0.0, 0.0,
    ///     1.0, 1.0, 1.0, 0.0,
    ///     4.0, 0.0, 0.0, 1.0
    /// ]
    /// ```
    ///
    /// The corresponding submatrix for `row == 1`, `col == 2` would be:
    ///
    /// ```text
    /// [
    ///     1.0, 0.0, 0.0,
    ///     1.0, 1.0, 0.0,
    ///     4.0, 0.0, 1.0
    /// ]
    /// ```
    pub fn submatrix(&self, row: usize, col: usize) -> Matrix3D {
        let mut buf: [f64; 9] = [0.0; 9];
        let mut count = 0;

        for r in 0..4 {
            for c in 0..4 {
                if !(r == row || c == col) {
                    buf[count] = self[(r, c)];
                    count += 1;
                }
            }
        }

        Matrix3D { data: buf }
    }

    /// Returns the minor of a `Matrix4D` at row and column.
    pub fn minor(&self, row: usize, col: usize) -> f64 {
        self.submatrix(row, col).determinant()
    }

    /// Returns the cofactor of a `Matrix4D` at row and column.
    ///
    /// The minor, negated when `row + col` is odd.
    pub fn cofactor(&self, row: usize, col: usize) -> f64 {
        let m = self.minor(row, col);
        m * if (row + col) % 2 == 0 { 1.0 } else { -1.0 }
    }

    /// Calculates the determinant of a `Matrix4D`.
    pub fn determinant(&self) -> f64 {
        let mut sum = 0.0;
        for c in 0..4 {
            sum += self[(0, c)] * self.cofactor(0, c);
        }

        sum
    }

    /// Whether the matrix has an inverse (its determinant is nonzero).
    pub fn is_invertible(&self) -> bool {
        self.determinant() != 0.0
    }

    /// Calculates the inverse of a `Matrix4D`.
    ///
    /// The inverse is the transposed cofactor matrix divided by the
    /// determinant. A matrix with a zero determinant has no inverse, and
    /// `TraceError::NotInvertible` is returned.
    pub fn inverse(&self) -> Result<Matrix4D> {
        let det = self.determinant();
        if det == 0.0 {
            return Err(TraceError::NotInvertible { determinant: det });
        }

        let mut inv = Matrix4D::new();
        for r in 0..4 {
            for c in 0..4 {
                inv[(c, r)] = self.cofactor(r, c) / det;
            }
        }

        Ok(inv)
    }
}

impl From<[f64; 16]> for Matrix4D {
    fn from(data: [f64; 16]) -> Matrix4D {
        Matrix4D { data }
    }
}

impl Index<(usize, usize)> for Matrix4D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 4) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix4D {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[(index.0 * 4) + index.1]
    }
}

/// Multiplication between two matrices.
///
/// Note that matrix multiplication is not commutative; in other words, for
/// matrix `A` and matrix `B`, `A * B` is not necessarily equal to `B * A`.
/// Applied to a tuple, `(A * B) * t` performs `B`'s transformation first.
///
/// # Examples
///
/// ```
/// # use raytrace::matrix::Matrix4D;
/// let m1 = Matrix4D::scaling(2.0, 3.0, 4.0);
/// let m2 = Matrix4D::scaling(4.0, 3.0, 2.0);
/// assert_eq!(m1 * m2, Matrix4D::scaling(8.0, 9.0, 8.0));
/// ```
impl Mul<Matrix4D> for Matrix4D {
    type Output = Matrix4D;

    fn mul(self, other: Matrix4D) -> Matrix4D {
        let mut res = Matrix4D::new();

        for r in 0..4 {
            for c in 0..4 {
                res[(r, c)] = self[(r, 0)] * other[(0, c)]
                    + self[(r, 1)] * other[(1, c)]
                    + self[(r, 2)] * other[(2, c)]
                    + self[(r, 3)] * other[(3, c)]
            }
        }

        res
    }
}

/// Multiplication between a matrix and a `Tuple4D`.
///
/// Note that `Tuple4D`s are multiplied on the right; this matches the
/// convention of a 4D vector having 4 rows, 1 column.
///
/// # Examples
///
/// ```
/// # use raytrace::tuple::Tuple4D;
/// # use raytrace::matrix::Matrix4D;
/// let v = Tuple4D::vector(1.0, 4.0, 5.0);
/// let m = Matrix4D::scaling(2.0, 2.0, 2.0);
/// assert_eq!(m * v, Tuple4D::vector(2.0, 8.0, 10.0));
/// ```
impl Mul<Tuple4D> for Matrix4D {
    type Output = Tuple4D;

    fn mul(self, other: Tuple4D) -> Tuple4D {
        let mut buf: [f64; 4] = Default::default();

        for r in 0..4 {
            buf[r] = self[(r, 0)] * other.x
                + self[(r, 1)] * other.y
                + self[(r, 2)] * other.z
                + self[(r, 3)] * other.w;
        }

        buf.into()
    }
}

#[test]
fn identity() {
    let i = Matrix4D::identity();
    let a: Matrix4D = [ 0.0, 1.0,  2.0,  4.0,
                        1.0, 2.0,  4.0,  8.0,
                        2.0, 4.0,  8.0, 16.0,
                        4.0, 8.0, 16.0, 32.0, ].into();

    assert_eq!(i * a, a);
    assert_eq!(a * i, a);
}

#[test]
fn identity_times_tuple() {
    let t = Tuple4D::tuple(1.0, 2.0, 3.0, 4.0);

    assert_eq!(Matrix4D::identity() * t, t);
}

#[test]
fn mat4_multiply() {
    let a: Matrix4D = [ 1.0, 2.0, 3.0, 4.0,
                        5.0, 6.0, 7.0, 8.0,
                        9.0, 8.0, 7.0, 6.0,
                        5.0, 4.0, 3.0, 2.0, ].into();

    let b: Matrix4D = [ -2.0, 1.0, 2.0,  3.0,
                         3.0, 2.0, 1.0, -1.0,
                         4.0, 3.0, 6.0,  5.0,
                         1.0, 2.0, 7.0,  8.0, ].into();

    let ab: Matrix4D = [ 20.0, 22.0,  50.0,  48.0,
                         44.0, 54.0, 114.0, 108.0,
                         40.0, 58.0, 110.0, 102.0,
                         16.0, 26.0,  46.0,  42.0, ].into();

    assert_eq!(a * b, ab);
    assert!(b * a != ab);
}

#[test]
fn mat4_multiply_tuple() {
    let a: Matrix4D = [ 1.0, 2.0, 3.0, 4.0,
                        2.0, 4.0, 4.0, 2.0,
                        8.0, 6.0, 4.0, 1.0,
                        0.0, 0.0, 0.0, 1.0, ].into();
    let b = Tuple4D::tuple(1.0, 2.0, 3.0, 1.0);

    assert_eq!(a * b, Tuple4D::tuple(18.0, 24.0, 33.0, 1.0));
}

#[test]
fn rows_and_columns() {
    let a: Matrix4D = [  1.0,  2.0,  3.0,  4.0,
                         5.5,  6.5,  7.5,  8.5,
                         9.0, 10.0, 11.0, 12.0,
                        13.5, 14.5, 15.5, 16.5, ].into();

    assert_eq!(a[(0, 3)], 4.0);
    assert_eq!(a[(3, 2)], 15.5);
    assert_eq!(a.row(1), [5.5, 6.5, 7.5, 8.5]);
    assert_eq!(a.column(2), [3.0, 7.5, 11.0, 15.5]);
}

#[test]
fn transpose() {
     let a: Matrix4D = [ 0.0, 9.0, 3.0, 0.0,
                         9.0, 8.0, 0.0, 8.0,
                         1.0, 8.0, 5.0, 3.0,
                         0.0, 0.0, 5.0, 8.0, ].into();

     let t: Matrix4D = [ 0.0, 9.0, 1.0, 0.0,
                         9.0, 8.0, 8.0, 0.0,
                         3.0, 0.0, 5.0, 5.0,
                         0.0, 8.0, 3.0, 8.0, ].into();

     assert_eq!(t, a.transposition());
     assert_eq!(t.transposition(), a);

     let mut in_place = a;
     in_place.transpose();
     assert_eq!(in_place, t);
}

#[test]
fn transpose_identity() {
    let i = Matrix4D::identity();
    assert_eq!(i, i.transposition());
}

#[test]
fn mat2_determinant() {
    let a: Matrix2D = [  1.0, 5.0,
                        -3.0, 2.0 ].into();

    assert_eq!(a.determinant(), 17.0);
    assert_eq!(Matrix2D::identity().determinant(), 1.0);
}

#[test]
fn mat3_submatrix() {
    let a: Matrix3D = [  1.0, 5.0,  0.0,
                        -3.0, 2.0,  7.0,
                         0.0, 6.0, -3.0, ].into();

    let s: Matrix2D = [ -3.0, 2.0,
                         0.0, 6.0  ].into();

    assert_eq!(a.submatrix(0, 2), s);
}

#[test]
fn mat4_submatrix() {
     let a: Matrix4D = [ -6.0, 1.0,  1.0, 6.0,
                         -8.0, 5.0,  8.0, 6.0,
                         -1.0, 0.0,  8.0, 2.0,
                         -7.0, 1.0, -1.0, 1.0, ].into();

     let s: Matrix3D = [ -6.0,  1.0, 6.0,
                         -8.0,  8.0, 6.0,
                         -7.0, -1.0, 1.0, ].into();

     assert_eq!(a.submatrix(2, 1), s);
}

#[test]
fn mat3_cofactor() {
    let a: Matrix3D = [ 3.0,  5.0,  0.0,
                        2.0, -1.0, -7.0,
                        6.0, -1.0,  5.0, ].into();

    assert_eq!(a.minor(0, 0), -12.0);
    assert_eq!(a.cofactor(0, 0), -12.0);
    assert_eq!(a.minor(1, 0), 25.0);
    assert_eq!(a.cofactor(1, 0), -25.0);
}

#[test]
fn mat3_determinant() {
     let a: Matrix3D = [  1.0, 2.0,  6.0,
                         -5.0, 8.0, -4.0,
                          2.0, 6.0,  4.0, ].into();

     assert_eq!(a.cofactor(0, 0), 56.0);
     assert_eq!(a.cofactor(0, 1), 12.0);
     assert_eq!(a.cofactor(0, 2), -46.0);
     assert_eq!(a.determinant(), -196.0);
     assert_eq!(Matrix3D::identity().determinant(), 1.0);
}

#[test]
fn mat4_determinant() {
     let a: Matrix4D = [ -2.0, -8.0,  3.0,  5.0,
                         -3.0,  1.0,  7.0,  3.0,
                          1.0,  2.0, -9.0,  6.0,
                         -6.0,  7.0,  7.0, -9.0, ].into();

     assert_eq!(a.cofactor(0, 0), 690.0);
     assert_eq!(a.cofactor(0, 1), 447.0);
     assert_eq!(a.cofactor(0, 2), 210.0);
     assert_eq!(a.cofactor(0, 3), 51.0);
     assert_eq!(a.determinant(), -4071.0);
}

#[test]
fn mat4_invertibility() {
    let invertible: Matrix4D = [ 6.0,  4.0, 4.0,  4.0,
                                 5.0,  5.0, 7.0,  6.0,
                                 4.0, -9.0, 3.0, -7.0,
                                 9.0,  1.0, 7.0, -6.0, ].into();

    let singular: Matrix4D = [ -4.0,  2.0, -2.0, -3.0,
                                9.0,  6.0,  2.0,  6.0,
                                0.0, -5.0,  1.0, -5.0,
                                0.0,  0.0,  0.0,  0.0, ].into();

    assert_eq!(invertible.determinant(), -2120.0);
    assert!(invertible.is_invertible());

    assert_eq!(singular.determinant(), 0.0);
    assert!(!singular.is_invertible());
    assert!(matches!(singular.inverse(),
        Err(TraceError::NotInvertible { .. })));
}

#[test]
fn mat4_inverse() {
     let a: Matrix4D = [ -5.0,  2.0,  6.0, -8.0,
                          1.0, -5.0,  1.0,  8.0,
                          7.0,  7.0, -6.0, -7.0,
                          1.0, -3.0,  7.0,  4.0, ].into();

     let i: Matrix4D = [  0.21805,  0.45113,  0.24060, -0.04511,
                         -0.80827, -1.45677, -0.44361,  0.52068,
                         -0.07895, -0.22368, -0.05263,  0.19737,
                         -0.52256, -0.81391, -0.30075,  0.30639, ].into();

     let b = a.inverse().unwrap();
     assert_eq!(a.determinant(), 532.0);
     assert_eq!(a.cofactor(2, 3), -160.0);
     assert!(crate::feq(b[(3, 2)], -160.0 / 532.0));
     assert_eq!(b, i);
}

#[test]
fn mat4_inverse_second() {
     let a: Matrix4D = [  8.0, -5.0,  9.0,  2.0,
                          7.0,  5.0,  6.0,  1.0,
                         -6.0,  0.0,  9.0,  6.0,
                         -3.0,  0.0, -9.0, -4.0, ].into();

     let i: Matrix4D = [ -0.15385, -0.15385, -0.28205, -0.53846,
                         -0.07692,  0.12308,  0.02564,  0.03077,
                          0.35897,  0.35897,  0.43590,  0.92308,
                         -0.69231, -0.69231, -0.76923, -1.92308, ].into();

     assert_eq!(a.inverse().unwrap(), i);
}

#[test]
fn mat4_inverse_mult() {
     let a: Matrix4D = [  3.0, -9.0,  7.0,  3.0,
                          3.0,  8.0,  2.0, -9.0,
                         -4.0,  4.0,  4.0,  1.0,
                         -6.0,  5.0, -1.0,  1.0, ].into();

     let b: Matrix4D = [ 8.0,  2.0, 2.0, 2.0,
                         3.0, -1.0, 7.0, 0.0,
                         7.0,  0.0, 5.0, 4.0,
                         6.0, -2.0, 0.0, 5.0  ].into();

     let c = a * b;

     assert_eq!(a, c * b.inverse().unwrap());
}

#[test]
fn mat4_inverse_roundtrips() {
    let matrices: [Matrix4D; 3] = [
        [ 9.0,  3.0,  0.0,  9.0,
         -5.0, -2.0, -6.0, -3.0,
         -4.0,  9.0,  6.0,  4.0,
         -7.0,  6.0,  6.0,  2.0, ].into(),
        Matrix4D::translation(5.0, -3.0, 2.0) * Matrix4D::rotation_y(0.6),
        Matrix4D::shearing(1.0, 0.0, 0.5, 0.0, 0.0, 0.25)
            * Matrix4D::scaling(2.0, -1.0, 0.5),
    ];

    for m in matrices.iter() {
        let inv = m.inverse().unwrap();
        assert_eq!(*m * inv, Matrix4D::identity());
        assert_eq!(inv * *m, Matrix4D::identity());
        assert_eq!(inv.inverse().unwrap(), *m);
    }
}

#[test]
fn inverse_of_transpose() {
    let a: Matrix4D = [ 9.0,  3.0,  0.0,  9.0,
                       -5.0, -2.0, -6.0, -3.0,
                       -4.0,  9.0,  6.0,  4.0,
                       -7.0,  6.0,  6.0,  2.0, ].into();

    assert_eq!(a.transposition().inverse().unwrap(),
        a.inverse().unwrap().transposition());
}
