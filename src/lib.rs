pub mod consts;
pub mod error;

pub mod tuple;
pub mod matrix;
pub mod transform;
pub mod ray;

pub mod color;
pub mod light;
pub mod shape;
pub mod intersect;
pub mod world;

pub mod camera;
pub mod parallel;
pub mod canvas;
pub mod scene;

pub use error::{ TraceError, Result };

use consts::EPSILON;

/// Compares two floats, absorbing rounding error below `EPSILON`.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < EPSILON
}

#[test]
fn feq_absorbs_small_drift() {
    assert!(feq(1.0, 1.0 + EPSILON / 2.0));
    assert!(!feq(1.0, 1.0 + EPSILON * 2.0));
}
