use std::iter::FromIterator;

use crate::consts::EPSILON;
use crate::error::Result;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::shape::Shape;

/// The position of a shape in its world's object list.
///
/// Intersections refer to shapes through this index instead of borrowing
/// them, so they can be copied freely and sent across threads.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectIndex(pub usize);

/// An intersection.
///
/// This structure assumes that some ray produced an intersection. Parameter `t`
/// is analogous to `t` for a ray (the offset from the ray origin), and
/// `object` says which shape was struck.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub t: f64,
    pub object: ObjectIndex,
}

impl Intersection {
    pub fn new(t: f64, object: ObjectIndex) -> Intersection {
        Intersection { t, object }
    }
}

/// A collection of intersections, kept sorted by `t`.
///
/// Every constructor here sorts. The `intersections` field is public, so code
/// that pushes onto it directly should call `sort` afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Intersections {
    pub intersections: Vec<Intersection>,
}

impl From<Vec<Intersection>> for Intersections {
    fn from(intersections: Vec<Intersection>) -> Intersections {
        let mut is = Intersections { intersections };
        is.sort();
        is
    }
}

impl FromIterator<Intersection> for Intersections {
    fn from_iter<I: IntoIterator<Item = Intersection>>(iter: I)
        -> Intersections {
        Intersections::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl Intersections {
    /// Creates a new list of intersections.
    pub fn new() -> Intersections {
        Intersections { intersections: Vec::new() }
    }

    /// Merges several collections into one sorted collection.
    ///
    /// A world uses this to fold the per-shape results for a ray together.
    pub fn combine<I>(groups: I) -> Intersections
        where I: IntoIterator<Item = Intersections> {
        groups.into_iter()
            .flat_map(|g| g.intersections)
            .collect()
    }

    /// Finds the visible intersection, if any.
    ///
    /// The hit is the intersection with the lowest non-negative `t`. Negative
    /// `t` values lie behind the ray origin and are never chosen, however
    /// close to zero they are. Non-finite values are skipped as well.
    pub fn hit(&mut self) -> Option<Intersection> {
        self.sort();

        self.intersections.iter()
            .find(|i| i.t >= 0.0 && i.t.is_finite())
            .copied()
    }

    /// Sorts the intersections by ascending `t`.
    pub fn sort(&mut self) {
        self.intersections.sort_by(|a, b| a.t.total_cmp(&b.t));
    }

    /// The `t` values, in order.
    pub fn t_values(&self) -> Vec<f64> {
        self.intersections.iter().map(|i| i.t).collect()
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Intersection> {
        self.intersections.get(index)
    }
}

/// A record for computations associated with an `Intersection`.
///
/// Mostly a superset of an `Intersection`; everything shading needs to know
/// about a hit, computed once.
#[derive(Copy, Clone, Debug)]
pub struct IntersectionComputation {
    /// The "time" of the ray intersection.
    pub t: f64,

    /// The object being intersected.
    pub object: ObjectIndex,

    /// The point where the intersection occurs.
    pub point: Tuple4D,

    /// A point slightly above the intersected surface. Shadow rays start here
    /// so that a surface does not shadow itself ("acne").
    pub over_point: Tuple4D,

    /// The eye vector for the intersection.
    pub eyev: Tuple4D,

    /// The normal vector of the object being intersected, facing the eye.
    pub normalv: Tuple4D,

    /// Whether the intersection occurs within the object or not.
    pub inside: bool,
}

impl IntersectionComputation {
    /// Creates a new intersection computation, given a ray, its hit and the
    /// shape the hit refers to.
    pub fn new(r: &Ray4D, hit: &Intersection, shape: &Shape)
        -> Result<IntersectionComputation> {
        let t = hit.t;
        let point = r.position(t);
        let eyev = -r.direction;
        let mut normalv = shape.normal_at(point)?;

        // A normal pointing away from the eye means the eye is inside
        let inside = if normalv.dot(&eyev) < 0.0 {
            normalv = -normalv;
            true
        } else {
            false
        };

        let over_point = point + normalv * EPSILON;

        Ok(IntersectionComputation {
            t,
            object: hit.object,
            point, over_point,
            eyev, normalv,
            inside,
        })
    }
}

#[cfg(test)]
const IDX: ObjectIndex = ObjectIndex(0);

#[cfg(test)]
fn intersections_at(ts: &[f64]) -> Intersections {
    ts.iter().map(|&t| Intersection::new(t, IDX)).collect()
}

#[test]
fn hit_with_all_positive() {
    let mut is = intersections_at(&[2.0, 1.0]);

    assert_eq!(is.hit(), Some(Intersection::new(1.0, IDX)));
}

#[test]
fn hit_with_some_negative() {
    let mut is = intersections_at(&[-1.0, 1.0]);

    assert_eq!(is.hit(), Some(Intersection::new(1.0, IDX)));
}

#[test]
fn hit_with_all_negative() {
    let mut is = intersections_at(&[-2.0, -1.0]);

    assert_eq!(is.hit(), None);
}

#[test]
fn hit_multiple() {
    let mut is = intersections_at(&[5.0, 7.0, -3.0, 2.0]);

    assert_eq!(is.hit(), Some(Intersection::new(2.0, IDX)));
}

#[test]
fn hit_accepts_zero() {
    let mut is = intersections_at(&[-0.5, 0.0, 3.0]);

    assert_eq!(is.hit(), Some(Intersection::new(0.0, IDX)));
}

#[test]
fn hit_after_direct_push() {
    let mut is = intersections_at(&[4.0]);
    is.intersections.push(Intersection::new(1.5, ObjectIndex(3)));

    assert_eq!(is.hit(), Some(Intersection::new(1.5, ObjectIndex(3))));
}

#[test]
fn combine_sorts_across_shapes() {
    let a: Intersections = vec![
        Intersection::new(6.0, ObjectIndex(0)),
        Intersection::new(4.0, ObjectIndex(0)),
    ].into_iter().collect();
    let b: Intersections = vec![
        Intersection::new(5.5, ObjectIndex(1)),
        Intersection::new(4.5, ObjectIndex(1)),
    ].into_iter().collect();

    let all = Intersections::combine(vec![a, b]);
    assert_eq!(all.t_values(), vec![4.0, 4.5, 5.5, 6.0]);
    assert_eq!(all.len(), 4);
    assert_eq!(all.get(1).map(|i| i.object), Some(ObjectIndex(1)));
    assert!(all.get(4).is_none());
}

#[test]
fn combine_nothing() {
    let all = Intersections::combine(Vec::new());

    assert!(all.is_empty());
}

#[test]
fn precompute_outside_intersection() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );
    let shape = Shape::sphere();
    let i = Intersection::new(4.0, IDX);
    let comps = IntersectionComputation::new(&r, &i, &shape).unwrap();

    assert_eq!(comps.t, i.t);
    assert_eq!(comps.object, IDX);
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(!comps.inside);
}

#[test]
fn precompute_inside_intersection() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );
    let shape = Shape::sphere();
    let i = Intersection::new(1.0, IDX);
    let comps = IntersectionComputation::new(&r, &i, &shape).unwrap();

    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, 1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(comps.inside);

    // Normal is inverted, so it faces the eye
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn hit_should_offset_point() {
    use crate::matrix::Matrix4D;

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );
    let mut shape = Shape::sphere();
    shape.set_transform(Matrix4D::translation(0.0, 0.0, 1.0));
    let i = Intersection::new(5.0, IDX);
    let comps = IntersectionComputation::new(&r, &i, &shape).unwrap();

    assert!(comps.over_point.z < -EPSILON / 2.0);
    assert!(comps.point.z > comps.over_point.z);
}
