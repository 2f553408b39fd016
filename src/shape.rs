use std::sync::atomic::{ AtomicUsize, Ordering };

use crate::consts::EPSILON;
use crate::error::{ TraceError, Result };
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::light::Material;
use crate::matrix::Matrix4D;
use crate::intersect::{ ObjectIndex, Intersection, Intersections };

static NEXT_SHAPE_ID: AtomicUsize = AtomicUsize::new(1);

/// A process-wide unique shape identity.
///
/// Ids are handed out in increasing order, but only their uniqueness is
/// meaningful; nothing orders shapes by id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShapeId(usize);

impl ShapeId {
    /// Allocates a fresh id. Safe to call from any thread.
    pub fn next() -> ShapeId {
        ShapeId(NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeType {
    /// A unit sphere with its center at the object-space origin.
    Sphere,

    /// The object-space XZ plane. Its normal is always +Y.
    Plane,
}

/// A primitive placed in a world.
///
/// Shapes are defined in their own object space (see `ShapeType`) and placed
/// with `transform`. The inverse of the transform is computed once when the
/// transform is set, since every intersection and normal needs it.
///
/// Two shapes are equal when they have the same id. A cloned shape keeps the
/// id of the shape it was cloned from.
#[derive(Debug, Clone)]
pub struct Shape {
    id: ShapeId,
    pub ty: ShapeType,
    pub material: Material,

    transform: Matrix4D,
    inverse: Option<Matrix4D>,
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Shape {
    fn new(ty: ShapeType) -> Shape {
        Shape {
            id: ShapeId::next(),
            ty,
            material: Default::default(),
            transform: Matrix4D::identity(),
            inverse: Some(Matrix4D::identity()),
        }
    }

    /// Creates a unit sphere with identity transform and default material.
    pub fn sphere() -> Shape {
        Shape::new(ShapeType::Sphere)
    }

    /// Creates a plane through the origin, with a normal pointing up along Y.
    pub fn plane() -> Shape {
        Shape::new(ShapeType::Plane)
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    /// Sets the object-to-world transform.
    ///
    /// A singular transform is accepted here; the shape then reports
    /// `TraceError::NotInvertible` from `intersect` and `normal_at`.
    pub fn set_transform(&mut self, transform: Matrix4D) {
        self.transform = transform;
        self.inverse = transform.inverse().ok();
    }

    fn inverse(&self) -> Result<&Matrix4D> {
        self.inverse.as_ref().ok_or_else(|| TraceError::NotInvertible {
            determinant: self.transform.determinant()
        })
    }

    /// Converts a point from world to object space.
    pub fn world_to_object(&self, point: Tuple4D) -> Result<Tuple4D> {
        Ok(*self.inverse()? * point)
    }

    /// Converts a normal from object to world space.
    ///
    /// Normals are carried by the transpose of the inverse transform, which
    /// keeps them perpendicular to the surface under non-uniform scaling. The
    /// translation part of that matrix leaks into `w`, so `w` is reset.
    pub fn normal_to_world(&self, normal: Tuple4D) -> Result<Tuple4D> {
        let mut normal = self.inverse()?.transposition() * normal;
        normal.w = 0.0;

        Ok(normal.normalize())
    }

    /// Intersects an object-space ray with this shape.
    ///
    /// `index` is where the shape lives in its world; it is recorded in each
    /// intersection so the hit can be traced back to the shape.
    pub fn local_intersect(&self, index: ObjectIndex, ray: &Ray4D)
        -> Intersections {
        match self.ty {
            ShapeType::Sphere => intersect_sphere(index, ray),
            ShapeType::Plane => intersect_plane(index, ray),
        }
    }

    /// The object-space normal at object-space point `at`.
    pub fn local_normal_at(&self, at: &Tuple4D) -> Tuple4D {
        match self.ty {
            ShapeType::Sphere => Tuple4D { w: 0.0, ..*at },
            ShapeType::Plane => Tuple4D::vector(0.0, 1.0, 0.0),
        }
    }

    /// Intersects a world-space ray with this shape.
    ///
    /// The ray is moved into object space with the inverse transform, so the
    /// reported `t` values are valid along the original ray.
    pub fn intersect(&self, index: ObjectIndex, r: Ray4D)
        -> Result<Intersections> {
        let local_ray = r.transform(*self.inverse()?);

        Ok(self.local_intersect(index, &local_ray))
    }

    /// The world-space surface normal at `world_point`.
    pub fn normal_at(&self, world_point: Tuple4D) -> Result<Tuple4D> {
        let local_point = self.world_to_object(world_point)?;
        let local_normal = self.local_normal_at(&local_point);

        self.normal_to_world(local_normal)
    }
}

/// Solves the ray/unit-sphere quadratic.
///
/// Both roots are reported whenever the discriminant is non-negative, even
/// when they coincide (a tangent ray) or lie behind the ray origin.
fn intersect_sphere(index: ObjectIndex, ray: &Ray4D) -> Intersections {
    // Subtracting a point removes the 'w' part of the ray origin.
    let sphere_to_ray = ray.origin - Tuple4D::origin();

    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * ray.direction.dot(&sphere_to_ray);
    let c = sphere_to_ray.dot(&sphere_to_ray) - 1.0;

    let discriminant = b.powi(2) - (4.0 * a * c);

    if discriminant < 0.0 {
        return Intersections::new();
    }

    let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
    let t2 = (-b + discriminant.sqrt()) / (2.0 * a);

    Intersections::from(vec![
        Intersection::new(t1, index),
        Intersection::new(t2, index),
    ])
}

/// Intersects a ray with the XZ plane.
///
/// A ray with no Y movement is parallel to the plane, or lies within it;
/// neither case reports an intersection.
fn intersect_plane(index: ObjectIndex, ray: &Ray4D) -> Intersections {
    if ray.direction.y.abs() < EPSILON {
        return Intersections::new();
    }

    let t = -ray.origin.y / ray.direction.y;

    Intersections::from(vec![Intersection::new(t, index)])
}

/* Tests */

#[cfg(test)]
const IDX: ObjectIndex = ObjectIndex(0);

#[test]
fn shapes_get_unique_ids() {
    let a = Shape::sphere();
    let b = Shape::sphere();
    let c = a.clone();

    assert_ne!(a.id(), b.id());
    assert_ne!(a, b);
    assert_eq!(a, c);
}

#[test]
fn ids_unique_across_threads() {
    use std::collections::HashSet;

    let handles: Vec<_> = (0..4).map(|_| {
        std::thread::spawn(|| {
            (0..100).map(|_| Shape::sphere().id()).collect::<Vec<_>>()
        })
    }).collect();

    let mut seen = HashSet::new();
    for h in handles {
        for id in h.join().unwrap() {
            assert!(seen.insert(id));
        }
    }
}

#[test]
fn default_transform_and_material() {
    let mut s = Shape::sphere();
    assert_eq!(*s.transform(), Matrix4D::identity());
    assert_eq!(*s.material(), Material::default());

    s.set_transform(Matrix4D::translation(2.0, 3.0, 4.0));
    s.material_mut().ambient = 1.0;

    assert_eq!(*s.transform(), Matrix4D::translation(2.0, 3.0, 4.0));
    assert_eq!(s.material().ambient, 1.0);
}

#[test]
fn ray_intersects_sphere_twice() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let s = Shape::sphere();
    let xs = s.intersect(IDX, r).unwrap();

    assert_eq!(xs.t_values(), vec![4.0, 6.0]);
    assert!(xs.intersections.iter().all(|i| i.object == IDX));
}

#[test]
fn ray_is_tangent_to_sphere() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 1.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let s = Shape::sphere();
    let xs = s.intersect(IDX, r).unwrap();

    assert_eq!(xs.t_values(), vec![5.0, 5.0]);
}

#[test]
fn ray_misses_sphere() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 2.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let s = Shape::sphere();

    assert!(s.intersect(IDX, r).unwrap().is_empty());
}

#[test]
fn ray_is_inside_sphere() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let s = Shape::sphere();

    assert_eq!(s.local_intersect(IDX, &r).t_values(), vec![-1.0, 1.0]);
}

#[test]
fn sphere_is_behind_ray() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 5.0),
                       Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();

    assert_eq!(s.intersect(IDX, r).unwrap().t_values(), vec![-6.0, -4.0]);
}

#[test]
fn intersect_scaled_sphere() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
                       Tuple4D::vector(0.0, 0.0, 1.0));
    let mut s = Shape::sphere();
    s.set_transform(Matrix4D::scaling(2.0, 2.0, 2.0));

    assert_eq!(s.intersect(IDX, r).unwrap().t_values(), vec![3.0, 7.0]);
}

#[test]
fn intersect_translated_sphere() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
                       Tuple4D::vector(0.0, 0.0, 1.0));
    let mut s = Shape::sphere();
    s.set_transform(Matrix4D::translation(5.0, 0.0, 0.0));

    assert!(s.intersect(IDX, r).unwrap().is_empty());
}

#[test]
fn singular_transform_is_an_error() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
                       Tuple4D::vector(0.0, 0.0, 1.0));
    let mut s = Shape::sphere();
    s.set_transform(Matrix4D::scaling(1.0, 0.0, 1.0));

    assert!(matches!(s.intersect(IDX, r),
        Err(TraceError::NotInvertible { .. })));
    assert!(matches!(s.normal_at(Tuple4D::point(1.0, 0.0, 0.0)),
        Err(TraceError::NotInvertible { .. })));
}

#[test]
fn normal_on_sphere_axes() {
    let s = Shape::sphere();

    for axis in [
        Tuple4D::vector(1.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    ].iter() {
        let p = Tuple4D::point(axis.x, axis.y, axis.z);
        assert_eq!(s.normal_at(p).unwrap(), *axis);
    }
}

#[test]
fn normal_on_sphere_nonaxial() {
    let s = Shape::sphere();
    let k = 3.0f64.sqrt() / 3.0;
    let n = s.normal_at(Tuple4D::point(k, k, k)).unwrap();

    assert_eq!(n, Tuple4D::vector(k, k, k));
    assert_eq!(n, n.normalize());
}

#[test]
fn normal_on_sphere_translated() {
    let mut s = Shape::sphere();
    s.set_transform(Matrix4D::translation(0.0, 1.0, 0.0));
    let n = s.normal_at(Tuple4D::point(0.0, 1.70711, -0.70711)).unwrap();

    assert_eq!(n, Tuple4D::vector(0.0, 0.70711, -0.70711));
}

#[test]
fn normal_on_sphere_transformed() {
    let mut s = Shape::sphere();
    s.set_transform(Matrix4D::scaling(1.0, 0.5, 1.0)
        * Matrix4D::rotation_z(std::f64::consts::PI / 5.0));
    let n = s.normal_at(
        Tuple4D::point(0.0, 2.0f64.sqrt() / 2.0, -(2.0f64.sqrt() / 2.0))
    ).unwrap();

    assert_eq!(n, Tuple4D::vector(0.0, 0.97014, -0.24254));
}

#[test]
fn normal_on_plane() {
    let p = Shape::plane();

    for at in [
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::point(10.0, 0.0, -10.0),
        Tuple4D::point(-5.0, 0.0, 150.0),
    ].iter() {
        assert_eq!(p.local_normal_at(at), Tuple4D::vector(0.0, 1.0, 0.0));
    }
}

#[test]
fn ray_parallel_to_plane() {
    let p = Shape::plane();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 10.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert!(p.local_intersect(IDX, &r).is_empty());
}

#[test]
fn ray_coplanar_with_plane() {
    let p = Shape::plane();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert!(p.local_intersect(IDX, &r).is_empty());
}

#[test]
fn ray_intersecting_plane_from_above() {
    let p = Shape::plane();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::vector(0.0, -1.0, 0.0)
    );

    assert_eq!(p.local_intersect(IDX, &r).t_values(), vec![1.0]);
}

#[test]
fn ray_intersecting_plane_from_below() {
    let p = Shape::plane();
    let r = Ray4D::new(
        Tuple4D::point(0.0, -1.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );

    assert_eq!(p.local_intersect(IDX, &r).t_values(), vec![1.0]);
}

#[test]
fn transformed_plane_normal() {
    let mut p = Shape::plane();
    p.set_transform(Matrix4D::rotation_z(std::f64::consts::PI / 2.0));

    // The XZ plane rotated onto the YZ plane faces -X
    let n = p.normal_at(Tuple4D::point(0.0, 3.0, 1.0)).unwrap();
    assert_eq!(n, Tuple4D::vector(-1.0, 0.0, 0.0));
}
