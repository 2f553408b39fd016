use crate::error::{ TraceError, Result };
use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::light::{ PointLight, Material, lighting };
use crate::shape::Shape;
use crate::intersect::{ ObjectIndex, Intersection, Intersections,
    IntersectionComputation };

/// A world with objects and lights.
///
/// Worlds own every shape and light of a scene. Intersections refer back to
/// shapes by `ObjectIndex`, their position in `objects`; shapes are only ever
/// appended, so an index stays valid for the life of the world.
///
/// Nothing in a world is mutated while it is rendered, so a world can be
/// shared between render threads behind an `Arc`.
#[derive(Clone, Debug)]
pub struct World {
    pub objects: Vec<Shape>,
    pub lights: Vec<PointLight>,
}

/// The default world: two concentric spheres lit from above and to the left.
///
/// The outer sphere is a unit sphere with a pale green, matte material; the
/// inner sphere is half its size with the default material.
impl Default for World {
    fn default() -> World {
        let light = PointLight::new(
            Color::white(),
            Tuple4D::point(-10.0, 10.0, -10.0)
        );

        let mut s1 = Shape::sphere();
        s1.set_material(Material {
            color: Color::rgb(0.8, 1.0, 0.6),
            diffuse: 0.7,
            specular: 0.2,
            ..Default::default()
        });

        let mut s2 = Shape::sphere();
        s2.set_transform(Matrix4D::scaling(0.5, 0.5, 0.5));

        World {
            objects: vec![s1, s2],
            lights: vec![light],
        }
    }
}

impl World {
    /// Creates an empty world with no objects and no lights.
    pub fn empty() -> World {
        World { objects: Vec::new(), lights: Vec::new() }
    }

    /// Adds a shape, returning the index intersections will refer to it by.
    pub fn add_object(&mut self, shape: Shape) -> ObjectIndex {
        self.objects.push(shape);
        ObjectIndex(self.objects.len() - 1)
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    pub fn object(&self, index: ObjectIndex) -> Option<&Shape> {
        self.objects.get(index.0)
    }

    pub fn object_mut(&mut self, index: ObjectIndex) -> Option<&mut Shape> {
        self.objects.get_mut(index.0)
    }

    fn lookup(&self, index: ObjectIndex) -> Result<&Shape> {
        self.object(index).ok_or(TraceError::UnknownObject(index))
    }

    /// Intersects a ray against all objects in a world.
    ///
    /// The result holds every intersection of every object, sorted by `t`.
    pub fn intersect(&self, r: Ray4D) -> Result<Intersections> {
        let per_object = self.objects.iter()
            .enumerate()
            .map(|(i, obj)| obj.intersect(ObjectIndex(i), r))
            .collect::<Result<Vec<_>>>()?;

        Ok(Intersections::combine(per_object))
    }

    /// Computes the shading state for `hit`, which `r` produced.
    pub fn prepare_computations(&self, hit: &Intersection, r: &Ray4D)
        -> Result<IntersectionComputation> {
        IntersectionComputation::new(r, hit, self.lookup(hit.object)?)
    }

    /// Determines whether `light` is blocked from reaching point `p`.
    ///
    /// Only objects strictly between the point and the light cast a shadow.
    /// Callers should pass a point already lifted off its surface (see
    /// `IntersectionComputation::over_point`).
    pub fn is_shadowed(&self, p: Tuple4D, light: &PointLight) -> Result<bool> {
        let v = light.position - p;
        let distance = v.magnitude();
        let direction = v.normalize();

        let r = Ray4D::new(p, direction);
        let mut intersections = self.intersect(r)?;

        Ok(match intersections.hit() {
            Some(i) => i.t < distance,
            None => false,
        })
    }

    /// Calculates the color for a hit, based on shadows and light.
    ///
    /// Each light contributes independently, and the contributions are summed.
    pub fn shade_hit(&self, comps: &IntersectionComputation) -> Result<Color> {
        let material = self.lookup(comps.object)?.material();

        let mut color = Color::black();
        for light in self.lights.iter() {
            let shadowed = self.is_shadowed(comps.over_point, light)?;
            color = color + lighting(material, light, comps.point,
                comps.eyev, comps.normalv, shadowed);
        }

        Ok(color)
    }

    /// Determines the color seen along a ray.
    ///
    /// A ray that hits nothing sees black.
    pub fn color_at(&self, r: Ray4D) -> Result<Color> {
        let hit = self.intersect(r)?.hit();

        match hit {
            None => Ok(Color::black()),
            Some(i) => {
                let comps = self.prepare_computations(&i, &r)?;
                self.shade_hit(&comps)
            },
        }
    }
}

#[test]
fn default_world_contents() {
    let w = World::default();

    assert_eq!(w.objects.len(), 2);
    assert_eq!(w.lights, vec![PointLight::new(Color::white(),
        Tuple4D::point(-10.0, 10.0, -10.0))]);
    assert_eq!(w.objects[0].material().color, Color::rgb(0.8, 1.0, 0.6));
    assert_eq!(*w.objects[1].transform(), Matrix4D::scaling(0.5, 0.5, 0.5));
}

#[test]
fn add_object_returns_index() {
    let mut w = World::empty();
    let a = w.add_object(Shape::sphere());
    let b = w.add_object(Shape::plane());

    assert_eq!((a, b), (ObjectIndex(0), ObjectIndex(1)));
    assert_eq!(w.object(b).map(|s| s.ty), Some(crate::shape::ShapeType::Plane));
    assert!(w.object(ObjectIndex(2)).is_none());
}

#[test]
fn intersect_default_world_with_ray() {
    let w = World::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let is = w.intersect(r).unwrap();

    assert_eq!(is.t_values(), vec![4.0, 4.5, 5.5, 6.0]);
}

#[test]
fn shade_intersection_from_outside() {
    let w = World::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    let i = Intersection::new(4.0, ObjectIndex(0));
    let comps = w.prepare_computations(&i, &r).unwrap();
    let c = w.shade_hit(&comps).unwrap();

    assert_eq!(c, Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn shade_intersection_from_inside() {
    let mut w = World::default();
    w.lights = vec![PointLight::new(
        Color::white(),
        Tuple4D::point(0.0, 0.25, 0.0),
    )];

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let i = Intersection::new(0.5, ObjectIndex(1));
    let comps = w.prepare_computations(&i, &r).unwrap();
    let c = w.shade_hit(&comps).unwrap();

    assert_eq!(c, Color::rgb(0.90498, 0.90498, 0.90498));
}

#[test]
fn shade_intersection_in_shadow() {
    let mut w = World::empty();
    w.add_light(PointLight::new(
        Color::white(),
        Tuple4D::point(0.0, 0.0, -10.0),
    ));

    w.add_object(Shape::sphere());

    let mut s2 = Shape::sphere();
    s2.set_transform(Matrix4D::translation(0.0, 0.0, 10.0));
    let second = w.add_object(s2);

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let i = Intersection::new(4.0, second);
    let comps = w.prepare_computations(&i, &r).unwrap();

    assert_eq!(w.shade_hit(&comps).unwrap(), Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn shade_sums_every_light() {
    let mut w = World::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );
    let single = w.color_at(r).unwrap();

    let light = w.lights[0];
    w.add_light(light);

    assert_eq!(w.color_at(r).unwrap(), single * 2.0);
}

#[test]
fn shade_without_lights_is_black() {
    let mut w = World::default();
    w.lights.clear();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    assert_eq!(w.color_at(r).unwrap(), Color::black());
}

#[test]
fn shade_unknown_object() {
    let w = World::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let i = Intersection::new(4.0, ObjectIndex(7));

    assert!(matches!(w.prepare_computations(&i, &r),
        Err(TraceError::UnknownObject(ObjectIndex(7)))));
}

#[test]
fn color_ray_miss() {
    let w = World::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    );

    assert_eq!(w.color_at(r).unwrap(), Color::black());
}

#[test]
fn color_ray_hit() {
    let w = World::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    assert_eq!(w.color_at(r).unwrap(), Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn color_behind_ray() {
    let mut w = World::default();
    for obj in w.objects.iter_mut() {
        obj.material_mut().ambient = 1.0;
    }

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.75),
        Tuple4D::vector(0.0, 0.0, -1.0)
    );

    let inner_color = w.objects[1].material().color;
    assert_eq!(w.color_at(r).unwrap(), inner_color);
}

#[test]
fn color_with_singular_object() {
    let mut w = World::default();
    if let Some(s) = w.object_mut(ObjectIndex(1)) {
        s.set_transform(Matrix4D::scaling(0.0, 1.0, 1.0));
    }
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    assert!(matches!(w.color_at(r), Err(TraceError::NotInvertible { .. })));
}

#[test]
fn no_shadow_when_nothing_between_point_and_light() {
    let w = World::default();
    let p = Tuple4D::point(0.0, 10.0, 0.0);

    assert!(!w.is_shadowed(p, &w.lights[0]).unwrap());
}

#[test]
fn shadow_when_object_between_point_and_light() {
    let w = World::default();
    let p = Tuple4D::point(10.0, -10.0, 10.0);

    assert!(w.is_shadowed(p, &w.lights[0]).unwrap());
}

#[test]
fn shadow_object_behind_light() {
    let w = World::default();
    let p = Tuple4D::point(-20.0, 20.0, -20.0);

    assert!(!w.is_shadowed(p, &w.lights[0]).unwrap());
}

#[test]
fn shadow_object_behind_point() {
    let w = World::default();
    let p = Tuple4D::point(-2.0, 2.0, -2.0);

    assert!(!w.is_shadowed(p, &w.lights[0]).unwrap());
}

#[test]
fn shadow_against_plane() {
    let mut w = World::empty();
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 10.0, 0.0));
    w.add_light(light);
    let mut floor = Shape::plane();
    floor.set_transform(Matrix4D::translation(0.0, 1.0, 0.0));
    w.add_object(floor);

    assert!(w.is_shadowed(Tuple4D::point(0.0, 0.0, 0.0), &light).unwrap());
    assert!(!w.is_shadowed(Tuple4D::point(0.0, 2.0, 0.0), &light).unwrap());
}
