use crate::color::Color;
use crate::tuple::Tuple4D;

/// A point light.
///
/// Light radiates from a single `position` with a single `intensity`; there is
/// no falloff with distance.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Tuple4D,
}

impl PointLight {
    /// Creates a point light.
    ///
    /// If `position` isn't a point, it is converted to a point automatically.
    pub fn new(intensity: Color, mut position: Tuple4D) -> PointLight {
        position.w = 1.0;

        PointLight { intensity, position }
    }

    pub fn set_intensity(&mut self, intensity: Color) {
        self.intensity = intensity;
    }

    pub fn set_position(&mut self, mut position: Tuple4D) {
        position.w = 1.0;
        self.position = position;
    }
}

/// A material record.
///
/// A surface color plus the four coefficients of the Phong reflection model.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::white(),

            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,
        }
    }
}

/// Calculate the color of a surface point as seen from the eye.
///
/// Takes the surface material, a single light, the point being shaded, the
/// eye vector and the normal vector, all in world space. Both vectors are
/// expected to be normalized.
///
/// If the point is in a shadow (parameter `in_shadow`), only ambient light is
/// used. The result is not clamped; a bright light can push channels past 1.
pub fn lighting(m: &Material, light: &PointLight, point: Tuple4D,
    eyev: Tuple4D, normalv: Tuple4D, in_shadow: bool) -> Color {
    // Combine surface color with light's color
    let effective_color = m.color * light.intensity;

    // Find direction to light source
    let lightv = (light.position - point).normalize();

    let ambient = effective_color * m.ambient;

    // A negative dot means the light is on the other side of the surface
    let light_dot_normal = lightv.dot(&normalv);
    if in_shadow || light_dot_normal < 0.0 {
        return ambient;
    }

    let diffuse = effective_color * m.diffuse * light_dot_normal;

    let reflectv = (-lightv).reflect(&normalv);
    let reflect_dot_eye = reflectv.dot(&eyev);

    // Light reflecting away from the eye has no highlight
    let specular = if reflect_dot_eye <= 0.0 {
        Color::black()
    } else {
        let factor = reflect_dot_eye.powf(m.shininess);
        light.intensity * m.specular * factor
    };

    ambient + diffuse + specular
}

#[cfg(test)]
fn white_light(x: f64, y: f64, z: f64) -> PointLight {
    PointLight::new(Color::white(), Tuple4D::point(x, y, z))
}

#[test]
fn light_setters() {
    let mut light = white_light(0.0, 0.0, 0.0);
    light.set_intensity(Color::rgb(0.5, 0.5, 0.5));
    light.set_position(Tuple4D::vector(1.0, 2.0, 3.0));

    assert_eq!(light.intensity, Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(light.position, Tuple4D::point(1.0, 2.0, 3.0));
}

#[test]
fn default_material() {
    let m = Material::default();

    assert_eq!(m.color, Color::white());
    assert_eq!((m.ambient, m.diffuse, m.specular, m.shininess),
        (0.1, 0.9, 0.9, 200.0));
}

#[test]
fn eye_between_light_and_surface() {
    let m = Material::default();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 0.0, -10.0);

    let res = lighting(&m, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(1.9, 1.9, 1.9));
}

#[test]
fn eye_between_light_and_surface_offset_45() {
    let m = Material::default();
    let eyev = Tuple4D::vector(0.0, 2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 0.0, -10.0);

    let res = lighting(&m, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(1.0, 1.0, 1.0));
}

#[test]
fn eye_opposite_from_surface_offset_45() {
    let m = Material::default();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 10.0, -10.0);

    let res = lighting(&m, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(0.7364, 0.7364, 0.7364));
}

#[test]
fn eye_opposite_from_surface_in_reflection() {
    let m = Material::default();
    let eyev = Tuple4D::vector(0., -(2.0f64.sqrt())/2., -(2.0f64.sqrt())/2.);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 10.0, -10.0);

    let res = lighting(&m, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(1.6364, 1.6364, 1.6364));
}

#[test]
fn eye_across_surface_from_light() {
    let m = Material::default();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 0.0, 10.0);

    let res = lighting(&m, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn surface_in_shadow() {
    let m = Material::default();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 0.0, -10.0);

    let res = lighting(&m, &light, Tuple4D::origin(), eyev, normalv, true);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn colored_light_filters_surface() {
    let m = Material {
        color: Color::rgb(1.0, 0.5, 0.0),
        specular: 0.0,
        ..Default::default()
    };
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::rgb(0.0, 1.0, 1.0),
        Tuple4D::point(0.0, 0.0, -10.0));

    // Only the green channel survives: (0.1 + 0.9) * 0.5
    let res = lighting(&m, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(0.0, 0.5, 0.0));
}
