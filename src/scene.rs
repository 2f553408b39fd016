use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use log::{ debug, warn };
use serde::Deserialize;

use crate::consts::{ CANVAS_WIDTH, CANVAS_HEIGHT, FIELD_OF_VIEW };
use crate::error::{ TraceError, Result };
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::color::Color;
use crate::light::{ PointLight, Material };
use crate::shape::Shape;
use crate::world::World;
use crate::camera::Camera;

/// A world, and the camera to view it with.
pub struct Scene {
    pub world: World,
    pub camera: Camera,
}

impl Scene {
    /// Reads and builds a scene from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Scene> {
        let path = path.as_ref();
        debug!("loading scene from {}", path.display());

        let text = fs::read_to_string(path)?;
        Scene::from_json(&text)
    }

    /// Builds a scene from JSON text.
    pub fn from_json(text: &str) -> Result<Scene> {
        let scene_json: SceneJson = serde_json::from_str(text)?;
        Scene::try_from(scene_json)
    }

    /// Changes the canvas size, keeping the camera's field of view and
    /// orientation.
    pub fn resize(&mut self, width: usize, height: usize) {
        let mut camera = Camera::new(width, height,
            self.camera.field_of_view());
        camera.set_transform(*self.camera.transform());

        self.camera = camera;
    }

    /// Three spheres on a floor, lit from the upper left.
    pub fn demo() -> Scene {
        let mut world = World::empty();

        let mut floor = Shape::plane();
        floor.set_material(Material {
            color: Color::rgb(1.0, 0.9, 0.9),
            specular: 0.0,
            ..Default::default()
        });
        world.add_object(floor);

        let spheres = [
            (Matrix4D::translation(-0.5, 1.0, 0.5),
                Color::rgb(0.1, 1.0, 0.5)),
            (Matrix4D::translation(1.5, 0.5, -0.5)
                * Matrix4D::scaling(0.5, 0.5, 0.5),
                Color::rgb(0.5, 1.0, 0.1)),
            (Matrix4D::translation(-1.5, 0.33, -0.75)
                * Matrix4D::scaling(0.33, 0.33, 0.33),
                Color::rgb(1.0, 0.8, 0.1)),
        ];

        for (transform, color) in spheres.iter() {
            let mut sphere = Shape::sphere();
            sphere.set_transform(*transform);
            sphere.set_material(Material {
                color: *color,
                diffuse: 0.7,
                specular: 0.3,
                ..Default::default()
            });
            world.add_object(sphere);
        }

        world.add_light(PointLight::new(
            Color::white(),
            Tuple4D::point(-10.0, 10.0, -10.0),
        ));

        let mut camera = Camera::new(CANVAS_WIDTH, CANVAS_HEIGHT, FIELD_OF_VIEW);
        camera.set_transform(Matrix4D::view_transform(
            Tuple4D::point(0.0, 1.5, -5.0),
            Tuple4D::point(0.0, 1.0, 0.0),
            Tuple4D::vector(0.0, 1.0, 0.0),
        ));

        Scene { world, camera }
    }
}

impl TryFrom<SceneJson> for Scene {
    type Error = TraceError;

    fn try_from(scene_json: SceneJson) -> Result<Scene> {
        if scene_json.canvas_width == 0 || scene_json.canvas_height == 0 {
            return Err(TraceError::Scene(format!(
                "canvas must be at least 1x1, got {}x{}",
                scene_json.canvas_width, scene_json.canvas_height
            )));
        }

        let mut camera = Camera::new(
            scene_json.canvas_width,
            scene_json.canvas_height,
            scene_json.field_of_view,
        );
        camera.set_transform(scene_json.camera.view_transform()?);

        let mut world = World::empty();
        for light in scene_json.lights.iter() {
            world.add_light(PointLight::new(
                light.intensity.into(),
                point(light.position),
            ));
        }

        for shape_json in scene_json.shapes.into_iter() {
            world.add_object(Shape::try_from(shape_json)?);
        }

        debug!("scene has {} objects and {} lights, canvas {}x{}",
            world.objects.len(), world.lights.len(),
            camera.hsize(), camera.vsize());

        if world.lights.is_empty() {
            warn!("scene has no lights; every pixel will be black");
        }
        if world.objects.is_empty() {
            warn!("scene has no objects");
        }

        Ok(Scene { world, camera })
    }
}

fn point(p: [f64; 3]) -> Tuple4D {
    Tuple4D::point(p[0], p[1], p[2])
}

fn vector(v: [f64; 3]) -> Tuple4D {
    Tuple4D::vector(v[0], v[1], v[2])
}

fn default_width() -> usize {
    CANVAS_WIDTH
}

fn default_height() -> usize {
    CANVAS_HEIGHT
}

fn default_fov() -> f64 {
    FIELD_OF_VIEW
}

/// The on-disk form of a `Scene`.
#[derive(Clone, Debug, Deserialize)]
pub struct SceneJson {
    #[serde(default = "default_width")]
    canvas_width: usize,
    #[serde(default = "default_height")]
    canvas_height: usize,
    #[serde(default = "default_fov")]
    field_of_view: f64,

    camera: CameraJson,

    #[serde(default)]
    lights: Vec<LightJson>,
    #[serde(default)]
    shapes: Vec<ShapeJson>,
}

#[derive(Clone, Debug, Deserialize)]
struct CameraJson {
    from: [f64; 3],
    to: [f64; 3],
    up: [f64; 3],
}

impl CameraJson {
    /// Builds the view transform, rejecting degenerate orientations.
    fn view_transform(&self) -> Result<Matrix4D> {
        let from = point(self.from);
        let to = point(self.to);
        let up = vector(self.up);

        let forward = (to - from).try_normalize().map_err(|_| {
            TraceError::Scene("camera `from` and `to` are the same point".into())
        })?;
        let up_n = up.try_normalize().map_err(|_| {
            TraceError::Scene("camera `up` is a zero vector".into())
        })?;
        forward.cross(&up_n).try_normalize().map_err(|_| {
            TraceError::Scene("camera `up` is parallel to the view".into())
        })?;

        Ok(Matrix4D::view_transform(from, to, up))
    }
}

#[derive(Clone, Debug, Deserialize)]
struct LightJson {
    intensity: [f64; 3],
    position: [f64; 3],
}

#[derive(Clone, Debug, Deserialize)]
struct ShapeJson {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    transform: Vec<TransformJson>,
    #[serde(default)]
    material: MaterialJson,
}

/// One step of a shape's transform. Steps apply in the order listed.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TransformJson {
    Translate([f64; 3]),
    Scale([f64; 3]),
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),
    Shear([f64; 6]),
}

impl TransformJson {
    fn matrix(&self) -> Matrix4D {
        match *self {
            TransformJson::Translate([x, y, z]) => Matrix4D::translation(x, y, z),
            TransformJson::Scale([x, y, z]) => Matrix4D::scaling(x, y, z),
            TransformJson::RotateX(r) => Matrix4D::rotation_x(r),
            TransformJson::RotateY(r) => Matrix4D::rotation_y(r),
            TransformJson::RotateZ(r) => Matrix4D::rotation_z(r),
            TransformJson::Shear([xy, xz, yx, yz, zx, zy])
                => Matrix4D::shearing(xy, xz, yx, yz, zx, zy),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct MaterialJson {
    color: Option<[f64; 3]>,
    ambient: Option<f64>,
    diffuse: Option<f64>,
    specular: Option<f64>,
    shininess: Option<f64>,
}

impl From<&MaterialJson> for Material {
    fn from(m: &MaterialJson) -> Material {
        let default = Material::default();

        Material {
            color: m.color.map(Color::from).unwrap_or(default.color),
            ambient: m.ambient.unwrap_or(default.ambient),
            diffuse: m.diffuse.unwrap_or(default.diffuse),
            specular: m.specular.unwrap_or(default.specular),
            shininess: m.shininess.unwrap_or(default.shininess),
        }
    }
}

impl TryFrom<ShapeJson> for Shape {
    type Error = TraceError;

    fn try_from(shape_json: ShapeJson) -> Result<Shape> {
        let mut shape = match shape_json.ty.as_str() {
            "sphere" => Shape::sphere(),
            "plane" => Shape::plane(),
            other => return Err(TraceError::Scene(
                format!("unrecognized shape type `{}`", other)
            )),
        };

        // Each step is applied after the ones before it
        let transform = shape_json.transform.iter()
            .fold(Matrix4D::identity(), |acc, step| step.matrix() * acc);

        shape.set_transform(transform);
        shape.set_material((&shape_json.material).into());

        Ok(shape)
    }
}

#[cfg(test)]
const MINIMAL: &str = r#"{
    "camera": { "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] }
}"#;

#[test]
fn minimal_scene_uses_defaults() {
    let scene = Scene::from_json(MINIMAL).unwrap();

    assert_eq!(scene.camera.hsize(), CANVAS_WIDTH);
    assert_eq!(scene.camera.vsize(), CANVAS_HEIGHT);
    assert_eq!(scene.camera.field_of_view(), FIELD_OF_VIEW);
    assert!(scene.world.objects.is_empty());
    assert!(scene.world.lights.is_empty());
}

#[test]
fn shape_transform_steps_apply_in_order() {
    let scene = Scene::from_json(r#"{
        "camera": { "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] },
        "shapes": [ { "type": "sphere",
                      "transform": [ {"scale": [2, 2, 2]},
                                     {"translate": [1, 0, 0]} ] } ]
    }"#).unwrap();

    let expected = Matrix4D::translation(1.0, 0.0, 0.0)
        * Matrix4D::scaling(2.0, 2.0, 2.0);
    assert_eq!(*scene.world.objects[0].transform(), expected);
}

#[test]
fn every_transform_step_parses() {
    let scene = Scene::from_json(r#"{
        "camera": { "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] },
        "shapes": [ { "type": "plane",
                      "transform": [ {"rotate_x": 0.5}, {"rotate_y": 0.25},
                                     {"rotate_z": -1.0},
                                     {"shear": [1, 0, 0, 0, 0, 0]} ] } ]
    }"#).unwrap();

    let expected = Matrix4D::shearing(1.0, 0.0, 0.0, 0.0, 0.0, 0.0)
        * Matrix4D::rotation_z(-1.0)
        * Matrix4D::rotation_y(0.25)
        * Matrix4D::rotation_x(0.5);
    assert_eq!(*scene.world.objects[0].transform(), expected);
}

#[test]
fn partial_material_keeps_defaults() {
    let scene = Scene::from_json(r#"{
        "camera": { "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] },
        "shapes": [ { "type": "sphere",
                      "material": { "color": [1, 0, 0], "specular": 0 } } ]
    }"#).unwrap();

    let m = scene.world.objects[0].material();
    assert_eq!(m.color, Color::rgb(1.0, 0.0, 0.0));
    assert_eq!(m.specular, 0.0);
    assert_eq!(m.ambient, Material::default().ambient);
    assert_eq!(m.shininess, Material::default().shininess);
}

#[test]
fn lights_are_loaded() {
    let scene = Scene::from_json(r#"{
        "camera": { "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] },
        "lights": [ { "intensity": [1, 1, 1], "position": [-10, 10, -10] },
                    { "intensity": [0.5, 0.5, 0.5], "position": [10, 10, -10] } ]
    }"#).unwrap();

    assert_eq!(scene.world.lights.len(), 2);
    assert_eq!(scene.world.lights[1].position, Tuple4D::point(10.0, 10.0, -10.0));
    assert_eq!(scene.world.lights[1].intensity, Color::rgb(0.5, 0.5, 0.5));
}

#[test]
fn unknown_shape_type() {
    let result = Scene::from_json(r#"{
        "camera": { "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] },
        "shapes": [ { "type": "teapot" } ]
    }"#);

    assert!(matches!(result, Err(TraceError::Scene(_))));
}

#[test]
fn degenerate_camera() {
    let same_point = Scene::from_json(r#"{
        "camera": { "from": [1, 1, 1], "to": [1, 1, 1], "up": [0, 1, 0] }
    }"#);
    let parallel_up = Scene::from_json(r#"{
        "camera": { "from": [0, 0, 0], "to": [0, 5, 0], "up": [0, 1, 0] }
    }"#);

    assert!(matches!(same_point, Err(TraceError::Scene(_))));
    assert!(matches!(parallel_up, Err(TraceError::Scene(_))));
}

#[test]
fn malformed_json() {
    assert!(matches!(Scene::from_json("{ \"camera\": "),
        Err(TraceError::Json(_))));
}

#[test]
fn resize_keeps_orientation() {
    let mut scene = Scene::demo();
    let transform = *scene.camera.transform();
    scene.resize(20, 10);

    assert_eq!((scene.camera.hsize(), scene.camera.vsize()), (20, 10));
    assert_eq!(*scene.camera.transform(), transform);
    assert_eq!(scene.camera.field_of_view(), FIELD_OF_VIEW);
}

#[test]
fn demo_scene_contents() {
    let scene = Scene::demo();

    assert_eq!(scene.world.objects.len(), 4);
    assert_eq!(scene.world.lights.len(), 1);
}
