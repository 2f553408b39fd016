use std::fs;
use std::sync::Arc;

use raytrace::color::Color;
use raytrace::tuple::Tuple4D;
use raytrace::matrix::Matrix4D;
use raytrace::camera::Camera;
use raytrace::canvas::Canvas;
use raytrace::world::World;
use raytrace::parallel::parallel_render;
use raytrace::scene::Scene;

const DEMO_SCENE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenes/demo.json");

fn default_camera(hsize: usize, vsize: usize) -> Camera {
    let mut c = Camera::new(hsize, vsize, std::f64::consts::PI / 2.0);
    c.set_transform(Matrix4D::view_transform(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    ));

    c
}

fn bit_identical(a: &Canvas, b: &Canvas) -> bool {
    a.width == b.width
        && a.height == b.height
        && a.pixels().iter().zip(b.pixels().iter()).all(|(p, q)| p.bit_eq(q))
}

#[test]
fn default_world_center_pixel() {
    let image = default_camera(11, 11).render(&World::default()).unwrap();

    assert_eq!(image.read_pixel(5, 5).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn render_is_idempotent() {
    let world = World::default();
    let camera = default_camera(21, 15);

    let first = camera.render(&world).unwrap();
    let second = camera.render(&world).unwrap();

    assert!(bit_identical(&first, &second));
}

#[test]
fn parallel_render_matches_serial_on_demo_scene() {
    let mut scene = Scene::load(DEMO_SCENE).unwrap();
    scene.resize(40, 20);

    let serial = scene.camera.render(&scene.world).unwrap();
    let parallel = parallel_render(
        Arc::new(scene.world), Arc::new(scene.camera), 4
    ).unwrap();

    assert!(bit_identical(&serial, &parallel));
}

#[test]
fn demo_file_matches_builtin_demo() {
    let mut from_file = Scene::load(DEMO_SCENE).unwrap();
    let mut builtin = Scene::demo();
    from_file.resize(24, 12);
    builtin.resize(24, 12);

    assert_eq!(from_file.world.objects.len(), builtin.world.objects.len());
    for (a, b) in from_file.world.objects.iter()
        .zip(builtin.world.objects.iter()) {
        assert_eq!(a.ty, b.ty);
        assert_eq!(a.transform(), b.transform());
        assert_eq!(a.material(), b.material());
    }

    let a = from_file.camera.render(&from_file.world).unwrap();
    let b = builtin.camera.render(&builtin.world).unwrap();
    assert!(a.pixels().iter().zip(b.pixels().iter()).all(|(p, q)| p == q));
}

#[test]
fn demo_scene_floor_is_lit_and_sky_is_black() {
    let mut scene = Scene::demo();
    scene.resize(40, 20);
    let image = scene.camera.render(&scene.world).unwrap();

    // The camera looks slightly down; the top row sees past the floor
    assert_eq!(image.read_pixel(0, 0).unwrap(), Color::black());
    assert!(image.read_pixel(0, 19).unwrap().r > 0.1);
}

#[test]
fn load_missing_scene_file() {
    let result = Scene::load("/nonexistent/scene.json");

    assert!(matches!(result, Err(raytrace::TraceError::Io(_))));
}

#[test]
fn save_ppm_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("render.ppm");

    let image = default_camera(11, 11).render(&World::default()).unwrap();
    image.save(&path).unwrap();

    let ppm = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = ppm.lines().collect();

    assert_eq!(&lines[..3], &["P3", "11 11", "255"]);
    assert!(ppm.ends_with('\n'));
    assert!(lines.iter().all(|l| l.len() <= 70));

    // Every channel of every pixel is present, in range
    let values: Vec<u32> = lines[3..].iter()
        .flat_map(|l| l.split_whitespace())
        .map(|v| v.parse().unwrap())
        .collect();
    assert_eq!(values.len(), 11 * 11 * 3);
    assert!(values.iter().all(|v| *v <= 255));
}

#[test]
fn scene_file_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    fs::write(&path, r#"{
        "canvas_width": 11, "canvas_height": 11, "field_of_view": 1.5707963267948966,
        "camera": { "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] },
        "lights": [ { "intensity": [1, 1, 1], "position": [-10, 10, -10] } ],
        "shapes": [
            { "type": "sphere",
              "material": { "color": [0.8, 1.0, 0.6], "diffuse": 0.7, "specular": 0.2 } },
            { "type": "sphere", "transform": [ { "scale": [0.5, 0.5, 0.5] } ] }
        ]
    }"#).unwrap();

    let scene = Scene::load(&path).unwrap();
    let image = scene.camera.render(&scene.world).unwrap();

    assert_eq!(image.read_pixel(5, 5).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855));
}
