use std::thread;
use std::sync::mpsc;
use std::sync::{ Arc, Mutex };

use log::{ debug, info };

use crate::error::{ TraceError, Result };
use crate::color::Color;
use crate::world::World;
use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::scene::Scene;

pub enum Message {
    /// Render the canvas row with this index.
    Row(usize),
    Terminate,
}

/// A finished row: its index, and its colors or the error that stopped it.
pub type RowResult = (usize, Result<Vec<Color>>);

struct Worker {
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, world: Arc<World>, camera: Arc<Camera>,
        receiver: Arc<Mutex<mpsc::Receiver<Message>>>,
        results: mpsc::Sender<RowResult>) -> Result<Worker> {

        let builder = thread::Builder::new().name(format!("render-{}", id));
        let thread = builder.spawn(move || loop {
            // Obtain the next message; a poisoned queue means another worker
            // panicked while holding it, so stop taking work.
            let message = match receiver.lock() {
                Ok(queue) => queue.recv(),
                Err(_) => break,
            };

            match message {
                Ok(Message::Row(y)) => {
                    let row = camera.render_row(&world, y);
                    debug!("worker {} finished row {}", id, y);

                    if results.send((y, row)).is_err() {
                        break;
                    }
                },

                // Exit the worker thread loop, terminating the thread.
                Ok(Message::Terminate) | Err(_) => break,
            }
        })?;

        Ok(Worker { thread: Some(thread) })
    }
}

/// A fixed set of render threads sharing one job queue.
///
/// Rows are handed out in the order they are queued, and each finished row is
/// sent back on the results channel given to `new`.
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: mpsc::Sender<Message>,
    terminated: bool,
}

impl ThreadPool {
    /// Spawns `size` workers. A `size` of zero still spawns one.
    ///
    /// Fails with `TraceError::Io` if the system cannot start a thread. Any
    /// workers already started are shut down before returning.
    pub fn new(size: usize, world: Arc<World>, camera: Arc<Camera>,
        results: mpsc::Sender<RowResult>) -> Result<ThreadPool> {
        let size = size.max(1);

        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut pool = ThreadPool {
            workers: Vec::with_capacity(size),
            sender,
            terminated: false,
        };

        for id in 0..size {
            pool.workers.push(Worker::new(
                id,
                Arc::clone(&world),
                Arc::clone(&camera),
                Arc::clone(&receiver),
                results.clone(),
            )?);
        }

        Ok(pool)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queues a message. Returns `false` if every worker has already exited.
    pub fn execute(&self, message: Message) -> bool {
        self.sender.send(message).is_ok()
    }

    /// Asks every worker to exit once the work queued so far is done.
    pub fn terminate(&mut self) {
        if self.terminated {
            return;
        }

        for _ in &self.workers {
            self.execute(Message::Terminate);
        }
        self.terminated = true;
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.terminate();

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                // A worker that panicked has nothing left to clean up
                let _ = thread.join();
            }
        }
    }
}

/// Renders a world across `threads` worker threads.
///
/// Rows are distributed over a `ThreadPool` and reassembled into a canvas, so
/// the result is identical to `Camera::render`. If any rows fail, the error
/// from the topmost failing row is returned.
pub fn parallel_render(world: Arc<World>, camera: Arc<Camera>, threads: usize)
    -> Result<Canvas> {
    let vsize = camera.vsize();
    let hsize = camera.hsize();
    let mut canvas = Canvas::new(hsize, vsize);

    let (results, finished) = mpsc::channel();
    let mut pool = ThreadPool::new(threads, world, Arc::clone(&camera), results)?;

    info!("rendering {}x{} on {} threads", hsize, vsize, pool.size());

    for y in 0..vsize {
        if !pool.execute(Message::Row(y)) {
            return Err(TraceError::WorkerLost);
        }
    }
    pool.terminate();

    let mut first_error: Option<(usize, TraceError)> = None;
    for _ in 0..vsize {
        let (y, row) = finished.recv().map_err(|_| TraceError::WorkerLost)?;

        match row {
            Ok(colors) => {
                for (x, color) in colors.iter().enumerate() {
                    canvas.write_pixel(x, y, color);
                }
            },
            Err(e) => {
                if first_error.as_ref().map_or(true, |(row, _)| y < *row) {
                    first_error = Some((y, e));
                }
            },
        }
    }

    if let Some((_, e)) = first_error {
        return Err(e);
    }

    info!("render finished");
    Ok(canvas)
}

/// Renders a scene on the calling thread when `threads` is 0 or 1, and
/// across `threads` workers otherwise.
pub fn render_scene(scene: Scene, threads: usize) -> Result<Canvas> {
    if threads <= 1 {
        scene.camera.render(&scene.world)
    } else {
        parallel_render(Arc::new(scene.world), Arc::new(scene.camera), threads)
    }
}

#[cfg(test)]
fn default_scene() -> (Arc<World>, Camera) {
    use crate::tuple::Tuple4D;
    use crate::matrix::Matrix4D;

    let mut c = Camera::new(11, 9, std::f64::consts::PI / 2.0);
    c.set_transform(Matrix4D::view_transform(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    ));

    (Arc::new(World::default()), c)
}

#[test]
fn parallel_matches_serial() {
    let (world, camera) = default_scene();
    let serial = camera.render(&world).unwrap();

    for threads in [1, 3, 8].iter() {
        let parallel = parallel_render(
            Arc::clone(&world), Arc::new(camera.clone()), *threads
        ).unwrap();

        assert_eq!((parallel.width, parallel.height), (11, 9));
        assert!(serial.pixels().iter()
            .zip(parallel.pixels().iter())
            .all(|(a, b)| a.bit_eq(b)));
    }
}

#[test]
fn zero_threads_still_renders() {
    let (world, camera) = default_scene();
    let canvas = parallel_render(world, Arc::new(camera), 0).unwrap();

    assert_eq!(canvas.read_pixel(5, 4).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn parallel_reports_errors() {
    use crate::matrix::Matrix4D;

    let (world, mut camera) = default_scene();
    camera.set_transform(Matrix4D::scaling(0.0, 1.0, 1.0));

    assert!(matches!(parallel_render(world, Arc::new(camera), 2),
        Err(TraceError::NotInvertible { .. })));
}

#[test]
fn pool_spawns_at_least_one_worker() {
    let (world, camera) = default_scene();
    let (results, _finished) = mpsc::channel();
    let pool = ThreadPool::new(0, world, Arc::new(camera), results).unwrap();

    assert_eq!(pool.size(), 1);
}

#[test]
fn dropping_pool_finishes_queued_rows() {
    let (world, camera) = default_scene();
    let (results, finished) = mpsc::channel();
    let pool = ThreadPool::new(3, world, Arc::new(camera), results).unwrap();

    for y in 0..3 {
        assert!(pool.execute(Message::Row(y)));
    }
    drop(pool);

    let mut rows: Vec<usize> = finished.try_iter().map(|(y, _)| y).collect();
    rows.sort();
    assert_eq!(rows, vec![0, 1, 2]);
}

#[test]
fn render_scene_serial_and_threaded_agree() {
    let mut scene = Scene::demo();
    scene.resize(16, 8);
    let serial = scene.camera.render(&scene.world).unwrap();

    for threads in [0, 1, 4].iter() {
        let mut scene = Scene::demo();
        scene.resize(16, 8);
        let canvas = render_scene(scene, *threads).unwrap();

        assert!(serial.pixels().iter()
            .zip(canvas.pixels().iter())
            .all(|(a, b)| a.bit_eq(b)));
    }
}
