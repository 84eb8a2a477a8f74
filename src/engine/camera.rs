use nalgebra::{Matrix4, Perspective3, Point3, Unit, Vector3};

use crate::sky::label::Viewport;
use crate::sky::picking::Ray;

const FOV_Y: f32 = 30.0 * std::f32::consts::PI / 180.0;
const NEAR: f32 = 0.01;
const FAR: f32 = 1001.0;
const DRAG_SENSITIVITY: f32 = 0.01;
const WHEEL_SENSITIVITY: f32 = 0.05;
const MAX_ELEVATION: f32 = 1.5;

/// Orbit rig around the scene origin: drag rotates, wheel zooms, distance
/// and elevation are clamped so the camera never flips or leaves the scene.
pub struct OrbitCamera {
    distance: f32,
    rotation: (f32, f32), // (elevation, azimuth)
    min_distance: f32,
    max_distance: f32,
    width: u32,
    height: u32,
    dragging: bool,
    last_pointer: (i32, i32),
}

impl OrbitCamera {
    pub fn new(radius: f32, width: u32, height: u32) -> Self {
        OrbitCamera {
            // Start at (0, r, 2r) looking at the origin.
            distance: radius * 5.0_f32.sqrt(),
            rotation: ((1.0 / 5.0_f32.sqrt()).asin(), 0.0),
            min_distance: 0.1,
            max_distance: radius * 2.5,
            width,
            height,
            dragging: false,
            last_pointer: (0, 0),
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }

    pub fn eye(&self) -> Point3<f32> {
        let (elevation, azimuth) = self.rotation;
        Point3::new(
            self.distance * elevation.cos() * azimuth.sin(),
            self.distance * elevation.sin(),
            self.distance * elevation.cos() * azimuth.cos(),
        )
    }

    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye(), &Point3::origin(), &Vector3::y())
    }

    pub fn projection(&self) -> Matrix4<f32> {
        let aspect = self.width as f32 / self.height.max(1) as f32;
        Perspective3::new(aspect, FOV_Y, NEAR, FAR).to_homogeneous()
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection() * self.view()
    }

    /// Casts a ray from the eye through the pointer. `None` when the camera
    /// matrix cannot be inverted.
    pub fn pointer_ray(&self, ndc_x: f32, ndc_y: f32) -> Option<Ray> {
        let inverse = self.view_projection().try_inverse()?;

        let near = inverse * nalgebra::Vector4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far = inverse * nalgebra::Vector4::new(ndc_x, ndc_y, 1.0, 1.0);
        if near.w == 0.0 || far.w == 0.0 {
            return None;
        }
        let near = Point3::new(near.x / near.w, near.y / near.w, near.z / near.w);
        let far = Point3::new(far.x / far.w, far.y / far.w, far.z / far.w);

        let dir = far - near;
        if dir.norm_squared() == 0.0 {
            return None;
        }
        Some(Ray {
            origin: self.eye(),
            dir: Unit::new_normalize(dir),
        })
    }

    pub fn begin_drag(&mut self, x: i32, y: i32) {
        self.dragging = true;
        self.last_pointer = (x, y);
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn drag_to(&mut self, x: i32, y: i32) {
        if !self.dragging {
            return;
        }
        let dx = x - self.last_pointer.0;
        let dy = y - self.last_pointer.1;

        self.rotation.1 += dx as f32 * DRAG_SENSITIVITY;
        self.rotation.0 += dy as f32 * DRAG_SENSITIVITY;
        // Clamp elevation to avoid flipping over the poles.
        self.rotation.0 = self.rotation.0.clamp(-MAX_ELEVATION, MAX_ELEVATION);

        self.last_pointer = (x, y);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance += delta * WHEEL_SENSITIVITY;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }
}
