pub mod coords;
pub mod error;
pub mod label;
pub mod picking;
pub mod scene;
pub mod star;

use nalgebra::Point3;

use crate::engine::camera::OrbitCamera;
use crate::engine::renderer::Renderer;
use label::LabelPlacement;
use picking::{DetailUpdate, RayHit, SelectionController};
use scene::Scene;
use star::{Appearance, LabelRank, VisualState};

const RING_SEGMENTS: usize = 64;
const RING_COUNT: u32 = 5;
const GRID_COLOR: (f32, f32, f32) = (0.125, 0.31, 0.125);
const POLE_COLOR: (f32, f32, f32) = (0.55, 0.55, 0.55);

/// One frame's outcome for a single label, handed to the overlay adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelFrame {
    pub placement: Option<LabelPlacement>,
    pub dimmed: bool,
}

/// The assembled view: scene, orbit camera and selection state, advanced one
/// render/update cycle per animation frame.
pub struct SkyView {
    pub scene: Scene,
    pub camera: OrbitCamera,
    selection: SelectionController,
    pointer_ndc: Option<(f32, f32)>,
    candidates: Vec<RayHit>,
}

impl SkyView {
    pub fn new(scene: Scene, width: u32, height: u32) -> Self {
        let camera = OrbitCamera::new(scene.radius, width, height);
        SkyView {
            scene,
            camera,
            selection: SelectionController::new(),
            pointer_ndc: None,
            candidates: Vec::new(),
        }
    }

    /// Latest pointer position in NDC, updated on every pointer-move event.
    pub fn set_pointer(&mut self, ndc_x: f32, ndc_y: f32) {
        self.pointer_ndc = Some((ndc_x, ndc_y));
    }

    /// Canvas click: resolves against the candidates of the current frame.
    pub fn click(&mut self) -> DetailUpdate {
        self.selection
            .resolve_ray_click(&self.candidates, &mut self.scene)
    }

    /// Label click: the label identifies its owner directly.
    pub fn label_click(&mut self, index: usize) -> DetailUpdate {
        self.selection.resolve_label_click(index, &mut self.scene)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.selected()
    }

    /// One cooperative tick. Order is fixed: candidates, render, label
    /// projection (never before render), dim recomputation.
    pub fn frame(&mut self, renderer: &Renderer) -> Vec<LabelFrame> {
        self.update_candidates();
        self.render(renderer);
        let labels = self.project_labels();
        self.update_dimming();
        labels
    }

    fn update_candidates(&mut self) {
        self.candidates = match self.pointer_ndc {
            Some((x, y)) => match self.camera.pointer_ray(x, y) {
                Some(ray) => picking::candidates(&ray, &self.scene),
                None => Vec::new(),
            },
            None => Vec::new(),
        };
    }

    fn render(&self, renderer: &Renderer) {
        renderer.clear(0.0, 0.0, 0.0);
        renderer.enable_depth_test();

        let view_proj = self.camera.view_projection();
        let radius = self.scene.radius;

        // Ecliptic furniture: axis cross plus concentric distance rings.
        let (r, g, b) = GRID_COLOR;
        renderer.draw_segments(&axis_vertices(radius), r, g, b, &view_proj);
        let step = (radius / RING_COUNT as f32).round().max(1.0);
        let mut ring = step;
        while ring <= radius {
            renderer.draw_line_strip(&ring_vertices(ring, RING_SEGMENTS), r, g, b, &view_proj);
            ring += step;
        }

        let (r, g, b) = POLE_COLOR;
        renderer.draw_segments(&pole_vertices(&self.scene), r, g, b, &view_proj);

        // Points batched per visual state so size and color follow state.
        for state in [
            VisualState::Dimmed,
            VisualState::Normal,
            VisualState::Highlighted,
        ] {
            let vertices: Vec<f32> = self
                .scene
                .objects
                .iter()
                .filter(|o| o.visual_state() == state)
                .flat_map(|o| [o.position.x, o.position.y, o.position.z])
                .collect();
            let Appearance { point_size, color } = Appearance::of(state);
            renderer.draw_points(&vertices, point_size, color.0, color.1, color.2, &view_proj);
        }
    }

    fn project_labels(&self) -> Vec<LabelFrame> {
        let view_proj = self.camera.view_projection();
        let viewport = self.camera.viewport();

        self.scene
            .objects
            .iter()
            .map(|obj| {
                let state = obj.visual_state();
                let placement =
                    label::project(&obj.position, &view_proj, viewport, LabelRank::of(state))
                        // A degenerate projection hides the label this frame.
                        .unwrap_or(None);
                LabelFrame {
                    placement,
                    dimmed: state == VisualState::Dimmed,
                }
            })
            .collect()
    }

    // The orbit distance is the dim threshold: anything on the far side of
    // the origin de-emphasizes, and zooming in narrows the bright set.
    fn update_dimming(&mut self) {
        let eye = self.camera.eye();
        let threshold = eye.coords.norm();
        for obj in self.scene.objects.iter_mut() {
            let away = (obj.position - eye).norm() > threshold;
            obj.set_dimmed(away);
        }
    }
}

fn ring_vertices(radius: f32, segments: usize) -> Vec<f32> {
    let mut vertices = Vec::with_capacity((segments + 1) * 3);
    for i in 0..=segments {
        let angle = i as f32 * 2.0 * std::f32::consts::PI / segments as f32;
        vertices.push(radius * angle.cos());
        vertices.push(0.0);
        vertices.push(radius * angle.sin());
    }
    vertices
}

fn axis_vertices(radius: f32) -> Vec<f32> {
    #[rustfmt::skip]
    let vertices = vec![
        -radius, 0.0, 0.0,  radius, 0.0, 0.0,
        0.0, -radius, 0.0,  0.0, radius, 0.0,
        0.0, 0.0, -radius,  0.0, 0.0, radius,
    ];
    vertices
}

fn pole_vertices(scene: &Scene) -> Vec<f32> {
    let mut vertices = Vec::with_capacity(scene.objects.len() * 6);
    for obj in &scene.objects {
        let p: &Point3<f32> = &obj.position;
        vertices.extend_from_slice(&[p.x, p.y, p.z, obj.ground.x, obj.ground.y, obj.ground.z]);
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::scene::assemble;
    use super::star::StarRecord;
    use super::*;

    fn record(id: u32, distance: f32) -> StarRecord {
        StarRecord {
            id,
            name: format!("HD {id}"),
            classification: "*".to_string(),
            spectral: "G2V".to_string(),
            distance,
            phi: 1.2,
            theta: id as f32 * 0.7,
        }
    }

    fn view(n: u32, radius: f32) -> SkyView {
        let records = (1..=n).map(|i| record(i, i as f32 * 3.0)).collect();
        let assembly = assemble(records, radius).unwrap();
        SkyView::new(assembly.scene, 800, 600)
    }

    #[test]
    fn ring_lies_on_the_plane_and_closes() {
        let v = ring_vertices(10.0, 64);
        assert_eq!(v.len(), 65 * 3);
        for chunk in v.chunks(3) {
            assert_eq!(chunk[1], 0.0);
            let r = (chunk[0] * chunk[0] + chunk[2] * chunk[2]).sqrt();
            assert!((r - 10.0).abs() < 1e-3);
        }
        let first = &v[..3];
        let last = &v[v.len() - 3..];
        for (a, b) in first.iter().zip(last) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn poles_connect_position_to_ground() {
        let view = view(2, 50.0);
        let v = pole_vertices(&view.scene);
        assert_eq!(v.len(), view.scene.len() * 6);
        // Each segment's second endpoint sits on the plane.
        for chunk in v.chunks(6) {
            assert_eq!(chunk[4], 0.0);
            assert_eq!(chunk[0], chunk[3]);
            assert_eq!(chunk[2], chunk[5]);
        }
    }

    #[test]
    fn pointer_movement_only_recomputes_candidates() {
        let mut view = view(3, 50.0);
        view.set_pointer(0.0, 0.0);
        view.update_candidates();
        assert_eq!(view.selected(), None);
        for obj in &view.scene.objects {
            assert!(!obj.is_highlighted());
        }
    }

    #[test]
    fn click_without_candidates_hides_detail() {
        let mut view = view(3, 50.0);
        let update = view.click();
        assert_eq!(update, DetailUpdate::Hide);
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn dimming_splits_near_from_far() {
        let mut view = view(2, 50.0);
        // Near side of the orbit (toward the default eye) and far side.
        view.scene.objects[1].position = Point3::new(0.0, 0.0, 45.0);
        view.scene.objects[2].position = Point3::new(0.0, 0.0, -45.0);

        view.update_dimming();

        assert_eq!(view.scene.objects[1].visual_state(), VisualState::Normal);
        assert_eq!(view.scene.objects[2].visual_state(), VisualState::Dimmed);
        // The reference object at the origin sits exactly on the threshold.
        assert_eq!(view.scene.objects[0].visual_state(), VisualState::Normal);
    }

    #[test]
    fn selected_object_is_never_reported_dimmed() {
        let mut view = view(3, 50.0);
        view.label_click(1);
        view.scene.objects[1].set_dimmed(true);
        let labels = view.project_labels();
        // Highlight wins over the dim flag, so the label is not dimmed.
        assert!(!labels[1].dimmed);
    }

    #[test]
    fn labels_cover_every_object() {
        let view = view(4, 50.0);
        let frames = view.project_labels();
        assert_eq!(frames.len(), view.scene.len());
    }
}
