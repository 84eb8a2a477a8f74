use nalgebra::{Point3, Unit, Vector3};

use crate::sky::scene::Scene;

/// Perpendicular distance under which a point counts as hit, in world units.
pub const PICK_THRESHOLD: f32 = 1.0;

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub dir: Unit<Vector3<f32>>,
}

/// One pickable candidate for the current frame. `distance_to_ray` is absent
/// for geometry that is rendered but not meant to be picked (pole lines);
/// such hits never win a click.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub index: usize,
    pub distance_to_ray: Option<f32>,
}

/// Tests every object's point against the pointer ray. Hits behind the eye
/// are culled outright.
pub fn candidates(ray: &Ray, scene: &Scene) -> Vec<RayHit> {
    scene
        .objects
        .iter()
        .enumerate()
        .filter_map(|(index, obj)| {
            let to_point = obj.position - ray.origin;
            let along = to_point.dot(&ray.dir);
            if along <= 0.0 {
                return None;
            }
            let perpendicular = (to_point - ray.dir.into_inner() * along).norm();
            (perpendicular <= PICK_THRESHOLD).then_some(RayHit {
                index,
                distance_to_ray: Some(perpendicular),
            })
        })
        .collect()
}

/// Emitted toward the detail-view boundary after each resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetailUpdate {
    Show(usize),
    Hide,
}

/// Owns the single selection and all highlight writes.
#[derive(Default)]
pub struct SelectionController {
    selected: Option<usize>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Canvas click: nearest candidate by distance-to-ray wins; candidates
    /// without the metric are excluded entirely. No valid candidate clears
    /// the selection.
    pub fn resolve_ray_click(&mut self, hits: &[RayHit], scene: &mut Scene) -> DetailUpdate {
        let target = hits
            .iter()
            .filter_map(|h| h.distance_to_ray.map(|d| (h.index, d)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index);
        self.apply(target, scene)
    }

    /// Label click: bypasses ray testing, the label identifies its owner.
    pub fn resolve_label_click(&mut self, index: usize, scene: &mut Scene) -> DetailUpdate {
        self.apply(Some(index), scene)
    }

    fn apply(&mut self, target: Option<usize>, scene: &mut Scene) -> DetailUpdate {
        // Exclusivity: clear everywhere before marking the new target.
        for obj in scene.objects.iter_mut() {
            obj.set_highlighted(false);
        }
        self.selected = target.filter(|i| *i < scene.objects.len());
        match self.selected {
            Some(index) => {
                scene.objects[index].set_highlighted(true);
                DetailUpdate::Show(index)
            }
            None => DetailUpdate::Hide,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sky::scene::assemble;
    use crate::sky::star::{StarRecord, VisualState};

    fn record(id: u32, distance: f32, phi: f32, theta: f32) -> StarRecord {
        StarRecord {
            id,
            name: format!("HD {id}"),
            classification: "*".to_string(),
            spectral: "K0V".to_string(),
            distance,
            phi,
            theta,
        }
    }

    fn test_scene(n: u32) -> Scene {
        let records = (1..=n)
            .map(|i| record(i, i as f32 * 2.0, 1.0, i as f32 * 0.3))
            .collect();
        assemble(records, 100.0).unwrap().scene
    }

    #[test]
    fn nearest_metric_wins_the_tie_break() {
        let mut scene = test_scene(4);
        let mut controller = SelectionController::new();
        let hits = [
            RayHit { index: 1, distance_to_ray: Some(3.1) },
            RayHit { index: 2, distance_to_ray: Some(0.4) },
            RayHit { index: 3, distance_to_ray: Some(2.0) },
            RayHit { index: 4, distance_to_ray: None },
        ];

        let update = controller.resolve_ray_click(&hits, &mut scene);
        assert_eq!(update, DetailUpdate::Show(2));
        assert_eq!(controller.selected(), Some(2));
    }

    #[test]
    fn metricless_hits_are_excluded_not_deprioritized() {
        let mut scene = test_scene(2);
        let mut controller = SelectionController::new();
        let hits = [RayHit { index: 1, distance_to_ray: None }];

        let update = controller.resolve_ray_click(&hits, &mut scene);
        assert_eq!(update, DetailUpdate::Hide);
        assert_eq!(controller.selected(), None);
    }

    #[test]
    fn selection_is_exclusive() {
        let mut scene = test_scene(5);
        let mut controller = SelectionController::new();

        controller.resolve_label_click(1, &mut scene);
        controller.resolve_label_click(3, &mut scene);

        let highlighted: Vec<usize> = scene
            .objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_highlighted())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(highlighted, vec![3]);
    }

    #[test]
    fn no_candidate_click_clears_selection() {
        let mut scene = test_scene(3);
        let mut controller = SelectionController::new();

        controller.resolve_label_click(2, &mut scene);
        scene.objects[2].set_dimmed(true);

        let update = controller.resolve_ray_click(&[], &mut scene);
        assert_eq!(update, DetailUpdate::Hide);
        assert_eq!(controller.selected(), None);
        // The previous target falls back to its dim status, not Normal.
        assert_eq!(scene.objects[2].visual_state(), VisualState::Dimmed);
        assert_eq!(scene.objects[1].visual_state(), VisualState::Normal);
    }

    #[test]
    fn label_click_beats_closer_ray_candidate() {
        let mut scene = test_scene(4);
        let mut controller = SelectionController::new();

        // The frame's ray candidates favor object 1...
        let hits = [RayHit { index: 1, distance_to_ray: Some(0.01) }];
        controller.resolve_ray_click(&hits, &mut scene);

        // ...but a click landing on object 4's label identifies its owner
        // directly and wins.
        let update = controller.resolve_label_click(4, &mut scene);
        assert_eq!(update, DetailUpdate::Show(4));
        assert!(scene.objects[4].is_highlighted());
        assert!(!scene.objects[1].is_highlighted());
    }

    #[test]
    fn candidates_respect_threshold_and_facing() {
        // Objects along -z from an eye at +z looking down -z.
        let mut scene = test_scene(3);
        // Place one object exactly on the ray, one off to the side, and
        // verify the behind-the-eye case with a reversed ray.
        scene.objects[1].position = Point3::new(0.0, 0.0, -5.0);
        scene.objects[2].position = Point3::new(50.0, 0.0, -5.0);

        let ray = Ray {
            origin: Point3::new(0.0, 0.0, 10.0),
            dir: Unit::new_normalize(Vector3::new(0.0, 0.0, -1.0)),
        };
        let hits = candidates(&ray, &scene);
        assert!(hits.iter().any(|h| h.index == 1));
        assert!(hits.iter().all(|h| h.index != 2));

        let away = Ray {
            origin: Point3::new(0.0, 0.0, 10.0),
            dir: Unit::new_normalize(Vector3::new(0.0, 0.0, 1.0)),
        };
        assert!(candidates(&away, &scene).iter().all(|h| h.index != 1));
    }
}
