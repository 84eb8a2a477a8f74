//! Screen-space label placement. Runs after the 3D render of a frame so the
//! camera matrix is settled; projecting earlier makes labels jitter.

use nalgebra::{Matrix4, Point3};

use crate::sky::error::ProjectionError;
use crate::sky::star::LabelRank;

const DEPTH_STEPS: i32 = 10_000;

/// Stacking value above every depth-ranked label.
pub const TOP_PRIORITY: i32 = 2 * DEPTH_STEPS + 2;
/// Stacking value below every depth-ranked label.
pub const BOTTOM_PRIORITY: i32 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelPlacement {
    pub x: i32,
    pub y: i32,
    pub priority: i32,
}

/// Smaller `ndc_z` (closer to the eye) maps to a strictly larger priority.
fn depth_priority(ndc_z: f32) -> i32 {
    1 + DEPTH_STEPS - (ndc_z * DEPTH_STEPS as f32).round() as i32
}

/// Projects a world position to viewport pixels. `Ok(None)` means the label
/// is hidden this frame (behind the eye or outside the frustum); a
/// non-finite result is reported as degenerate and also hides the label.
pub fn project(
    position: &Point3<f32>,
    view_proj: &Matrix4<f32>,
    viewport: Viewport,
    rank: LabelRank,
) -> Result<Option<LabelPlacement>, ProjectionError> {
    let clip = view_proj * position.to_homogeneous();
    if !clip.iter().all(|c| c.is_finite()) {
        return Err(ProjectionError::Degenerate);
    }
    if clip.w <= 0.0 {
        return Ok(None);
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let ndc_z = clip.z / clip.w;
    if !ndc_x.is_finite() || !ndc_y.is_finite() || !ndc_z.is_finite() {
        return Err(ProjectionError::Degenerate);
    }
    if ndc_x.abs() > 1.0 || ndc_y.abs() > 1.0 || ndc_z.abs() > 1.0 {
        return Ok(None);
    }

    // Screen y grows downward while NDC y grows upward.
    let x = ((0.5 + ndc_x / 2.0) * viewport.width as f32).round() as i32;
    let y = ((0.5 - ndc_y / 2.0) * viewport.height as f32).round() as i32;

    let priority = match rank {
        LabelRank::Top => TOP_PRIORITY,
        LabelRank::Bottom => BOTTOM_PRIORITY,
        LabelRank::ByDepth => depth_priority(ndc_z),
    };

    Ok(Some(LabelPlacement { x, y, priority }))
}
