use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::sky::coords;
use crate::sky::error::CatalogError;

/// One catalog row, as produced by the SIMBAD export. `name` may carry the
/// catalog's `NAME ` marker for proper names; identity always uses the raw
/// string.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StarRecord {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub classification: String,
    pub spectral: String,
    /// Parsecs from the observer; the catalog export calls this `radius`.
    #[serde(rename = "radius")]
    pub distance: f32,
    pub phi: f32,
    pub theta: f32,
}

const PROPER_NAME_PREFIX: &str = "NAME ";

impl StarRecord {
    pub fn display_name(&self) -> &str {
        self.name.strip_prefix(PROPER_NAME_PREFIX).unwrap_or(&self.name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualState {
    Normal,
    Highlighted,
    Dimmed,
}

/// Point size and color handed to the renderer, a pure function of state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    pub point_size: f32,
    pub color: (f32, f32, f32),
}

impl Appearance {
    pub fn of(state: VisualState) -> Self {
        match state {
            VisualState::Normal => Appearance {
                point_size: 3.0,
                color: (1.0, 1.0, 1.0),
            },
            VisualState::Highlighted => Appearance {
                point_size: 7.0,
                color: (1.0, 0.75, 0.2),
            },
            VisualState::Dimmed => Appearance {
                point_size: 2.0,
                color: (0.45, 0.45, 0.5),
            },
        }
    }
}

/// Where a label sits in the stacking order relative to depth-ranked peers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelRank {
    Top,
    ByDepth,
    Bottom,
}

impl LabelRank {
    pub fn of(state: VisualState) -> Self {
        match state {
            VisualState::Highlighted => LabelRank::Top,
            VisualState::Normal => LabelRank::ByDepth,
            VisualState::Dimmed => LabelRank::Bottom,
        }
    }
}

/// A placed catalog object. Position and ground anchor are derived once at
/// construction; only the two visual flags mutate afterwards.
#[derive(Debug)]
pub struct CelestialObject {
    pub record: StarRecord,
    pub position: Point3<f32>,
    pub ground: Point3<f32>,
    highlighted: bool,
    dimmed: bool,
}

impl CelestialObject {
    pub fn new(record: StarRecord) -> Result<Self, CatalogError> {
        if record.distance < 0.0 {
            return Err(CatalogError::InvalidRecord {
                id: record.id,
                reason: format!("negative distance {}", record.distance),
            });
        }
        if !record.phi.is_finite() || !record.theta.is_finite() || !record.distance.is_finite() {
            return Err(CatalogError::InvalidRecord {
                id: record.id,
                reason: "non-finite coordinate".to_string(),
            });
        }

        let position = coords::spherical_to_cartesian(record.distance, record.phi, record.theta);
        let ground = coords::ground_projection(&position);
        Ok(CelestialObject {
            record,
            position,
            ground,
            highlighted: false,
            dimmed: false,
        })
    }

    pub fn set_highlighted(&mut self, on: bool) {
        self.highlighted = on;
    }

    pub fn set_dimmed(&mut self, on: bool) {
        self.dimmed = on;
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    // Highlighted wins over Dimmed when both flags are set.
    pub fn visual_state(&self) -> VisualState {
        if self.highlighted {
            VisualState::Highlighted
        } else if self.dimmed {
            VisualState::Dimmed
        } else {
            VisualState::Normal
        }
    }

    pub fn appearance(&self) -> Appearance {
        Appearance::of(self.visual_state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(distance: f32) -> StarRecord {
        StarRecord {
            id: 7,
            name: "NAME Vega".to_string(),
            classification: "PulsV*delSct".to_string(),
            spectral: "A0Va".to_string(),
            distance,
            phi: 0.9,
            theta: 1.4,
        }
    }

    #[test]
    fn rejects_negative_distance() {
        let err = CelestialObject::new(record(-1.0)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRecord { id: 7, .. }));
    }

    #[test]
    fn rejects_non_finite_angles() {
        let mut r = record(2.0);
        r.phi = f32::NAN;
        assert!(CelestialObject::new(r).is_err());
    }

    #[test]
    fn derives_ground_anchor_on_plane() {
        let obj = CelestialObject::new(record(7.68)).unwrap();
        assert_eq!(obj.ground.y, 0.0);
        assert_eq!(obj.ground.x, obj.position.x);
        assert_eq!(obj.ground.z, obj.position.z);
    }

    #[test]
    fn highlight_overrides_dim() {
        let mut obj = CelestialObject::new(record(1.0)).unwrap();
        assert_eq!(obj.visual_state(), VisualState::Normal);

        obj.set_dimmed(true);
        assert_eq!(obj.visual_state(), VisualState::Dimmed);

        obj.set_highlighted(true);
        assert_eq!(obj.visual_state(), VisualState::Highlighted);

        // Dropping the highlight reveals the still-set dim flag.
        obj.set_highlighted(false);
        assert_eq!(obj.visual_state(), VisualState::Dimmed);

        obj.set_dimmed(false);
        assert_eq!(obj.visual_state(), VisualState::Normal);
    }

    #[test]
    fn appearance_tracks_state() {
        let normal = Appearance::of(VisualState::Normal);
        let highlighted = Appearance::of(VisualState::Highlighted);
        let dimmed = Appearance::of(VisualState::Dimmed);
        assert!(highlighted.point_size > normal.point_size);
        assert!(dimmed.point_size < normal.point_size);
        assert_ne!(highlighted.color, normal.color);
    }

    #[test]
    fn label_rank_overrides() {
        assert_eq!(LabelRank::of(VisualState::Highlighted), LabelRank::Top);
        assert_eq!(LabelRank::of(VisualState::Normal), LabelRank::ByDepth);
        assert_eq!(LabelRank::of(VisualState::Dimmed), LabelRank::Bottom);
    }

    #[test]
    fn display_name_strips_catalog_marker() {
        let r = record(1.0);
        assert_eq!(r.display_name(), "Vega");
        assert_eq!(r.name, "NAME Vega");

        let plain = StarRecord {
            name: "HD 172167".to_string(),
            ..record(1.0)
        };
        assert_eq!(plain.display_name(), "HD 172167");
    }
}
