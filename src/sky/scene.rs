use crate::sky::error::CatalogError;
use crate::sky::star::{CelestialObject, StarRecord};

/// The assembled object collection. Index 0 is always the reference Sun;
/// indices are the object handles used by picking, labels and selection.
#[derive(Debug)]
pub struct Scene {
    pub objects: Vec<CelestialObject>,
    pub radius: f32,
}

impl Scene {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[derive(Debug)]
pub struct Assembly {
    pub scene: Scene,
    /// Records dropped during construction, for the caller to report.
    pub skipped: Vec<CatalogError>,
}

fn sun_record() -> StarRecord {
    StarRecord {
        id: 0,
        name: "Sun".to_string(),
        classification: "*".to_string(),
        spectral: "G2V".to_string(),
        distance: 0.0,
        phi: 0.0,
        theta: 0.0,
    }
}

/// Builds the scene from the injected dataset. Records beyond `max_distance`
/// are filtered out; a record that fails entity construction is skipped and
/// reported without aborting the rest. An empty dataset aborts assembly.
pub fn assemble(records: Vec<StarRecord>, max_distance: f32) -> Result<Assembly, CatalogError> {
    if records.is_empty() {
        return Err(CatalogError::EmptyCatalog);
    }

    let mut objects = Vec::with_capacity(records.len() + 1);
    objects.push(CelestialObject::new(sun_record())?);

    let mut skipped = Vec::new();
    for record in records {
        if record.distance > max_distance {
            continue;
        }
        match CelestialObject::new(record) {
            Ok(obj) => objects.push(obj),
            Err(e) => skipped.push(e),
        }
    }

    Ok(Assembly {
        scene: Scene {
            objects,
            radius: max_distance,
        },
        skipped,
    })
}
