//! Level-of-detail switching
use std::collections::HashMap;

use trois_math::Matrix4;

use crate::{NodeId, ObjectKind, Result, SceneError, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodLevel {
    /// Camera distance from which this level is shown.
    pub distance: f64,
    pub object: NodeId,
}

/// Levels sorted by ascending distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lod {
    levels: Vec<LodLevel>,
}

impl Lod {
    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    /// Insert after every level with a distance not greater than
    /// `distance`. Negative distances count by magnitude.
    pub fn insert_level(&mut self, object: NodeId, distance: f64) {
        let distance = distance.abs();
        let index = self
            .levels
            .iter()
            .position(|level| distance < level.distance)
            .unwrap_or(self.levels.len());
        self.levels.insert(index, LodLevel { distance, object });
    }

    /// The last level whose distance does not exceed `distance`, or the
    /// first level when the camera is closer than all of them.
    pub fn object_for_distance(&self, distance: f64) -> Option<NodeId> {
        let first = self.levels.first()?;
        let chosen = self
            .levels
            .iter()
            .skip(1)
            .take_while(|level| distance >= level.distance)
            .last()
            .unwrap_or(first);
        Some(chosen.object)
    }

    pub(crate) fn remap(&mut self, mapping: &HashMap<NodeId, NodeId>) {
        for level in &mut self.levels {
            if let Some(&object) = mapping.get(&level.object) {
                level.object = object;
            }
        }
    }
}

/// Depth of `lod` in front of the camera, measured along the camera's view
/// axis.
fn view_depth(camera_world: &Matrix4, lod_world: &Matrix4) -> f64 {
    let inverse = camera_world.inverse().elements;
    let mw = &lod_world.elements;
    -(inverse[2] * mw[12] + inverse[6] * mw[13] + inverse[10] * mw[14] + inverse[14])
}

impl SceneGraph {
    pub fn lod(&self, id: NodeId) -> Result<&Lod> {
        match &self.get(id)?.kind {
            ObjectKind::Lod(lod) => Ok(lod),
            _ => Err(SceneError::WrongKind(id, "lod")),
        }
    }

    /// Parent `object` under `lod` and register it as a level. Nothing is
    /// registered when the object can't be attached.
    pub fn add_lod_level(&mut self, lod: NodeId, object: NodeId, distance: f64) -> Result<()> {
        self.lod(lod)?;
        if object == lod {
            return Err(SceneError::WouldCreateCycle { parent: lod, child: object });
        }
        self.add(lod, object)?;
        if let ObjectKind::Lod(levels) = &mut self.get_mut(lod)?.kind {
            levels.insert_level(object, distance);
        }
        Ok(())
    }

    /// Show exactly one level for the current camera position. Uses the
    /// world matrices from the last sweep.
    pub fn update_lod(&mut self, lod: NodeId, camera: NodeId) -> Result<()> {
        let levels = self.lod(lod)?.levels().to_vec();
        if levels.len() <= 1 {
            return Ok(());
        }

        let depth = view_depth(&self.get(camera)?.matrix_world, &self.get(lod)?.matrix_world);
        let shown = self.lod(lod)?.object_for_distance(depth);

        for level in levels {
            self.get_mut(level.object)?.visible = Some(level.object) == shown;
        }
        Ok(())
    }
}
