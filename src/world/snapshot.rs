//! Project file format.
//!
//! A [`SceneSnapshot`] is the complete persisted state of a world, minus
//! anything that can be re-derived from the mesh files (geometry,
//! thumbnails, render handles). It is a plain DTO; the live
//! [`World`](super::World) converts to and from it explicitly.

use super::camera::CameraState;
use super::grid::DEFAULT_CELL_SIZE;
use super::object::WorldObject;
use crate::error::{Result, TileForgeError};
use crate::types::TileId;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSnapshot {
    /// Source file of every registered tile, in registry order.
    #[serde(with = "ordered_map")]
    pub tile_meshes: Vec<(TileId, PathBuf)>,
    pub objects: Vec<WorldObject>,
    pub camera: CameraState,
    pub grid_size: f64,
    pub grid_shown: bool,
    pub tile_id_counter: u32,
}

impl Default for SceneSnapshot {
    fn default() -> Self {
        Self {
            tile_meshes: Vec::new(),
            objects: Vec::new(),
            camera: CameraState::default(),
            grid_size: DEFAULT_CELL_SIZE,
            grid_shown: true,
            tile_id_counter: 0,
        }
    }
}

impl SceneSnapshot {
    /// Parse a project document. Missing keys take their defaults and
    /// unknown keys are ignored.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty-printed project document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a project file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| TileForgeError::persistence(path, e))?;
        Self::from_json(&text).map_err(|e| TileForgeError::persistence(path, e))
    }

    /// Write a project file.
    ///
    /// The document goes to a sibling temporary file first and is renamed
    /// over `path`, so a failed save leaves any previous file intact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json().map_err(|e| TileForgeError::persistence(path, e))?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json)
            .and_then(|_| std::fs::rename(&tmp, path))
            .map_err(|e| {
                let _ = std::fs::remove_file(&tmp);
                TileForgeError::persistence(path, e)
            })?;

        info!(
            "Saved project {:?} ({} tiles, {} objects)",
            path,
            self.tile_meshes.len(),
            self.objects.len()
        );
        Ok(())
    }
}

/// Serialize `Vec<(K, V)>` as a JSON object without reordering entries.
mod ordered_map {
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<K, V, S>(entries: &[(K, V)], serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<Vec<(K, V)>, D::Error>
    where
        K: Deserialize<'de>,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K: Deserialize<'de>, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<K, V> {
            type Value = Vec<(K, V)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn sample() -> SceneSnapshot {
        SceneSnapshot {
            tile_meshes: vec![
                (TileId(5), PathBuf::from("tiles/floor.stl")),
                (TileId(0), PathBuf::from("tiles/wall.stl")),
            ],
            objects: vec![
                WorldObject::new(TileId(5), [0.0, 50.0, 0.0], 90),
                WorldObject::new(TileId(0), [-50.0, 0.0, 0.0], 0),
            ],
            camera: CameraState {
                pan: Vec3::new(10.0, -5.0, 0.0),
                dist: 320.0,
                azim: 60.0,
                elev: 15.0,
            },
            grid_size: 25.0,
            grid_shown: false,
            tile_id_counter: 6,
        }
    }

    #[test]
    fn test_document_layout() {
        let value: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(value["tile_meshes"]["5"], "tiles/floor.stl");
        assert_eq!(value["objects"][0]["mesh_id"], 5);
        assert_eq!(value["objects"][0]["pos"], serde_json::json!([0, 50, 0]));
        assert_eq!(value["camera"]["dist"], 320.0);
        assert_eq!(value["grid_size"], 25.0);
        assert_eq!(value["grid_shown"], false);
        assert_eq!(value["tile_id_counter"], 6);
    }

    #[test]
    fn test_json_round_trip_keeps_tile_order() {
        let snapshot = sample();
        let back = SceneSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(back.tile_meshes[0].0, TileId(5));
    }

    #[test]
    fn test_missing_keys_default() {
        let snapshot = SceneSnapshot::from_json("{}").unwrap();
        assert_eq!(snapshot, SceneSnapshot::default());
        assert_eq!(snapshot.grid_size, 50.0);
        assert!(snapshot.grid_shown);
        assert_eq!(snapshot.tile_id_counter, 0);
    }

    #[test]
    fn test_parses_highest_tile_id() {
        let snapshot = SceneSnapshot::from_json(
            r#"{"tile_meshes": {"4294967295": "a.stl"}, "tile_id_counter": 4294967295}"#,
        )
        .unwrap();
        assert_eq!(snapshot.tile_meshes, vec![(TileId::MAX, PathBuf::from("a.stl"))]);
        assert_eq!(snapshot.tile_id_counter, u32::MAX);

        let back = SceneSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let snapshot =
            SceneSnapshot::from_json(r#"{"grid_size": 100, "version": 7, "extra": {"a": 1}}"#).unwrap();
        assert_eq!(snapshot.grid_size, 100.0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dungeon.json");
        sample().save(&path).unwrap();

        assert_eq!(SceneSnapshot::load(&path).unwrap(), sample());
        assert!(!dir.path().join("dungeon.json.tmp").exists());
    }

    #[test]
    fn test_load_errors_are_persistence_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = SceneSnapshot::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, TileForgeError::Persistence { .. }));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        let invalid = SceneSnapshot::load(&bad).unwrap_err();
        assert!(matches!(invalid, TileForgeError::Persistence { .. }));
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = sample().save(dir.path().join("no/such/dir/p.json")).unwrap_err();
        assert!(matches!(err, TileForgeError::Persistence { .. }));
    }
}
