//! Saving and reopening whole projects.
//!
//! A project file only stores tile source paths, so opening one re-imports
//! every tile at the ID it was saved with before the placed objects are
//! restored. Tiles whose file can no longer be loaded are dropped together
//! with their objects.

use crate::error::Result;
use crate::ingest::{CancelToken, ImportBatch, ImportProgress, ImportReport, Importer};
use crate::mesh::MeshLoader;
use crate::world::{SceneSnapshot, World};
use log::info;
use std::path::Path;

/// Write the world to a project file. The world is not modified.
pub fn save_project(world: &World, path: impl AsRef<Path>) -> Result<()> {
    world.snapshot().save(path)
}

/// Replace the world with the contents of a project file.
///
/// The file is read and parsed before anything is touched; on error the
/// current world is left as it was. Cancelling the re-import still restores
/// grid, camera and the objects of tiles imported so far.
pub fn open_project<L: MeshLoader>(
    world: &mut World,
    importer: &Importer<L>,
    path: impl AsRef<Path>,
    progress: &mut dyn FnMut(&ImportProgress),
    cancel: &CancelToken,
) -> Result<ImportReport> {
    let path = path.as_ref();
    let snapshot = SceneSnapshot::load(path)?;
    info!(
        "Opening project {:?} ({} tiles, {} objects)",
        path,
        snapshot.tile_meshes.len(),
        snapshot.objects.len()
    );

    world.reset();
    let batch = ImportBatch::Indexed(snapshot.tile_meshes.clone());
    let report = importer.import_paths(world, batch, progress, cancel);
    world.restore(snapshot);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;
    use crate::error::TileForgeError;
    use crate::testutil::write_box_stl;
    use crate::types::TileId;

    #[test]
    fn test_failed_read_leaves_world_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let cube = write_box_stl(dir.path(), "cube.stl", [25.0; 3]);
        let importer =
            Importer::new(ImportConfig::default().with_thumbnail_dir(dir.path().join("t"))).unwrap();
        let mut world = World::new();
        importer.import_one(&mut world, &cube).unwrap();
        world.select_tile(Some(TileId(0)));
        world.place_object([0.0; 3], 0);
        let generation = world.generation();

        let bad = dir.path().join("broken.json");
        std::fs::write(&bad, "[1, 2").unwrap();
        let err = open_project(&mut world, &importer, &bad, &mut |_| {}, &CancelToken::new())
            .unwrap_err();

        assert!(matches!(err, TileForgeError::Persistence { .. }));
        assert_eq!(world.tiles().len(), 1);
        assert_eq!(world.objects().len(), 1);
        assert_eq!(world.generation(), generation);
    }

    #[test]
    fn test_missing_tile_file_drops_its_objects() {
        let dir = tempfile::tempdir().unwrap();
        let keep = write_box_stl(dir.path(), "keep.stl", [25.0; 3]);
        let lose = write_box_stl(dir.path(), "lose.stl", [25.0; 3]);
        let importer =
            Importer::new(ImportConfig::default().with_thumbnail_dir(dir.path().join("t"))).unwrap();

        let mut world = World::new();
        let a = importer.import_one(&mut world, &keep).unwrap().unwrap();
        let b = importer.import_one(&mut world, &lose).unwrap().unwrap();
        world.select_tile(Some(a));
        world.place_object([0.0; 3], 0);
        world.select_tile(Some(b));
        world.place_object([50.0, 0.0, 0.0], 0);

        let project = dir.path().join("level.json");
        save_project(&world, &project).unwrap();
        std::fs::remove_file(&lose).unwrap();

        let report =
            open_project(&mut world, &importer, &project, &mut |_| {}, &CancelToken::new())
                .unwrap();
        assert_eq!(report.failed.len(), 1);
        assert_eq!(world.tiles().ids(), vec![a]);
        assert_eq!(world.objects().len(), 1);
        assert_eq!(world.objects()[0].tile_id, a);
        assert_eq!(world.tiles().next_id(), TileId(2));
    }
}
