//! Turning mesh files into registered tiles.
//!
//! Each file goes through four steps: load the raw mesh, measure its
//! bounding box and grid footprint, decimate it to the footprint's triangle
//! budget, and fetch or render its thumbnail. Files are processed one at a
//! time on the calling thread. A file that fails any step is logged and
//! recorded in the [`ImportReport`]; the rest of the batch continues.

use crate::config::ImportConfig;
use crate::error::{LoadError, Result, TileForgeError};
use crate::mesh::{decimate, BoundingBox, FileMeshLoader, MeshLoader};
use crate::thumbnail::ThumbnailCache;
use crate::tile::Tile;
use crate::types::TileId;
use crate::world::World;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sub-step of importing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    Loading,
    Analyzing,
    Reducing,
    Thumbnail,
}

impl ImportStep {
    /// Number of progress units per file.
    pub const COUNT: usize = 4;

    /// Progress units completed once this step is done (1-based).
    pub fn ordinal(self) -> usize {
        match self {
            ImportStep::Loading => 1,
            ImportStep::Analyzing => 2,
            ImportStep::Reducing => 3,
            ImportStep::Thumbnail => 4,
        }
    }
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ImportStep::Loading => "Loading",
            ImportStep::Analyzing => "Analyzing",
            ImportStep::Reducing => "Reducing",
            ImportStep::Thumbnail => "Thumbnail",
        };
        f.write_str(label)
    }
}

/// Progress report passed to the host after every step.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportProgress {
    /// Zero-based index of the file in the batch.
    pub item: usize,
    pub total_items: usize,
    /// Last step reached for this file. Skipped files report the final step.
    pub step: ImportStep,
    /// Completed units, `4 * item + step` (or `4 * item + 4` once a file is
    /// skipped or abandoned).
    pub done: usize,
    /// `4 * total_items`.
    pub total: usize,
    pub file_name: String,
}

impl ImportProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.done as f32 / self.total as f32
        }
    }
}

/// Shared cancellation flag.
///
/// Clones share the flag, so a UI thread can cancel an import running
/// elsewhere. The importer only checks it between files.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Files to import.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportBatch {
    /// New files. IDs are assigned automatically; files already backing a
    /// live tile are skipped.
    Fresh(Vec<PathBuf>),
    /// Files restored from a project, registered at their saved IDs.
    Indexed(Vec<(TileId, PathBuf)>),
}

impl ImportBatch {
    pub fn len(&self) -> usize {
        match self {
            ImportBatch::Fresh(paths) => paths.len(),
            ImportBatch::Indexed(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_entries(self) -> Vec<(Option<TileId>, PathBuf)> {
        match self {
            ImportBatch::Fresh(paths) => paths.into_iter().map(|p| (None, p)).collect(),
            ImportBatch::Indexed(entries) => {
                entries.into_iter().map(|(id, p)| (Some(id), p)).collect()
            }
        }
    }
}

impl From<Vec<PathBuf>> for ImportBatch {
    fn from(paths: Vec<PathBuf>) -> Self {
        ImportBatch::Fresh(paths)
    }
}

/// Outcome of one batch.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<(TileId, PathBuf)>,
    /// Files already imported.
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, TileForgeError)>,
    /// The batch stopped early; files after the cancellation point were not touched.
    pub cancelled: bool,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failed.is_empty()
    }
}

/// Builds tiles from mesh files and registers them in a [`World`].
#[derive(Debug)]
pub struct Importer<L: MeshLoader = FileMeshLoader> {
    loader: L,
    config: ImportConfig,
    thumbnails: ThumbnailCache,
}

impl Importer<FileMeshLoader> {
    /// Importer reading STL and OBJ files from disk.
    pub fn new(config: ImportConfig) -> Result<Self> {
        Self::with_loader(FileMeshLoader, config)
    }
}

impl<L: MeshLoader> Importer<L> {
    /// Importer with a custom mesh source. Opens the thumbnail cache folder.
    pub fn with_loader(loader: L, config: ImportConfig) -> Result<Self> {
        let thumbnails = ThumbnailCache::new(&config.thumbnail_dir, config.thumbnail_size)?;
        Ok(Self {
            loader,
            config,
            thumbnails,
        })
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbnails
    }

    /// Import every file of `batch` into `world`, in order.
    ///
    /// `progress` is called after each step of each file. `cancel` is checked
    /// before each file.
    pub fn import_paths(
        &self,
        world: &mut World,
        batch: ImportBatch,
        progress: &mut dyn FnMut(&ImportProgress),
        cancel: &CancelToken,
    ) -> ImportReport {
        let entries = batch.into_entries();
        let total_items = entries.len();
        let mut report = ImportReport::default();

        for (item, (explicit, path)) in entries.into_iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Import cancelled after {} of {} files", item, total_items);
                report.cancelled = true;
                break;
            }

            let file_name = display_name(&path);
            let mut emit = |step: ImportStep, done: usize| {
                progress(&ImportProgress {
                    item,
                    total_items,
                    step,
                    done,
                    total: total_items * ImportStep::COUNT,
                    file_name: file_name.clone(),
                })
            };
            let item_end = (item + 1) * ImportStep::COUNT;

            if explicit.is_none() {
                if let Some(existing) = world.find_tile_by_path(&path) {
                    debug!("Skipping {:?}: already imported as tile {}", path, existing);
                    emit(ImportStep::Thumbnail, item_end);
                    report.skipped.push(path);
                    continue;
                }
            }

            let mut last_step = ImportStep::Loading;
            let built = self.build_tile_with(&path, &mut |step| {
                last_step = step;
                emit(step, item * ImportStep::COUNT + step.ordinal());
            });

            match built {
                Ok(tile) => {
                    let triangles = tile.mesh().triangle_count();
                    let id = world.register_tile(tile, explicit);
                    info!("Imported {:?} as tile {} ({} triangles)", path, id, triangles);
                    report.imported.push((id, path));
                }
                Err(e) => {
                    warn!("Skipping {:?}: {}", path, e);
                    if last_step.ordinal() < ImportStep::COUNT {
                        emit(last_step, item_end);
                    }
                    report.failed.push((path, e));
                }
            }
        }

        report
    }

    /// Import a single file with automatic ID assignment.
    ///
    /// Returns `None` when the file already backs a live tile.
    pub fn import_one(&self, world: &mut World, path: impl AsRef<Path>) -> Result<Option<TileId>> {
        let path = path.as_ref();
        if world.find_tile_by_path(path).is_some() {
            return Ok(None);
        }
        let tile = self.build_tile(path)?;
        Ok(Some(world.register_tile(tile, None)))
    }

    /// Run the four import steps for one file without registering the result.
    pub fn build_tile(&self, path: &Path) -> Result<Tile> {
        self.build_tile_with(path, &mut |_| {})
    }

    fn build_tile_with(&self, path: &Path, on_step: &mut dyn FnMut(ImportStep)) -> Result<Tile> {
        let raw = self.loader.load(path)?;
        debug!(
            "Loaded {:?}: {} vertices, {} triangles",
            path,
            raw.vertex_count(),
            raw.triangle_count()
        );
        on_step(ImportStep::Loading);

        let bounds =
            BoundingBox::from_mesh(&raw).ok_or_else(|| LoadError::Empty(path.to_path_buf()))?;
        let dims = self.config.grid_dims(bounds.size);
        debug!("Footprint of {:?}: {} (volume {})", path, dims.label(), dims.volume);
        on_step(ImportStep::Analyzing);

        let budget = self.config.face_budget(dims.volume);
        let mesh = decimate(&raw, budget);
        if mesh.triangle_count() < raw.triangle_count() {
            debug!(
                "Reduced {:?} from {} to {} triangles (budget {})",
                path,
                raw.triangle_count(),
                mesh.triangle_count(),
                budget
            );
        }
        on_step(ImportStep::Reducing);

        let thumbnail = self.thumbnails.get(&mesh, &path.to_string_lossy())?;
        on_step(ImportStep::Thumbnail);

        Ok(Tile::new(path, mesh, bounds, dims, thumbnail))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriMesh;
    use crate::testutil::{plane_grid, write_box_stl};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn importer(dir: &TempDir) -> Importer {
        let config = ImportConfig::default().with_thumbnail_dir(dir.path().join("thumbs"));
        Importer::new(config).unwrap()
    }

    fn collect_progress() -> (Rc<RefCell<Vec<ImportProgress>>>, impl FnMut(&ImportProgress)) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        (events, move |p: &ImportProgress| sink.borrow_mut().push(p.clone()))
    }

    /// Serves a dense flat grid for any path.
    struct DenseLoader;

    impl MeshLoader for DenseLoader {
        fn load(&self, _path: &Path) -> std::result::Result<TriMesh, LoadError> {
            Ok(plane_grid(20, 5.0))
        }
    }

    #[test]
    fn test_cube_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let cube = write_box_stl(dir.path(), "cube.stl", [100.0, 100.0, 50.0]);
        let importer = importer(&dir);
        let mut world = World::new();

        let report = importer.import_paths(
            &mut world,
            ImportBatch::Fresh(vec![cube.clone()]),
            &mut |_| {},
            &CancelToken::new(),
        );

        assert!(report.is_complete());
        assert_eq!(report.imported, vec![(TileId(0), cube.clone())]);

        let tile = world.tile(TileId(0)).unwrap();
        assert_eq!(tile.dims().size, [4, 4, 2]);
        assert_eq!(tile.dims().volume, 32);
        assert_eq!(importer.config().face_budget(32), 25000);
        assert_eq!(tile.mesh().triangle_count(), 12);
        assert_eq!(tile.mesh().vertex_count(), 8);
        assert_eq!(tile.name(), "cube.stl [4x4x2]");
        assert!(tile.render_handle().is_some());
        assert_eq!(tile.thumbnail().dimensions(), (64, 64));
        assert!(importer
            .thumbnails()
            .path_for(&cube.to_string_lossy())
            .exists());
    }

    #[test]
    fn test_duplicate_path_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let cube = write_box_stl(dir.path(), "cube.stl", [25.0; 3]);
        let importer = importer(&dir);
        let mut world = World::new();

        assert_eq!(importer.import_one(&mut world, &cube).unwrap(), Some(TileId(0)));
        assert_eq!(importer.import_one(&mut world, &cube).unwrap(), None);

        let (events, mut sink) = collect_progress();
        let report = importer.import_paths(
            &mut world,
            ImportBatch::Fresh(vec![cube.clone()]),
            &mut sink,
            &CancelToken::new(),
        );
        assert_eq!(report.skipped, vec![cube]);
        assert_eq!(world.tiles().len(), 1);

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].step, ImportStep::Thumbnail);
        assert_eq!(events[0].done, 4);
    }

    #[test]
    fn test_indexed_batch_bypasses_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let cube = write_box_stl(dir.path(), "cube.stl", [25.0; 3]);
        let importer = importer(&dir);
        let mut world = World::new();
        importer.import_one(&mut world, &cube).unwrap();

        let report = importer.import_paths(
            &mut world,
            ImportBatch::Indexed(vec![(TileId(0), cube.clone()), (TileId(4), cube)]),
            &mut |_| {},
            &CancelToken::new(),
        );
        assert_eq!(report.imported.len(), 2);
        assert_eq!(world.tiles().ids(), vec![TileId(0), TileId(4)]);
        assert_eq!(world.tiles().next_id(), TileId(5));
    }

    #[test]
    fn test_failed_file_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_box_stl(dir.path(), "good.stl", [50.0; 3]);
        let missing = dir.path().join("missing.stl");
        let unsupported = dir.path().join("notes.txt");
        std::fs::write(&unsupported, "hello").unwrap();
        let importer = importer(&dir);
        let mut world = World::new();

        let report = importer.import_paths(
            &mut world,
            ImportBatch::Fresh(vec![missing.clone(), unsupported.clone(), good.clone()]),
            &mut |_| {},
            &CancelToken::new(),
        );

        assert_eq!(report.imported, vec![(TileId(0), good)]);
        assert_eq!(report.failed.len(), 2);
        assert!(matches!(
            report.failed[0].1,
            TileForgeError::Load(LoadError::Missing(_))
        ));
        assert!(matches!(
            report.failed[1].1,
            TileForgeError::Load(LoadError::UnsupportedFormat(_))
        ));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_progress_values() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_box_stl(dir.path(), "a.stl", [25.0; 3]);
        let missing = dir.path().join("gone.stl");
        let importer = importer(&dir);
        let mut world = World::new();
        let (events, mut sink) = collect_progress();

        importer.import_paths(
            &mut world,
            ImportBatch::Fresh(vec![a, missing]),
            &mut sink,
            &CancelToken::new(),
        );

        let events = events.borrow();
        let done: Vec<usize> = events.iter().map(|p| p.done).collect();
        assert_eq!(done, vec![1, 2, 3, 4, 8]);
        assert!(events.iter().all(|p| p.total == 8 && p.total_items == 2));
        assert_eq!(events[0].step, ImportStep::Loading);
        assert_eq!(events[3].step, ImportStep::Thumbnail);
        assert_eq!(events[3].file_name, "a.stl");
        assert_eq!(events[4].item, 1);
        assert_eq!(events[4].file_name, "gone.stl");
        assert_eq!(events[4].fraction(), 1.0);
    }

    #[test]
    fn test_cancel_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_box_stl(dir.path(), "a.stl", [25.0; 3]);
        let importer = importer(&dir);
        let mut world = World::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        let report =
            importer.import_paths(&mut world, ImportBatch::Fresh(vec![a]), &mut |_| {}, &cancel);
        assert!(report.cancelled);
        assert!(report.imported.is_empty());
        assert!(world.tiles().is_empty());
    }

    #[test]
    fn test_cancel_between_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_box_stl(dir.path(), "a.stl", [25.0; 3]);
        let b = write_box_stl(dir.path(), "b.stl", [25.0; 3]);
        let importer = importer(&dir);
        let mut world = World::new();
        let cancel = CancelToken::new();
        let remote = cancel.clone();

        let report = importer.import_paths(
            &mut world,
            ImportBatch::Fresh(vec![a, b]),
            &mut |p| {
                if p.step == ImportStep::Loading {
                    remote.cancel();
                }
            },
            &cancel,
        );

        // The running file finishes; the next one is never started.
        assert_eq!(report.imported.len(), 1);
        assert!(report.cancelled);
        assert_eq!(world.tiles().len(), 1);
    }

    #[test]
    fn test_budget_applied() {
        let dir = tempfile::tempdir().unwrap();
        let config = ImportConfig::default()
            .with_thumbnail_dir(dir.path().join("thumbs"))
            .with_budget(50, 50);
        let importer = Importer::with_loader(DenseLoader, config).unwrap();
        let mut world = World::new();

        let id = importer
            .import_one(&mut world, "virtual/plane.stl")
            .unwrap()
            .unwrap();
        let tile = world.tile(id).unwrap();
        assert_eq!(tile.dims().size, [4, 4, 1]);
        assert!(tile.mesh().triangle_count() <= 50);
        assert!(tile.mesh().triangle_count() > 0);
    }
}
