//! Save a level, reopen it in a fresh world and check nothing moved.

use std::path::{Path, PathBuf};
use tile_forge::mesh::stl::encode_binary_stl;
use tile_forge::{
    open_project, save_project, CancelToken, ImportBatch, ImportConfig, Importer, SceneSnapshot,
    TileId, TriMesh, World,
};

fn write_box(dir: &Path, name: &str, [x, y, z]: [f32; 3]) -> PathBuf {
    let positions = vec![
        [0.0, 0.0, 0.0],
        [x, 0.0, 0.0],
        [x, y, 0.0],
        [0.0, y, 0.0],
        [0.0, 0.0, z],
        [x, 0.0, z],
        [x, y, z],
        [0.0, y, z],
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 0, 3, 2,
        4, 5, 6, 4, 6, 7,
        0, 1, 5, 0, 5, 4,
        1, 2, 6, 1, 6, 5,
        2, 3, 7, 2, 7, 6,
        3, 0, 4, 3, 4, 7,
    ];
    let path = dir.join(name);
    std::fs::write(&path, encode_binary_stl(&TriMesh::from_indexed(positions, indices))).unwrap();
    path
}

#[test]
fn test_save_reset_reimport_restore() {
    let dir = tempfile::tempdir().unwrap();
    let floor = write_box(dir.path(), "floor.stl", [100.0, 100.0, 25.0]);
    let wall = write_box(dir.path(), "wall.stl", [100.0, 25.0, 75.0]);
    let pillar = write_box(dir.path(), "pillar.stl", [25.0, 25.0, 100.0]);

    let config = ImportConfig::default().with_thumbnail_dir(dir.path().join("thumbs"));
    let importer = Importer::new(config).unwrap();

    // Build a world with sparse IDs {0, 2, 5}.
    let mut world = World::new();
    let report = importer.import_paths(
        &mut world,
        ImportBatch::Indexed(vec![
            (TileId(0), floor.clone()),
            (TileId(2), wall.clone()),
            (TileId(5), pillar.clone()),
        ]),
        &mut |_| {},
        &CancelToken::new(),
    );
    assert!(report.is_complete());

    world.select_tile(Some(TileId(0)));
    world.place_object([10.0, 10.0, 0.0], 0);
    world.place_object([110.0, 10.0, 0.0], 0);
    world.select_tile(Some(TileId(2)));
    world.place_object([10.0, 160.0, 0.0], 90);
    world.select_tile(Some(TileId(5)));
    world.place_object([-30.0, -30.0, 0.0], 270);
    world.shrink_grid();
    world.place_object([12.0, 12.0, 0.0], 180);
    world.camera_mut().orbit(40.0, -20.0);
    world.camera_mut().zoom(false);

    let project = dir.path().join("level.json");
    save_project(&world, &project).unwrap();

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&project).unwrap()).unwrap();
    assert_eq!(saved["tile_id_counter"], 6);
    assert_eq!(saved["grid_size"], 25.0);
    assert_eq!(saved["objects"][4]["pos"], serde_json::json!([0, 0, 0]));

    let mut reopened = World::new();
    let report = open_project(
        &mut reopened,
        &importer,
        &project,
        &mut |_| {},
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(report.imported.len(), 3);
    assert_eq!(
        reopened.tiles().ids(),
        vec![TileId(0), TileId(2), TileId(5)]
    );
    assert!(reopened.tiles().next_id() >= TileId(6));
    assert_eq!(reopened.objects(), world.objects());
    assert_eq!(reopened.camera(), world.camera());
    assert_eq!(reopened.grid(), world.grid());
    assert_eq!(
        reopened.tile(TileId(2)).unwrap().name(),
        "wall.stl [4x1x3]"
    );
    assert_eq!(reopened.snapshot(), SceneSnapshot::load(&project).unwrap());
}

#[test]
fn test_reopen_into_used_world_replaces_it() {
    let dir = tempfile::tempdir().unwrap();
    let floor = write_box(dir.path(), "floor.stl", [50.0, 50.0, 25.0]);
    let other = write_box(dir.path(), "other.stl", [25.0, 25.0, 25.0]);
    let config = ImportConfig::default().with_thumbnail_dir(dir.path().join("thumbs"));
    let importer = Importer::new(config).unwrap();

    let mut world = World::new();
    let id = importer.import_one(&mut world, &floor).unwrap().unwrap();
    world.select_tile(Some(id));
    world.place_object([0.0; 3], 0);
    let project = dir.path().join("small.json");
    save_project(&world, &project).unwrap();

    importer.import_one(&mut world, &other).unwrap();
    world.place_object([50.0, 0.0, 0.0], 0);
    world.grow_grid();

    open_project(&mut world, &importer, &project, &mut |_| {}, &CancelToken::new()).unwrap();
    assert_eq!(world.tiles().len(), 1);
    assert_eq!(world.objects().len(), 1);
    assert_eq!(world.grid().cell_size, 50.0);
    assert_eq!(world.selected_tile(), None);
}
