//! Tile Forge CLI
//!
//! Inspect mesh files as tiles and build or export level projects.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tile_forge::thumbnail::encode_png;
use tile_forge::{
    decimate, export_scene_obj, format_summary, load_mesh, open_project, render_thumbnail,
    save_project, tile_counts, BoundingBox, CancelToken, ImportBatch, ImportConfig,
    ImportProgress, Importer, LoadError, World,
};

#[derive(Parser)]
#[command(name = "tile-forge")]
#[command(author, version, about = "Import meshes as grid tiles and compose 3D levels", long_about = None)]
struct Cli {
    /// Thumbnail cache folder
    #[arg(long, global = true, default_value = ".thumbnails")]
    thumbnail_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a mesh file would be imported as a tile
    Inspect {
        /// Mesh file (STL or OBJ)
        mesh: PathBuf,
    },

    /// Render the isometric preview of a mesh
    Thumbnail {
        /// Mesh file (STL or OBJ)
        mesh: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Edge length in pixels
        #[arg(short, long, default_value = "64")]
        size: u32,
    },

    /// Create a project from mesh files
    New {
        /// Mesh files to import as tiles
        #[arg(required = true)]
        meshes: Vec<PathBuf>,

        /// Output project file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List placed tiles of a project
    Summary {
        /// Project file
        project: PathBuf,
    },

    /// Export the composed scene of a project as Wavefront OBJ
    ExportObj {
        /// Project file
        project: PathBuf,

        /// Output OBJ path
        #[arg(short, long)]
        output: PathBuf,

        /// Object name written to the file (defaults to the project file stem)
        #[arg(short, long)]
        name: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = ImportConfig::default().with_thumbnail_dir(&cli.thumbnail_dir);

    match cli.command {
        Commands::Inspect { mesh } => inspect(&mesh, &config)?,
        Commands::Thumbnail { mesh, output, size } => thumbnail(&mesh, &output, size)?,
        Commands::New { meshes, output } => new_project(meshes, &output, config)?,
        Commands::Summary { project } => {
            let world = open(&project, config)?;
            println!("{}", format_summary(&tile_counts(&world)));
        }
        Commands::ExportObj {
            project,
            output,
            name,
        } => {
            let world = open(&project, config)?;
            let name = name.unwrap_or_else(|| {
                project
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "scene".to_string())
            });
            let obj = export_scene_obj(&world, &name)?;
            fs::write(&output, &obj)?;
            println!(
                "Exported {} objects to {:?}",
                world.objects().len(),
                output
            );
        }
    }

    Ok(())
}

fn inspect(path: &Path, config: &ImportConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load_mesh(path)?;
    let bounds = BoundingBox::from_mesh(&mesh).ok_or_else(|| LoadError::Empty(path.to_path_buf()))?;
    let dims = config.grid_dims(bounds.size);
    let budget = config.face_budget(dims.volume);
    let reduced = decimate(&mesh, budget);

    println!("{}", tile_forge::tile::tile_name(path, &dims));
    println!("  Vertices: {}", mesh.vertex_count());
    println!("  Triangles: {}", mesh.triangle_count());
    println!(
        "  Size: {:.2} x {:.2} x {:.2}",
        bounds.size.x, bounds.size.y, bounds.size.z
    );
    println!("  Footprint: {} (volume {})", dims.label(), dims.volume);
    println!("  Budget: {} triangles", budget);
    println!("  After reduction: {} triangles", reduced.triangle_count());

    Ok(())
}

fn thumbnail(path: &Path, output: &Path, size: u32) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load_mesh(path)?;
    let png = encode_png(&render_thumbnail(&mesh, size))?;
    fs::write(output, &png)?;
    println!("Wrote {}x{} thumbnail ({} bytes) to {:?}", size, size, png.len(), output);
    Ok(())
}

fn new_project(
    meshes: Vec<PathBuf>,
    output: &Path,
    config: ImportConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let importer = Importer::new(config)?;
    let mut world = World::new();

    let report = importer.import_paths(
        &mut world,
        ImportBatch::Fresh(meshes),
        &mut print_progress,
        &CancelToken::new(),
    );
    for (path, err) in &report.failed {
        eprintln!("Warning: {:?} not imported: {}", path, err);
    }
    for (id, tile) in world.tiles().iter() {
        println!("  [{}] {}", id, tile.name());
    }

    save_project(&world, output)?;
    println!("Saved {} tiles to {:?}", world.tiles().len(), output);
    Ok(())
}

fn open(project: &Path, config: ImportConfig) -> Result<World, Box<dyn std::error::Error>> {
    let importer = Importer::new(config)?;
    let mut world = World::new();
    let report = open_project(
        &mut world,
        &importer,
        project,
        &mut print_progress,
        &CancelToken::new(),
    )?;
    for (path, err) in &report.failed {
        eprintln!("Warning: {:?} could not be reloaded: {}", path, err);
    }
    Ok(world)
}

fn print_progress(p: &ImportProgress) {
    log::debug!(
        "[{}/{}] {} {} ({:.0}%)",
        p.item + 1,
        p.total_items,
        p.step,
        p.file_name,
        p.fraction() * 100.0
    );
}
