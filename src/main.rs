//! maxis-export - Maxis mesh archive tooling
//!
//! Scans `sim3d#.max` archives for OBJX/FACE records and extracts or
//! replaces individual meshes. Encoding itself is a library API; the mesh
//! source (the authoring tool) lives outside this binary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use maxis_export::coords::SPATIAL_SCALE;
use maxis_export::{archive, ArchiveScanner};

#[derive(Parser)]
#[command(name = "maxis-export")]
#[command(about = "Maxis OBJX mesh archive tooling")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tabulate every OBJX header in an archive (CSV)
    ScanObjects {
        /// Input archive (sim3d#.max)
        input: PathBuf,

        /// Output CSV file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Tabulate every FACE record in an archive (CSV)
    ScanFaces {
        /// Input archive (sim3d#.max)
        input: PathBuf,

        /// Output CSV file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract one OBJX record from an archive
    Extract {
        /// Input archive
        input: PathBuf,

        /// Zero-based record index
        #[arg(short, long)]
        index: usize,

        /// Output file for the record bytes
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Replace OBJX record(s) with a standalone export
    Replace {
        /// Input archive
        input: PathBuf,

        /// Zero-based record index/indices to replace
        #[arg(short, long, value_delimiter = ',', required = true)]
        index: Vec<usize>,

        /// Standalone OBJX record to splice in
        #[arg(short, long)]
        replacement: PathBuf,

        /// Output archive
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ScanObjects { input, output } => {
            let data = read_archive(&input)?;
            let csv = objects_csv(&input, &data);
            emit(csv, output.as_deref())?;
        }

        Commands::ScanFaces { input, output } => {
            let data = read_archive(&input)?;
            let csv = faces_csv(&data);
            emit(csv, output.as_deref())?;
        }

        Commands::Extract {
            input,
            index,
            output,
        } => {
            let data = read_archive(&input)?;
            let record = archive::extract_object(&data, index)
                .with_context(|| format!("Failed to extract record {} from {:?}", index, input))?;
            std::fs::write(&output, record)
                .with_context(|| format!("Failed to write {:?}", output))?;
            tracing::info!("Extracted record {} ({} bytes) -> {:?}", index, record.len(), output);
        }

        Commands::Replace {
            input,
            index,
            replacement,
            output,
        } => {
            let data = read_archive(&input)?;
            let patch = std::fs::read(&replacement)
                .with_context(|| format!("Failed to read replacement {:?}", replacement))?;
            let patched = archive::replace_object(&data, &index, &patch)
                .with_context(|| format!("Failed to patch {:?}", input))?;
            std::fs::write(&output, &patched)
                .with_context(|| format!("Failed to write {:?}", output))?;
            tracing::info!("Replaced {:?} in {:?} -> {:?}", index, input, output);
        }
    }

    Ok(())
}

fn read_archive(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read archive {:?}", path))
}

/// One row per OBJX tag occurrence, same columns as the original survey
/// spreadsheets.
fn objects_csv(path: &Path, data: &[u8]) -> String {
    let mut out = String::from(
        "file, index, offset, vertex count, face count, attributes, radius, radius scaled, y radius, name, texture file, anim count, anim pointer, id\n",
    );
    for (index, record) in ArchiveScanner::new(data).objects().enumerate() {
        let h = &record.header;
        let _ = writeln!(
            out,
            "{}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}",
            path.display(),
            index,
            record.offset,
            h.vertex_count,
            h.face_count,
            h.attributes,
            h.radius,
            h.radius as f64 / SPATIAL_SCALE,
            h.y_radius,
            h.name,
            h.texture_file,
            h.anim_count,
            h.anim_ptr,
            h.id
        );
    }
    out
}

fn faces_csv(data: &[u8]) -> String {
    let mut out =
        String::from("offset, vertexCount, flags, isLight, group, face type, tex/color, texFile\n");
    for record in ArchiveScanner::new(data).faces() {
        let h = record.header;
        let _ = writeln!(
            out,
            "{}, {}, {}, {}, {}, {}, {}, {}",
            record.offset,
            h.vertex_count,
            h.flags,
            h.is_light,
            h.group,
            h.type_code,
            h.color_index,
            h.texture_file
        );
    }
    out
}

fn emit(csv: String, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, csv).with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Wrote {:?}", path);
        }
        None => print!("{}", csv),
    }
    Ok(())
}
