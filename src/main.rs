use clap::{Parser, Subcommand};
use grid_splitter::config::{self, FileConfig};
use grid_splitter::imaging::supported_input_extensions;
use grid_splitter::output::{self, SplitReport};
use grid_splitter::{ImageGridSplitter, ImageSource, SplitMode, SplitOptions};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Grid options shared by every command that needs a grid.
#[derive(clap::Args, Clone)]
struct GridArgs {
    /// TOML config file (see `gen-config`); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// crop: center-crop to a square first; stretch: slice the full image
    #[arg(long)]
    mode: Option<SplitMode>,

    /// Pieces per row
    #[arg(long)]
    cols: Option<u32>,

    /// Pieces per column
    #[arg(long)]
    rows: Option<u32>,

    /// Output format id, e.g. image/png, image/jpeg, image/webp
    #[arg(long)]
    format: Option<String>,

    /// Lossy encoder quality from 0.0 to 1.0
    #[arg(long)]
    quality: Option<f32>,
}

impl GridArgs {
    fn overrides(&self) -> SplitOptions {
        SplitOptions {
            mode: self.mode,
            cols: self.cols,
            rows: self.rows,
            output_format: self.format.clone(),
            quality: self.quality,
        }
    }

    /// Config file first, flags on top.
    fn load(&self) -> Result<(FileConfig, SplitOptions), config::ConfigError> {
        let file = config::load_config(self.config.as_deref())?;
        let options = file.split.clone().merge(self.overrides());
        Ok((file, options))
    }
}

#[derive(Parser)]
#[command(name = "grid-splitter")]
#[command(about = "Cut an image into an N×M grid of pieces")]
#[command(long_about = "\
Cut an image into an N×M grid of pieces

Modes:
  crop      Center-crop to a square, then slice. 3x3 gives nine square pieces.
  stretch   Slice the whole image. Piece aspect ratio is the image's aspect
            ratio divided by the grid (100x50 at 4x1 gives 25x50 pieces).

Piece sizes are floor(width / cols) by floor(height / rows); leftover pixels
on the right and bottom edges are dropped.

Inputs can be image files, directories (every supported image inside),
data: URLs or http(s) URLs. Pieces are written as <name>-r<row>-c<col>.<ext>.

Run 'grid-splitter gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split images into grid pieces
    Split {
        /// Image files, directories, data: URLs or http(s) URLs
        #[arg(required = true)]
        inputs: Vec<String>,

        #[command(flatten)]
        grid: GridArgs,

        /// Directory for the pieces
        #[arg(long, short, default_value = "pieces")]
        output: PathBuf,

        /// Also write manifest.json describing every piece
        #[arg(long)]
        manifest: bool,
    },
    /// Print grid-line positions (percent) for previewing a grid
    Preview {
        #[command(flatten)]
        grid: GridArgs,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

/// One written piece, as recorded in manifest.json.
#[derive(Serialize)]
struct ManifestEntry {
    source: String,
    row: u32,
    col: u32,
    width: u32,
    height: u32,
    path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Split {
            inputs,
            grid,
            output,
            manifest,
        } => {
            let (file_config, options) = grid.load()?;
            init_thread_pool(&file_config.processing);
            let splitter = ImageGridSplitter::new(options)?;

            let sources = expand_inputs(&inputs);
            let image_count = sources.len();
            std::fs::create_dir_all(&output)?;

            let mut entries = Vec::with_capacity(image_count * splitter.config().piece_count());
            let mut total_pieces = 0;
            for (i, (label, display, source)) in sources.into_iter().enumerate() {
                let pieces = splitter.split(source).await?;

                let mut written = Vec::with_capacity(pieces.len());
                for piece in &pieces {
                    if piece.is_empty() {
                        written.push(None);
                        continue;
                    }
                    let path = output.join(format!(
                        "{}-r{}-c{}.{}",
                        label,
                        piece.row,
                        piece.col,
                        piece.file_extension().unwrap_or("bin")
                    ));
                    std::fs::write(&path, &piece.encoded_data)?;
                    written.push(Some(path));
                }

                output::print_split_output(&SplitReport {
                    index: i + 1,
                    label: &label,
                    source: &display,
                    config: splitter.config(),
                    pieces: &pieces,
                    written: &written,
                });

                total_pieces += pieces.len();
                entries.extend(pieces.iter().zip(written).map(|(piece, path)| {
                    ManifestEntry {
                        source: display.clone(),
                        row: piece.row,
                        col: piece.col,
                        width: piece.width,
                        height: piece.height,
                        path,
                    }
                }));
            }

            if manifest {
                let json = serde_json::to_string_pretty(&entries)?;
                std::fs::write(output.join("manifest.json"), json)?;
            }
            output::print_split_summary(image_count, total_pieces, &output);
        }
        Command::Preview { grid } => {
            let (_, options) = grid.load()?;
            let splitter = ImageGridSplitter::new(options)?;
            output::print_preview_output(splitter.config(), &splitter.preview_grid_lines());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the tracing subscriber. Logs go to stderr so piece listings on
/// stdout stay clean.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Turn CLI inputs into `(file label, display name, source)` triples.
///
/// Directories expand to every supported image inside them, sorted by path.
fn expand_inputs(inputs: &[String]) -> Vec<(String, String, ImageSource)> {
    let mut sources = Vec::new();

    for (i, input) in inputs.iter().enumerate() {
        match ImageSource::parse(input) {
            ImageSource::Path(path) if path.is_dir() => {
                let mut files: Vec<PathBuf> = WalkDir::new(&path)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file() && is_supported_image(e.path()))
                    .map(|e| e.into_path())
                    .collect();
                files.sort();
                for file in files {
                    sources.push((
                        path_label(&file, i),
                        file.display().to_string(),
                        ImageSource::Path(file),
                    ));
                }
            }
            ImageSource::Path(path) => {
                sources.push((
                    path_label(&path, i),
                    path.display().to_string(),
                    ImageSource::Path(path),
                ));
            }
            ImageSource::Url(url) => {
                let label = url
                    .rsplit('/')
                    .next()
                    .map(|segment| path_label(Path::new(segment), i))
                    .unwrap_or_else(|| format!("image-{}", i + 1));
                sources.push((label, url.clone(), ImageSource::Url(url)));
            }
            other => {
                sources.push((format!("image-{}", i + 1), "(data URL)".to_string(), other));
            }
        }
    }

    dedupe_labels(&mut sources);
    sources
}

/// Suffix repeated labels with `-2`, `-3`, ... so no two inputs write to the
/// same piece files. The first occurrence keeps its label.
fn dedupe_labels(sources: &mut [(String, String, ImageSource)]) {
    let mut used = HashSet::new();
    for (label, _, _) in sources.iter_mut() {
        let mut candidate = label.clone();
        let mut n = 2;
        while used.contains(&candidate) {
            candidate = format!("{}-{}", label, n);
            n += 1;
        }
        used.insert(candidate.clone());
        *label = candidate;
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// File stem of `path`, or a positional fallback when it has none.
fn path_label(path: &Path, index: usize) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("image-{}", index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn labels(sources: &[(String, String, ImageSource)]) -> Vec<&str> {
        sources.iter().map(|(label, _, _)| label.as_str()).collect()
    }

    fn write_png(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbaImage::new(4, 4).save(path).unwrap();
    }

    #[test]
    fn same_stem_in_walked_directory_gets_distinct_labels() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_png(&tmp.path().join("a/cat.png"));
        write_png(&tmp.path().join("b/cat.png"));

        let sources = expand_inputs(&[tmp.path().display().to_string()]);

        assert_eq!(labels(&sources), vec!["cat", "cat-2"]);
    }

    #[test]
    fn same_stem_across_inputs_gets_distinct_labels() {
        let tmp = tempfile::TempDir::new().unwrap();
        let first = tmp.path().join("a/cat.png");
        let second = tmp.path().join("b/cat.png");
        write_png(&first);
        write_png(&second);

        let sources = expand_inputs(&[
            first.display().to_string(),
            second.display().to_string(),
            "https://example.com/img/cat.webp".to_string(),
        ]);

        assert_eq!(labels(&sources), vec!["cat", "cat-2", "cat-3"]);
    }

    #[test]
    fn data_url_label_does_not_collide_with_file_stem() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("image-2.png");
        write_png(&file);

        let sources = expand_inputs(&[
            file.display().to_string(),
            "data:image/png;base64,AAAA".to_string(),
        ]);

        assert_eq!(labels(&sources), vec!["image-2", "image-2-2"]);
    }

    #[test]
    fn renamed_label_does_not_clash_with_later_input() {
        let mut sources: Vec<(String, String, ImageSource)> = ["cat", "cat", "cat-2"]
            .iter()
            .map(|l| (l.to_string(), String::new(), ImageSource::Bytes(Vec::new())))
            .collect();

        dedupe_labels(&mut sources);

        assert_eq!(labels(&sources), vec!["cat", "cat-2", "cat-2-2"]);
    }

    #[test]
    fn help_describes_stretch_piece_shape() {
        use clap::CommandFactory;

        let help = Cli::command()
            .get_long_about()
            .map(|about| about.to_string())
            .unwrap_or_default();
        assert!(help.contains("ratio divided by the grid"));
        assert!(!help.contains("keep the image's aspect ratio"));
    }

    #[test]
    fn directory_walk_skips_unsupported_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_png(&tmp.path().join("dog.png"));
        std::fs::write(tmp.path().join("notes.txt"), "hi").unwrap();

        let sources = expand_inputs(&[tmp.path().display().to_string()]);

        assert_eq!(labels(&sources), vec!["dog"]);
    }
}
