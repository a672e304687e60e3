use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use img_reader::{BoundsOnly, ImgOptions, ImgReader, RectC, SubFileType};

#[derive(Parser, Debug)]
#[command(name = "img-reader", version, about = "Inspect Garmin IMG map containers")]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Query cache budget, in decoded features
    #[arg(long, global = true, default_value_t = 2048)]
    cache_capacity: usize,

    /// Styling file used when the container embeds none
    #[arg(long, global = true)]
    style: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the container header, bounds and tiles
    Info {
        file: PathBuf,
    },
    /// Run a range query and print what it touched
    Query {
        file: PathBuf,
        /// Rectangle as min_lon,min_lat,max_lon,max_lat
        #[arg(long, value_parser = parse_rect, allow_hyphen_values = true)]
        rect: RectC,
        /// Detail level
        #[arg(long, default_value_t = 24)]
        bits: u8,
    },
    /// Write the de-obfuscated bytes of one sub-file
    Dump {
        file: PathBuf,
        /// Tile name (ignored for TYP)
        tile: String,
        /// Sub-file type: TRE, RGN, LBL, NET, GMP or TYP
        kind: SubFileType,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_rect(s: &str) -> Result<RectC, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("invalid number '{}': {}", v, e)))
        .collect::<Result<Vec<_>, _>>()?;
    match values.as_slice() {
        [min_lon, min_lat, max_lon, max_lat] => {
            let rect = RectC::from_min_max([*min_lon, *min_lat], [*max_lon, *max_lat]);
            if rect.is_valid() {
                Ok(rect)
            } else {
                Err(format!("rectangle {} has min above max", rect))
            }
        }
        _ => Err(format!("expected 4 comma-separated values, got {}", values.len())),
    }
}

fn open(file: &Path, options: ImgOptions) -> ImgReader<BoundsOnly> {
    match ImgReader::<BoundsOnly>::open_with(file, options) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("ERROR: Failed to open {}", file.display());
            eprintln!("  {}", e);
            process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut options = ImgOptions::default().with_cache_capacity(cli.cache_capacity);
    if let Some(style) = cli.style {
        options = options.with_style_fallback(style);
    }

    match cli.command {
        Command::Info { file } => {
            let mut reader = open(&file, options);

            println!("IMG file: {}", reader.label());
            println!("{}", "=".repeat(60));
            println!("  Name: {}", reader.name());
            println!("  Block size: {} bytes", reader.block_size());
            println!("  XOR key: {:#04x}", reader.header().key);
            println!("  Bounds: {}", reader.bounds());
            println!("  Tiles: {} ({} dropped)", reader.tiles().len(), reader.dropped_tiles());
            match reader.load_style() {
                Ok(style) => println!("  Style: {:?} ({} bytes)", style.source(), style.data().len()),
                Err(e) => println!("  Style: unreadable ({})", e),
            }

            println!("\nTiles:");
            for tile in reader.tiles() {
                let files = tile
                    .files()
                    .kinds()
                    .filter_map(|kind| tile.file(kind))
                    .map(|f| format!("{}({}B/{} blocks)", f.kind(), f.size(), f.blocks().len()))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("  {} {} {}", tile.name(), tile.bounds(), files);
            }
        }
        Command::Query { file, rect, bits } => {
            let mut reader = open(&file, options);

            let mut names = Vec::new();
            reader.visit_tiles(&rect, |tile| {
                names.push(tile.name().to_string());
                true
            });
            names.sort();
            println!("Tiles intersecting {}: {}", rect, names.join(", "));

            let (mut polygons, mut lines, mut points) = (Vec::new(), Vec::new(), Vec::new());
            let poly_stats = reader.polys(&rect, bits, &mut polygons, &mut lines);
            let point_stats = reader.points(&rect, bits, &mut points);

            println!("  Polygons: {}", polygons.len());
            println!("  Lines: {}", lines.len());
            println!("  Points: {}", points.len());
            println!("  Poly query: {:?}", poly_stats);
            println!("  Point query: {:?}", point_stats);
        }
        Command::Dump { file, tile, kind, output } => {
            let mut reader = open(&file, options);
            let data = match reader.read_subfile(&tile, kind) {
                Ok(data) => data,
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    process::exit(1);
                }
            };
            let written = match output {
                Some(path) => fs::write(&path, &data),
                None => io::stdout().lock().write_all(&data),
            };
            if let Err(e) = written {
                eprintln!("ERROR: Failed to write {} bytes: {}", data.len(), e);
                process::exit(1);
            }
        }
    }
}
