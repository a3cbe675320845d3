use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use hues_core::{AppConfig, HuesError, ResourcePack, TrackKind};
use tracing_subscriber::EnvFilter;

fn main() -> hues_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Inspect { pack, json } => run_inspect(&pack, config, json),
        Commands::Decode { pack, song, image } => {
            run_decode(&pack, config, song.as_deref(), image.as_deref())
        }
    }
}

fn open_pack(path: &Path, config: AppConfig) -> hues_core::Result<ResourcePack> {
    let mut pack = ResourcePack::with_config(path, config.pack);
    pack.init()?;
    Ok(pack)
}

fn run_inspect(path: &Path, config: AppConfig, json: bool) -> hues_core::Result<()> {
    tracing::info!(?path, "inspecting resource pack");
    let pack = open_pack(path, config)?;
    let summary = pack.summary();

    if json {
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|err| HuesError::msg(format!("failed to serialise summary: {err}")))?;
        println!("{text}");
        return Ok(());
    }

    if let Some(name) = &summary.info.name {
        println!("{name}");
    }
    println!("{} songs", summary.songs.len());
    for song in &summary.songs {
        match &song.buildup_name {
            Some(buildup) => println!(
                "  {} [{} + {}] {} + {} beats",
                song.title, buildup, song.loop_name, song.buildup_beats, song.loop_beats
            ),
            None => println!("  {} [{}] {} beats", song.title, song.loop_name, song.loop_beats),
        }
    }
    println!("{} images", summary.images.len());
    for image in &summary.images {
        println!("  {} ({:?})", image.name, image.alignment);
    }
    Ok(())
}

fn run_decode(
    path: &Path,
    config: AppConfig,
    song: Option<&str>,
    image: Option<&str>,
) -> hues_core::Result<()> {
    let pack = open_pack(path, config)?;

    let songs: Vec<_> = match song {
        Some(title) => vec![pack
            .song(title)
            .ok_or_else(|| HuesError::msg(format!("no song titled `{title}`")))?],
        None if image.is_some() => Vec::new(),
        None => pack.songs().iter().collect(),
    };
    for song in songs {
        for kind in [TrackKind::Buildup, TrackKind::Loop] {
            if kind == TrackKind::Buildup && !song.has_buildup() {
                continue;
            }
            song.read_and_decode(kind)?;
            println!(
                "{} {:?}: {} ch @ {} Hz, {:.2} s, {} bytes",
                song.title(),
                kind,
                song.channel_count(kind),
                song.sample_rate(kind),
                song.song_duration_usec(kind) / 1_000_000.0,
                song.pcm_data_size(kind)
            );
        }
    }

    let images: Vec<_> = match image {
        Some(name) => vec![pack
            .image(name)
            .ok_or_else(|| HuesError::msg(format!("no image named `{name}`")))?],
        None if song.is_some() => Vec::new(),
        None => pack.images().iter().collect(),
    };
    for image in images {
        let decoded = image.read_and_decode()?;
        println!(
            "{}: {}x{} {:?}",
            image.name(),
            decoded.width,
            decoded.height,
            decoded.color_type
        );
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and decode Hues resource packs", long_about = None)]
struct Cli {
    /// JSON file overriding the default pack layout.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the songs and images of a pack.
    Inspect {
        /// Root directory of the pack.
        pack: PathBuf,
        /// Emit the catalog as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Decode songs and images to check that their backing files are sound.
    Decode {
        /// Root directory of the pack.
        pack: PathBuf,
        /// Only decode the song with this title.
        #[arg(short, long)]
        song: Option<String>,
        /// Only decode the image with this name.
        #[arg(short, long)]
        image: Option<String>,
    },
}
