//! Cheese command line

use std::path::PathBuf;

use clap::Parser;

use cheese_lib::capture::EncodedImage;

#[derive(Parser, Debug)]
#[command(name = "cheese", version, about = "Hands-free selfies: raise a hand or make a peace sign")]
struct Cli {
    /// Recorded detections to replay (JSON Lines)
    recording: Option<PathBuf>,

    /// Config file (default: ~/.cheese/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep the gallery in memory for this run
    #[arg(long)]
    no_persist: bool,

    /// Print the stored gallery and exit
    #[arg(long)]
    list_gallery: bool,

    /// Write default settings to the config file and exit
    #[arg(long)]
    reset_config: bool,
}

fn describe(index: usize, image: &EncodedImage) -> String {
    format!(
        "{:>4}  {}  {:<10}  {} bytes",
        index + 1,
        image.captured_at.format("%Y-%m-%d %H:%M:%S UTC"),
        image.mime_type,
        image.data.len()
    )
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    cheese_lib::init_logging();

    if cli.reset_config {
        let path = cli.config.unwrap_or_else(cheese_lib::config::get_config_path);
        cheese_lib::config::reset_config(&path).map_err(anyhow::Error::msg)?;
        println!("Config at {} reset to defaults", path.display());
        return Ok(());
    }

    if cli.list_gallery {
        let config = cheese_lib::load_config(cli.config.as_deref())?;
        let gallery = cheese_lib::open_gallery(&config, cli.no_persist)?;
        for (index, image) in gallery.entries().iter().enumerate() {
            println!("{}", describe(index, image));
        }
        println!("{} selfie(s) in gallery '{}'", gallery.len(), gallery.key());
        return Ok(());
    }

    let Some(recording) = cli.recording else {
        anyhow::bail!("No recording given. Pass a JSON Lines file of detections to replay.");
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(cheese_lib::run(cheese_lib::RunOptions {
        recording,
        config_path: cli.config,
        no_persist: cli.no_persist,
    }))
}
