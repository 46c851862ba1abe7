use clap::{Parser, Subcommand};
use nasa_gallery::client::NasaClient;
use nasa_gallery::config::{self, CONFIG_FILENAME, ConfigError, GalleryConfig};
use nasa_gallery::filter::FilterState;
use nasa_gallery::output;
use nasa_gallery::session::Gallery;
use nasa_gallery::settings::{FileStorage, Layout, PreferencesPatch, SettingsStore, Theme};
use nasa_gallery::shell::Shell;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nasa-gallery")]
#[command(about = "Browse the NASA Image and Video Library from the terminal")]
#[command(long_about = "\
Browse the NASA Image and Video Library from the terminal

Search, filter and page through images from images-api.nasa.gov, add your
own entries, and group favourites into collections.

Configuration is read from gallery.toml (see 'nasa-gallery gen-config').
Display preferences are kept under the configured state directory.

Set RUST_LOG=nasa_gallery=debug to see requests and store activity.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one page of results and print it
    Search {
        /// Search text
        #[arg(short, long, default_value = "")]
        query: String,
        /// Only images from this year
        #[arg(long)]
        year: Option<String>,
        /// image, video or audio
        #[arg(long)]
        media_type: Option<String>,
        /// NASA center, e.g. "JPL"
        #[arg(long)]
        center: Option<String>,
        /// Result page (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Interactive gallery shell
    Shell,
    /// Show or change display preferences
    Settings {
        #[arg(long)]
        background: Option<String>,
        #[arg(long)]
        font_size: Option<u32>,
        #[arg(long)]
        layout: Option<Layout>,
        #[arg(long)]
        theme: Option<Theme>,
        /// Switch between light and dark
        #[arg(long, conflicts_with = "theme")]
        toggle_theme: bool,
        /// Print the CSS custom properties for the preferences
        #[arg(long)]
        css: bool,
    },
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nasa_gallery=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_state(path: &Path) -> Result<(GalleryConfig, SettingsStore<FileStorage>), ConfigError> {
    let config = config::load_config(path)?;
    tracing::debug!(config = %path.display(), "configuration loaded");
    let settings = SettingsStore::load(FileStorage::new(&config.storage.state_dir));
    Ok((config, settings))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Search {
            query,
            year,
            media_type,
            center,
            page,
        } => {
            let (config, settings) = load_state(&cli.config)?;
            let client = NasaClient::new(&config.api)?;
            let mut gallery = Gallery::with_page_size(client, config.api.page_size);
            let filters = FilterState {
                year,
                media_type,
                center,
                ..Default::default()
            };
            gallery.restore(query.trim(), filters);
            gallery.refresh().await;
            if page > 1 && !gallery.go_to_page(page).await {
                let total = gallery.store().pagination().total_pages();
                eprintln!("No page {page} (1-{total}); showing page 1.");
            }
            let visible = gallery.filtered_images();
            output::print_gallery(
                gallery.store(),
                gallery.filters(),
                &visible,
                settings.get().layout,
            );
            if gallery.store().error().is_some() {
                std::process::exit(1);
            }
        }
        Command::Shell => {
            let (config, settings) = load_state(&cli.config)?;
            let client = NasaClient::new(&config.api)?;
            let gallery = Gallery::with_page_size(client, config.api.page_size);
            Shell::new(gallery, settings, config.search.debounce())
                .run()
                .await?;
        }
        Command::Settings {
            background,
            font_size,
            layout,
            theme,
            toggle_theme,
            css,
        } => {
            let (_, mut settings) = load_state(&cli.config)?;
            let patch = PreferencesPatch {
                background_color: background,
                font_size,
                layout,
                theme,
            };
            if !patch.is_empty() {
                settings.update(patch)?;
            }
            if toggle_theme {
                settings.toggle_theme()?;
            }
            if css {
                println!("{}", settings.get().css_variables());
            } else {
                output::print_settings(settings.get());
            }
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}
