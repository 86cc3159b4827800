use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use spotifyapi::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[clap(about = "Authorize the application and cache the access token")]
    Auth(AuthOptions),

    #[clap(about = "Show the profile of the current user")]
    Me,

    #[clap(about = "List tracks saved in your library")]
    SavedTracks(ListOptions),

    #[clap(about = "List albums saved in your library")]
    SavedAlbums(ListOptions),

    #[clap(about = "List artists you follow")]
    Followed(ListOptions),

    #[clap(about = "List playlists you own or follow")]
    Playlists(ListOptions),

    #[clap(about = "List recently played tracks")]
    RecentlyPlayed(ListOptions),

    #[clap(about = "List available playback devices")]
    Devices,

    #[clap(about = "List the tracks of an album")]
    AlbumTracks(AlbumTracksOptions),

    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Show the consent dialog even if the app was approved before
    #[clap(long)]
    force: bool,

    /// Paste the redirect URL instead of running the local listener
    #[clap(long)]
    manual: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ListOptions {
    /// Maximum number of entries to fetch
    #[clap(long, default_value_t = 50)]
    limit: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct AlbumTracksOptions {
    /// Spotify id of the album
    id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth(opt) => cli::auth(opt.force, opt.manual).await,
        Command::Me => cli::me().await,
        Command::SavedTracks(opt) => cli::saved_tracks(opt.limit).await,
        Command::SavedAlbums(opt) => cli::saved_albums(opt.limit).await,
        Command::Followed(opt) => cli::followed_artists(opt.limit).await,
        Command::Playlists(opt) => cli::playlists(opt.limit).await,
        Command::RecentlyPlayed(opt) => cli::recently_played(opt.limit).await,
        Command::Devices => cli::devices().await,
        Command::AlbumTracks(opt) => cli::album_tracks(&opt.id).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
