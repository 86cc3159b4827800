//! Spotify Web API client
//!
//! This library authenticates a user through the OAuth2 authorization-code
//! grant, keeps the access token fresh, issues bearer-authenticated calls
//! against the versioned Web API and turns paged collections into lazily
//! fetched sequences of typed objects.
//!
//! # Modules
//!
//! - `oauth` - Authorization URL, redirect parsing, code exchange, [`oauth::Token`]
//! - `transport` - Authenticated requests and error classification
//! - `pagination` - Lazy traversal of paged collections
//! - `scope` - Permission scopes and the scope guard
//! - `spotify` - Endpoint façade composed of capability views
//! - `types` - Read-only models of API objects
//! - `error` - Error taxonomy
//!
//! The remaining modules (`cli`, `config`, `management`, `server`) belong to
//! the bundled command-line client: they read the environment, cache the
//! token on disk and run the local redirect listener. The client core never
//! does any of that by itself.
//!
//! # Example
//!
//! ```
//! use spotifyapi::{oauth::{OAuth, Token}, spotify::Spotify, transport::Transport};
//!
//! async fn me(token: Token, id: &str, secret: &str) -> spotifyapi::Res<()> {
//!     let transport = Transport::new(token).with_auto_refresh(OAuth::new(), id, secret);
//!     let user = Spotify::new(transport).users().current_user().await?;
//!     println!("{}", user.id);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod oauth;
pub mod pagination;
pub mod scope;
pub mod server;
pub mod spotify;
pub mod transport;
pub mod types;

pub use error::Error;

/// Result alias used throughout the crate.
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits with code 1.
///
/// Only for the command-line client; library code returns errors instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
