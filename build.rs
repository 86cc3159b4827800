//! Build script for the Spotify Web API client.
//!
//! Copies `.env.example` from the crate root into the user's local data
//! directory so a configuration template sits next to where the client
//! looks for `.env`:
//!
//! - Linux: `~/.local/share/spotifyapi/.env.example`
//! - macOS: `~/Library/Application Support/spotifyapi/.env.example`
//! - Windows: `%LOCALAPPDATA%/spotifyapi/.env.example`
//!
//! A missing template only produces a cargo warning.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spotifyapi");

    if !template.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            template.display()
        );
        return Ok(());
    }

    // Sandboxed builds may not be allowed to write there.
    if let Err(e) = fs::create_dir_all(&out_dir)
        .and_then(|_| fs::copy(&template, out_dir.join(".env.example")).map(|_| ()))
    {
        println!(
            "cargo:warning=cannot copy .env.example to {}: {}",
            out_dir.display(),
            e
        );
    }

    Ok(())
}
