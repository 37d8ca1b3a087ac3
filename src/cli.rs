use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Terminal remote for the Pi MP3 player. Starts the interactive UI unless a
/// command is given.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Player service base URL (overrides `server.url`)
    #[arg(short, long, global = true)]
    pub server: Option<String>,
    /// Config file to read instead of the default location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Show the player state
    Status,
    /// List the playlist
    List,
    /// Play the song at a playlist index
    Play {
        /// Zero-based playlist index
        index: usize,
    },
    /// Pause or resume playback; starts the first song when none is loaded
    Pause,
    /// Stop playback
    Stop,
    /// Skip to the next song
    Next,
    /// Go back to the previous song
    Previous,
    /// Set the volume
    Volume {
        /// Volume between 0.0 and 1.0; the server clamps anything else
        value: f64,
    },
    /// Toggle shuffle mode
    Shuffle,
    /// Toggle repeat mode
    Repeat,
    /// Delete a song from the server
    Delete {
        /// File name as listed by `list`
        filename: String,
    },
    /// Upload files or directories, one file at a time
    Upload {
        /// Files or directories to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[cfg(test)]
mod tests;
