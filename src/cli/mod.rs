use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config;
use crate::domain::track::{Song, filter_songs};
use crate::mining::Miner;
use crate::session::Session;
use crate::storage::operations::Storage;

#[derive(Parser)]
#[command(name = "rolas")]
#[command(version = "0.1")]
#[command(about = "Mines music directories into a small relational library")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mine a directory and show the tracks found
    Mine {
        /// Directory to scan recursively
        dir: PathBuf,
        /// Only show tracks whose title, artist or album contains this text
        #[arg(short, long)]
        filter: Option<String>,
        /// Store the mined tracks in the database
        #[arg(short, long)]
        persist: bool,
        /// Print tracks as JSON
        #[arg(long)]
        json: bool,
    },
    /// List tracks stored in the database
    Songs {
        #[arg(short, long)]
        filter: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List stored albums
    Albums,
    /// List the tracks of one album
    Album {
        /// Album id as shown by `albums`
        id: i64,
    },
    /// Show how many rows every table holds
    Status,
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::Config::load(&cli.config)?;

    match &cli.command {
        Commands::Mine {
            dir,
            filter,
            persist,
            json,
        } => {
            let mut session = Session::new(Miner::new(cfg.mining.follow_symlinks));
            session.select_directory(dir);

            print_songs(&session.filter(filter.as_deref().unwrap_or_default()), *json)?;

            if *persist {
                let mut storage =
                    Storage::new(&cfg.database).with_context(|| "Failed to initialize storage")?;
                let result = session.commit(&mut storage);
                println!("{}", session.status());
                result?;
            } else {
                println!("{}", session.status());
            }
        }

        Commands::Songs { filter, json } => {
            let storage =
                Storage::new(&cfg.database).with_context(|| "Failed to initialize storage")?;
            let songs = storage.list_songs()?;
            print_songs(&filter_songs(&songs, filter.as_deref().unwrap_or_default()), *json)?;
        }

        Commands::Albums => {
            let storage =
                Storage::new(&cfg.database).with_context(|| "Failed to initialize storage")?;
            let albums = storage.list_albums()?;
            if albums.is_empty() {
                println!("No albums stored yet");
            }
            for album in albums {
                println!(
                    "[{}] {} ({}) - {} tracks",
                    album.id,
                    album.name,
                    year_label(album.year),
                    album.tracks
                );
                println!("    {}", album.path.to_string_lossy());
            }
        }

        Commands::Album { id } => {
            let storage =
                Storage::new(&cfg.database).with_context(|| "Failed to initialize storage")?;
            let songs = storage.album_songs(*id)?;
            print_songs(&songs.iter().collect::<Vec<_>>(), false)?;
        }

        Commands::Status => {
            let storage =
                Storage::new(&cfg.database).with_context(|| "Failed to initialize storage")?;
            for (table, rows) in storage.table_counts()? {
                println!("{table:<12} {rows}");
            }
        }
    }

    Ok(())
}

fn print_songs(songs: &[&Song], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(songs)?);
        return Ok(());
    }

    if songs.is_empty() {
        println!("No tracks found");
        return Ok(());
    }

    println!("{:<4} {:<32} {:<24} {:<24} {:<6}", "#", "Title", "Artist", "Album", "Year");
    for song in songs {
        println!(
            "{:<4} {:<32} {:<24} {:<24} {:<6}",
            song.track_number,
            song.title,
            song.artist,
            song.album,
            year_label(song.year)
        );
    }
    Ok(())
}

fn year_label(year: u32) -> String {
    if year == 0 {
        "-".to_string()
    } else {
        year.to_string()
    }
}
