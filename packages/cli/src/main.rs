use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fscache_core_store::{CacheProvider, Format, Key};
use fscache_path_store::{PathStore, StoreConfig};
use serde_json::Value as JsonValue;
use tracing_subscriber::EnvFilter;

/// fscache - inspect and edit a filesystem-backed object cache
#[derive(Parser, Debug)]
#[command(name = "fscache")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Absolute path of the cache root
    #[arg(short, long, env = "FSCACHE_ROOT")]
    root: PathBuf,

    /// Serialization format of the stored blobs (json, json-pretty, bincode)
    #[arg(short, long, default_value = "json")]
    format: Format,

    /// Create the root directory if it does not exist
    #[arg(long)]
    create: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value stored at a key
    Get {
        key: Key,
        /// Printed instead of failing when the key is absent
        #[arg(long)]
        default: Option<String>,
    },
    /// Store a JSON value at a key
    Put { key: Key, value: String },
    /// Remove a key
    Delete { key: Key },
    /// List every stored key
    Keys,
    /// Print every stored key with its value
    Values,
    /// Remove every stored key
    Reset,
    /// Print the total size of stored blobs in bytes
    Size,
}

fn open(args: &Args) -> Result<PathStore> {
    let config = StoreConfig::new(&args.root)
        .format(args.format)
        .create_if_missing(args.create);
    tracing::debug!(root = %args.root.display(), format = %args.format, "opening cache");
    PathStore::with_config(config).context("Failed to open cache")
}

fn parse_json(text: &str) -> Result<JsonValue> {
    serde_json::from_str(text).with_context(|| format!("Invalid JSON value: {}", text))
}

fn run(args: Args, out: &mut impl Write) -> Result<bool> {
    let mut store = open(&args)?;

    match args.command {
        Command::Get { key, default } => match store.get::<JsonValue>(&key)? {
            Some(value) => writeln!(out, "{}", value)?,
            None => match default {
                Some(default) => writeln!(out, "{}", parse_json(&default)?)?,
                None => {
                    eprintln!("Key not found: {}", key);
                    return Ok(false);
                }
            },
        },
        Command::Put { key, value } => {
            store.put(&key, &parse_json(&value)?)?;
        }
        Command::Delete { key } => {
            if !store.delete(&key)? {
                eprintln!("Key not found: {}", key);
            }
        }
        Command::Keys => {
            for key in store.keys()? {
                writeln!(out, "{}", key)?;
            }
        }
        Command::Values => {
            for (key, value) in store.entries::<JsonValue>()? {
                writeln!(out, "{}\t{}", key, value)?;
            }
        }
        Command::Reset => store.reset()?,
        Command::Size => writeln!(out, "{}", store.size()?)?,
    }

    Ok(true)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let args = Args::parse();
    let found = run(args, &mut std::io::stdout().lock())?;
    if !found {
        std::process::exit(1);
    }
    Ok(())
}
