//! Command-line interface definitions for gober.
//!
//! Options can be given as flags or through the environment.

use clap::{Parser, Subcommand};

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Run the HTTP API with built-in sources
/// gober serve
///
/// # Same, with a config file and a different address
/// GOBER_CONFIG=./gober.yaml gober serve --bind 127.0.0.1:9000
///
/// # One-off lookups printed as JSON
/// gober popular --source kompas
/// gober detail --source detik --url https://news.detik.com/berita/d-7666179/...
/// gober search --query "harga beras"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "GOBER_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Serve the HTTP API
    Serve {
        /// Listen address; overrides `bind` from the config file
        #[arg(short, long, env = "GOBER_BIND")]
        bind: Option<String>,
    },
    /// Print the popular articles of a source
    Popular {
        #[arg(short, long, default_value = "detik")]
        source: String,
    },
    /// Print a single article
    Detail {
        #[arg(short, long, default_value = "detik")]
        source: String,
        /// Article URL on the source site
        #[arg(short, long)]
        url: String,
    },
    /// Print search results from a source
    Search {
        #[arg(short, long, default_value = "detik")]
        source: String,
        #[arg(short, long)]
        query: String,
    },
}
