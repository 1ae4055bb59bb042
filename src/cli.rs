//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use gallery_core::{DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS};

/// Crawl a paginated photo gallery and download every image.
///
/// Walks all categories of the gallery, follows each category's list pages
/// to the last one, and writes the images plus a `db.json` catalog to the
/// output directory.
#[derive(Parser, Debug)]
#[command(name = "gallery-crawler")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Gallery root URL, e.g. https://weds360.com/en
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory for images and db.json (default: ./output)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum concurrent image downloads per category (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Categories crawled at the same time (1-100)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub category_concurrency: u8,

    /// Attempts per image download and detail page (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: u32,

    /// Give up on a category after this many list pages
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_pages: Option<u32>,

    /// First list page of every category
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub start_page: u32,

    /// Leave images that fail to download out of the catalog instead of aborting
    #[arg(long)]
    pub skip_failed: bool,

    /// Do not open detail pages
    #[arg(long)]
    pub no_details: bool,

    /// Read defaults from a key = value config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Which defaulted flags were given explicitly on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliValueSources {
    pub concurrency: bool,
    pub category_concurrency: bool,
    pub max_attempts: bool,
    pub start_page: bool,
}

impl CliValueSources {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            concurrency: is_commandline_value(matches, "concurrency"),
            category_concurrency: is_commandline_value(matches, "category_concurrency"),
            max_attempts: is_commandline_value(matches, "max_attempts"),
            start_page: is_commandline_value(matches, "start_page"),
        }
    }
}

/// Parses process arguments, exiting on `--help`, `--version` or errors.
pub fn parse_with_sources() -> (Args, CliValueSources) {
    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    (args, CliValueSources::from_matches(&matches))
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}
