//! Config file loading and merging with CLI flags.
//!
//! The file is a flat list of `key = value` lines with `#` comments:
//!
//! ```text
//! base_url = "https://weds360.com/en"
//! output_dir = "gallery"
//! concurrency = 16      # per category
//! skip_failed = true
//! ```
//!
//! Precedence: explicit CLI flag > config file > built-in default.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use gallery_core::{CrawlConfig, FailurePolicy};

use crate::cli::{Args, CliValueSources};

/// Values read from a config file; `None` means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Gallery root URL.
    pub base_url: Option<String>,
    /// Output directory for images and the catalog.
    pub output_dir: Option<PathBuf>,
    /// Image downloads in flight per category (1..=100).
    pub concurrency: Option<u8>,
    /// Categories crawled at once (1..=100).
    pub category_concurrency: Option<u8>,
    /// Attempts per fetch (1..=10).
    pub max_attempts: Option<u32>,
    /// Page ceiling per category.
    pub max_pages: Option<u32>,
    /// First list page.
    pub start_page: Option<u32>,
    /// Skip images that fail to download.
    pub skip_failed: Option<bool>,
    /// Open detail pages.
    pub fetch_details: Option<bool>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against the CLI ranges.
    pub fn validate(&self) -> Result<()> {
        validate_range("concurrency", self.concurrency.map(u64::from), 1, 100)?;
        validate_range(
            "category_concurrency",
            self.category_concurrency.map(u64::from),
            1,
            100,
        )?;
        validate_range("max_attempts", self.max_attempts.map(u64::from), 1, 10)?;
        validate_range("max_pages", self.max_pages.map(u64::from), 1, u64::from(u32::MAX))?;
        validate_range("start_page", self.start_page.map(u64::from), 1, u64::from(u32::MAX))?;
        validate_range("connect_timeout_secs", self.connect_timeout_secs, 1, 3600)?;
        validate_range("read_timeout_secs", self.read_timeout_secs, 1, 3600)?;
        Ok(())
    }
}

fn validate_range(field: &str, value: Option<u64>, min: u64, max: u64) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(min..=max).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: {min}..={max}");
    }
    Ok(())
}

/// Reads and validates a config file.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_index + 1;

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };
        let key = raw_key.trim();
        let value = raw_value.trim();
        let context = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "base_url" => cfg.base_url = Some(parse_string_literal(value).with_context(context)?),
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            "concurrency" => cfg.concurrency = Some(parse_integer(value).with_context(context)?),
            "category_concurrency" => {
                cfg.category_concurrency = Some(parse_integer(value).with_context(context)?);
            }
            "max_attempts" => cfg.max_attempts = Some(parse_integer(value).with_context(context)?),
            "max_pages" => cfg.max_pages = Some(parse_integer(value).with_context(context)?),
            "start_page" => cfg.start_page = Some(parse_integer(value).with_context(context)?),
            "skip_failed" => cfg.skip_failed = Some(parse_boolean(value).with_context(context)?),
            "fetch_details" => {
                cfg.fetch_details = Some(parse_boolean(value).with_context(context)?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer(value).with_context(context)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer(value).with_context(context)?);
            }
            unknown => bail!("Unknown configuration key: '{unknown}' on line {line_no}"),
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer<T: TryFrom<u64>>(raw_value: &str) -> Result<T> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    let value =
        u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))?;
    T::try_from(value).map_err(|_| anyhow::anyhow!("Integer value {value} out of range"))
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}

/// Builds the run settings: defaults, then the config file, then CLI flags.
pub fn resolve_crawl_config(
    args: &Args,
    sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Result<CrawlConfig> {
    let mut config = CrawlConfig::default();
    let file = file_config.cloned().unwrap_or_default();

    if let Some(base_url) = args.base_url.clone().or(file.base_url) {
        config.base_url = base_url;
    }
    if let Some(output_dir) = args.output_dir.clone().or(file.output_dir) {
        config.output_dir = output_dir;
    }

    config.concurrency = usize::from(pick(sources.concurrency, args.concurrency, file.concurrency));
    config.category_concurrency = usize::from(pick(
        sources.category_concurrency,
        args.category_concurrency,
        file.category_concurrency,
    ));
    config.max_attempts = pick(sources.max_attempts, args.max_attempts, file.max_attempts);
    config.start_page = pick(sources.start_page, args.start_page, file.start_page);
    config.max_pages = args.max_pages.or(file.max_pages);

    let skip_failed = args.skip_failed || file.skip_failed.unwrap_or(false);
    config.failure_policy = if skip_failed {
        FailurePolicy::Skip
    } else {
        FailurePolicy::Abort
    };
    config.fetch_details = !args.no_details && file.fetch_details.unwrap_or(true);

    if let Some(secs) = file.connect_timeout_secs {
        config.connect_timeout_secs = secs;
    }
    if let Some(secs) = file.read_timeout_secs {
        config.read_timeout_secs = secs;
    }

    config
        .validate()
        .context("Invalid effective crawl settings")?;
    Ok(config)
}

/// CLI value when given explicitly, else the file value, else the CLI default.
fn pick<T>(from_cli: bool, cli_value: T, file_value: Option<T>) -> T {
    if from_cli {
        cli_value
    } else {
        file_value.unwrap_or(cli_value)
    }
}
