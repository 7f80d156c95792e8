use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paginate::PagingPolicy;
use crate::preview::DEFAULT_API_URL;
use crate::theme::Theme;
use crate::upload::{ExpirationPreset, DEFAULT_EXPLORER_URL};

/// shelbyx - Shelby storage dashboard
///
/// Terminal UI for browsing, previewing and uploading blobs stored on the
/// Shelby network.
/// Configuration priority: CLI args > Environment variables > Config file > Defaults
#[derive(Parser, Debug, Default)]
#[command(name = "shelbyx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Shelby storage dashboard", long_about = None)]
pub struct CliArgs {
    /// Account whose blobs are listed (0x-prefixed address)
    #[arg(short, long, env = "SHELBY_ACCOUNT")]
    pub account: Option<String>,

    /// Shelby API base URL
    #[arg(long, env = "SHELBY_API_URL")]
    pub api_url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, env = "SHELBY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Explorer base URL used for transaction links
    #[arg(long, env = "SHELBY_EXPLORER_URL")]
    pub explorer_url: Option<String>,

    /// Blob list refresh interval in milliseconds (1000-60000)
    #[arg(long, env = "POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// HTTP request timeout in milliseconds (1000-120000)
    #[arg(long, env = "REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Paging for the media tab: reveal or pages
    #[arg(long, env = "MEDIA_PAGING")]
    pub media_paging: Option<PagingPolicy>,

    /// Paging for the documents tab: reveal or pages
    #[arg(long, env = "DOCUMENTS_PAGING")]
    pub documents_paging: Option<PagingPolicy>,

    /// Items per page for paged lists (1-500)
    #[arg(long, env = "PAGE_SIZE")]
    pub page_size: Option<usize>,

    /// Items added per "load more" (1-500)
    #[arg(long, env = "REVEAL_BATCH")]
    pub reveal_batch: Option<usize>,

    /// Load previews for every listed item instead of only visible ones
    #[arg(long, env = "EAGER_PREVIEWS")]
    pub eager_previews: Option<bool>,

    /// Default expiration in days (1, 3, 7, 14 or 30)
    #[arg(long, env = "DEFAULT_EXPIRATION_DAYS")]
    pub default_expiration_days: Option<u32>,

    /// Target UI rendering FPS (1-120)
    #[arg(long, env = "RENDER_FPS")]
    pub render_fps: Option<u32>,

    /// Color theme: shelby, nord or green-phosphor
    #[arg(long, env = "SHELBYX_THEME")]
    pub theme: Option<Theme>,

    /// TOML config file
    #[arg(long, env = "SHELBYX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file (the TUI owns the terminal)
    #[arg(long, env = "SHELBYX_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Files to pre-select in the upload dialog
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,

    /// Deep link to open at startup (shelbyx://documents, #/blob/<path>, ...)
    #[arg(value_name = "ROUTE")]
    pub route: Option<String>,
}

/// Config file layout; every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub account: Option<String>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub explorer_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub media_paging: Option<PagingPolicy>,
    pub documents_paging: Option<PagingPolicy>,
    pub page_size: Option<usize>,
    pub reveal_batch: Option<usize>,
    pub eager_previews: Option<bool>,
    pub default_expiration_days: Option<u32>,
    pub render_fps: Option<u32>,
    pub theme: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub account: String,
    pub api_url: String,
    pub api_key: Option<String>,
    pub explorer_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub media_paging: PagingPolicy,
    pub documents_paging: PagingPolicy,
    pub page_size: usize,
    pub reveal_batch: usize,
    pub eager_previews: bool,
    pub default_expiration: ExpirationPreset,
    pub render_fps: u32,
    pub theme: Theme,
    pub log_file: PathBuf,
    pub initial_files: Vec<PathBuf>,
    pub initial_route: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            poll_interval_ms: 5000,
            request_timeout_ms: 15000,
            media_paging: PagingPolicy::Reveal,
            documents_paging: PagingPolicy::Pages,
            page_size: 20,
            reveal_batch: 12,
            eager_previews: false,
            default_expiration: ExpirationPreset::OneWeek,
            render_fps: 30,
            theme: Theme::default(),
            log_file: PathBuf::from("./shelbyx.log"),
            initial_files: Vec::new(),
            initial_route: None,
        }
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

fn load_file(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
}

/// Load configuration from CLI args, environment and the optional TOML file.
pub fn load() -> Result<Config> {
    let args = CliArgs::parse();
    let file = match args.config.as_deref() {
        Some(path) => {
            log::info!("📄 Loading configuration from {}", path.display());
            load_file(path)?
        }
        None => ConfigFile::default(),
    };
    resolve(args, file)
}

/// Merge already-parsed layers. CLI and env arrive together through clap.
pub fn resolve(args: CliArgs, file: ConfigFile) -> Result<Config> {
    let d = Config::default();

    let account = args
        .account
        .or(file.account)
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .ok_or_else(|| anyhow!("SHELBY_ACCOUNT is required (--account or env)"))?;

    let api_url = args.api_url.or(file.api_url).unwrap_or(d.api_url);
    validate_url(&api_url, "SHELBY_API_URL")?;

    let explorer_url = args
        .explorer_url
        .or(file.explorer_url)
        .unwrap_or(d.explorer_url);
    validate_url(&explorer_url, "SHELBY_EXPLORER_URL")?;

    let poll_interval_ms = validate_in_range(
        args.poll_interval_ms
            .or(file.poll_interval_ms)
            .unwrap_or(d.poll_interval_ms),
        1000,
        60000,
        "POLL_INTERVAL_MS",
    )?;
    let request_timeout_ms = validate_in_range(
        args.request_timeout_ms
            .or(file.request_timeout_ms)
            .unwrap_or(d.request_timeout_ms),
        1000,
        120000,
        "REQUEST_TIMEOUT_MS",
    )?;
    let page_size = validate_in_range(
        args.page_size.or(file.page_size).unwrap_or(d.page_size),
        1,
        500,
        "PAGE_SIZE",
    )?;
    let reveal_batch = validate_in_range(
        args.reveal_batch.or(file.reveal_batch).unwrap_or(d.reveal_batch),
        1,
        500,
        "REVEAL_BATCH",
    )?;
    let render_fps = validate_in_range(
        args.render_fps.or(file.render_fps).unwrap_or(d.render_fps),
        1,
        120,
        "RENDER_FPS",
    )?;

    let default_expiration = match args
        .default_expiration_days
        .or(file.default_expiration_days)
    {
        Some(days) => ExpirationPreset::from_days(days).ok_or_else(|| {
            anyhow!("DEFAULT_EXPIRATION_DAYS must be one of 1, 3, 7, 14, 30, got {days}")
        })?,
        None => d.default_expiration,
    };

    let theme = match args.theme {
        Some(t) => t,
        None => match file.theme.as_deref() {
            Some(name) => name.parse()?,
            None => d.theme,
        },
    };

    Ok(Config {
        account,
        api_url,
        api_key: args.api_key.or(file.api_key).filter(|k| !k.is_empty()),
        explorer_url,
        poll_interval_ms,
        request_timeout_ms,
        media_paging: args
            .media_paging
            .or(file.media_paging)
            .unwrap_or(d.media_paging),
        documents_paging: args
            .documents_paging
            .or(file.documents_paging)
            .unwrap_or(d.documents_paging),
        page_size,
        reveal_batch,
        eager_previews: args
            .eager_previews
            .or(file.eager_previews)
            .unwrap_or(d.eager_previews),
        default_expiration,
        render_fps,
        theme,
        log_file: args.log_file.or(file.log_file).unwrap_or(d.log_file),
        initial_files: args.files,
        initial_route: args.route,
    })
}

impl Config {
    /// Browser defaults; the account comes from the connected wallet.
    pub fn for_web(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            ..Self::default()
        }
    }

    pub fn poll_interval(&self) -> crate::platform::runtime::Duration {
        crate::platform::runtime::Duration::from_millis(self.poll_interval_ms)
    }

    /// Print current configuration (useful for debugging)
    pub fn log_summary(&self) {
        log::info!("shelbyx configuration:");
        log::info!("  Account: {}", self.account);
        log::info!("  API URL: {}", self.api_url);
        log::info!("  Explorer: {}", self.explorer_url);
        log::info!("  Poll Interval: {}ms", self.poll_interval_ms);
        log::info!("  Request Timeout: {}ms", self.request_timeout_ms);
        log::info!(
            "  Paging: media={} documents={} (page {}, batch {})",
            self.media_paging,
            self.documents_paging,
            self.page_size,
            self.reveal_batch
        );
        log::info!("  Eager Previews: {}", self.eager_previews);
        log::info!("  Default Expiration: {}", self.default_expiration.label());
        log::info!("  Theme: {}", self.theme);
        if self.api_key.is_some() {
            log::info!("  API Key: Configured");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(account: &str) -> CliArgs {
        CliArgs {
            account: Some(account.into()),
            ..CliArgs::default()
        }
    }

    #[test]
    fn defaults_fill_everything_but_the_account() {
        let cfg = resolve(args("0xabc"), ConfigFile::default()).unwrap();
        assert_eq!(cfg.api_url, "https://api.shelbynet.shelby.xyz");
        assert_eq!(cfg.poll_interval_ms, 5000);
        assert_eq!(cfg.media_paging, PagingPolicy::Reveal);
        assert_eq!(cfg.documents_paging, PagingPolicy::Pages);
        assert_eq!(cfg.reveal_batch, 12);
        assert_eq!(cfg.default_expiration, ExpirationPreset::OneWeek);

        let err = resolve(CliArgs::default(), ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("SHELBY_ACCOUNT"));
    }

    #[test]
    fn cli_beats_file_beats_defaults() {
        let file: ConfigFile = toml::from_str(
            r#"
            account = "0xfile"
            poll_interval_ms = 2000
            page_size = 50
            media_paging = "pages"
            "#,
        )
        .unwrap();
        let cli = CliArgs {
            page_size: Some(10),
            ..args("0xcli")
        };
        let cfg = resolve(cli, file).unwrap();
        assert_eq!(cfg.account, "0xcli");
        assert_eq!(cfg.poll_interval_ms, 2000);
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.media_paging, PagingPolicy::Pages);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let cli = CliArgs {
            poll_interval_ms: Some(500),
            ..args("0xabc")
        };
        assert!(resolve(cli, ConfigFile::default()).is_err());

        let cli = CliArgs {
            default_expiration_days: Some(2),
            ..args("0xabc")
        };
        assert!(resolve(cli, ConfigFile::default()).is_err());

        let cli = CliArgs {
            api_url: Some("ftp://nope".into()),
            ..args("0xabc")
        };
        assert!(resolve(cli, ConfigFile::default()).is_err());
    }

    #[test]
    fn unknown_file_keys_fail_loudly() {
        assert!(toml::from_str::<ConfigFile>("acount = \"typo\"").is_err());
    }

    #[test]
    fn web_defaults() {
        let cfg = Config::for_web("0xweb");
        assert_eq!(cfg.account, "0xweb");
        assert_eq!(cfg.explorer_url, "https://explorer.shelby.xyz/shelbynet");
    }
}
