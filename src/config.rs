use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CacheWindows, DEFAULT_GC_MS, DEFAULT_STALE_MS};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the catalog backend, e.g. "https://api.example.com/v1/"
  pub base_url: String,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./katalog.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/katalog/config.yaml
  /// 4. ~/.config/katalog/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/katalog/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("katalog.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("katalog").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the API bearer token from environment variables.
  ///
  /// Checks KATALOG_API_TOKEN first, then CATALOG_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("KATALOG_API_TOKEN")
      .or_else(|_| std::env::var("CATALOG_API_TOKEN"))
      .map_err(|_| {
        eyre!(
          "API token not found. Set KATALOG_API_TOKEN or CATALOG_API_TOKEN environment variable."
        )
      })
  }

  /// Cache windows with environment overrides.
  ///
  /// KATALOG_CACHE_STALE_MS and KATALOG_CACHE_GC_MS override the 5/10
  /// minute defaults; invalid or non-positive values fall back silently.
  pub fn cache_windows() -> CacheWindows {
    CacheWindows {
      stale_after: window_from_env(
        std::env::var("KATALOG_CACHE_STALE_MS").ok().as_deref(),
        Duration::from_millis(DEFAULT_STALE_MS),
      ),
      gc_after: window_from_env(
        std::env::var("KATALOG_CACHE_GC_MS").ok().as_deref(),
        Duration::from_millis(DEFAULT_GC_MS),
      ),
    }
  }
}

/// Parse a millisecond window override; anything unparsable or
/// non-positive falls back.
fn window_from_env(raw: Option<&str>, fallback: Duration) -> Duration {
  match raw.and_then(|s| s.trim().parse::<i64>().ok()) {
    Some(ms) if ms > 0 => Duration::from_millis(ms as u64),
    _ => fallback,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const FALLBACK: Duration = Duration::from_millis(DEFAULT_STALE_MS);

  #[test]
  fn valid_override_is_used() {
    assert_eq!(
      window_from_env(Some("60000"), FALLBACK),
      Duration::from_millis(60000)
    );
  }

  #[test]
  fn absent_override_falls_back() {
    assert_eq!(window_from_env(None, FALLBACK), FALLBACK);
  }

  #[test]
  fn unparsable_override_falls_back() {
    assert_eq!(window_from_env(Some("abc"), FALLBACK), FALLBACK);
    assert_eq!(window_from_env(Some(""), FALLBACK), FALLBACK);
  }

  #[test]
  fn non_positive_override_falls_back() {
    assert_eq!(window_from_env(Some("0"), FALLBACK), FALLBACK);
    assert_eq!(window_from_env(Some("-500"), FALLBACK), FALLBACK);
  }
}
