use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::cli::Args;

pub const DEFAULT_FOLDER: &str = "images";
pub const USER_AGENT: &str = concat!("img-harvest/", env!("CARGO_PKG_VERSION"));
pub const INSECURE_SSL_ENV: &str = "IMG_HARVEST_INSECURE_SSL";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a saved image's file name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NameSource {
    /// Last segment of the image URL path
    Url,
    /// The resolved caption, with a `.jpg` extension
    Caption,
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub directory: PathBuf,
    pub name_from: NameSource,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub insecure_ssl: bool,
}

impl ScrapeConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            name_from: NameSource::Url,
            user_agent: USER_AGENT.to_string(),
            connect_timeout: CONNECT_TIMEOUT,
            timeout: REQUEST_TIMEOUT,
            insecure_ssl: flag_enabled(std::env::var(INSECURE_SSL_ENV).ok().as_deref()),
        }
    }

    pub fn from_args(args: &Args) -> Self {
        Self {
            name_from: args.name_from,
            ..Self::new(&args.folder)
        }
    }
}

fn flag_enabled(value: Option<&str>) -> bool {
    value == Some("1")
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_name_from_url() {
        let config = ScrapeConfig::new("out");
        assert_eq!(config.directory, PathBuf::from("out"));
        assert_eq!(config.name_from, NameSource::Url);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert!(config.user_agent.starts_with("img-harvest/"));
    }

    #[test]
    fn from_args_carries_folder_and_naming() {
        let args = Args::try_parse_from([
            "img-harvest",
            "--link",
            "https://x.test/page",
            "--folder",
            "pics",
            "--name-from",
            "caption",
        ])
        .unwrap();
        let config = ScrapeConfig::from_args(&args);
        assert_eq!(config.directory, PathBuf::from("pics"));
        assert_eq!(config.name_from, NameSource::Caption);
    }

    #[test]
    fn insecure_flag_only_accepts_one() {
        assert!(flag_enabled(Some("1")));
        assert!(!flag_enabled(Some("true")));
        assert!(!flag_enabled(Some("0")));
        assert!(!flag_enabled(None));
    }
}
