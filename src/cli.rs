//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{NameSource, DEFAULT_FOLDER};

/// Download every image on a web page, each with a caption sidecar file.
#[derive(Parser, Debug)]
#[command(name = "img-harvest")]
#[command(author, version, about)]
pub struct Args {
    /// URL of the page to scrape (asked for on stdin when omitted)
    #[arg(short, long)]
    pub link: Option<String>,

    /// Folder to save images and captions into
    #[arg(short, long, default_value = DEFAULT_FOLDER)]
    pub folder: PathBuf,

    /// Where saved file names come from
    #[arg(short, long, value_enum, default_value_t = NameSource::Url)]
    pub name_from: NameSource,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_flags() {
        let args = Args::try_parse_from(["img-harvest"]).unwrap();
        assert_eq!(args.link, None);
        assert_eq!(args.folder, PathBuf::from("images"));
        assert_eq!(args.name_from, NameSource::Url);
        assert!(!args.json);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn link_and_folder_short_flags() {
        let args =
            Args::try_parse_from(["img-harvest", "-l", "https://x.test/page", "-f", "out"]).unwrap();
        assert_eq!(args.link.as_deref(), Some("https://x.test/page"));
        assert_eq!(args.folder, PathBuf::from("out"));
    }

    #[test]
    fn verbose_flag_counts() {
        let args = Args::try_parse_from(["img-harvest", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn unknown_name_source_is_rejected() {
        let err = Args::try_parse_from(["img-harvest", "--name-from", "hash"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn help_flag_exits_with_help() {
        let err = Args::try_parse_from(["img-harvest", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
