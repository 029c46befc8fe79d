pub mod save_type;

use clap::{arg, Parser};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use dotenv::dotenv;
use std::path::PathBuf;

pub use save_type::SaveType;

#[derive(Debug, Clone, Parser, Default)]
pub struct Config {
    /// Your `FANBOXSESSID` cookie
    #[clap(env = "FANBOXSESSID")]
    session: String,
    /// Directory to save downloaded assets
    #[arg(short, long, default_value = "./images", env = "OUTPUT")]
    output: PathBuf,
    /// Which creator lists to archive
    #[arg(short, long, default_value = "all")]
    save: SaveType,
    /// Creator IDs to archive, skipping the supporting/following lookup
    #[arg(short, long, num_args = 0..)]
    creator: Vec<String>,
    /// Creator IDs to exclude from the supporting/following lists
    #[arg(short, long, num_args = 0..)]
    ignore: Vec<String>,
    /// Check every post instead of stopping at the first already
    /// downloaded asset (the stop relies on newest-first post ordering)
    #[arg(long = "all")]
    check_all_posts: bool,
    /// Log what would be downloaded without writing anything
    #[arg(long)]
    dry_run: bool,
    /// Do not download file assets
    #[arg(long)]
    skip_files: bool,
    /// Do not download image assets
    #[arg(long)]
    skip_images: bool,
    /// Log and continue on page or post failures instead of aborting
    #[arg(long)]
    skip_on_error: bool,
    /// Save each post into its own directory
    #[arg(long)]
    dir_by_post: bool,
    /// Group each post under a directory named after its plan fee
    #[arg(long)]
    dir_by_plan: bool,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// Engine-facing snapshot of the decision flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadOptions {
    pub check_all_posts: bool,
    pub dry_run: bool,
    pub skip_files: bool,
    pub skip_images: bool,
    pub skip_on_error: bool,
}

impl Config {
    /// Parse the configuration from the environment and command line arguments
    pub fn parse() -> Self {
        dotenv().ok();
        <Self as Parser>::parse()
    }
    /// Create a logger with the configured verbosity level
    pub fn init_logger(&self) {
        env_logger::Builder::new()
            .filter_level(self.verbose.log_level_filter())
            .format_target(false)
            .init();
    }
    /// Get the session cookie
    pub fn session(&self) -> String {
        if self.session.starts_with("FANBOXSESSID=") {
            self.session.clone()
        } else {
            format!("FANBOXSESSID={}", self.session)
        }
    }
    pub const fn output(&self) -> &PathBuf {
        &self.output
    }
    pub fn accepts(&self) -> SaveType {
        self.save
    }
    pub fn creators(&self) -> &[String] {
        &self.creator
    }
    pub fn ignores(&self, creator_id: &str) -> bool {
        self.ignore.iter().any(|id| id == creator_id)
    }
    pub const fn dir_by_post(&self) -> bool {
        self.dir_by_post
    }
    pub const fn dir_by_plan(&self) -> bool {
        self.dir_by_plan
    }
    pub const fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            check_all_posts: self.check_all_posts,
            dry_run: self.dry_run,
            skip_files: self.skip_files,
            skip_images: self.skip_images,
            skip_on_error: self.skip_on_error,
        }
    }
}

#[cfg(test)]
impl Config {
    pub(crate) fn for_tests() -> Self {
        Self {
            session: "FANBOXSESSID=test".to_string(),
            save: SaveType::All,
            ..Self::default()
        }
    }
    pub(crate) fn with_creators(mut self, ids: &[&str]) -> Self {
        self.creator = ids.iter().map(|id| id.to_string()).collect();
        self
    }
    pub(crate) fn with_ignore(mut self, ids: &[&str]) -> Self {
        self.ignore = ids.iter().map(|id| id.to_string()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_gains_cookie_prefix() {
        let config = Config {
            session: "abc123".to_string(),
            ..Config::default()
        };
        assert_eq!(config.session(), "FANBOXSESSID=abc123");
    }

    #[test]
    fn prefixed_session_is_kept_as_is() {
        let config = Config {
            session: "FANBOXSESSID=abc123".to_string(),
            ..Config::default()
        };
        assert_eq!(config.session(), "FANBOXSESSID=abc123");
    }

    #[test]
    fn ignore_list_matches_exact_ids() {
        let config = Config::for_tests().with_ignore(&["alice"]);
        assert!(config.ignores("alice"));
        assert!(!config.ignores("alicia"));
    }
}
