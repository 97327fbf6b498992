use clap::Parser;
use std::path::PathBuf;

/// git-push-preview: review everything an unpushed branch would send before pushing it
#[derive(Parser, Debug)]
#[command(
    name = "git-push-preview",
    about,
    long_about = None,
    disable_version_flag = true
)]
pub struct Cli {
    /// remote to compare against when the branch has no upstream (default: first remote)
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// print the unpushed commits and their change trees as JSON and exit
    #[arg(long)]
    pub json: bool,

    /// print git commands as they run
    #[arg(short, long)]
    pub verbose: bool,

    /// run as if started in PATH
    #[arg(short = 'C', long = "directory", value_name = "PATH", default_value = ".")]
    pub directory: PathBuf,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
