mod aggregate;
mod changeset;
mod cli;
mod constants;
mod context;
mod git;
mod log;
mod render;
mod tree;
mod ui;

use crate::changeset::{CommitEntry, FileChange};
use crate::cli::Cli;
use crate::context::ReviewSession;
use crate::git::GitClient;
use crate::tree::TreeNode;
use anyhow::{Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::IsTerminal;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

/// returns whether the branch was pushed
fn run() -> Result<bool> {
    let args = Cli::parse_args();
    ui::set_verbose(args.verbose);

    // sanity checks
    if !args.json && (!std::io::stdin().is_terminal() || !std::io::stdout().is_terminal()) {
        bail!("interactive terminal required (use --json for non-interactive output)");
    }
    git::sanity_check(&args.directory)?;

    let client = GitClient::open(&args.directory)?;
    let session = load_session(&client, args.remote.as_deref(), !args.json)?;

    if args.json {
        print_json(&session)?;
        return Ok(true);
    }

    if session.commit_count() == 0 {
        bail!("no unpushed commits found");
    }

    review(&client, session)
}

/// collect and parse the unpushed commits, with the pending entry prepended
fn load_session(
    client: &GitClient,
    remote_override: Option<&str>,
    show_spinner: bool,
) -> Result<ReviewSession> {
    let spinner = if show_spinner {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .expect("invalid spinner template"),
        );
        spinner.set_message("collecting unpushed commits...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        spinner
    } else {
        ProgressBar::hidden()
    };

    let collected = collect_log(client, remote_override);
    spinner.finish_and_clear();
    let (branch, remote, log_text) = collected?;

    let commits = log::parse_log(&log_text)?;
    debug!("parsed {} unpushed commit(s)", commits.len());

    let entries = aggregate::review_entries(commits, &branch, &remote);
    Ok(ReviewSession::new(
        client.workspace_name(),
        branch,
        remote,
        entries,
    ))
}

fn collect_log(client: &GitClient, remote_override: Option<&str>) -> Result<(String, String, String)> {
    let remote = match remote_override {
        Some(remote) => remote.to_string(),
        None => client.remote_name()?,
    };
    let branch = client.branch_name()?;
    let log_text = client.unpushed_log(&branch, &remote)?;
    Ok((branch, remote, log_text))
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    entry: &'a CommitEntry,
    tree: TreeNode,
}

fn print_json(session: &ReviewSession) -> Result<()> {
    let mut entries = Vec::with_capacity(session.entries.len());
    for entry in &session.entries {
        entries.push(JsonEntry {
            entry,
            tree: session.tree_for(entry)?,
        });
    }

    let json = serde_json::to_string_pretty(&entries)?;
    info!(json);
    Ok(())
}

/// display the selected entry and handle the user's choices until push or cancel
fn review(client: &GitClient, mut session: ReviewSession) -> Result<bool> {
    let mut redraw = true;

    loop {
        if redraw {
            display_selection(&session)?;
        }
        redraw = true;

        let options = ["YES", "no", "up", "down", "open diff"];
        match ui::prompt(&options)? {
            'y' => {
                status!("pushing...");
                client.push(&session.branch, &session.remote)?;
                return Ok(true);
            }
            'n' => {
                status!("push cancelled");
                return Ok(false);
            }
            'u' => {
                if !session.select_previous() {
                    redraw = false;
                }
            }
            'd' => {
                if !session.select_next() {
                    redraw = false;
                }
            }
            'o' => {
                open_diff(client, &session)?;
                redraw = false;
            }
            _ => redraw = false,
        }
    }
}

fn display_selection(session: &ReviewSession) -> Result<()> {
    let Some(entry) = session.selected_entry() else {
        return Ok(());
    };

    info!();
    status!("commits:");
    for line in render::entry_lines(&session.entries, session.selected()) {
        info!(line);
    }

    info!();
    for line in render::commit_info_lines(entry) {
        info!(line);
    }

    // tree errors abort the review
    let tree = session.tree_for(entry)?;
    info!();
    let file_count = entry.files().len();
    status!(
        "files ({} {}):",
        file_count,
        if file_count == 1 { "file" } else { "files" }
    );
    for line in render::tree_lines(&tree) {
        info!(line);
    }
    info!();

    Ok(())
}

fn open_diff(client: &GitClient, session: &ReviewSession) -> Result<()> {
    status!("file to diff (number or path):");
    let Some(query) = ui::read_line("? ")? else {
        return Ok(());
    };
    if query.is_empty() {
        return Ok(());
    }

    match session.find_file(&query)? {
        Some(change) => show_diff(client, &change),
        None => {
            warning!("no changed file matches '{}'", query);
            Ok(())
        }
    }
}

fn show_diff(client: &GitClient, change: &FileChange) -> Result<()> {
    // missing content on either side (added, deleted, root commit) reads as empty
    let old = change
        .parent_hash
        .as_deref()
        .map(|parent| client.file_at_revision(parent, change.baseline_path()))
        .unwrap_or_default();
    let new = client.file_at_revision(&change.hash, &change.path);

    info!();
    for line in render::diff_lines(&old, &new, change.baseline_path(), &change.path)? {
        info!(line);
    }
    info!();

    Ok(())
}
