use crate::changeset::{CommitEntry, FileStatus};
use crate::constants::{MAX_COMMIT_SUMMARY_LENGTH, MAX_TREE_FILES, SHORT_HASH_LENGTH};
use crate::tree::TreeNode;
use anyhow::{Context, Result};
use chrono::Local;
use colored::{ColoredString, Colorize};
use git2::Patch;
use std::path::Path;

const INDENT: &str = "  ";

fn short_hash(hash: &str) -> &str {
    hash.get(..SHORT_HASH_LENGTH).unwrap_or(hash)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn paint_status(status: FileStatus) -> ColoredString {
    let code = status.code().to_string();
    match status {
        FileStatus::Added => code.green(),
        FileStatus::Deleted => code.red(),
        FileStatus::Modified | FileStatus::TypeChanged => code.yellow(),
        FileStatus::Renamed | FileStatus::Copied => code.cyan(),
        FileStatus::Unmerged | FileStatus::Unknown | FileStatus::BrokenPairing => code.magenta(),
    }
}

/// the review list, one line per entry, with the selection marked
pub fn entry_lines(entries: &[CommitEntry], selected: usize) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let marker = if index == selected { ">" } else { " " };
            let summary = truncate(entry.message(), MAX_COMMIT_SUMMARY_LENGTH);
            let line = match entry {
                CommitEntry::Pending(_) => format!("{marker} {}", summary.bold()),
                CommitEntry::Commit(commit) => {
                    format!("{marker} {} {summary}", short_hash(&commit.hash).yellow())
                }
            };
            if index == selected {
                line.reversed().to_string()
            } else {
                line
            }
        })
        .collect()
}

/// message, author and date of a real commit
pub fn commit_info_lines(entry: &CommitEntry) -> Vec<String> {
    let CommitEntry::Commit(commit) = entry else {
        return vec!["No commit selected".dimmed().to_string()];
    };

    let date = commit.date.with_timezone(&Local);
    let mut lines = vec![
        format!("{} {}", "commit".yellow(), commit.hash.yellow()),
        format!("Author: {}", commit.author),
        format!("Date:   {}", date.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
    ];
    lines.extend(commit.message.lines().map(|line| format!("{INDENT}{line}")));
    lines
}

/// indented change tree, file leaves numbered in display order
pub fn tree_lines(root: &TreeNode) -> Vec<String> {
    let mut lines = Vec::new();
    let mut number = 0;
    push_tree_lines(root, 0, &mut number, &mut lines);

    if number > MAX_TREE_FILES {
        lines.push(format!("(+{} more)", number - MAX_TREE_FILES));
    }
    lines
}

fn push_tree_lines(node: &TreeNode, depth: usize, number: &mut usize, lines: &mut Vec<String>) {
    let indent = INDENT.repeat(depth);
    match node {
        TreeNode::Folder { name, children } => {
            if *number < MAX_TREE_FILES {
                lines.push(format!("{indent}{}", format!("{name}/").blue().bold()));
            }
            for child in children {
                push_tree_lines(child, depth + 1, number, lines);
            }
        }
        TreeNode::File { name, change } => {
            *number += 1;
            if *number > MAX_TREE_FILES {
                return;
            }
            let renamed = match &change.old_path {
                Some(old_path) => format!(" ← {old_path}").dimmed().to_string(),
                None => String::new(),
            };
            lines.push(format!(
                "{indent}{} {name} {}{renamed}",
                format!("{number:>3}").dimmed(),
                paint_status(change.status)
            ));
        }
    }
}

/// unified diff between two versions of a file
pub fn diff_lines(old: &[u8], new: &[u8], old_path: &str, new_path: &str) -> Result<Vec<String>> {
    let patch = Patch::from_buffers(
        old,
        Some(Path::new(old_path)),
        new,
        Some(Path::new(new_path)),
        None,
    )
    .context("failed to create diff")?;

    let mut lines = vec![
        format!("--- a/{old_path}").bold().to_string(),
        format!("+++ b/{new_path}").bold().to_string(),
    ];

    let delta = patch.delta();
    if delta.old_file().is_binary() || delta.new_file().is_binary() {
        lines.push("binary files differ".dimmed().to_string());
        return Ok(lines);
    }
    if patch.num_hunks() == 0 {
        lines.push("no changes".dimmed().to_string());
        return Ok(lines);
    }

    for hunk_idx in 0..patch.num_hunks() {
        let (hunk, line_count) = patch.hunk(hunk_idx).context("failed to read diff hunk")?;
        let header = String::from_utf8_lossy(hunk.header());
        lines.push(header.trim_end().cyan().to_string());

        for line_idx in 0..line_count {
            let line = patch
                .line_in_hunk(hunk_idx, line_idx)
                .context("failed to read diff line")?;
            let content = String::from_utf8_lossy(line.content());
            let content = content.trim_end_matches(['\n', '\r']);
            let text = match line.origin() {
                '+' => format!("+{content}").green().to_string(),
                '-' => format!("-{content}").red().to_string(),
                ' ' => format!(" {content}"),
                // "\ no newline at end of file" markers
                _ => content.dimmed().to_string(),
            };
            lines.push(text);
        }
    }

    Ok(lines)
}
