use crate::changeset::{Commit, FileChange, FileStatus};
use chrono::{DateTime, FixedOffset};
use std::collections::HashSet;
use thiserror::Error;

// delimiters emitted by `git log -z --name-status --parents`
const COMMIT_SEPARATOR: &str = "\0\0";
const FILELESS_COMMIT_BOUNDARY: &str = "\n\0commit ";
const BLOCK_SEPARATOR: &str = "\n\n";
const FIELD_SEPARATOR: char = '\0';

const MESSAGE_INDENT: usize = 4;
const GIT_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed log entry: missing commit line")]
    MissingCommitLine,

    #[error("commit {hash}: missing author")]
    MissingAuthor { hash: String },

    #[error("commit {hash}: missing date")]
    MissingDate { hash: String },

    #[error("commit {hash}: unrecognised date '{value}'")]
    InvalidDate { hash: String, value: String },

    #[error("commit {hash}: unknown file status '{status}'")]
    UnknownStatus { hash: String, status: String },

    #[error("commit {hash}: file record with status '{status}' has no path")]
    MissingPath { hash: String, status: char },

    #[error("commit {hash}: path '{path}' listed more than once")]
    DuplicatePath { hash: String, path: String },
}

/// parse the output of `git log -z --name-status --parents` into commits,
/// in the order git emitted them
pub fn parse_log(text: &str) -> Result<Vec<Commit>, ParseError> {
    split_chunks(text).into_iter().map(parse_commit).collect()
}

/// split the log into one chunk per commit
///
/// commits with file changes end in a NUL terminated record followed by the
/// NUL separator, commits without files end directly after the message
fn split_chunks(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();

    for chunk in text.split(COMMIT_SEPARATOR) {
        let mut rest = chunk;
        while let Some(pos) = rest.find(FILELESS_COMMIT_BOUNDARY) {
            chunks.push(&rest[..pos]);
            rest = &rest[pos + 2..];
        }
        chunks.push(rest);
    }

    chunks
        .into_iter()
        .map(|chunk| chunk.trim_matches(FIELD_SEPARATOR).trim_start())
        .filter(|chunk| !chunk.trim().is_empty())
        .collect()
}

fn parse_commit(chunk: &str) -> Result<Commit, ParseError> {
    let (header, body) = chunk.split_once(BLOCK_SEPARATOR).unwrap_or((chunk, ""));

    let (hash, parent_hash) = parse_commit_line(header)?;
    let author = header_field(header, "Author:").ok_or_else(|| ParseError::MissingAuthor {
        hash: hash.clone(),
    })?;
    let date_value = header_field(header, "Date:").ok_or_else(|| ParseError::MissingDate {
        hash: hash.clone(),
    })?;
    let date = parse_date(date_value).ok_or_else(|| ParseError::InvalidDate {
        hash: hash.clone(),
        value: date_value.to_string(),
    })?;

    // the file list is the last block, unless it is indented message text
    let mut blocks: Vec<&str> = body.split(BLOCK_SEPARATOR).collect();
    let file_block = match blocks.last() {
        Some(last) if is_file_block(last) => blocks.pop(),
        _ => None,
    };

    let message = parse_message(&blocks.join(BLOCK_SEPARATOR));
    let files = match file_block {
        Some(block) => parse_files(block, &hash, parent_hash.as_deref())?,
        None => Vec::new(),
    };

    Ok(Commit {
        hash,
        parent_hash,
        author: author.to_string(),
        date,
        message,
        files,
    })
}

/// `commit <hash> [<parent> ...] [(decorations)]`, only the first parent is kept
fn parse_commit_line(header: &str) -> Result<(String, Option<String>), ParseError> {
    let line = header
        .lines()
        .find_map(|line| line.strip_prefix("commit "))
        .ok_or(ParseError::MissingCommitLine)?;

    let mut ids = line
        .split_whitespace()
        .take_while(|id| !id.starts_with('('));
    let hash = ids.next().ok_or(ParseError::MissingCommitLine)?;
    let parent_hash = ids.next();

    Ok((hash.to_string(), parent_hash.map(str::to_string)))
}

fn header_field<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .lines()
        .find_map(|line| line.strip_prefix(name))
        .map(str::trim)
}

fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, GIT_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}

fn is_file_block(block: &str) -> bool {
    !block.is_empty() && !block.starts_with(' ')
}

/// strip the indentation git adds to every message line
fn parse_message(block: &str) -> String {
    block
        .lines()
        .map(|line| {
            let indent = line.len() - line.trim_start_matches(' ').len();
            &line[indent.min(MESSAGE_INDENT)..]
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// status tokens are a status letter, optionally followed by a similarity score (`R100`)
fn parse_status(token: &str) -> Option<FileStatus> {
    let mut chars = token.chars();
    let status = FileStatus::from_code(chars.next()?)?;
    chars.all(|c| c.is_ascii_digit()).then_some(status)
}

fn parse_files(
    block: &str,
    hash: &str,
    parent_hash: Option<&str>,
) -> Result<Vec<FileChange>, ParseError> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    let mut fields = block.split(FIELD_SEPARATOR).filter(|field| !field.is_empty());

    while let Some(token) = fields.next() {
        let status = parse_status(token).ok_or_else(|| ParseError::UnknownStatus {
            hash: hash.to_string(),
            status: token.to_string(),
        })?;
        let missing_path = || ParseError::MissingPath {
            hash: hash.to_string(),
            status: status.code(),
        };

        let (old_path, path) = if status.has_source_path() {
            let old_path = fields.next().ok_or_else(missing_path)?;
            let path = fields.next().ok_or_else(missing_path)?;
            (Some(old_path.to_string()), path)
        } else {
            (None, fields.next().ok_or_else(missing_path)?)
        };

        if !seen.insert(path) {
            return Err(ParseError::DuplicatePath {
                hash: hash.to_string(),
                path: path.to_string(),
            });
        }

        files.push(FileChange {
            status,
            path: path.to_string(),
            old_path,
            hash: hash.to_string(),
            parent_hash: parent_hash.map(str::to_string),
        });
    }

    Ok(files)
}
