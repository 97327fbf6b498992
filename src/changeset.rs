use chrono::{DateTime, FixedOffset};
use serde::{Serialize, Serializer};

/// change status of a single file, as reported by `git log --name-status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    Added,
    Copied,
    Deleted,
    Modified,
    Renamed,
    TypeChanged,
    Unmerged,
    Unknown,
    BrokenPairing,
}

impl FileStatus {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(Self::Added),
            'C' => Some(Self::Copied),
            'D' => Some(Self::Deleted),
            'M' => Some(Self::Modified),
            'R' => Some(Self::Renamed),
            'T' => Some(Self::TypeChanged),
            'U' => Some(Self::Unmerged),
            'X' => Some(Self::Unknown),
            'B' => Some(Self::BrokenPairing),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Self::Added => 'A',
            Self::Copied => 'C',
            Self::Deleted => 'D',
            Self::Modified => 'M',
            Self::Renamed => 'R',
            Self::TypeChanged => 'T',
            Self::Unmerged => 'U',
            Self::Unknown => 'X',
            Self::BrokenPairing => 'B',
        }
    }

    /// renames and copies are followed by two paths (source, destination)
    pub fn has_source_path(self) -> bool {
        matches!(self, Self::Renamed | Self::Copied)
    }
}

impl Serialize for FileStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.code())
    }
}

/// represents a single file change within a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub status: FileStatus,
    pub path: String,
    pub old_path: Option<String>, // set for renames and copies
    pub hash: String,
    pub parent_hash: Option<String>, // diff baseline, None for a root commit
}

impl FileChange {
    /// path of this file at `parent_hash`
    pub fn baseline_path(&self) -> &str {
        self.old_path.as_deref().unwrap_or(&self.path)
    }
}

/// a real commit parsed from the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub hash: String,
    pub parent_hash: Option<String>, // first parent only
    pub author: String,
    pub date: DateTime<FixedOffset>,
    pub message: String,
    pub files: Vec<FileChange>,
}

impl Commit {
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// synthetic commit rolling up every unpushed change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingCommit {
    pub message: String,
    pub files: Vec<FileChange>,
}

/// one line of the review list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CommitEntry {
    Pending(PendingCommit),
    Commit(Commit),
}

impl CommitEntry {
    pub fn message(&self) -> &str {
        match self {
            Self::Pending(pending) => &pending.message,
            Self::Commit(commit) => commit.summary(),
        }
    }

    pub fn files(&self) -> &[FileChange] {
        match self {
            Self::Pending(pending) => &pending.files,
            Self::Commit(commit) => &commit.files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for code in "ACDMRTUXB".chars() {
            let status = FileStatus::from_code(code).expect("canonical code");
            assert_eq!(status.code(), code);
        }
        assert_eq!(FileStatus::from_code('Z'), None);
        assert_eq!(FileStatus::from_code('a'), None);
    }

    #[test]
    fn test_baseline_path_prefers_old_path() {
        let mut change = FileChange {
            status: FileStatus::Renamed,
            path: "new.rs".to_string(),
            old_path: Some("old.rs".to_string()),
            hash: "b".to_string(),
            parent_hash: Some("a".to_string()),
        };
        assert_eq!(change.baseline_path(), "old.rs");

        change.old_path = None;
        assert_eq!(change.baseline_path(), "new.rs");
    }

    #[test]
    fn test_status_serializes_as_code() {
        let json = serde_json::to_string(&FileStatus::TypeChanged).unwrap();
        assert_eq!(json, "\"T\"");
    }
}
