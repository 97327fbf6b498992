use crate::changeset::{Commit, CommitEntry, FileChange, PendingCommit};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// roll every unpushed commit up into one synthetic commit
///
/// `commits` must be newest first, as `git log` emits them. each path keeps
/// the change from its newest commit, but its `parent_hash` ends up as the
/// parent of the oldest commit touching it, so diffing against it shows the
/// whole pending range rather than the latest edit only.
pub fn pending_commit(commits: &[Commit], branch: &str, remote: &str) -> PendingCommit {
    let mut files: Vec<FileChange> = Vec::new();
    let mut index_by_path: HashMap<&str, usize> = HashMap::new();

    for commit in commits {
        for file in &commit.files {
            match index_by_path.entry(&file.path) {
                Entry::Occupied(entry) => {
                    files[*entry.get()].parent_hash.clone_from(&file.parent_hash);
                }
                Entry::Vacant(entry) => {
                    entry.insert(files.len());
                    files.push(file.clone());
                }
            }
        }
    }

    PendingCommit {
        message: format!("{branch} → {remote} : {branch}"),
        files,
    }
}

/// the review list: the pending commit first, then every commit in log order
pub fn review_entries(commits: Vec<Commit>, branch: &str, remote: &str) -> Vec<CommitEntry> {
    let pending = pending_commit(&commits, branch, remote);
    std::iter::once(CommitEntry::Pending(pending))
        .chain(commits.into_iter().map(CommitEntry::Commit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::FileStatus;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    fn commit(hash: &str, parent: Option<&str>, files: &[(FileStatus, &str)]) -> Commit {
        Commit {
            hash: hash.to_string(),
            parent_hash: parent.map(str::to_string),
            author: "Test User <test@example.com>".to_string(),
            date: DateTime::parse_from_rfc3339("2026-10-15T10:24:31+02:00").unwrap(),
            message: format!("commit {hash}"),
            files: files
                .iter()
                .map(|(status, path)| FileChange {
                    status: *status,
                    path: path.to_string(),
                    old_path: None,
                    hash: hash.to_string(),
                    parent_hash: parent.map(str::to_string),
                })
                .collect(),
        }
    }

    #[test]
    fn test_oldest_parent_wins() {
        let commits = vec![
            commit("c1", Some("p1"), &[(FileStatus::Modified, "a")]),
            commit(
                "c2",
                Some("p2"),
                &[(FileStatus::Modified, "a"), (FileStatus::Added, "b")],
            ),
        ];

        let pending = pending_commit(&commits, "main", "origin");

        let summary: Vec<(&str, Option<&str>)> = pending
            .files
            .iter()
            .map(|f| (f.path.as_str(), f.parent_hash.as_deref()))
            .collect();
        assert_eq!(summary, [("a", Some("p2")), ("b", Some("p2"))]);
    }

    #[test]
    fn test_status_and_hash_stay_from_newest() {
        let commits = vec![
            commit("c1", Some("c2"), &[(FileStatus::Modified, "a")]),
            commit("c2", Some("c3"), &[(FileStatus::Modified, "a")]),
            commit("c3", Some("base"), &[(FileStatus::Added, "a")]),
        ];

        let pending = pending_commit(&commits, "main", "origin");

        assert_eq!(pending.files.len(), 1);
        let file = &pending.files[0];
        assert_eq!(file.status, FileStatus::Modified);
        assert_eq!(file.hash, "c1");
        assert_eq!(file.parent_hash.as_deref(), Some("base"));
    }

    #[test]
    fn test_root_commit_clears_baseline() {
        let commits = vec![
            commit("c1", Some("c2"), &[(FileStatus::Modified, "a")]),
            commit("c2", None, &[(FileStatus::Added, "a")]),
        ];

        let pending = pending_commit(&commits, "main", "origin");

        assert_eq!(pending.files[0].parent_hash, None);
    }

    #[test]
    fn test_first_encounter_order() {
        let commits = vec![
            commit("c1", Some("c2"), &[(FileStatus::Modified, "z"), (FileStatus::Added, "m")]),
            commit("c2", Some("c3"), &[(FileStatus::Added, "a"), (FileStatus::Added, "z")]),
        ];

        let pending = pending_commit(&commits, "main", "origin");

        let paths: Vec<&str> = pending.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["z", "m", "a"]);
    }

    #[test]
    fn test_input_commits_untouched() {
        let commits = vec![
            commit("c1", Some("p1"), &[(FileStatus::Modified, "a")]),
            commit("c2", Some("p2"), &[(FileStatus::Modified, "a")]),
        ];

        let _ = pending_commit(&commits, "main", "origin");

        assert_eq!(commits[0].files[0].parent_hash.as_deref(), Some("p1"));
    }

    #[test]
    fn test_empty_commit_list() {
        let pending = pending_commit(&[], "main", "origin");

        assert!(pending.files.is_empty());
        assert_eq!(pending.message, "main → origin : main");
    }

    #[test]
    fn test_review_entries_prepend_pending() {
        let commits = vec![
            commit("c1", Some("c2"), &[(FileStatus::Modified, "a")]),
            commit("c2", Some("c3"), &[(FileStatus::Deleted, "b")]),
        ];

        let entries = review_entries(commits.clone(), "feature", "upstream");

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message(), "feature → upstream : feature");
        assert_eq!(entries[0].files().len(), 2);
        assert_eq!(entries[1], CommitEntry::Commit(commits[0].clone()));
        assert_eq!(entries[2], CommitEntry::Commit(commits[1].clone()));
    }
}
