use crate::changeset::{CommitEntry, FileChange};
use crate::tree::{TreeError, TreeNode, build_tree};

/// state of one interactive review, from loading the log until push or cancel
pub struct ReviewSession {
    /// root name of every change tree
    pub workspace_name: String,

    /// branch being pushed and the remote it is compared against
    pub branch: String,
    pub remote: String,

    /// pending entry first, then the unpushed commits newest first
    pub entries: Vec<CommitEntry>,

    /// index into `entries`
    selected: usize,
}

impl ReviewSession {
    pub fn new(
        workspace_name: String,
        branch: String,
        remote: String,
        entries: Vec<CommitEntry>,
    ) -> Self {
        Self {
            workspace_name,
            branch,
            remote,
            entries,
            selected: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// number of real commits, excluding the pending entry
    pub fn commit_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, CommitEntry::Commit(_)))
            .count()
    }

    pub fn selected_entry(&self) -> Option<&CommitEntry> {
        self.entries.get(self.selected)
    }

    /// returns false when already at the top
    pub fn select_previous(&mut self) -> bool {
        if self.selected == 0 {
            return false;
        }
        self.selected -= 1;
        true
    }

    /// returns false when already at the bottom
    pub fn select_next(&mut self) -> bool {
        if self.selected + 1 >= self.entries.len() {
            return false;
        }
        self.selected += 1;
        true
    }

    pub fn tree_for(&self, entry: &CommitEntry) -> Result<TreeNode, TreeError> {
        build_tree(&self.workspace_name, entry.files())
    }

    /// change tree of the selected entry, rebuilt on every call
    pub fn selected_tree(&self) -> Result<TreeNode, TreeError> {
        match self.selected_entry() {
            Some(entry) => self.tree_for(entry),
            None => Ok(TreeNode::folder(self.workspace_name.as_str())),
        }
    }

    /// resolve a file of the selected entry by its 1-based tree position or its path
    pub fn find_file(&self, query: &str) -> Result<Option<FileChange>, TreeError> {
        let query = query.trim();
        let tree = self.selected_tree()?;
        let files = tree.files();

        let by_number = query
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| files.get(index));
        if let Some(change) = by_number {
            return Ok(Some((*change).clone()));
        }

        Ok(files
            .into_iter()
            .find(|change| change.path == query)
            .cloned())
    }
}
