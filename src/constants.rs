// git
pub const GIT_TIMEOUT_SECS: u64 = 30;
pub const SHORT_HASH_LENGTH: usize = 7;

// ui
pub const MAX_TREE_FILES: usize = 200;
pub const MAX_COMMIT_SUMMARY_LENGTH: usize = 72;
