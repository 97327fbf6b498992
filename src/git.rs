use crate::constants::GIT_TIMEOUT_SECS;
use crate::{debug, warning};
use anyhow::{Context, Result, anyhow, bail};
use git2::{BranchType, Repository, RepositoryState};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

// pin the log layout regardless of user config (log.date, log.decorate, ...)
const LOG_FORMAT_ARGS: [&str; 7] = [
    "-z",
    "--name-status",
    "--parents",
    "--pretty=medium",
    "--date=default",
    "--no-decorate",
    "--no-color",
];

/// sanity check that we're in a git repository and in a good state
pub fn sanity_check(path: &Path) -> Result<()> {
    // check we're in a git repository (can be anywhere within the repo)
    let repo = Repository::discover(path)
        .map_err(|e| anyhow!("not in a git repository: {}", e.message()))?;

    // check we're not in the middle of a git operation
    if repo.state() != RepositoryState::Clean {
        bail!("repository is in the middle of an operation (merge, rebase, etc)");
    }

    // check we're not on a detached HEAD
    if repo.head_detached().unwrap_or(false) {
        bail!("repository is in detached HEAD state");
    }

    Ok(())
}

/// typed access to the repository, one method per query
pub struct GitClient {
    repo: Repository,
    workdir: PathBuf,
}

impl GitClient {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).context("failed to open git repository")?;
        let workdir = repo
            .workdir()
            .context("bare repositories are not supported")?
            .to_path_buf();
        Ok(Self { repo, workdir })
    }

    /// name of the working directory, used as the root of the change tree
    pub fn workspace_name(&self) -> String {
        self.workdir
            .file_name()
            .map_or_else(|| ".".to_string(), |name| name.to_string_lossy().to_string())
    }

    /// first remote listed by `git remote`
    pub fn remote_name(&self) -> Result<String> {
        let output = self.run(&["remote"])?;
        output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .context("no git remote configured")
    }

    pub fn branch_name(&self) -> Result<String> {
        let output = self.run(&["branch", "--show-current"])?;
        let branch = output.trim();
        if branch.is_empty() {
            bail!("not on a branch");
        }
        Ok(branch.to_string())
    }

    pub fn has_upstream(&self, branch: &str) -> bool {
        self.repo
            .find_branch(branch, BranchType::Local)
            .and_then(|branch| branch.upstream())
            .is_ok()
    }

    /// raw `git log` dump of every commit not yet on the remote
    ///
    /// compares against the upstream when the branch tracks one, otherwise
    /// against everything known on `remote`
    pub fn unpushed_log(&self, branch: &str, remote: &str) -> Result<String> {
        let remotes = format!("--remotes={remote}");
        let mut args = vec!["log"];
        if self.has_upstream(branch) {
            args.push("@{u}..");
        } else {
            args.extend(["HEAD", "--not", remotes.as_str()]);
        }
        args.extend(LOG_FORMAT_ARGS);
        self.run(&args)
    }

    /// contents of `path` at `revision`
    ///
    /// returns empty content when the file does not exist there (added or
    /// deleted files) or cannot be read at all
    pub fn file_at_revision(&self, revision: &str, path: &str) -> Vec<u8> {
        self.repo
            .revparse_single(&format!("{revision}:{path}"))
            .ok()
            .and_then(|object| object.into_blob().ok())
            .map(|blob| blob.content().to_vec())
            .unwrap_or_default()
    }

    /// push the current branch
    ///
    /// uses the git binary so credential helpers and hooks (pre-push, etc.)
    /// work as expected. a branch without an upstream is published to
    /// `remote` and starts tracking it
    pub fn push(&self, branch: &str, remote: &str) -> Result<()> {
        let mut args = vec!["push"];
        if !self.has_upstream(branch) {
            args.extend(["--set-upstream", remote, branch]);
        }

        debug!("git {}", args.join(" "));
        let status = Command::new("git")
            .args(&args)
            .current_dir(&self.workdir)
            .status()
            .context("failed to run git push")?;

        if !status.success() {
            bail!("git push failed with exit code: {status}");
        }
        Ok(())
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        run_git(&self.workdir, args)
    }
}

/// run git, returning stdout untouched (NULs and trailing whitespace intact)
///
/// a non-zero exit fails with the combined stdout and stderr
fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let command_line = format!("git {}", args.join(" "));
    debug!("{}", command_line);

    let mut child = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn `{command_line}`"))?;

    let mut stdout = child.stdout.take().context("failed to capture git stdout")?;
    let mut stderr = child.stderr.take().context("failed to capture git stderr")?;

    // drain both pipes while waiting, large logs would otherwise fill the pipe
    thread::scope(|scope| {
        let stdout_reader = scope.spawn(move || {
            let mut data = Vec::new();
            stdout.read_to_end(&mut data).map(|_| data)
        });
        let stderr_reader = scope.spawn(move || {
            let mut data = Vec::new();
            stderr.read_to_end(&mut data).map(|_| data)
        });

        let status = match child.wait_timeout(Duration::from_secs(GIT_TIMEOUT_SECS)) {
            Ok(Some(status)) => status,
            Ok(None) => {
                if let Err(e) = child.kill() {
                    warning!("failed to kill git process: {}", e);
                }
                if let Err(e) = child.wait() {
                    warning!("failed to reap git process: {}", e);
                }
                bail!("`{command_line}` took longer than {GIT_TIMEOUT_SECS}s");
            }
            Err(e) => bail!("failed to wait for `{command_line}`: {e}"),
        };

        let stdout_data = stdout_reader
            .join()
            .map_err(|_| anyhow!("git stdout reader panicked"))?
            .context("failed to read git stdout")?;
        let stderr_data = stderr_reader
            .join()
            .map_err(|_| anyhow!("git stderr reader panicked"))?
            .context("failed to read git stderr")?;

        if !status.success() {
            let mut combined = String::from_utf8_lossy(&stdout_data).to_string();
            combined.push_str(&String::from_utf8_lossy(&stderr_data));
            bail!("`{command_line}` failed ({status}):\n{}", combined.trim());
        }

        Ok(String::from_utf8_lossy(&stdout_data).to_string())
    })
}
