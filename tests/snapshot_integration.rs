//! End-to-end runs against real repositories built with git2.
//!
//! git itself is invoked through `SystemRunner`; the tree tool is replaced by a small
//! in-process renderer that lists the files of the working tree.
use anyhow::Result;
use git2::{Oid, Repository, RepositoryInitOptions, Signature};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tree_history::config::Config;
use tree_history::driver::Driver;
use tree_history::error::{CommandError, EnvironmentError, HistoryError, SnapshotError};
use tree_history::git::RestoreTarget;
use tree_history::runner::{CommandOutput, CommandRunner, SystemRunner};

/// Real git, fake tree tool
struct FixtureRunner {
    git: SystemRunner,
    repo_dir: PathBuf,
    fail_for: Option<String>,
}

impl FixtureRunner {
    fn new(repo_dir: &Path) -> Self {
        Self {
            git: SystemRunner::new(repo_dir, "fixture-tree"),
            repo_dir: repo_dir.to_path_buf(),
            fail_for: None,
        }
    }

    fn collect(dir: &Path, root: &Path, exclude: &[String], out: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let relative = path
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            let name = entry.file_name().to_string_lossy().into_owned();
            if exclude.iter().any(|e| *e == name || *e == relative) {
                continue;
            }
            if path.is_dir() {
                Self::collect(&path, root, exclude, out);
            } else {
                out.push(relative);
            }
        }
    }
}

impl CommandRunner for FixtureRunner {
    fn run_git(&self, args: &[&str]) -> Result<CommandOutput, CommandError> {
        self.git.run_git(args)
    }

    fn run_tree(&self, args: &[String]) -> Result<CommandOutput, CommandError> {
        if args.iter().any(|a| a == "--help") {
            return Ok(CommandOutput::ok("usage: fixture-tree"));
        }

        let to = args.iter().position(|a| a == "--to").expect("--to present");
        let target = PathBuf::from(&args[to + 1]);
        let exclude: Vec<String> = args[..to]
            .iter()
            .filter(|a| a.as_str() != "--exclude")
            .cloned()
            .collect();

        let file_name = target.file_name().unwrap().to_string_lossy().into_owned();
        if self.fail_for.as_deref() == Some(file_name.as_str()) {
            return Ok(CommandOutput::failed(3, "render failed"));
        }

        let mut files = Vec::new();
        Self::collect(&self.repo_dir, &self.repo_dir, &exclude, &mut files);
        files.sort();
        std::fs::write(&target, files.join("\n")).expect("write snapshot");
        Ok(CommandOutput::ok(""))
    }

    fn tree_program(&self) -> &str {
        "fixture-tree"
    }
}

/// Repository on `main` with one commit per `(file, message)`
fn init_repo(dir: &Path, commits: &[(&str, &str)]) -> Result<(Repository, Vec<Oid>)> {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = Repository::init_opts(dir, &opts)?;
    let mut oids = Vec::new();
    for (file, message) in commits {
        oids.push(commit_file(&repo, file, message)?);
    }
    Ok((repo, oids))
}

fn commit_file(repo: &Repository, file: &str, message: &str) -> Result<Oid> {
    let workdir = repo.workdir().expect("non-bare repository");
    let path = workdir.join(file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, message)?;

    let mut index = repo.index()?;
    index.add_path(Path::new(file))?;
    index.write()?;
    let tree = repo.find_tree(index.write_tree()?)?;

    let sig = Signature::now("Test", "test@example.com")?;
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit()?],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    Ok(repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)?)
}

fn config_for(dir: &Path) -> Config {
    let mut config = Config::default_for_cwd();
    config.repo_dir = dir.to_path_buf();
    config
}

fn head_state(repo: &Repository) -> Result<(Option<String>, Oid)> {
    let head = repo.head()?;
    let name = head.shorthand().map(str::to_string);
    Ok((name, head.peel_to_commit()?.id()))
}

#[test]
fn test_snapshots_every_commit_oldest_first() -> Result<()> {
    let dir = TempDir::new()?;
    let (repo, oids) = init_repo(
        dir.path(),
        &[
            ("a.txt", "Initial commit"),
            ("src/lib.rs", "Add: library/core"),
            ("b.txt", "Third"),
        ],
    )?;

    let driver = Driver::new(config_for(dir.path()), FixtureRunner::new(dir.path()));
    let summary = driver.run()?;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 3);

    let out = dir.path().join("tree");
    let first = std::fs::read_to_string(out.join("01_Initial commit.txt"))?;
    let second = std::fs::read_to_string(out.join("02_Add_ library_core.txt"))?;
    let third = std::fs::read_to_string(out.join("03_Third.txt"))?;

    assert_eq!(first, "a.txt");
    assert_eq!(second, "a.txt\nsrc/lib.rs");
    assert_eq!(third, "a.txt\nb.txt\nsrc/lib.rs");

    let (branch, head) = head_state(&repo)?;
    assert_eq!(branch.as_deref(), Some("main"));
    assert_eq!(head, *oids.last().unwrap());
    Ok(())
}

#[test]
fn test_feature_branch_is_restored_after_walking_main() -> Result<()> {
    let dir = TempDir::new()?;
    let (repo, oids) = init_repo(dir.path(), &[("a.txt", "One"), ("b.txt", "Two")])?;

    // feature = main + one extra commit, and it is the checked-out branch
    let main_tip = repo.find_commit(oids[1])?;
    repo.branch("feature", &main_tip, false)?;
    repo.set_head("refs/heads/feature")?;
    repo.checkout_head(Some(git2::build::CheckoutBuilder::new().force()))?;
    let feature_tip = commit_file(&repo, "feature.txt", "Feature work")?;

    let driver = Driver::new(config_for(dir.path()), FixtureRunner::new(dir.path()));
    let summary = driver.run()?;

    assert_eq!(summary.succeeded, 2);
    assert_eq!(
        summary.restored_to,
        RestoreTarget::Branch {
            name: "feature".to_string(),
            head: Some(feature_tip.to_string()),
        }
    );

    let (branch, head) = head_state(&repo)?;
    assert_eq!(branch.as_deref(), Some("feature"));
    assert_eq!(head, feature_tip);
    assert!(dir.path().join("feature.txt").exists());

    // main itself was never moved
    let main = repo.find_branch("main", git2::BranchType::Local)?;
    assert_eq!(main.get().target(), Some(oids[1]));
    Ok(())
}

#[test]
fn test_failed_commit_does_not_stop_the_walk() -> Result<()> {
    let dir = TempDir::new()?;
    let (repo, oids) = init_repo(
        dir.path(),
        &[("a.txt", "One"), ("b.txt", "Two"), ("c.txt", "Three")],
    )?;

    let mut runner = FixtureRunner::new(dir.path());
    runner.fail_for = Some("02_Two.txt".to_string());
    let summary = Driver::new(config_for(dir.path()), runner).run()?;

    assert_eq!(summary.succeeded, 2);
    assert!(summary.succeeded < summary.total);
    assert_eq!(summary.failed.len(), 1);
    assert!(dir.path().join("tree/03_Three.txt").exists());
    assert!(!dir.path().join("tree/02_Two.txt").exists());

    let (branch, head) = head_state(&repo)?;
    assert_eq!(branch.as_deref(), Some("main"));
    assert_eq!(head, oids[2]);
    Ok(())
}

#[test]
fn test_custom_output_dir_and_excludes() -> Result<()> {
    let dir = TempDir::new()?;
    init_repo(
        dir.path(),
        &[("keep.txt", "One"), ("node_modules/dep.js", "Two")],
    )?;

    let mut config = config_for(dir.path());
    config.snapshot.output_dir = PathBuf::from("snapshots");
    config.snapshot.exclude = vec![
        ".git".to_string(),
        "node_modules".to_string(),
        "snapshots".to_string(),
    ];

    Driver::new(config, FixtureRunner::new(dir.path())).run()?;

    let second = std::fs::read_to_string(dir.path().join("snapshots/02_Two.txt"))?;
    assert_eq!(second, "keep.txt");
    assert!(!dir.path().join("tree").exists());
    Ok(())
}

#[test]
fn test_unknown_branch_fails_without_creating_output() -> Result<()> {
    let dir = TempDir::new()?;
    init_repo(dir.path(), &[("a.txt", "One")])?;

    let mut config = config_for(dir.path());
    config.history.branch = "does-not-exist".to_string();
    let err = Driver::new(config, FixtureRunner::new(dir.path()))
        .run()
        .unwrap_err();

    assert!(matches!(
        err,
        SnapshotError::History(HistoryError::LogFailed { .. })
    ));
    assert_eq!(err.exit_code(), 1);
    assert!(!dir.path().join("tree").exists());
    Ok(())
}

#[test]
fn test_plain_directory_is_not_a_repository() -> Result<()> {
    let dir = TempDir::new()?;
    // Keep git from discovering a repository above the temp dir
    std::fs::write(dir.path().join(".git"), "gitdir: /nonexistent\n")?;

    let err = Driver::new(config_for(dir.path()), FixtureRunner::new(dir.path()))
        .run()
        .unwrap_err();

    assert!(matches!(
        err,
        SnapshotError::Environment(EnvironmentError::NotARepository(_))
    ));
    assert!(!dir.path().join("tree").exists());
    Ok(())
}
