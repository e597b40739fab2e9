use anyhow::{Context, Result};
use roi_store::LocalRepository;
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming the repository directory.
pub const REPO_ENV: &str = "NDPA_IMPORT_REPO";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repo_root: PathBuf,
}

impl Config {
    /// `--repo`, then `NDPA_IMPORT_REPO`, then the per-user data directory.
    pub fn resolve(repo_flag: Option<PathBuf>) -> Result<Self> {
        Self::resolve_with(repo_flag, std::env::var_os(REPO_ENV))
    }

    fn resolve_with(repo_flag: Option<PathBuf>, repo_env: Option<OsString>) -> Result<Self> {
        let explicit = repo_flag
            .or_else(|| repo_env.filter(|value| !value.is_empty()).map(PathBuf::from));

        let repo_root = match explicit {
            Some(root) => root,
            None => LocalRepository::default_root()
                .context("no repository given and no default data directory")?,
        };

        Ok(Self { repo_root })
    }

    pub fn open_repository(&self) -> Result<LocalRepository> {
        log::debug!("using repository {}", self.repo_root.display());

        LocalRepository::open(&self.repo_root)
            .with_context(|| format!("failed to open repository {}", self.repo_root.display()))
    }
}
