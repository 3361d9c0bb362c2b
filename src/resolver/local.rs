//! Local directory source resolution.

use crate::resolver::error::ResolveError;
use crate::resolver::{FileOrigin, ResolvedSkill, ResolverOptions, SourceKind, assemble};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Resolves skills from a directory on disk.
pub struct LocalResolver {
    opts: ResolverOptions,
}

impl LocalResolver {
    pub fn new(opts: ResolverOptions) -> Self {
        Self { opts }
    }

    pub fn resolve(&self, root: &Path, skill_name: &str) -> Result<ResolvedSkill, ResolveError> {
        if !root.is_dir() {
            return Err(ResolveError::NotFound(root.display().to_string()));
        }
        info!(root = %root.display(), skill = skill_name, "Resolving skill from local directory");

        let mut origin = LocalOrigin::scan(root)?;
        let assembled = assemble(
            &mut origin,
            &root.display().to_string(),
            skill_name,
            &self.opts,
        )?;

        Ok(ResolvedSkill {
            source: SourceKind::Local {
                root: root.to_path_buf(),
            },
            owner: None,
            repo: None,
            default_branch: None,
            commit_or_version: None,
            skill_name: skill_name.to_string(),
            skill_dir: assembled.skill_dir,
            skill_file_path: assembled.skill_file_path,
            files: assembled.files,
            unverifiable_reasons: assembled.unverifiable_reasons,
            moderation: self.opts.moderation,
        })
    }
}

struct LocalOrigin {
    root: PathBuf,
    paths: Vec<String>,
}

impl LocalOrigin {
    /// Walks the tree once up front so assembly sees a stable path list.
    /// Hidden directories (`.git` and friends) are skipped.
    fn scan(root: &Path) -> Result<Self, ResolveError> {
        let mut paths = Vec::new();
        let walker = WalkDir::new(root).follow_links(false).into_iter();
        for entry in walker.filter_entry(|e| {
            !(e.depth() > 0
                && e.file_type().is_dir()
                && e.file_name().to_string_lossy().starts_with('.'))
        }) {
            let entry = entry.map_err(|e| {
                let msg = e.to_string();
                ResolveError::Io(e.into_io_error().unwrap_or_else(|| std::io::Error::other(msg)))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(root) {
                let rel = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if !rel.is_empty() {
                    paths.push(rel);
                }
            }
        }
        paths.sort();
        Ok(Self {
            root: root.to_path_buf(),
            paths,
        })
    }
}

impl FileOrigin for LocalOrigin {
    fn known_paths(&self) -> Vec<String> {
        self.paths.clone()
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, ResolveError> {
        let full = self.root.join(path);
        Ok(std::fs::read(full)?)
    }
}
