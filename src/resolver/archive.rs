//! Zip archive source resolution.
//!
//! Entries with unsafe names (absolute paths, `..` traversal) are dropped at
//! indexing time, so assembly never sees a path that could escape the
//! archive root.

use crate::resolver::error::ResolveError;
use crate::resolver::{FileOrigin, ResolvedSkill, ResolverOptions, SourceKind, assemble};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};
use zip::ZipArchive;

const MAX_ARCHIVE_ENTRIES: usize = 10_000;

/// Resolves skills from a `.zip` file on disk.
pub struct ArchiveResolver {
    opts: ResolverOptions,
}

impl ArchiveResolver {
    pub fn new(opts: ResolverOptions) -> Self {
        Self { opts }
    }

    pub fn resolve(&self, path: &Path, skill_name: &str) -> Result<ResolvedSkill, ResolveError> {
        info!(archive = %path.display(), skill = skill_name, "Resolving skill from archive");

        let file = File::open(path)?;
        let zip = ZipArchive::new(file).map_err(|e| ResolveError::Archive(e.to_string()))?;
        if zip.len() > MAX_ARCHIVE_ENTRIES {
            return Err(ResolveError::Archive(format!(
                "too many entries ({} > {MAX_ARCHIVE_ENTRIES})",
                zip.len()
            )));
        }

        let mut origin = ArchiveOrigin::index(zip)?;
        let assembled = assemble(
            &mut origin,
            &path.display().to_string(),
            skill_name,
            &self.opts,
        )?;

        Ok(ResolvedSkill {
            source: SourceKind::Archive {
                path: path.to_path_buf(),
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

struct ArchiveOrigin {
    zip: ZipArchive<File>,
    paths: Vec<String>,
}

impl ArchiveOrigin {
    fn index(mut zip: ZipArchive<File>) -> Result<Self, ResolveError> {
        let mut paths = Vec::new();
        for i in 0..zip.len() {
            let entry = zip
                .by_index(i)
                .map_err(|e| ResolveError::Archive(e.to_string()))?;
            if !entry.is_file() {
                continue;
            }
            // enclosed_name() is None for absolute and traversing names.
            let Some(safe) = entry.enclosed_name() else {
                warn!(name = %entry.name(), "Skipping archive entry with unsafe path");
                continue;
            };
            let rel = safe
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if !rel.is_empty() {
                paths.push(rel);
            }
        }
        paths.sort();
        Ok(Self { zip, paths })
    }
}

impl FileOrigin for ArchiveOrigin {
    fn known_paths(&self) -> Vec<String> {
        self.paths.clone()
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, ResolveError> {
        let mut entry = self
            .zip
            .by_name(path)
            .map_err(|_| ResolveError::NotFound(path.to_string()))?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .map_err(|e| ResolveError::Archive(format!("{path}: {e}")))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn build_zip(entries: Vec<(&str, &str)>) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("skill.zip");
        let file = File::create(&path).unwrap();
        let mut writer = ZipWriter::new(file);
        for (name, content) in entries {
            writer
                .start_file(name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        (dir, path)
    }

    #[test]
    fn test_resolve_skill_from_archive() {
        let (_dir, path) = build_zip(vec![
            ("my-skill/SKILL.md", "# Skill\n\nUses `scripts/run.sh`.\n"),
            ("my-skill/scripts/run.sh", "echo hi\n"),
        ]);

        let resolver = ArchiveResolver::new(ResolverOptions::default());
        let skill = resolver.resolve(&path, "my-skill").unwrap();

        assert!(matches!(skill.source, SourceKind::Archive { .. }));
        assert_eq!(skill.files.len(), 2);
        assert_eq!(skill.files[1].content, "echo hi\n");
    }

    #[test]
    fn test_traversal_entry_is_skipped() {
        let (_dir, path) = build_zip(vec![
            ("my-skill/SKILL.md", "# Skill\n"),
            ("../outside.sh", "echo escape\n"),
        ]);

        let resolver = ArchiveResolver::new(ResolverOptions::default());
        let skill = resolver.resolve(&path, "my-skill").unwrap();
        assert!(skill.files.iter().all(|f| !f.path.contains("outside")));
    }

    #[test]
    fn test_not_a_zip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bogus.zip");
        std::fs::write(&path, b"plain text, not a zip").unwrap();

        let resolver = ArchiveResolver::new(ResolverOptions::default());
        let err = resolver.resolve(&path, "x").unwrap_err();
        assert!(matches!(err, ResolveError::Archive(_)));
    }
}
