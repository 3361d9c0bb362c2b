//! Source resolution: turn a skill source (GitHub repo, local directory, or
//! archive) into a fixed set of in-memory text files for scanning.
//!
//! Every origin funnels through the same assembly pipeline so the scanner
//! sees one shape regardless of where the bytes came from.

pub mod archive;
pub mod error;
pub mod github;
pub mod local;
pub mod refs;
pub mod retry;

pub use archive::ArchiveResolver;
pub use error::ResolveError;
pub use github::GithubResolver;
pub use local::LocalResolver;

use crate::scoring::ModerationStatus;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Where a skill's bytes came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    Github { owner: String, repo: String },
    Local { root: PathBuf },
    Archive { path: PathBuf },
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Github { owner, repo } => write!(f, "{owner}/{repo}"),
            SourceKind::Local { root } => write!(f, "{}", root.display()),
            SourceKind::Archive { path } => write!(f, "{}", path.display()),
        }
    }
}

/// One resolved file: source-relative slash path plus decoded UTF-8 content.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedFile {
    pub path: String,
    pub content: String,
}

/// A skill pinned to a concrete set of files, ready for scanning.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSkill {
    pub source: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_or_version: Option<String>,
    pub skill_name: String,
    pub skill_dir: String,
    pub skill_file_path: String,
    #[serde(skip)]
    pub files: Vec<ResolvedFile>,
    pub unverifiable_reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation: Option<ModerationStatus>,
}

/// Resolution limits and network policy.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub request_timeout_ms: u64,
    pub max_file_size_bytes: u64,
    pub max_aux_files: usize,
    pub max_total_files: usize,
    pub retries: u32,
    pub retry_base_delay_ms: u64,
    /// Registry moderation verdict for this source, when the caller has one.
    /// Stamped onto the resolved skill so scoring can apply its override.
    pub moderation: Option<ModerationStatus>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
            max_file_size_bytes: 1_048_576,
            max_aux_files: 50,
            max_total_files: 100,
            retries: 2,
            retry_base_delay_ms: 250,
            moderation: None,
        }
    }
}

/// Extensions treated as scannable text.
const TEXT_EXTENSIONS: &[&str] = &[
    "md", "markdown", "txt", "sh", "bash", "zsh", "py", "rb", "js", "ts", "mjs", "json", "yaml",
    "yml", "toml", "cfg", "ini", "xml", "html", "css",
];

/// True for files we will attempt to decode and scan. Extensionless files
/// qualify only under a scripts/ directory, where shebang scripts live.
pub(crate) fn is_text_candidate(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        }
        _ => path.split('/').rev().skip(1).any(|seg| seg == "scripts"),
    }
}

/// Uniform byte access over a resolved source. Implementations list every
/// path they can serve and read one path at a time.
pub(crate) trait FileOrigin {
    fn known_paths(&self) -> Vec<String>;
    fn read(&mut self, path: &str) -> Result<Vec<u8>, ResolveError>;
}

/// Decodes raw bytes into scannable text, or explains why it cannot be.
pub(crate) fn decode_text(bytes: &[u8], max_size: u64) -> Result<String, String> {
    if bytes.len() as u64 > max_size {
        return Err(format!("exceeds size limit ({} bytes)", bytes.len()));
    }
    if bytes.contains(&0) {
        return Err("binary content".to_string());
    }
    String::from_utf8(bytes.to_vec()).map_err(|_| "not valid UTF-8".to_string())
}

#[derive(Debug)]
pub(crate) struct AssembledSkill {
    pub skill_dir: String,
    pub skill_file_path: String,
    pub files: Vec<ResolvedFile>,
    pub unverifiable_reasons: Vec<String>,
}

fn parent_dir(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => String::new(),
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Finds the skill file for `skill_name` among the origin's paths.
///
/// Preference order: a SKILL.md whose parent directory is named after the
/// skill, then one with the skill name anywhere in its path. A SKILL.md that
/// matches neither way is never resolved, even when it is the only one.
fn locate_skill_file(paths: &[String], skill_name: &str) -> Option<String> {
    let candidates: Vec<&String> = paths
        .iter()
        .filter(|p| last_segment(p).eq_ignore_ascii_case("skill.md"))
        .collect();

    if let Some(hit) = candidates
        .iter()
        .find(|p| last_segment(&parent_dir(p)).eq_ignore_ascii_case(skill_name))
    {
        return Some((*hit).clone());
    }
    if let Some(hit) = candidates
        .iter()
        .find(|p| p.split('/').any(|seg| seg.eq_ignore_ascii_case(skill_name)))
    {
        return Some((*hit).clone());
    }
    None
}

/// Shared assembly over any origin: locate the skill file, follow its
/// references, sweep auxiliary script directories, and read everything into
/// memory under the configured caps.
///
/// An unreadable skill file is fatal; any other unreadable file degrades to
/// an unverifiable-content reason so the gate can refuse to vouch for it.
pub(crate) fn assemble(
    origin: &mut dyn FileOrigin,
    source: &str,
    skill_name: &str,
    opts: &ResolverOptions,
) -> Result<AssembledSkill, ResolveError> {
    let known = origin.known_paths();
    if known.is_empty() {
        return Err(ResolveError::EmptyFileSet);
    }

    let skill_file_path = locate_skill_file(&known, skill_name).ok_or_else(|| {
        ResolveError::SkillNotFound {
            skill: skill_name.to_string(),
            origin: source.to_string(),
        }
    })?;
    let skill_dir = parent_dir(&skill_file_path);
    debug!(skill = skill_name, file = %skill_file_path, "Located skill file");

    let skill_bytes =
        origin
            .read(&skill_file_path)
            .map_err(|e| ResolveError::SkillFileUnreadable {
                path: skill_file_path.clone(),
                reason: e.to_string(),
            })?;
    let skill_content = decode_text(&skill_bytes, opts.max_file_size_bytes).map_err(|reason| {
        ResolveError::SkillFileUnreadable {
            path: skill_file_path.clone(),
            reason,
        }
    })?;

    let mut unverifiable_reasons = Vec::new();

    // Referenced files, resolved against the skill directory with traversal
    // rejected. Targets absent from the source or outside the text allow-list
    // are discarded, not fetched.
    let mut wanted: Vec<String> = Vec::new();
    for target in refs::extract_references(&skill_content) {
        let Some(resolved) = refs::resolve_reference(&skill_dir, &target) else {
            continue;
        };
        if known.contains(&resolved) && is_text_candidate(&resolved) {
            wanted.push(resolved);
        } else {
            debug!(target = %resolved, "Dropping unresolvable or non-text reference");
        }
    }

    // Auxiliary sweep: every text file under the skill's scripts/ and src/
    // trees, referenced or not.
    let aux_prefixes = if skill_dir.is_empty() {
        vec!["scripts/".to_string(), "src/".to_string()]
    } else {
        vec![format!("{skill_dir}/scripts/"), format!("{skill_dir}/src/")]
    };
    let mut aux: Vec<String> = known
        .iter()
        .filter(|p| aux_prefixes.iter().any(|pre| p.starts_with(pre.as_str())))
        .filter(|p| is_text_candidate(p))
        .cloned()
        .collect();
    aux.sort();
    if aux.len() > opts.max_aux_files {
        unverifiable_reasons.push(format!(
            "auxiliary file list truncated at {} of {} files",
            opts.max_aux_files,
            aux.len()
        ));
        aux.truncate(opts.max_aux_files);
    }

    let mut ordered = vec![skill_file_path.clone()];
    ordered.extend(wanted);
    ordered.extend(aux);
    let mut seen = std::collections::HashSet::new();
    ordered.retain(|p| seen.insert(p.clone()));
    if ordered.len() > opts.max_total_files {
        unverifiable_reasons.push(format!(
            "file set truncated at {} of {} files",
            opts.max_total_files,
            ordered.len()
        ));
        ordered.truncate(opts.max_total_files);
    }

    let mut files = Vec::with_capacity(ordered.len());
    files.push(ResolvedFile {
        path: skill_file_path.clone(),
        content: skill_content,
    });
    for path in ordered.into_iter().skip(1) {
        match origin.read(&path) {
            Ok(bytes) => match decode_text(&bytes, opts.max_file_size_bytes) {
                Ok(content) => files.push(ResolvedFile { path, content }),
                Err(reason) => {
                    warn!(file = %path, %reason, "Skipping undecodable file");
                    unverifiable_reasons.push(format!("{path}: {reason}"));
                }
            },
            Err(e) => {
                warn!(file = %path, error = %e, "Skipping unreadable file");
                unverifiable_reasons.push(format!("{path}: {e}"));
            }
        }
    }

    Ok(AssembledSkill {
        skill_dir,
        skill_file_path,
        files,
        unverifiable_reasons,
    })
}
