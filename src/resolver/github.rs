//! GitHub source resolution over the REST API.
//!
//! Resolution pins the repository's default branch to a commit, lists the
//! full tree at that commit, then fetches individual blobs on demand. HTTP
//! access sits behind the `HttpFetch` trait so network behavior can be
//! exercised in tests without a live endpoint.

use crate::resolver::error::ResolveError;
use crate::resolver::retry::with_retry;
use crate::resolver::{
    FileOrigin, ResolvedSkill, ResolverOptions, SourceKind, assemble,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_API_BASE: &str = "https://api.github.com";

static SHORTHAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+/[A-Za-z0-9_.\-]+$").unwrap());

/// Accepts `owner/repo` shorthand or a github.com URL.
pub fn parse_repo_input(input: &str) -> Result<(String, String), ResolveError> {
    let input = input.trim().trim_end_matches('/');

    if let Some(rest) = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
    {
        let rest = rest.strip_prefix("www.").unwrap_or(rest);
        let Some(path) = rest.strip_prefix("github.com/") else {
            return Err(ResolveError::InvalidRepoInput(input.to_string()));
        };
        let mut segments = path.split('/');
        let owner = segments.next().unwrap_or("");
        let repo = segments.next().unwrap_or("").trim_end_matches(".git");
        if owner.is_empty() || repo.is_empty() {
            return Err(ResolveError::InvalidRepoInput(input.to_string()));
        }
        return Ok((owner.to_string(), repo.to_string()));
    }

    if SHORTHAND.is_match(input) {
        let (owner, repo) = input
            .split_once('/')
            .ok_or_else(|| ResolveError::InvalidRepoInput(input.to_string()))?;
        return Ok((owner.to_string(), repo.to_string()));
    }

    Err(ResolveError::InvalidRepoInput(input.to_string()))
}

/// Maps an HTTP status to the resolver error taxonomy.
pub(crate) fn classify_status(status: u16, url: &str) -> ResolveError {
    match status {
        401 | 403 => ResolveError::Auth {
            status,
            url: url.to_string(),
        },
        404 => ResolveError::NotFound(url.to_string()),
        429 => ResolveError::RateLimited(url.to_string()),
        500 | 502 | 503 | 504 => ResolveError::Server {
            status,
            url: url.to_string(),
        },
        _ => ResolveError::UnexpectedStatus {
            status,
            url: url.to_string(),
        },
    }
}

/// Minimal HTTP GET seam. Implementations return the response body on 2xx
/// and a classified `ResolveError` otherwise.
pub trait HttpFetch {
    fn get(&self, url: &str) -> Result<String, ResolveError>;
}

/// Production fetcher backed by a blocking `ureq` agent.
pub struct UreqFetch {
    agent: ureq::Agent,
    token: Option<String>,
}

impl UreqFetch {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }
}

impl HttpFetch for UreqFetch {
    fn get(&self, url: &str) -> Result<String, ResolveError> {
        let mut request = self
            .agent
            .get(url)
            .set("User-Agent", concat!("skillgate/", env!("CARGO_PKG_VERSION")))
            .set("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        match request.call() {
            Ok(response) => response
                .into_string()
                .map_err(|e| ResolveError::Network(format!("{url}: {e}"))),
            Err(ureq::Error::Status(status, _)) => Err(classify_status(status, url)),
            Err(ureq::Error::Transport(t)) => {
                let message = t.to_string();
                if message.contains("timed out") || message.contains("timeout") {
                    Err(ResolveError::Timeout(url.to_string()))
                } else {
                    Err(ResolveError::Network(format!("{url}: {message}")))
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct BranchInfo {
    commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
struct BranchCommit {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    tree: TreeRef,
}

#[derive(Debug, Deserialize)]
struct TreeRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
}

/// Resolves skills from GitHub repositories.
pub struct GithubResolver<F: HttpFetch = UreqFetch> {
    fetch: F,
    api_base: String,
    opts: ResolverOptions,
}

impl GithubResolver<UreqFetch> {
    pub fn new(opts: ResolverOptions) -> Self {
        let fetch = UreqFetch::new(Duration::from_millis(opts.request_timeout_ms));
        Self {
            fetch,
            api_base: DEFAULT_API_BASE.to_string(),
            opts,
        }
    }
}

impl<F: HttpFetch> GithubResolver<F> {
    #[cfg(test)]
    fn with_fetch(fetch: F, api_base: &str, opts: ResolverOptions) -> Self {
        Self {
            fetch,
            api_base: api_base.to_string(),
            opts,
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ResolveError> {
        let base_delay = Duration::from_millis(self.opts.retry_base_delay_ms);
        let body = with_retry(self.opts.retries, base_delay, || self.fetch.get(url))?;
        serde_json::from_str(&body).map_err(|e| ResolveError::Api(format!("{url}: {e}")))
    }

    /// Pins `repo_input` to its default-branch head and assembles the named
    /// skill's file set from that commit's tree.
    pub fn resolve(&self, repo_input: &str, skill_name: &str) -> Result<ResolvedSkill, ResolveError> {
        let (owner, repo) = parse_repo_input(repo_input)?;
        info!(%owner, %repo, skill = skill_name, "Resolving skill from GitHub");

        let repo_url = format!("{}/repos/{owner}/{repo}", self.api_base);
        let repo_info: RepoInfo = self.get_json(&repo_url)?;

        let branch_url = format!(
            "{}/repos/{owner}/{repo}/branches/{}",
            self.api_base, repo_info.default_branch
        );
        let branch: BranchInfo = self.get_json(&branch_url)?;
        let commit_sha = branch.commit.sha;
        debug!(branch = %repo_info.default_branch, commit = %commit_sha, "Pinned to commit");

        let tree_url = format!(
            "{}/repos/{owner}/{repo}/git/trees/{}?recursive=1",
            self.api_base, branch.commit.commit.tree.sha
        );
        let tree: TreeResponse = self.get_json(&tree_url)?;

        let index: FxHashMap<String, TreeEntry> = tree
            .tree
            .into_iter()
            .filter(|e| e.kind == "blob")
            .map(|e| (e.path.clone(), e))
            .collect();

        let mut origin = GithubOrigin {
            resolver: self,
            owner: &owner,
            repo: &repo,
            index,
        };
        let mut assembled = assemble(
            &mut origin,
            &format!("{owner}/{repo}"),
            skill_name,
            &self.opts,
        )?;

        if tree.truncated {
            assembled
                .unverifiable_reasons
                .push("repository tree listing was truncated by the API".to_string());
        }

        Ok(ResolvedSkill {
            source: SourceKind::Github {
                owner: owner.clone(),
                repo: repo.clone(),
            },
            owner: Some(owner),
            repo: Some(repo),
            default_branch: Some(repo_info.default_branch),
            commit_or_version: Some(commit_sha),
            skill_name: skill_name.to_string(),
            skill_dir: assembled.skill_dir,
            skill_file_path: assembled.skill_file_path,
            files: assembled.files,
            unverifiable_reasons: assembled.unverifiable_reasons,
            moderation: self.opts.moderation,
        })
    }
}

struct GithubOrigin<'a, F: HttpFetch> {
    resolver: &'a GithubResolver<F>,
    owner: &'a str,
    repo: &'a str,
    index: FxHashMap<String, TreeEntry>,
}

impl<F: HttpFetch> FileOrigin for GithubOrigin<'_, F> {
    fn known_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.index.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, ResolveError> {
        let entry = self
            .index
            .get(path)
            .ok_or_else(|| ResolveError::NotFound(path.to_string()))?;

        // Reject on the tree-reported size before spending a blob fetch.
        if let Some(size) = entry.size
            && size > self.resolver.opts.max_file_size_bytes
        {
            return Err(ResolveError::FileRejected {
                path: path.to_string(),
                reason: format!("exceeds size limit ({size} bytes)"),
            });
        }

        let blob_url = format!(
            "{}/repos/{}/{}/git/blobs/{}",
            self.resolver.api_base, self.owner, self.repo, entry.sha
        );
        let blob: BlobResponse = self.resolver.get_json(&blob_url)?;
        if blob.encoding != "base64" {
            return Err(ResolveError::Api(format!(
                "unexpected blob encoding '{}' for {path}",
                blob.encoding
            )));
        }

        let cleaned: String = blob.content.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(cleaned)
            .map_err(|e| ResolveError::Api(format!("invalid base64 blob for {path}: {e}")))
    }
}
