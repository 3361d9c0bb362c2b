use crate::resolver::ResolverOptions;
use crate::scoring::ModerationStatus;
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

/// Registry moderation verdict passed through from a registry lookup.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModerationArg {
    Suspicious,
    MalwareBlocked,
}

impl From<ModerationArg> for ModerationStatus {
    fn from(arg: ModerationArg) -> Self {
        match arg {
            ModerationArg::Suspicious => ModerationStatus::Suspicious,
            ModerationArg::MalwareBlocked => ModerationStatus::MalwareBlocked,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "skillgate",
    version,
    about = "Pre-install security gate for third-party skill packages",
    long_about = "skillgate resolves a skill's files from a GitHub repository, local \
directory, or zip archive, scans them for risky patterns, scores the result, and \
decides whether the install may proceed."
)]
pub struct Cli {
    /// Skill source: owner/repo, a github.com URL, a directory, or a .zip file
    pub source: String,

    /// Skill name(s) to gate; repeat for several skills from one source
    #[arg(short = 'k', long = "skill", required = true)]
    pub skills: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,

    /// Strict mode: tighter risk thresholds
    #[arg(short, long)]
    pub strict: bool,

    /// Accept warnings without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Override an UNSAFE verdict (never overrides CRITICAL or UNVERIFIABLE)
    #[arg(long)]
    pub force: bool,

    /// Allow installation when some content could not be verified
    #[arg(long)]
    pub allow_unverifiable: bool,

    /// Trust credits (0-20) subtracted from the risk score of clean-ish skills
    #[arg(long, default_value_t = 0.0)]
    pub trust_credits: f64,

    /// Evaluate the gate but suppress the installer handoff
    #[arg(long)]
    pub dry_run: bool,

    /// CI mode: non-interactive output, no installer handoff
    #[arg(long)]
    pub ci: bool,

    /// Verbose finding output
    #[arg(short, long)]
    pub verbose: bool,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Retries per network request on retryable failures
    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// Per-file size limit in bytes
    #[arg(long, default_value_t = 1_048_576)]
    pub max_file_size_bytes: u64,

    /// Cap on auxiliary files swept from scripts/ and src/ per skill
    #[arg(long, default_value_t = 50)]
    pub max_aux_files: usize,

    /// Cap on files resolved per skill
    #[arg(long, default_value_t = 100)]
    pub max_total_files: usize,

    /// Base delay in milliseconds between retry attempts
    #[arg(long, default_value_t = 250)]
    pub retry_base_delay_ms: u64,

    /// Moderation verdict from the skill registry, when one is on record
    #[arg(long, value_enum)]
    pub moderation: Option<ModerationArg>,
}

impl Cli {
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            request_timeout_ms: self.timeout_ms,
            max_file_size_bytes: self.max_file_size_bytes,
            max_aux_files: self.max_aux_files,
            max_total_files: self.max_total_files,
            retries: self.retries,
            retry_base_delay_ms: self.retry_base_delay_ms,
            moderation: self.moderation.map(ModerationStatus::from),
        }
    }
}
