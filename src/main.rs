use clap::Parser;
use skillgate::gate::{self, EXIT_RUNTIME_ERROR, GateDecision, GateFlags};
use skillgate::reporter::{GateReport, Reporter};
use skillgate::scoring::{ScoreOptions, apply_moderation, score};
use skillgate::{
    ArchiveResolver, Cli, GithubResolver, JsonReporter, LocalResolver, OutputFormat, ResolvedSkill,
    Result, SkillScanner, TerminalReporter,
};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(exit_code) => ExitCode::from(exit_code),
        Err(e) => {
            eprintln!("skillgate: {e}");
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

fn resolve(cli: &Cli, skill_name: &str) -> Result<ResolvedSkill> {
    let opts = cli.resolver_options();
    let path = Path::new(&cli.source);
    let skill = if path.is_dir() {
        LocalResolver::new(opts).resolve(path, skill_name)?
    } else if path.is_file() {
        ArchiveResolver::new(opts).resolve(path, skill_name)?
    } else {
        GithubResolver::new(opts).resolve(&cli.source, skill_name)?
    };
    Ok(skill)
}

/// Runs the resolve/scan/score/gate pipeline once per requested skill and
/// returns the worst exit code.
fn run(cli: &Cli) -> Result<u8> {
    let scanner = SkillScanner::new();
    let reporter: Box<dyn Reporter> = match cli.format {
        OutputFormat::Terminal => Box::new(TerminalReporter::new(cli.verbose)),
        OutputFormat::Json => Box::new(JsonReporter::new()),
    };
    let flags = GateFlags {
        yes: cli.yes,
        force: cli.force,
        allow_unverifiable: cli.allow_unverifiable,
    };

    let mut worst: u8 = 0;
    for skill_name in &cli.skills {
        let skill = resolve(cli, skill_name)?;
        let scan = scanner.scan(&skill);

        let opts = ScoreOptions {
            strict: cli.strict,
            trust_credits: cli.trust_credits,
            has_unverifiable_content: scan.has_unverifiable_content,
        };
        let mut result = score(scan.findings, &opts);
        if let Some(status) = skill.moderation {
            result = apply_moderation(result, status);
        }

        let decision = gate::evaluate(result.level, flags);
        print!(
            "{}",
            reporter.report(&GateReport {
                skill: &skill,
                result: &result,
                decision: &decision,
            })
        );
        print_handoff(cli, skill_name, &decision);

        worst = worst.max(decision.exit_code);
    }

    Ok(worst)
}

/// Installer handoff note after the gate. Suppressed in dry-run and CI modes
/// where no install follows.
fn print_handoff(cli: &Cli, skill_name: &str, decision: &GateDecision) {
    if !decision.can_install || cli.dry_run || cli.ci {
        return;
    }
    if matches!(cli.format, OutputFormat::Terminal) {
        println!("Proceeding with install of '{skill_name}'.");
    }
}
