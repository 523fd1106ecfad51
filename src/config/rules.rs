use crate::error::EngineError;
use crate::features::Thresholds;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named malicious-URL signature as written in the rule file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SignatureConfig {
    pub name: String,
    pub pattern: String,
}

impl SignatureConfig {
    fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// Score contribution of each heuristic
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Weights {
    pub ip_host: i32,
    pub low_trust_tld: i32,
    pub hyphenated_host: i32,
    pub deep_subdomain: i32,
    pub long_hostname: i32,
    pub long_path: i32,
    pub many_parameters: i32,
    pub redirect_parameter: i32,
    pub heavy_encoding: i32,
    pub insecure_protocol: i32,
    pub nonstandard_protocol: i32,
    pub malicious_pattern: i32,
    pub suspicious_keyword: i32,
    pub phishing_indicator: i32,
    pub invalid_url: i32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            ip_host: 30,
            low_trust_tld: 25,
            hyphenated_host: 20,
            deep_subdomain: 15,
            long_hostname: 10,
            long_path: 15,
            many_parameters: 10,
            redirect_parameter: 20,
            heavy_encoding: 15,
            insecure_protocol: 10,
            nonstandard_protocol: 30,
            malicious_pattern: 25,
            suspicious_keyword: 10,
            phishing_indicator: 15,
            invalid_url: 90,
        }
    }
}

/// Structural limits; a heuristic fires once the value passes its limit
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Limits {
    /// Fires at this many hyphens or more
    pub min_hyphens: usize,
    /// Fires above this many dot-separated labels
    pub max_labels: usize,
    pub max_hostname_len: usize,
    pub max_path_len: usize,
    pub max_parameters: usize,
    pub max_encoded_triplets: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_hyphens: 3,
            max_labels: 4,
            max_hostname_len: 50,
            max_path_len: 100,
            max_parameters: 10,
            max_encoded_triplets: 5,
        }
    }
}

/// Operator-editable rule data, loaded from YAML.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RuleConfig {
    pub trusted_domains: Vec<String>,
    pub malicious_patterns: Vec<SignatureConfig>,
    pub suspicious_keywords: Vec<String>,
    pub phishing_indicators: Vec<String>,
    pub low_trust_tlds: Vec<String>,
    pub redirect_params: Vec<String>,
    pub weights: Weights,
    pub limits: Limits,
    pub thresholds: Thresholds,
}

impl Default for RuleConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            trusted_domains: strings(&[
                "google.com",
                "youtube.com",
                "facebook.com",
                "instagram.com",
                "twitter.com",
                "linkedin.com",
                "github.com",
                "stackoverflow.com",
                "wikipedia.org",
                "mozilla.org",
                "w3.org",
                "naver.com",
                "daum.net",
                "kakao.com",
                "samsung.com",
                "lg.com",
            ]),
            malicious_patterns: vec![
                // Phishing framing
                SignatureConfig::new(
                    "account-action-brand",
                    r"(?i)(?:secure|account|verify|update|confirm|suspended|locked|expired).*(?:paypal|amazon|apple|microsoft|google|facebook|instagram|twitter|bank|credit)",
                ),
                SignatureConfig::new(
                    "login-verification",
                    r"(?i)(?:login|signin|account).*(?:verify|confirm|update|suspended|security)",
                ),
                SignatureConfig::new(
                    "click-urgency",
                    r"(?i)(?:click|visit|go).*(?:here|now|immediately|urgent|asap)",
                ),
                // Scam framing
                SignatureConfig::new(
                    "prize-giveaway",
                    r"(?i)(?:free|win|winner|congratulations|selected|chosen).*(?:money|cash|prize|gift|reward)",
                ),
                SignatureConfig::new(
                    "pressure-language",
                    r"(?i)(?:urgent|immediate|limited|expire|act now|don't miss)",
                ),
                SignatureConfig::new(
                    "guaranteed-returns",
                    r"(?i)(?:bitcoin|crypto|investment|trading|profit|earn).*(?:guaranteed|easy|quick|instant)",
                ),
                // Structural red flags
                SignatureConfig::new("ip-literal", r"[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+"),
                SignatureConfig::new(
                    "low-trust-tld",
                    r"(?i)[a-z]{2,}\.(?:tk|ml|ga|cf|pw|top|click|download)",
                ),
                SignatureConfig::new(
                    "multi-hyphen-domain",
                    r"[a-z]+-[a-z]+-[a-z]+\.(?:com|net|org)",
                ),
            ],
            suspicious_keywords: strings(&[
                "verify account",
                "suspended account",
                "urgent action",
                "click here",
                "free money",
                "easy profit",
                "guaranteed income",
                "act now",
                "limited time",
                "exclusive offer",
                "congratulations winner",
                "무료 돈",
                "긴급 조치",
                "계정 정지",
                "계정 확인",
                "당첨",
                "무료 제공",
                "특별 혜택",
                "긴급",
            ]),
            phishing_indicators: strings(&[
                "security alert",
                "account verification",
                "confirm identity",
                "update payment",
                "billing issue",
                "suspicious activity",
                "보안 경고",
                "계정 인증",
                "신원 확인",
                "결제 업데이트",
                "의심스러운 활동",
            ]),
            low_trust_tlds: strings(&["tk", "ml", "ga", "cf", "pw", "top", "click", "download"]),
            redirect_params: strings(&["redirect", "url", "return", "goto", "next", "continue"]),
            weights: Weights::default(),
            limits: Limits::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl RuleConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file: {}", path.display()))?;
        let config: RuleConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse rule file: {}", path.display()))?;

        log::info!(
            "Loaded rule set from {}: {} trusted domains, {} signatures, {} keywords, {} phishing indicators",
            path.display(),
            config.trusted_domains.len(),
            config.malicious_patterns.len(),
            config.suspicious_keywords.len(),
            config.phishing_indicators.len()
        );
        Ok(config)
    }

    /// Compile signatures and normalise lists. Fails on the first bad pattern.
    pub fn compile(&self) -> Result<RuleSet, EngineError> {
        let thresholds = self.thresholds.clone();
        if !(thresholds.high >= thresholds.medium && thresholds.medium >= thresholds.low) {
            return Err(EngineError::InvalidThresholds {
                high: thresholds.high,
                medium: thresholds.medium,
                low: thresholds.low,
            });
        }

        let mut signatures = Vec::with_capacity(self.malicious_patterns.len());
        for (index, signature) in self.malicious_patterns.iter().enumerate() {
            let regex = Regex::new(&signature.pattern).map_err(|source| {
                EngineError::InvalidPattern {
                    name: signature.name.clone(),
                    source,
                }
            })?;
            signatures.push(Signature {
                number: index + 1,
                name: signature.name.clone(),
                regex,
            });
        }

        Ok(RuleSet {
            trusted_domains: normalise(&self.trusted_domains),
            signatures,
            suspicious_keywords: normalise(&self.suspicious_keywords),
            phishing_indicators: normalise(&self.phishing_indicators),
            low_trust_tlds: self
                .low_trust_tlds
                .iter()
                .map(|tld| tld.trim().trim_start_matches('.').to_lowercase())
                .filter(|tld| !tld.is_empty())
                .collect(),
            redirect_params: self
                .redirect_params
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect(),
            weights: self.weights.clone(),
            limits: self.limits.clone(),
            thresholds,
        })
    }
}

fn normalise(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// A compiled malicious signature. `number` is its 1-based position in the list.
#[derive(Debug, Clone)]
pub struct Signature {
    pub number: usize,
    pub name: String,
    pub regex: Regex,
}

/// Immutable, compiled rule set consumed by the analyzers.
///
/// Keyword and indicator lists are lowercased; empty entries are dropped so an
/// empty or sparse category simply contributes nothing.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub trusted_domains: Vec<String>,
    pub signatures: Vec<Signature>,
    pub suspicious_keywords: Vec<String>,
    pub phishing_indicators: Vec<String>,
    pub low_trust_tlds: Vec<String>,
    /// Kept in configured order; the first present parameter wins.
    pub redirect_params: Vec<String>,
    pub weights: Weights,
    pub limits: Limits,
    pub thresholds: Thresholds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_compile() {
        let rules = RuleConfig::default().compile().unwrap();
        assert_eq!(rules.signatures.len(), 9);
        assert_eq!(rules.signatures[0].number, 1);
        assert_eq!(rules.signatures[6].name, "ip-literal");
        assert_eq!(rules.thresholds.high, 70);
    }

    #[test]
    fn test_bad_pattern_fails_fast() {
        let config = RuleConfig {
            malicious_patterns: vec![SignatureConfig::new("broken", "(unclosed")],
            ..RuleConfig::default()
        };

        match config.compile() {
            Err(EngineError::InvalidPattern { name, .. }) => assert_eq!(name, "broken"),
            other => panic!("expected InvalidPattern, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unordered_thresholds_rejected() {
        let config = RuleConfig {
            thresholds: Thresholds {
                high: 30,
                medium: 40,
                low: 20,
            },
            ..RuleConfig::default()
        };
        assert!(matches!(
            config.compile(),
            Err(EngineError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn test_lists_are_normalised() {
        let config = RuleConfig {
            suspicious_keywords: vec!["  Click Here ".to_string(), String::new()],
            low_trust_tlds: vec![".TK".to_string()],
            ..RuleConfig::default()
        };
        let rules = config.compile().unwrap();
        assert_eq!(rules.suspicious_keywords, vec!["click here".to_string()]);
        assert_eq!(rules.low_trust_tlds, vec!["tk".to_string()]);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
trusted_domains:
  - example.com
weights:
  ip_host: 50
"#;
        let config: RuleConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.trusted_domains, vec!["example.com".to_string()]);
        assert_eq!(config.weights.ip_host, 50);
        assert_eq!(config.weights.low_trust_tld, 25);
        assert_eq!(config.malicious_patterns.len(), 9);
        assert_eq!(config.thresholds.medium, 40);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yaml");
        std::fs::write(&path, "suspicious_keywords: []\n").unwrap();

        let config = RuleConfig::load_from_file(&path).unwrap();
        assert!(config.suspicious_keywords.is_empty());
        assert!(!config.phishing_indicators.is_empty());
    }
}
