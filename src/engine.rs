use crate::analysis::{AnalysisDetails, AnalysisResult, THREAT_INVALID_URL};
use crate::config::rules::{RuleConfig, RuleSet};
use crate::error::EngineError;
use crate::features::domain_analyzer::analyze_domain;
use crate::features::pattern_matcher::analyze_patterns;
use crate::features::protocol_analyzer::analyze_protocol;
use crate::features::url_structure::analyze_url_structure;
use crate::features::{Classification, RiskLevel};
use crate::recommendations;
use chrono::Utc;
use std::sync::Arc;
use url::Url;

/// Stateless URL risk scorer. Cloning shares the compiled rule set.
#[derive(Debug, Clone)]
pub struct UrlRiskEngine {
    rules: Arc<RuleSet>,
}

impl UrlRiskEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    pub fn from_config(config: &RuleConfig) -> Result<Self, EngineError> {
        Ok(Self::new(config.compile()?))
    }

    /// Engine over the built-in production rule set.
    pub fn with_default_rules() -> Result<Self, EngineError> {
        Self::from_config(&RuleConfig::default())
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Analyze a URL. Unparseable input yields the fixed high-risk result
    /// rather than an error.
    pub fn analyze(&self, url: &str) -> AnalysisResult {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::debug!("Unparseable URL {:?}: {}", url, e);
                return self.unparseable(url);
            }
        };

        let rules = self.rules.as_ref();
        let details = AnalysisDetails {
            domain: analyze_domain(parsed.host_str().unwrap_or(""), rules),
            url_structure: analyze_url_structure(url, &parsed, rules),
            protocol: analyze_protocol(parsed.scheme(), rules),
            patterns: analyze_patterns(url, rules),
        };

        let risk_score = details.total_score();
        let risk_level = rules.thresholds.level_for(risk_score);
        let threats = details.collect_threats(risk_score, &rules.thresholds);
        let recommendations = recommendations::generate(risk_level, details.protocol.is_secure);

        log::debug!(
            "Analyzed {}: score={} level={} (domain={}, structure={}, protocol={}, patterns={})",
            url,
            risk_score,
            risk_level,
            details.domain.risk_score,
            details.url_structure.risk_score,
            details.protocol.risk_score,
            details.patterns.risk_score
        );

        AnalysisResult {
            url: url.to_string(),
            risk_score,
            risk_level,
            threats,
            recommendations,
            details: Some(details),
            timestamp: Utc::now(),
        }
    }

    /// Entry point for loosely typed callers (JSON requests, batch files).
    pub fn analyze_value(&self, input: &serde_json::Value) -> Result<AnalysisResult, EngineError> {
        match input {
            serde_json::Value::String(url) => Ok(self.analyze(url)),
            other => Err(EngineError::NotAString {
                found: json_type_name(other),
            }),
        }
    }

    /// Async wrapper for I/O-bound callers. The analysis itself never suspends.
    pub async fn analyze_async(&self, url: String) -> AnalysisResult {
        self.analyze(&url)
    }

    pub fn classify(&self, score: i32) -> Classification {
        self.rules.thresholds.classify(score)
    }

    fn unparseable(&self, url: &str) -> AnalysisResult {
        AnalysisResult {
            url: url.to_string(),
            risk_score: self.rules.weights.invalid_url,
            risk_level: RiskLevel::High,
            threats: vec![THREAT_INVALID_URL.to_string()],
            recommendations: recommendations::for_unparseable(),
            details: None,
            timestamp: Utc::now(),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::*;
    use crate::features::RiskLevel;

    fn engine() -> UrlRiskEngine {
        UrlRiskEngine::with_default_rules().unwrap()
    }

    #[test]
    fn test_trusted_secure_url_is_safe() {
        let result = engine().analyze("https://google.com/search?q=x");
        let details = result.details.as_ref().unwrap();

        assert_eq!(details.domain.risk_score, 0);
        assert!(details.domain.is_trusted);
        assert_eq!(details.protocol.risk_score, 0);
        assert_eq!(result.risk_score, 0);
        assert_eq!(result.risk_level, RiskLevel::Safe);
        assert!(result.threats.is_empty());
        assert_eq!(
            result.recommendations,
            vec!["This site appears to be safe", "You can use it normally"]
        );
    }

    #[test]
    fn test_ip_insecure_signature_composition() {
        let result = engine().analyze("http://123.45.67.89/verify-account-now");
        let details = result.details.as_ref().unwrap();

        assert_eq!(details.domain.risk_score, 30);
        assert_eq!(details.protocol.risk_score, 10);
        assert_eq!(details.patterns.risk_score, 25);
        assert_eq!(result.risk_score, 65);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(
            result.threats,
            vec![
                THREAT_SUSPICIOUS_DOMAIN,
                THREAT_INSECURE_CONNECTION,
                THREAT_MALICIOUS_PATTERN,
                THREAT_MEDIUM_RISK,
            ]
        );
        assert_eq!(
            result.recommendations.last().map(String::as_str),
            Some(recommendations::PREFER_HTTPS)
        );
    }

    #[test]
    fn test_extra_keyword_pushes_into_high() {
        let result = engine().analyze("http://123.45.67.89/verify-account-now?m=act now");
        assert_eq!(result.risk_score, 75);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.threats.last().map(String::as_str), Some(THREAT_HIGH_RISK));
    }

    #[test]
    fn test_redirect_counts_once() {
        let result = engine().analyze("https://example.org/?redirect=a&next=b");
        let details = result.details.as_ref().unwrap();
        assert_eq!(details.url_structure.risk_score, 20);
        assert!(result.threats.contains(&THREAT_SUSPICIOUS_REDIRECT.to_string()));
    }

    #[test]
    fn test_unparseable_input() {
        let result = engine().analyze("not a url");

        assert_eq!(result.url, "not a url");
        assert_eq!(result.risk_score, 90);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.threats, vec![THREAT_INVALID_URL.to_string()]);
        assert_eq!(result.recommendations, recommendations::for_unparseable());
        assert!(result.details.is_none());
        assert!(result.is_unparseable());
    }

    #[test]
    fn test_score_equals_sum_of_parts() {
        let engine = engine();
        for url in [
            "http://a.b.c.free-gift-card-now.tk/login/verify?url=x",
            "ftp://files.example.org/pub",
            "https://example.org/%41%42%43%44%45%46%47",
        ] {
            let result = engine.analyze(url);
            let details = result.details.as_ref().unwrap();
            assert_eq!(result.risk_score, details.total_score(), "{}", url);
        }
    }

    #[test]
    fn test_score_is_not_clamped() {
        let url = "http://a.b.c.win-free-cash-prize.tk/click here/free money/act now/security alert";
        let result = engine().analyze(url);
        assert!(result.risk_score > 100);
        assert_eq!(result.display_score(), 100);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_multi_hyphen_signature_is_case_sensitive() {
        let engine = engine();

        let mixed = engine.analyze("https://example.org/My-Cool-Shop.com");
        assert_eq!(mixed.risk_score, 0);
        assert_eq!(mixed.risk_level, RiskLevel::Safe);

        let lower = engine.analyze("https://example.org/my-cool-shop.com");
        assert_eq!(lower.risk_score, 25);
        assert_eq!(
            lower.details.unwrap().patterns.matched_patterns,
            vec!["pattern 9 matched (multi-hyphen-domain)".to_string()]
        );
    }

    #[test]
    fn test_deterministic_apart_from_timestamp() {
        let engine = engine();
        let url = "http://login-secure-update.example.tk/account?redirect=x";

        let mut first = engine.analyze(url);
        let second = engine.analyze(url);
        first.timestamp = second.timestamp;
        assert_eq!(first, second);
    }

    #[test]
    fn test_monotonic_in_keywords() {
        let engine = engine();
        let base = engine.analyze("https://example.org/promo");
        let more = engine.analyze("https://example.org/promo/exclusive offer");
        assert!(more.risk_score >= base.risk_score);
    }

    #[test]
    fn test_analyze_value_rejects_non_strings() {
        let engine = engine();

        let ok = engine
            .analyze_value(&serde_json::json!("https://github.com"))
            .unwrap();
        assert_eq!(ok.risk_level, RiskLevel::Safe);

        match engine.analyze_value(&serde_json::json!(42)) {
            Err(EngineError::NotAString { found }) => assert_eq!(found, "number"),
            other => panic!("expected NotAString, got {:?}", other),
        }
        assert!(engine.analyze_value(&serde_json::Value::Null).is_err());
    }

    #[test]
    fn test_classify_matches_analysis_thresholds() {
        let engine = engine();
        assert_eq!(engine.classify(70).level, RiskLevel::High);
        assert_eq!(engine.classify(40).level, RiskLevel::Medium);
        assert_eq!(engine.classify(20).level, RiskLevel::Low);
        assert_eq!(engine.classify(19).label, "Safe");
    }

    #[test]
    fn test_custom_thresholds_flow_through() {
        let config = RuleConfig {
            thresholds: crate::features::Thresholds {
                high: 10,
                medium: 5,
                low: 1,
            },
            ..RuleConfig::default()
        };
        let engine = UrlRiskEngine::from_config(&config).unwrap();

        let result = engine.analyze("http://example.org/");
        assert_eq!(result.risk_score, 10);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.threats.last().map(String::as_str), Some(THREAT_HIGH_RISK));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_rules() {
        let engine = engine();
        let mut handles = Vec::new();
        for i in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine
                    .analyze_async(format!("http://10.0.0.{}/", i))
                    .await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            // IP host (+30), http (+10), ip-literal signature (+25)
            assert_eq!(result.risk_score, 65);
        }
    }
}
