use crate::config::rules::RuleSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternResult {
    pub risk_score: i32,
    pub flags: Vec<String>,
    pub matched_patterns: Vec<String>,
}

/// Scan the full URL text against signatures, keywords and phishing indicators.
///
/// Signatures are first-match-wins: at most one contributes. Keywords and
/// indicators are counted across the whole list, one hit per distinct entry.
pub fn analyze_patterns(url: &str, rules: &RuleSet) -> PatternResult {
    let weights = &rules.weights;
    let mut result = PatternResult {
        risk_score: 0,
        flags: Vec::new(),
        matched_patterns: Vec::new(),
    };

    if let Some(signature) = rules.signatures.iter().find(|s| s.regex.is_match(url)) {
        result.risk_score += weights.malicious_pattern;
        result.matched_patterns.push(format!(
            "pattern {} matched ({})",
            signature.number, signature.name
        ));
        result.flags.push("known malicious pattern found".to_string());
    }

    let url_lower = url.to_lowercase();

    let keyword_hits: Vec<&String> = rules
        .suspicious_keywords
        .iter()
        .filter(|keyword| url_lower.contains(keyword.as_str()))
        .collect();
    if !keyword_hits.is_empty() {
        for keyword in &keyword_hits {
            result.matched_patterns.push(format!("keyword: {}", keyword));
        }
        result.risk_score += weights.suspicious_keyword * keyword_hits.len() as i32;
        result
            .flags
            .push(format!("{} suspicious keyword(s) found", keyword_hits.len()));
    }

    let indicator_hits: Vec<&String> = rules
        .phishing_indicators
        .iter()
        .filter(|indicator| url_lower.contains(indicator.as_str()))
        .collect();
    if !indicator_hits.is_empty() {
        for indicator in &indicator_hits {
            result
                .matched_patterns
                .push(format!("phishing indicator: {}", indicator));
        }
        result.risk_score += weights.phishing_indicator * indicator_hits.len() as i32;
        result
            .flags
            .push(format!("{} phishing indicator(s) found", indicator_hits.len()));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rules::{RuleConfig, SignatureConfig};

    fn rules() -> RuleSet {
        RuleConfig::default().compile().unwrap()
    }

    #[test]
    fn test_clean_url() {
        let result = analyze_patterns("https://example.org/docs", &rules());
        assert_eq!(result.risk_score, 0);
        assert!(result.matched_patterns.is_empty());
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_first_signature_wins() {
        // Matches both "ip-literal" (7) and "low-trust-tld" (8); only one counts
        let result = analyze_patterns("http://10.0.0.1/files.download", &rules());
        assert_eq!(result.risk_score, 25);
        assert_eq!(
            result.matched_patterns,
            vec!["pattern 7 matched (ip-literal)".to_string()]
        );
    }

    #[test]
    fn test_keywords_accumulate() {
        let url = "https://example.org/click here/free money/limited time";
        let result = analyze_patterns(url, &rules());
        let keywords = result
            .matched_patterns
            .iter()
            .filter(|m| m.starts_with("keyword: "))
            .count();
        assert_eq!(keywords, 3);
        // "click here" also trips the click-urgency signature
        assert_eq!(result.risk_score, 25 + 3 * 10);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let config = RuleConfig {
            malicious_patterns: Vec::new(),
            suspicious_keywords: vec!["Free Money".to_string()],
            phishing_indicators: Vec::new(),
            ..RuleConfig::default()
        };
        let rules = config.compile().unwrap();

        let result = analyze_patterns("https://example.org/FREE MONEY", &rules);
        assert_eq!(result.risk_score, 10);
        assert_eq!(result.matched_patterns, vec!["keyword: free money".to_string()]);
    }

    #[test]
    fn test_phishing_indicators_weighted_higher() {
        let config = RuleConfig {
            malicious_patterns: Vec::new(),
            suspicious_keywords: Vec::new(),
            ..RuleConfig::default()
        };
        let rules = config.compile().unwrap();

        let result = analyze_patterns(
            "https://example.org/security alert/billing issue",
            &rules,
        );
        assert_eq!(result.risk_score, 2 * 15);
        assert_eq!(result.flags, vec!["2 phishing indicator(s) found".to_string()]);
    }

    #[test]
    fn test_default_korean_keyword_and_indicator() {
        let rules = rules();

        let keyword = analyze_patterns("https://example.org/긴급", &rules);
        assert_eq!(keyword.risk_score, 10);
        assert_eq!(keyword.matched_patterns, vec!["keyword: 긴급".to_string()]);

        let indicator = analyze_patterns("https://example.org/보안 경고", &rules);
        assert_eq!(indicator.risk_score, 15);
        assert_eq!(
            indicator.matched_patterns,
            vec!["phishing indicator: 보안 경고".to_string()]
        );
    }

    #[test]
    fn test_empty_rule_lists_contribute_nothing() {
        let config = RuleConfig {
            malicious_patterns: Vec::new(),
            suspicious_keywords: Vec::new(),
            phishing_indicators: Vec::new(),
            ..RuleConfig::default()
        };
        let rules = config.compile().unwrap();

        let result = analyze_patterns("http://1.2.3.4/click here/security alert", &rules);
        assert_eq!(result.risk_score, 0);
    }

    #[test]
    fn test_adding_keyword_never_decreases_score() {
        let rules = rules();
        let base = analyze_patterns("https://example.org/offer", &rules);
        let more = analyze_patterns("https://example.org/offer/act now", &rules);
        assert!(more.risk_score >= base.risk_score);
    }

    #[test]
    fn test_custom_signature_fixture() {
        let config = RuleConfig {
            malicious_patterns: vec![SignatureConfig {
                name: "wallet-drain".to_string(),
                pattern: r"(?i)connect-wallet".to_string(),
            }],
            suspicious_keywords: Vec::new(),
            phishing_indicators: Vec::new(),
            ..RuleConfig::default()
        };
        let rules = config.compile().unwrap();

        let result = analyze_patterns("https://example.org/Connect-Wallet", &rules);
        assert_eq!(
            result.matched_patterns,
            vec!["pattern 1 matched (wallet-drain)".to_string()]
        );
    }
}
