use crate::config::rules::RuleSet;
use crate::domain_utils::DomainUtils;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResult {
    pub hostname: String,
    pub risk_score: i32,
    pub flags: Vec<String>,
    pub is_trusted: bool,
    pub is_suspicious: bool,
}

/// Score a hostname. Trusted hosts short-circuit to zero; every other check is additive.
pub fn analyze_domain(hostname: &str, rules: &RuleSet) -> DomainResult {
    let mut result = DomainResult {
        hostname: hostname.to_string(),
        risk_score: 0,
        flags: Vec::new(),
        is_trusted: false,
        is_suspicious: false,
    };

    if DomainUtils::matches_domain_list(hostname, &rules.trusted_domains) {
        result.is_trusted = true;
        result.flags.push("trusted domain".to_string());
        return result;
    }

    let weights = &rules.weights;
    let limits = &rules.limits;

    if DomainUtils::is_ipv4_literal(hostname) {
        result.risk_score += weights.ip_host;
        result.flags.push("IP address used as host".to_string());
        result.is_suspicious = true;
    }

    if let Some(tld) = DomainUtils::extract_tld(hostname) {
        if rules.low_trust_tlds.contains(&tld) {
            result.risk_score += weights.low_trust_tld;
            result.flags.push(format!("low-trust top-level domain: .{}", tld));
            result.is_suspicious = true;
        }
    }

    if DomainUtils::hyphen_count(hostname) >= limits.min_hyphens {
        result.risk_score += weights.hyphenated_host;
        result.flags.push("excessive hyphens in hostname".to_string());
    }

    if DomainUtils::label_count(hostname) > limits.max_labels {
        result.risk_score += weights.deep_subdomain;
        result.flags.push("deeply nested subdomains".to_string());
    }

    if hostname.chars().count() > limits.max_hostname_len {
        result.risk_score += weights.long_hostname;
        result.flags.push("unusually long hostname".to_string());
    }

    result
}
