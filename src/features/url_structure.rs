use crate::config::rules::RuleSet;
use crate::domain_utils::DomainUtils;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlStructureResult {
    pub risk_score: i32,
    pub flags: Vec<String>,
    pub path_length: usize,
    pub parameter_count: usize,
    pub has_redirect: bool,
}

/// Inspect path, query and encoding. `raw` is the caller's original text,
/// used for the percent-encoding count before normalisation.
pub fn analyze_url_structure(raw: &str, parsed: &Url, rules: &RuleSet) -> UrlStructureResult {
    let weights = &rules.weights;
    let limits = &rules.limits;

    let mut result = UrlStructureResult {
        risk_score: 0,
        flags: Vec::new(),
        path_length: parsed.path().chars().count(),
        parameter_count: parsed.query_pairs().count(),
        has_redirect: false,
    };

    if result.path_length > limits.max_path_len {
        result.risk_score += weights.long_path;
        result.flags.push("unusually long path".to_string());
    }

    if result.parameter_count > limits.max_parameters {
        result.risk_score += weights.many_parameters;
        result.flags.push("excessive query parameters".to_string());
    }

    // Only the first configured name present counts
    let redirect = rules
        .redirect_params
        .iter()
        .find(|name| parsed.query_pairs().any(|(key, _)| key == name.as_str()));
    if let Some(name) = redirect {
        result.has_redirect = true;
        result.risk_score += weights.redirect_parameter;
        result.flags.push(format!("redirect parameter found: {}", name));
    }

    if DomainUtils::percent_triplet_count(raw) > limits.max_encoded_triplets {
        result.risk_score += weights.heavy_encoding;
        result.flags.push("excessive URL encoding".to_string());
    }

    result
}
