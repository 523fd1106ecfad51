use crate::config::rules::RuleSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolResult {
    /// Scheme without the trailing colon, e.g. `https`
    pub protocol: String,
    pub risk_score: i32,
    pub flags: Vec<String>,
    pub is_secure: bool,
}

pub fn analyze_protocol(scheme: &str, rules: &RuleSet) -> ProtocolResult {
    let protocol = scheme.trim_end_matches(':').to_lowercase();
    let mut result = ProtocolResult {
        protocol: protocol.clone(),
        risk_score: 0,
        flags: Vec::new(),
        is_secure: false,
    };

    match protocol.as_str() {
        "https" => {
            result.is_secure = true;
            result.flags.push("secure connection (HTTPS)".to_string());
        }
        "http" => {
            result.risk_score += rules.weights.insecure_protocol;
            result.flags.push("insecure connection (HTTP)".to_string());
        }
        other => {
            result.risk_score += rules.weights.nonstandard_protocol;
            result.flags.push(format!("non-standard protocol: {}", other));
        }
    }

    result
}
