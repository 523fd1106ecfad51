use crate::features::RiskLevel;

pub const PREFER_HTTPS: &str = "Prefer sites that use a secure HTTPS connection";

fn level_advice(level: RiskLevel) -> &'static [&'static str] {
    match level {
        RiskLevel::High => &[
            "Do not visit this site",
            "Never enter personal information on this site",
            "Do not share this link with others",
        ],
        RiskLevel::Medium => &[
            "Proceed with caution",
            "Take extra care before entering personal information",
            "Double-check the URL before continuing",
        ],
        RiskLevel::Low => &[
            "Follow general browsing precautions",
            "Be mindful of protecting your personal information",
        ],
        RiskLevel::Safe => &[
            "This site appears to be safe",
            "You can use it normally",
        ],
    }
}

/// Level-specific advice first, transport advice last.
pub fn generate(level: RiskLevel, is_secure: bool) -> Vec<String> {
    let mut recommendations: Vec<String> =
        level_advice(level).iter().map(|s| s.to_string()).collect();

    if !is_secure {
        recommendations.push(PREFER_HTTPS.to_string());
    }

    recommendations
}

/// Advice for input that could not be parsed: the high-risk set on its own.
pub fn for_unparseable() -> Vec<String> {
    level_advice(RiskLevel::High)
        .iter()
        .map(|s| s.to_string())
        .collect()
}
