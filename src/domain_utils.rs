/// Minimal hostname utilities shared by the analyzers
pub struct DomainUtils;

impl DomainUtils {
    /// Check if host matches any in list (with hierarchy support)
    pub fn matches_domain_list(host: &str, domain_list: &[String]) -> bool {
        let host_lower = host.to_lowercase();

        for pattern in domain_list {
            let pattern_lower = pattern.to_lowercase();
            if pattern_lower.is_empty() {
                continue;
            }

            // Exact match
            if host_lower == pattern_lower {
                return true;
            }

            // Subdomain match (host ends with .pattern)
            if host_lower.ends_with(&format!(".{}", pattern_lower)) {
                return true;
            }
        }

        false
    }

    /// Dotted-quad IPv4 literal: four runs of digits separated by dots
    pub fn is_ipv4_literal(host: &str) -> bool {
        let labels: Vec<&str> = host.split('.').collect();
        labels.len() == 4
            && labels
                .iter()
                .all(|label| !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Last dot-separated label, lowercased. `None` for single-label hosts.
    pub fn extract_tld(host: &str) -> Option<String> {
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() >= 2 {
            Some(parts.last()?.to_lowercase())
        } else {
            None
        }
    }

    pub fn label_count(host: &str) -> usize {
        host.split('.').count()
    }

    pub fn hyphen_count(host: &str) -> usize {
        host.matches('-').count()
    }

    /// Count `%XX` hex triplets in raw text
    pub fn percent_triplet_count(text: &str) -> usize {
        text.as_bytes()
            .windows(3)
            .filter(|w| w[0] == b'%' && w[1].is_ascii_hexdigit() && w[2].is_ascii_hexdigit())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_domain_list() {
        let domains = vec!["example.com".to_string(), "test.org".to_string()];

        assert!(DomainUtils::matches_domain_list("example.com", &domains));
        assert!(DomainUtils::matches_domain_list(
            "mail.example.com",
            &domains
        ));
        assert!(!DomainUtils::matches_domain_list("other.com", &domains));
        assert!(!DomainUtils::matches_domain_list(
            "notexample.com",
            &domains
        ));
    }

    #[test]
    fn test_empty_list_entry_matches_nothing() {
        let domains = vec![String::new()];
        assert!(!DomainUtils::matches_domain_list("example.com", &domains));
        assert!(!DomainUtils::matches_domain_list("", &domains));
    }

    #[test]
    fn test_ipv4_literal() {
        assert!(DomainUtils::is_ipv4_literal("123.45.67.89"));
        assert!(!DomainUtils::is_ipv4_literal("123.45.67"));
        assert!(!DomainUtils::is_ipv4_literal("a.b.c.d"));
        assert!(!DomainUtils::is_ipv4_literal("1.2.3.4.5"));
        assert!(!DomainUtils::is_ipv4_literal(""));
    }

    #[test]
    fn test_extract_tld() {
        assert_eq!(DomainUtils::extract_tld("example.TK"), Some("tk".to_string()));
        assert_eq!(DomainUtils::extract_tld("localhost"), None);
    }

    #[test]
    fn test_percent_triplets() {
        assert_eq!(DomainUtils::percent_triplet_count("a%20b%2Fc%zz"), 2);
        assert_eq!(DomainUtils::percent_triplet_count("%%41"), 1);
        assert_eq!(DomainUtils::percent_triplet_count("plain"), 0);
    }
}
