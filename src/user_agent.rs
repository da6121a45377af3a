//! Shared User-Agent string for page and PDF requests.

/// Default User-Agent for all crawler traffic (identifies the tool and version).
#[must_use]
pub fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("proceedings-crawler/{version} (academic-research-tool)")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent_contains_crate_version() {
        let ua = default_user_agent();
        let version = ua
            .strip_prefix("proceedings-crawler/")
            .and_then(|s| s.split(' ').next())
            .unwrap();
        assert_eq!(version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_default_user_agent_is_ascii_header_value() {
        let ua = default_user_agent();
        assert!(ua.is_ascii());
        assert!(reqwest::header::HeaderValue::from_str(&ua).is_ok());
    }
}
