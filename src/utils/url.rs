//! Endpoint URL construction.

/// Join a base URL and an endpoint path with exactly one slash between them.
///
/// # Examples
///
/// ```
/// use gyaan::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.groq.com/openai/v1/", "/chat/completions"),
///     "https://api.groq.com/openai/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_regardless_of_slashes() {
        let expected = "https://api.groq.com/openai/v1/chat/completions";
        for (base, endpoint) in [
            ("https://api.groq.com/openai/v1", "chat/completions"),
            ("https://api.groq.com/openai/v1/", "chat/completions"),
            ("https://api.groq.com/openai/v1", "/chat/completions"),
            ("https://api.groq.com/openai/v1///", "//chat/completions"),
        ] {
            assert_eq!(construct_api_url(base, endpoint), expected);
        }
    }

    #[test]
    fn keeps_ports_and_root_urls() {
        assert_eq!(
            construct_api_url("http://127.0.0.1:8080", "chat/completions"),
            "http://127.0.0.1:8080/chat/completions"
        );
        assert_eq!(construct_api_url("", "models"), "/models");
    }
}
