use reqwest::Client;
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 200;

pub fn build_source_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Strip the API key out of an error body and cap its length.
pub fn sanitize_error_body(body: &str, api_key: &str) -> String {
    let scrubbed = if api_key.is_empty() {
        body.to_string()
    } else {
        body.replace(api_key, "[REDACTED]")
    };

    if scrubbed.chars().count() <= MAX_ERROR_BODY_CHARS {
        return scrubbed;
    }

    let mut end = MAX_ERROR_BODY_CHARS;
    while end > 0 && !scrubbed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &scrubbed[..end])
}
