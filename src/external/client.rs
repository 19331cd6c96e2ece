use std::sync::LazyLock;
use std::time::Duration;

/// User-Agent sent on every outbound request
pub fn user_agent() -> String {
    format!("review-notify/{}", crate::pkg_version())
}

/// Global HTTP client instance
///
/// Initialized lazily on first access and reused for every webhook toast.
///
/// # Features
/// - **Connection pooling**: Reuses TCP connections across toasts
/// - **Compression**: gzip responses
/// - **HTTP/2**: Adaptive window sizing and keep-alive
/// - **Timeouts**: 30s request timeout, 10s connect timeout; callers may
///   shorten the request timeout per call
/// - **Security**: Rustls for TLS (no OpenSSL dependency)
///
/// # Example
/// ```ignore
/// use crate::external::client::HTTP_CLIENT;
///
/// let response = HTTP_CLIENT
///     .post("https://bridge.local/toast")
///     .json(&payload)
///     .send()
///     .await?;
/// ```
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    let builder = reqwest::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        // Connection pooling
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        .gzip(true)
        .user_agent(user_agent());

    builder.build().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client, falling back to defaults");
        reqwest::Client::new()
    })
});
