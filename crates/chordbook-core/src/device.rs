//! Device identity

/// Mint an opaque identifier for this installation.
///
/// The host name (when the environment exposes one) keeps ids readable in
/// metadata dumps; the UUID keeps them unique.
pub fn generate_device_id() -> String {
    let host = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .map(|name| sanitize_host(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "device".to_string());
    format!("{host}-{}", uuid::Uuid::now_v7())
}

fn sanitize_host(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(32)
        .collect::<String>()
        .to_ascii_lowercase()
}
