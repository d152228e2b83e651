//! Callback URL validation.
//!
//! The table service pushes deliveries from its own network, so a callback
//! pointing at a loopback or unspecified address can never be reached.

use std::net::IpAddr;

use rowhook_types::error::LifecycleError;

/// Reject callback URLs the table service cannot reach.
///
/// Matches `localhost` and `*.localhost`, the loopback ranges (`127.0.0.0/8`,
/// `::1`, IPv4-mapped loopback) and the unspecified addresses.
pub fn ensure_publicly_reachable(callback_url: &str) -> Result<(), LifecycleError> {
    let host = host_of(callback_url).ok_or_else(|| {
        LifecycleError::Configuration(format!(
            "callback URL '{callback_url}' does not contain a host"
        ))
    })?;

    if is_local_host(host) {
        return Err(LifecycleError::Configuration(format!(
            "The webhook cannot work on a local address (\"{callback_url}\"). \
             Either serve rowhook on a public domain or expose it through a tunnel, \
             then set `public_url` in config.toml."
        )));
    }

    Ok(())
}

/// Extract the host portion of a URL, without brackets for IPv6 literals.
fn host_of(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest
        .split(|c| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or_default();
    let authority = authority.rsplit_once('@').map_or(authority, |(_, a)| a);

    let host = if let Some(bracketed) = authority.strip_prefix('[') {
        bracketed.split_once(']').map(|(h, _)| h)?
    } else {
        authority.split(':').next().unwrap_or_default()
    };

    if host.is_empty() { None } else { Some(host) }
}

fn is_local_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_loopback() || v4.is_unspecified(),
        Ok(IpAddr::V6(v6)) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || v6.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback())
        }
        Err(_) => false,
    }
}
