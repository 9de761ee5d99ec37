//! Command implementations.

use std::sync::Arc;

use anyhow::Context;

use crate::config::Settings;
use crate::llm::MessageClient;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind)?;
    println!("Starting leadforge server at http://{}:{}", host, port);
    println!("  Press Ctrl+C to stop");
    crate::server::serve(settings, &host, port).await
}

/// Acquire one profile and print it, optionally with a generated
/// message.
pub async fn cmd_acquire(
    settings: &Settings,
    url: &str,
    session_cookie: Option<&str>,
    api_only: bool,
    persistent: bool,
    message: bool,
) -> anyhow::Result<()> {
    let pool = Arc::new(settings.proxy_pool());
    let orchestrator = settings.build_orchestrator(pool);

    let outcome = if api_only {
        orchestrator.acquire_api_only(url, session_cookie).await
    } else {
        orchestrator.acquire(url, session_cookie, persistent).await
    }
    .map_err(|e| anyhow::anyhow!("acquisition failed ({}): {}", e.kind.as_str(), e.message))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&outcome.record).context("serializing profile record")?
    );
    eprintln!(
        "# strategy: {}, limited: {}",
        outcome.strategy,
        outcome.record.is_limited()
    );

    if message {
        let client = MessageClient::new(settings.llm.clone());
        println!("{}", client.generate_message(&outcome.record).await);
    }

    Ok(())
}

/// Show the loaded proxy pool.
pub fn cmd_proxies(settings: &Settings, sample: usize) -> anyhow::Result<()> {
    let pool = settings.proxy_pool();
    if pool.is_empty() {
        println!("No proxies loaded (proxy rotation disabled; using direct connections)");
        return Ok(());
    }

    println!("{} HTTP proxies loaded", pool.len());
    let entries: Vec<_> = if sample > 0 {
        pool.sample(sample)
    } else {
        pool.entries().iter().collect()
    };
    for proxy in entries {
        println!(
            "  {}:{}  {}  {}  {}ms  up {:.1}%",
            proxy.address,
            proxy.port,
            proxy.country,
            proxy.anonymity_level,
            proxy.latency_ms,
            proxy.up_time_ratio
        );
    }
    Ok(())
}

/// Parse a bind address that can be:
/// - Just a port: "5000" -> 127.0.0.1:5000
/// - Just a host: "0.0.0.0" -> 0.0.0.0:5000
/// - Host and port: "0.0.0.0:5000" -> 0.0.0.0:5000
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    Ok((bind.to_string(), 5000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        assert_eq!(
            parse_bind_address("5000").unwrap(),
            ("127.0.0.1".to_string(), 5000)
        );
        assert_eq!(
            parse_bind_address("0.0.0.0").unwrap(),
            ("0.0.0.0".to_string(), 5000)
        );
        assert_eq!(
            parse_bind_address("0.0.0.0:8080").unwrap(),
            ("0.0.0.0".to_string(), 8080)
        );
    }
}
