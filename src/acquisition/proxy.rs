//! Rotating proxy pool for browser-based acquisition.
//!
//! Proxy supply is a best-effort optimization, never a correctness
//! dependency: an empty pool means direct connections.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One outbound egress point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyEntry {
    pub address: String,
    pub port: u16,
    pub protocols: Vec<String>,
    pub anonymity_level: String,
    pub country: String,
    pub latency_ms: u64,
    pub up_time_ratio: f64,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl ProxyEntry {
    /// Chrome-style `--proxy-server` value.
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }
}

/// Round-robin pool over a list loaded once at startup. The list is
/// immutable for the process lifetime; only the cursor advances, and it
/// is safe to advance from concurrent acquisitions.
pub struct ProxyPool {
    proxies: Vec<ProxyEntry>,
    cursor: AtomicUsize,
}

impl ProxyPool {
    /// An empty pool: every `next()` is a direct connection.
    pub fn empty() -> Self {
        Self {
            proxies: Vec::new(),
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn new(proxies: Vec<ProxyEntry>) -> Self {
        Self {
            proxies,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Load a pool from a JSON proxy dump.
    ///
    /// Keeps only entries advertising HTTP protocol support. Malformed
    /// entries are skipped with a warning; a missing or unparsable file
    /// degrades to an empty pool rather than failing startup.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("Proxy file {} not readable: {}", path.display(), e);
                return Self::empty();
            }
        };
        let raw: Vec<serde_json::Value> = match serde_json::from_str(&data) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Proxy file {} is not a JSON array: {}", path.display(), e);
                return Self::empty();
            }
        };

        let total = raw.len();
        let proxies: Vec<ProxyEntry> = raw.iter().filter_map(parse_entry).collect();
        info!(
            "Loaded {} HTTP proxies from {} ({} entries total)",
            proxies.len(),
            path.display(),
            total
        );
        Self::new(proxies)
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Next proxy in round-robin order, or `None` when the pool is empty
    /// (callers treat that as a valid direct-connection fallback).
    pub fn next(&self) -> Option<&ProxyEntry> {
        if self.proxies.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.proxies.len();
        Some(&self.proxies[index])
    }

    /// Random subset of up to `count` proxies, without replacement.
    pub fn sample(&self, count: usize) -> Vec<&ProxyEntry> {
        let mut rng = rand::thread_rng();
        self.proxies
            .choose_multiple(&mut rng, count.min(self.proxies.len()))
            .collect()
    }

    pub fn entries(&self) -> &[ProxyEntry] {
        &self.proxies
    }
}

/// Parse one dump entry, tolerating the field variance seen in public
/// proxy lists (string or numeric ports, absent quality fields).
fn parse_entry(value: &serde_json::Value) -> Option<ProxyEntry> {
    let address = value.get("ip").and_then(|v| v.as_str());
    let port = value.get("port").and_then(|v| match v {
        serde_json::Value::String(s) => s.parse::<u16>().ok(),
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        _ => None,
    });
    let protocols: Vec<String> = value
        .get("protocols")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|p| p.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let (Some(address), Some(port)) = (address, port) else {
        warn!("Skipping malformed proxy entry: {}", value);
        return None;
    };
    if !protocols.iter().any(|p| p == "http") {
        return None;
    }

    Some(ProxyEntry {
        address: address.to_string(),
        port,
        protocols,
        anonymity_level: value
            .get("anonymityLevel")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string(),
        country: value
            .get("country")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string(),
        latency_ms: value.get("latency").and_then(|v| v.as_u64()).unwrap_or(0),
        up_time_ratio: value.get("upTime").and_then(|v| v.as_f64()).unwrap_or(0.0),
        last_checked_at: value
            .get("lastChecked")
            .and_then(|v| v.as_i64())
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn entry(address: &str) -> ProxyEntry {
        ProxyEntry {
            address: address.to_string(),
            port: 8080,
            protocols: vec!["http".to_string()],
            anonymity_level: "elite".to_string(),
            country: "US".to_string(),
            latency_ms: 120,
            up_time_ratio: 0.9,
            last_checked_at: None,
        }
    }

    #[test]
    fn test_round_robin_visits_every_entry_once() {
        let pool = ProxyPool::new(vec![entry("10.0.0.1"), entry("10.0.0.2"), entry("10.0.0.3")]);
        let first_cycle: Vec<String> = (0..3)
            .map(|_| pool.next().unwrap().address.clone())
            .collect();
        let unique: HashSet<_> = first_cycle.iter().collect();
        assert_eq!(unique.len(), 3);
        // Fourth call wraps back to the first served entry.
        assert_eq!(pool.next().unwrap().address, first_cycle[0]);
    }

    #[test]
    fn test_empty_pool_yields_direct_connection() {
        let pool = ProxyPool::empty();
        assert!(pool.next().is_none());
        assert!(pool.sample(3).is_empty());
    }

    #[test]
    fn test_sample_without_replacement() {
        let pool = ProxyPool::new(vec![entry("10.0.0.1"), entry("10.0.0.2"), entry("10.0.0.3")]);
        let sampled = pool.sample(5);
        assert_eq!(sampled.len(), 3);
        let unique: HashSet<_> = sampled.iter().map(|p| &p.address).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_load_filters_and_tolerates_malformed() {
        let json = serde_json::json!([
            {"ip": "10.0.0.1", "port": "8080", "protocols": ["http", "https"], "country": "US",
             "anonymityLevel": "elite", "latency": 42, "upTime": 99.5},
            {"ip": "10.0.0.2", "port": 3128, "protocols": ["socks5"]},
            {"ip": "10.0.0.3", "protocols": ["http"]},
            {"port": 8080, "protocols": ["http"]},
            {"ip": "10.0.0.4", "port": 1080, "protocols": ["http"]}
        ]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxies.json");
        std::fs::write(&path, json.to_string()).unwrap();

        let pool = ProxyPool::load(&path);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.entries()[0].address, "10.0.0.1");
        assert_eq!(pool.entries()[0].port, 8080);
        assert_eq!(pool.entries()[1].address, "10.0.0.4");
    }

    #[test]
    fn test_load_missing_file_is_empty_pool() {
        let pool = ProxyPool::load(Path::new("/nonexistent/proxies.json"));
        assert!(pool.is_empty());
    }
}
