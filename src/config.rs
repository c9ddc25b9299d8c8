//! Server configuration. The embedding binary owns file I/O; this struct
//! deserializes from whatever it reads and every field has a sane default
//! for tests and local play.

use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Where the game listener binds.
    pub listen_addr: SocketAddr,
    /// Simultaneous connections accepted before the accept loop blocks.
    pub max_clients: usize,
    /// Bound of each client's outbound queue.
    pub send_queue_capacity: usize,
    /// Largest accepted inbound packet body.
    pub max_inbound_body: usize,
    /// Largest payload the pooled write buffers can frame.
    pub pool_payload_cap: usize,
    /// Buffers retained by the write pool.
    pub pool_max_buffers: usize,
    /// Visibility batch period, in milliseconds.
    pub visibility_refresh_ms: u64,
    /// Minimum spacing between social actions, in milliseconds.
    pub social_cooldown_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:7777".parse().expect("valid default addr"),
            max_clients: 1024,
            send_queue_capacity: 128,
            max_inbound_body: 8192,
            pool_payload_cap: 8192,
            pool_max_buffers: 256,
            visibility_refresh_ms: 100,
            social_cooldown_ms: 2600,
        }
    }
}

impl ServerConfig {
    pub fn visibility_refresh(&self) -> Duration {
        Duration::from_millis(self.visibility_refresh_ms)
    }

    pub fn social_cooldown(&self) -> Duration {
        Duration::from_millis(self.social_cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = ServerConfig::default();

        assert!(config.max_clients > 0);
        assert!(config.send_queue_capacity > 0);
        assert_eq!(config.visibility_refresh(), Duration::from_millis(100));
    }

    #[test]
    fn partial_toml_overrides_merge_with_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            listen_addr = "127.0.0.1:7788"
            send_queue_capacity = 64
            visibility_refresh_ms = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.listen_addr.port(), 7788);
        assert_eq!(config.send_queue_capacity, 64);
        assert_eq!(config.visibility_refresh(), Duration::from_millis(50));

        // Untouched fields keep their defaults.
        assert_eq!(config.max_inbound_body, 8192);
        assert_eq!(config.social_cooldown_ms, 2600);
    }
}
