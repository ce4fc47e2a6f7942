// =============================================================================
// config.rs - THE CONTROL PANEL
// =============================================================================
//
// Everything tunable lives here. All values come from environment variables
// (optionally seeded from a .env file) and every one of them has a default,
// so the engine boots with zero configuration and fetches pages directly.
//
// The one setting that is NOT frozen at startup is the outbound proxy. It is
// re-read from CRAWLER_PROXY at the start of every batch, so flipping the
// variable mid-process reroutes the next batch without touching the ones
// already on the wire.
// =============================================================================

use std::env;
use std::time::Duration;

/// Environment variable holding the upstream proxy address.
pub const PROXY_ENV: &str = "CRAWLER_PROXY";

/// A desktop Chrome circa 2017. Plenty of servers still slam the door on
/// anything that admits to being a bot, so we don't admit it.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/56.0.2924.87 Safari/537.36";

/// Engine configuration. Built once in `main` and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // SERVER
    // =========================================================================

    /// Interface to bind. Default: 0.0.0.0
    pub host: String,

    /// Port to bind. Read from plain `PORT`, the way most PaaS hosts hand it
    /// out. Default: 8080
    pub port: u16,

    // =========================================================================
    // FETCHING
    // =========================================================================

    /// Hard ceiling on a single fetch: connect, send, and read the whole
    /// body. Default: 5 seconds.
    pub fetch_timeout: Duration,

    /// User-Agent sent with every request.
    pub user_agent: String,

    /// Per-batch cap on units fetching at once. `None` means every URL in the
    /// batch goes out at the same time. Default: unbounded (0).
    pub max_in_flight: Option<usize>,

    // =========================================================================
    // EXTRACTION
    // =========================================================================

    /// Column width the text renderer wraps at. Default: 120
    pub text_width: usize,

    // =========================================================================
    // LOGGING
    // =========================================================================

    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            fetch_timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_in_flight: None,
            text_width: 120,
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        // A missing .env is the normal case in containers.
        let _ = dotenvy::dotenv();

        let defaults = Config::default();

        Config {
            host: env_or_default("CRAWLER_HOST", &defaults.host),
            port: env_or_default("PORT", "8080").parse().unwrap_or(defaults.port),

            fetch_timeout: Duration::from_secs(
                env_or_default("CRAWLER_FETCH_TIMEOUT_SECS", "5").parse().unwrap_or(5),
            ),
            user_agent: env_or_default("CRAWLER_USER_AGENT", DEFAULT_USER_AGENT),
            max_in_flight: parse_in_flight(&env_or_default("CRAWLER_MAX_IN_FLIGHT", "0")),

            text_width: env_or_default("CRAWLER_TEXT_WIDTH", "120")
                .parse()
                .ok()
                .filter(|w: &usize| *w > 0)
                .unwrap_or(defaults.text_width),

            log_json: parse_flag(&env_or_default("CRAWLER_LOG_JSON", "false")),
        }
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The proxy address as of right now. Called once per batch; the value is
    /// then handed down to every unit of that batch.
    pub fn current_proxy(&self) -> Option<String> {
        normalize_proxy(env::var(PROXY_ENV).ok())
    }
}

/// Empty and whitespace-only proxy values mean "connect directly".
pub fn normalize_proxy(raw: Option<String>) -> Option<String> {
    raw.map(|p| p.trim().to_string()).filter(|p| !p.is_empty())
}

fn parse_in_flight(raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Read an environment variable, or the default when it isn't set.
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
