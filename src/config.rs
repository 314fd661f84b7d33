//! Server configuration loaded from environment variables

use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    /// Path of the question bank JSON file
    pub questions_path: PathBuf,
    /// Re-read the question bank on every lookup instead of caching it
    pub questions_reload: bool,
    /// Seconds a team has to answer once it holds the floor
    pub answer_seconds: u64,
    /// Seconds between everyone being ready and the game starting
    pub lobby_countdown_seconds: u64,
    /// Players needed before a ready lobby starts counting down
    pub min_ready_players: usize,
    pub static_dir: PathBuf,
    pub index_url: String,
    pub lobby_url: String,
    pub board_url: String,
    pub results_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            questions_path: PathBuf::from("questions.json"),
            questions_reload: false,
            answer_seconds: 30,
            lobby_countdown_seconds: 10,
            min_ready_players: 2,
            static_dir: PathBuf::from("static"),
            index_url: "/".to_string(),
            lobby_url: "/lobby".to_string(),
            board_url: "/game".to_string(),
            results_url: "/results".to_string(),
        }
    }
}

/// Read a trimmed, non-empty environment variable
fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse an environment variable, falling back to `default` when it is
/// missing or invalid
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match env_string(key) {
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
                default
            }
        },
        None => default,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match env_string(key).map(|s| s.to_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        Some(other) => {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, other);
            default
        }
        None => default,
    }
}

impl AppConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            port: env_parse("PORT", defaults.port),
            questions_path: env_string("QUESTIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.questions_path),
            questions_reload: env_bool("QUESTIONS_RELOAD", defaults.questions_reload),
            answer_seconds: env_parse("ANSWER_SECONDS", defaults.answer_seconds),
            lobby_countdown_seconds: env_parse(
                "LOBBY_COUNTDOWN_SECONDS",
                defaults.lobby_countdown_seconds,
            ),
            min_ready_players: env_parse("MIN_READY_PLAYERS", defaults.min_ready_players),
            static_dir: env_string("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            index_url: env_string("INDEX_URL").unwrap_or(defaults.index_url),
            lobby_url: env_string("LOBBY_URL").unwrap_or(defaults.lobby_url),
            board_url: env_string("BOARD_URL").unwrap_or(defaults.board_url),
            results_url: env_string("RESULTS_URL").unwrap_or(defaults.results_url),
        };

        tracing::info!(
            "Config: port={}, questions={} (reload={}), answer={}s, countdown={}s",
            config.port,
            config.questions_path.display(),
            config.questions_reload,
            config.answer_seconds,
            config.lobby_countdown_seconds
        );
        config
    }
}
