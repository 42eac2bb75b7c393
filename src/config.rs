use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8069";
pub const DEFAULT_FEEDBACK_DELAY_MS: u64 = 1500;
pub const DEFAULT_FEEDBACK_MIN_CHARS: usize = 20;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub base_url: String,
    pub session_id: Option<String>,
    pub feedback_delay: Duration,
    pub feedback_min_chars: usize,
    pub request_timeout: Duration,
    pub db_path: PathBuf,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_id: None,
            feedback_delay: Duration::from_millis(DEFAULT_FEEDBACK_DELAY_MS),
            feedback_min_chars: DEFAULT_FEEDBACK_MIN_CHARS,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            db_path: default_db_path(),
        }
    }
}

impl QuizConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = lookup("SLIDE_QUIZ_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);

        let session_id = lookup("SLIDE_QUIZ_SESSION_ID").filter(|s| !s.trim().is_empty());

        let feedback_delay = Duration::from_millis(parse_or(
            &lookup,
            "SLIDE_QUIZ_FEEDBACK_DELAY_MS",
            DEFAULT_FEEDBACK_DELAY_MS,
        ));
        let feedback_min_chars = parse_or(
            &lookup,
            "SLIDE_QUIZ_FEEDBACK_MIN_CHARS",
            DEFAULT_FEEDBACK_MIN_CHARS,
        );
        let request_timeout = Duration::from_secs(parse_or(
            &lookup,
            "SLIDE_QUIZ_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        ));

        let db_path = lookup("SLIDE_QUIZ_DB")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        Self {
            base_url,
            session_id,
            feedback_delay,
            feedback_min_chars,
            request_timeout,
            db_path,
        }
    }
}

fn parse_or<T: FromStr + Copy>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}

fn get_data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| "C:\\Users\\User".to_string());
        PathBuf::from(home).join(".local\\share\\slide-quiz")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/home/user".to_string());
        PathBuf::from(home).join(".local/share/slide-quiz")
    }
}

pub fn default_db_path() -> PathBuf {
    get_data_dir().join("drafts.db")
}
