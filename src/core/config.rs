use std::env;
use std::time::Duration;

pub const DEFAULT_CLEAR_PROMPT_THRESHOLD: usize = 20;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub storage_path: String,
    pub db_path: String,
    pub clear_prompt_threshold: usize,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api_url =
            env::var("LEADERCHAT_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
        // An empty token is the same as no token
        let auth_token = env::var("LEADERCHAT_AUTH_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        let storage_path = env::var("LEADERCHAT_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path.trim_end_matches('/'));
        let clear_prompt_threshold = env::var("LEADERCHAT_CLEAR_PROMPT_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_CLEAR_PROMPT_THRESHOLD);
        let request_timeout = env::var("LEADERCHAT_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));

        Self {
            api_url,
            auth_token,
            storage_path,
            db_path,
            clear_prompt_threshold,
            request_timeout,
        }
    }
}
