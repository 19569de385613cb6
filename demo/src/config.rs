use std::time::Duration;

use clap::Parser;

/// Walks a job through create, fetch, list, update and delete against a
/// live job service.
///
/// Every option falls back to its environment variable; a `.env` file in the
/// working directory is loaded first. Unset values stay blank.
#[derive(Debug, Clone, Parser)]
#[command(name = "job-demo", version)]
pub struct Config {
    /// Service URL the `?action=...` discriminator is appended to.
    #[arg(long, env = "API_BASE_URL", default_value = "")]
    pub base_url: String,

    #[arg(long, env = "API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Account that owns the demo job (its partition key).
    #[arg(long, env = "ACCOUNT_ID", default_value = "")]
    pub account_id: String,

    #[arg(long, env = "USER_ID", default_value = "")]
    pub user_id: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,
}

impl Config {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
