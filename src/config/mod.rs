use std::env;

const DEFAULT_NOTIFICATION_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Bookify backend
    pub bookify_api_url: String,
    pub bookify_api_key: String,

    // Notifications
    pub notification_capacity: usize,

    // Logging
    pub log_json: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bookify_api_url = env::var("BOOKIFY_API_URL")
            .map_err(|_| anyhow::anyhow!("BOOKIFY_API_URL must be set"))?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            bookify_api_url: bookify_api_url.trim_end_matches('/').to_string(),
            bookify_api_key: env::var("BOOKIFY_API_KEY")
                .map_err(|_| anyhow::anyhow!("BOOKIFY_API_KEY must be set"))?,

            notification_capacity: env::var("NOTIFICATION_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_NOTIFICATION_CAPACITY),

            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Config pointing at a given backend, with defaults for everything else.
    pub fn for_backend(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            bookify_api_url: api_url.trim_end_matches('/').to_string(),
            bookify_api_key: api_key.into(),
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
            log_json: false,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
