use std::env;

/// Default license validity when the issuer does not specify one.
pub const DEFAULT_VALIDITY_DAYS: i64 = 365;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Exact origin allowed to call the API from a browser (the ebook frontend).
    pub allowed_origin: Option<String>,
    /// Resend API key for welcome emails. None disables outbound mail.
    pub resend_api_key: Option<String>,
    /// From address for welcome emails.
    pub email_from: String,
    pub default_validity_days: i64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        // Binds all interfaces by default: the service runs behind the
        // hosting platform's edge, not on a trusted loopback.
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "bookkey.db".to_string()),
            allowed_origin: env::var("ALLOWED_ORIGIN").ok(),
            resend_api_key: env::var("RESEND_API_KEY").ok(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "licenses@localhost".to_string()),
            default_validity_days: env::var("DEFAULT_VALIDITY_DAYS")
                .ok()
                .and_then(|d| d.parse().ok())
                .unwrap_or(DEFAULT_VALIDITY_DAYS),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
