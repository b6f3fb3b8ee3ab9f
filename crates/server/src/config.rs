use clap::Parser;

/// Server settings, from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "agora forum backend")]
pub struct Config {
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8888")]
    pub bind: String,
    #[arg(long, env = "DB_URL")]
    pub db_url: String,
    #[arg(long, env = "JWT_SECRET", default_value = "", hide_env_values = true)]
    pub secret: String,
    /// Public origin of the site, used for the CSRF origin check.
    #[arg(long, env = "BASE_URL", default_value = "http://localhost:8888")]
    pub base_url: String,
    #[arg(long, env = "SECURE_COOKIES", default_value_t = true, action = clap::ArgAction::Set)]
    pub secure_cookies: bool,
    #[arg(long, env = "WORKERS", default_value_t = 4)]
    pub workers: usize,
    /// Page prefixes that always redirect home.
    #[arg(long, env = "MAINTENANCE", value_delimiter = ',')]
    pub maintenance: Vec<String>,
}

impl Config {
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self.maintenance.retain(|p| !p.trim().is_empty());
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingSecret,
    NoWorkers,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSecret => write!(f, "JWT_SECRET must be set and non-empty"),
            Self::NoWorkers => write!(f, "WORKERS must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("backend").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn empty_secret_is_fatal() {
        let config = parse(&["--db-url", "postgres://x", "--secret", "  "]);
        assert_eq!(config.validate().unwrap_err(), ConfigError::MissingSecret);
    }

    #[test]
    fn base_url_and_maintenance_are_normalised() {
        let config = parse(&[
            "--db-url",
            "postgres://x",
            "--secret",
            "s3cret",
            "--base-url",
            "https://forum.example/",
            "--maintenance",
            "/group,,/account",
        ])
        .validate()
        .unwrap();
        assert_eq!(config.base_url, "https://forum.example");
        assert_eq!(config.maintenance, ["/group", "/account"]);
        assert!(config.secure_cookies);
    }
}
