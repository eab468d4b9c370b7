use std::{net::SocketAddr, str::FromStr, time::Duration};

#[derive(Clone, Debug, PartialEq)]
pub enum Env {
    Dev,
    Staging,
    Production,
}

impl Env {
    pub fn from_name(name: &str) -> Self {
        match name {
            "dev" => Env::Dev,
            "staging" => Env::Staging,
            "production" => Env::Production,
            _ => Env::Dev,
        }
    }

    pub fn from_env() -> Self {
        match var("ENVIRONMENT") {
            Ok(Some(env)) => Env::from_name(env.as_str()),
            _ => Env::Dev,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub env: Env,
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub database_max_connections: usize,
    pub database_timeout: Duration,
    pub cors_allowed_origins: Vec<String>,
    pub comment_max_length: usize,
}

pub const DEFAULT_COMMENT_MAX_LENGTH: usize = 5000;

fn var(key: &str) -> Result<Option<String>, String> {
    match std::env::var(key) {
        Ok(env) => Ok(Some(env)),
        Err(e) => {
            tracing::warn!("Missing environment variable `{key}`");
            match e {
                std::env::VarError::NotPresent => Ok(None),
                std::env::VarError::NotUnicode(_) => Err(format!(
                    "Could not get the environment variable `{key}` due to unicode error"
                )),
            }
        }
    }
}

fn required_var(key: &str) -> String {
    let val = var(key);
    match val {
        Ok(val) => match val {
            Some(val) => val,
            None => {
                tracing::error!("Environment variable `{key}` is required");
                std::process::exit(1)
            }
        },
        Err(e) => {
            tracing::error!(
                "Environment variable `{key}` is required, but could not retrieve: {e}"
            );
            std::process::exit(1)
        }
    }
}

/// Parses `key` if set, falling back to `default` when it is absent or
/// malformed.
fn parsed_var<T: FromStr>(key: &str, default: T) -> T {
    match var(key) {
        Ok(Some(raw)) => parse_or(key, &raw, default),
        _ => default,
    }
}

fn parse_or<T: FromStr>(key: &str, raw: &str, default: T) -> T {
    match raw.trim().parse() {
        Ok(val) => val,
        Err(_) => {
            tracing::warn!("Environment variable `{key}` has an invalid value `{raw}`, ignoring");
            default
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl ServerConfig {
    pub fn new_from_env() -> Self {
        let port: u16 = parsed_var("PORT", 3000);

        ServerConfig {
            env: Env::from_env(),
            database_url: required_var("DATABASE_URL"),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            database_max_connections: parsed_var("DATABASE_MAX_CONNECTIONS", 10),
            database_timeout: Duration::from_secs(parsed_var("DATABASE_TIMEOUT_SECS", 10)),
            cors_allowed_origins: match var("CORS_ALLOWED_ORIGINS") {
                Ok(Some(origins)) => split_list(&origins),
                _ => vec![],
            },
            comment_max_length: parsed_var("COMMENT_MAX_LENGTH", DEFAULT_COMMENT_MAX_LENGTH),
        }
    }
}
