// Runtime configuration, read from the environment

pub const DEFAULT_API_URL: &str = "https://labdados.com/produtos";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

pub const API_URL_VAR: &str = "SALES_API_URL";
pub const BIND_ADDR_VAR: &str = "DASHBOARD_ADDR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Sales API endpoint queried with `regiao` and `ano`
    pub api_url: String,
    /// Address the web server listens on
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Config {
            api_url: get(API_URL_VAR, DEFAULT_API_URL),
            bind_addr: get(BIND_ADDR_VAR, DEFAULT_BIND_ADDR),
        }
    }
}
