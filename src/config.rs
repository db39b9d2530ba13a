use std::path::PathBuf;

use crate::domain::order::TransitionPolicy;

/// Service configuration
///
/// | Variable | Default | |
/// |----------|---------|---|
/// | HTTP_PORT | 9090 | metrics, health and read endpoints |
/// | EXPORT_DIR | ./exports | where preparation lists are written |
/// | TRANSITION_POLICY | permissive | `permissive` or `strict` |
/// | SEED_DEMO_DATA | true | create demo customers and orders on startup |
///
/// Values that fail to parse fall back to the default.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_port: u16,
    pub export_dir: PathBuf,
    pub transition_policy: TransitionPolicy,
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: 9090,
            export_dir: PathBuf::from("./exports"),
            transition_policy: TransitionPolicy::Permissive,
            seed_demo_data: true,
        }
    }
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let transition_policy = match lookup("TRANSITION_POLICY") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Unknown TRANSITION_POLICY, using permissive");
                defaults.transition_policy
            }),
            None => defaults.transition_policy,
        };

        Self {
            http_port: lookup("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.http_port),
            export_dir: lookup("EXPORT_DIR")
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            transition_policy,
            seed_demo_data: lookup("SEED_DEMO_DATA")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.seed_demo_data),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.export_dir, PathBuf::from("./exports"));
        assert_eq!(config.transition_policy, TransitionPolicy::Permissive);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HTTP_PORT", "8088"),
            ("EXPORT_DIR", "/tmp/lists"),
            ("TRANSITION_POLICY", "strict"),
            ("SEED_DEMO_DATA", "no"),
        ]);
        assert_eq!(config.http_port, 8088);
        assert_eq!(config.export_dir, PathBuf::from("/tmp/lists"));
        assert_eq!(config.transition_policy, TransitionPolicy::Strict);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = config_from(&[
            ("HTTP_PORT", "not-a-port"),
            ("TRANSITION_POLICY", "sideways"),
            ("SEED_DEMO_DATA", "maybe"),
        ]);
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.transition_policy, TransitionPolicy::Permissive);
        assert!(config.seed_demo_data);
    }
}
