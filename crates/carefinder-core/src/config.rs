use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a working
/// development configuration pointed at a local backend.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let http_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Ok(trimmed.to_string())
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected an http(s) URL, got '{raw}'"),
            })
        }
    };

    let log_level = or_default("CAREFINDER_LOG_LEVEL", "info");

    let api_base_url = http_url("CAREFINDER_API_BASE_URL", "http://localhost:5000/api")?;
    let origin = http_url("CAREFINDER_ORIGIN", "http://localhost:5173")?;
    let geocoder_url = http_url(
        "CAREFINDER_GEOCODER_URL",
        "https://nominatim.openstreetmap.org",
    )?;
    let ipapi_url = http_url("CAREFINDER_IPAPI_URL", "https://ipapi.co/json/")?;
    let ipinfo_url = http_url("CAREFINDER_IPINFO_URL", "https://ipinfo.io/json")?;

    let search_radius_m = parse_u32(
        "CAREFINDER_SEARCH_RADIUS_M",
        &crate::DEFAULT_SEARCH_RADIUS_M.to_string(),
    )?;
    if search_radius_m == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CAREFINDER_SEARCH_RADIUS_M".to_string(),
            reason: "radius must be greater than zero".to_string(),
        });
    }
    let request_timeout_secs = parse_u64("CAREFINDER_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("CAREFINDER_USER_AGENT", "carefinder/0.1 (facility-locator)");

    Ok(AppConfig {
        log_level,
        api_base_url,
        origin,
        geocoder_url,
        ipapi_url,
        ipinfo_url,
        search_radius_m,
        request_timeout_secs,
        user_agent,
    })
}
