#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Base URL of the REST backend, e.g. `http://localhost:5000/api`.
    pub api_base_url: String,
    /// Origin the client is considered to run from. Device geolocation is
    /// only attempted for secure origins.
    pub origin: String,
    /// Nominatim-compatible free-text geocoder.
    pub geocoder_url: String,
    /// IP geolocation endpoint returning `{latitude, longitude, city}`.
    pub ipapi_url: String,
    /// IP geolocation endpoint returning `{loc: "lat,lng", city}`.
    pub ipinfo_url: String,
    pub search_radius_m: u32,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}
