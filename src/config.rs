use std::env;

/// Service configuration, loaded once at startup from the environment.
/// The inference token may legitimately be absent here; its absence is
/// reported per-request as a configuration error.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub hf_token: Option<String>,
    pub model_id: String,
    pub overpass_url: String,
    pub osrm_url: String,
    pub nominatim_url: String,
    pub hf_api_url: String,
    pub bind_addr: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            hf_token: env::var("HUGGINGFACE_API_TOKEN").ok().filter(|t| !t.is_empty()),
            model_id: env_or("MODEL_ID", "mistralai/Mistral-7B-Instruct-v0.2"),
            overpass_url: env_or("OVERPASS_URL", "https://overpass-api.de/api/interpreter"),
            osrm_url: env_or("OSRM_URL", "http://router.project-osrm.org/route/v1"),
            nominatim_url: env_or("NOMINATIM_URL", "https://nominatim.openstreetmap.org"),
            hf_api_url: env_or("HF_API_URL", "https://api-inference.huggingface.co/models"),
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:8080"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_when_unset() {
        assert_eq!(
            env_or("MOBILITY_ASSISTANT_NEVER_SET", "fallback-value"),
            "fallback-value"
        );
    }

    #[test]
    fn env_or_prefers_the_environment() {
        // Key is unique to this test, so parallel tests cannot race on it.
        env::set_var("MOBILITY_ASSISTANT_ENV_OR_TEST", "from-env");
        assert_eq!(
            env_or("MOBILITY_ASSISTANT_ENV_OR_TEST", "fallback-value"),
            "from-env"
        );
        env::remove_var("MOBILITY_ASSISTANT_ENV_OR_TEST");
    }
}
