use anyhow::Context;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub api_keys: ApiKeySettings,
    pub browser: BrowserSettings,
    pub pipeline: PipelineSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct ApiKeySettings {
    pub openai: String,
}

#[derive(Deserialize, Clone)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub viewport_width: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub viewport_height: u32,
}

#[derive(Deserialize, Clone)]
pub struct PipelineSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_timeout_secs: u64,
    // Reserved for a future bounded-retry policy around capture and
    // inference; nothing reads it yet.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_retries: u32,
}

impl Settings {
    pub fn require_openai_key(&self) -> anyhow::Result<&str> {
        match self.api_keys.openai.is_empty() {
            true => Err(anyhow::anyhow!(
                "OPENAI_API_KEY environment variable is required"
            )),
            false => Ok(&self.api_keys.openai),
        }
    }
}

pub fn get_configuration() -> anyhow::Result<Settings> {
    let builder = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000)?
        .set_default("api_keys.openai", "")?
        .set_default("browser.webdriver_url", "http://localhost:4444")?
        .set_default("browser.viewport_width", 1920)?
        .set_default("browser.viewport_height", 1080)?
        .set_default("pipeline.request_timeout_secs", 30)?
        .set_default("pipeline.max_retries", 3)?
        .add_source(config::Environment::with_prefix("ADLOOK").separator("__"));

    let mut settings: Settings = builder
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // The OpenAI key keeps its conventional variable name.
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        if !key.is_empty() {
            settings.api_keys.openai = key;
        }
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_populated() {
        let settings = get_configuration().unwrap();

        assert_eq!(settings.application.port, 8000);
        assert_eq!(settings.browser.viewport_width, 1920);
        assert_eq!(settings.browser.viewport_height, 1080);
        assert_eq!(settings.pipeline.request_timeout_secs, 30);
        assert_eq!(settings.pipeline.max_retries, 3);
    }

    #[test]
    fn empty_openai_key_is_rejected() {
        let settings = Settings {
            application: ApplicationSettings {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            api_keys: ApiKeySettings {
                openai: String::new(),
            },
            browser: BrowserSettings {
                webdriver_url: "http://localhost:4444".to_string(),
                viewport_width: 1920,
                viewport_height: 1080,
            },
            pipeline: PipelineSettings {
                request_timeout_secs: 30,
                max_retries: 3,
            },
        };

        assert!(settings.require_openai_key().is_err());
    }
}
