use std::path::PathBuf;

use adlook::configuration::{get_configuration, Settings};
use adlook::domain::analysis_request::AnalysisRequest;
use chrono::Local;
use clap::Parser;
use env_logger::Env;

/// Analyze websites for ad placement opportunities.
#[derive(Parser)]
#[command(name = "adlook-cli", version)]
struct Cli {
    /// Target URL to analyze
    url: String,

    /// Output directory for analysis results
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate configuration and arguments without running analysis
    #[arg(long)]
    dry_run: bool,
}

/// Check the URL and, unless this is a dry run, the credentials a real run
/// would need. Returns the validated request.
fn validate_run(settings: &Settings, url: &str, dry_run: bool) -> anyhow::Result<AnalysisRequest> {
    let request = AnalysisRequest::parse(url).map_err(|e| anyhow::anyhow!(e))?;

    if !dry_run {
        settings.require_openai_key()?;
    }

    Ok(request)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        true => "debug",
        false => "info",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let configuration = get_configuration()?;
    let request = validate_run(&configuration, &cli.url, cli.dry_run)?;

    let run_dir = cli
        .output
        .join(Local::now().format("run_%Y%m%d_%H%M%S").to_string());
    std::fs::create_dir_all(&run_dir)?;
    log::info!("Output directory: {}", run_dir.display());

    if cli.dry_run {
        log::info!("Dry run: configuration and arguments are valid for {}", request);
        return Ok(());
    }

    log::info!(
        "Target: {} (viewport {}x{}, timeout {}s)",
        request,
        configuration.browser.viewport_width,
        configuration.browser.viewport_height,
        configuration.pipeline.request_timeout_secs
    );
    // TODO: drive the analysis pipeline from here; today only the HTTP
    // server runs it.
    log::warn!("CLI analysis is not implemented yet; use the HTTP API.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use adlook::configuration::{
        ApiKeySettings, ApplicationSettings, BrowserSettings, PipelineSettings, Settings,
    };

    use super::validate_run;

    fn settings_with_key(openai: &str) -> Settings {
        Settings {
            application: ApplicationSettings {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            api_keys: ApiKeySettings {
                openai: openai.to_string(),
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
        }
    }

    #[test]
    fn dry_run_passes_without_credentials() {
        let settings = settings_with_key("");

        assert!(validate_run(&settings, "https://example.com", true).is_ok());
    }

    #[test]
    fn real_run_requires_the_openai_key() {
        let settings = settings_with_key("");

        assert!(validate_run(&settings, "https://example.com", false).is_err());
    }

    #[test]
    fn real_run_passes_with_a_key() {
        let settings = settings_with_key("sk-test");

        let request = validate_run(&settings, "https://example.com", false).unwrap();
        assert_eq!(request.as_str(), "https://example.com/");
    }

    #[test]
    fn invalid_url_is_rejected_even_on_dry_run() {
        let settings = settings_with_key("sk-test");

        assert!(validate_run(&settings, "not a url", true).is_err());
    }
}
