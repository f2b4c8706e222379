use base64::Engine;

use crate::configuration::Settings;
use crate::domain::analysis_record::AnalysisRecord;
use crate::domain::analysis_request::AnalysisRequest;
use crate::domain::site_metadata::SiteMetadata;
use crate::domain::zone::VisionAnalysis;

use super::droid::Droid;
use super::openai_client::{OpenaiClient, ProposalContext};
use super::site_scraper::scrape_site_data;

pub const OWNER_NOT_FOUND: &str = "Информация о компании не найдена";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Capture,
    VisionAnalysis,
    Scrape,
    Research,
    Proposal,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Capture => "capture",
            PipelineStage::VisionAnalysis => "vision analysis",
            PipelineStage::Scrape => "scrape",
            PipelineStage::Research => "research",
            PipelineStage::Proposal => "proposal",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of one stage, fed into the state machine. Capture and vision are
/// the only fallible stages; the rest already degraded inside the stage.
pub enum StageOutcome {
    Capture(Result<String, String>),
    Vision(Result<VisionAnalysis, String>),
    Scrape(SiteMetadata),
    Research(String),
    Proposal(String),
}

impl StageOutcome {
    fn stage(&self) -> PipelineStage {
        match self {
            StageOutcome::Capture(_) => PipelineStage::Capture,
            StageOutcome::Vision(_) => PipelineStage::VisionAnalysis,
            StageOutcome::Scrape(_) => PipelineStage::Scrape,
            StageOutcome::Research(_) => PipelineStage::Research,
            StageOutcome::Proposal(_) => PipelineStage::Proposal,
        }
    }
}

/// The five-stage analysis as an explicit state machine. `Failed` is the only
/// terminal error state and is reachable solely from `Pending` (capture
/// failure) and `Captured` (vision failure); every later stage degrades
/// instead of failing.
#[derive(Debug, PartialEq)]
pub enum PipelineState {
    Pending,
    Captured {
        screenshot: String,
    },
    Analyzed {
        screenshot: String,
        vision: VisionAnalysis,
    },
    Scraped {
        screenshot: String,
        vision: VisionAnalysis,
        metadata: SiteMetadata,
    },
    Researched {
        screenshot: String,
        vision: VisionAnalysis,
        metadata: SiteMetadata,
        owner_info: String,
    },
    Proposed {
        screenshot: String,
        vision: VisionAnalysis,
        metadata: SiteMetadata,
        owner_info: String,
        proposal: String,
    },
    Failed {
        stage: PipelineStage,
        error: String,
    },
}

impl PipelineState {
    pub fn advance(self, outcome: StageOutcome) -> PipelineState {
        match (self, outcome) {
            (PipelineState::Pending, StageOutcome::Capture(Ok(screenshot))) => {
                PipelineState::Captured { screenshot }
            }
            (PipelineState::Pending, StageOutcome::Capture(Err(error))) => PipelineState::Failed {
                stage: PipelineStage::Capture,
                error,
            },
            (PipelineState::Captured { screenshot }, StageOutcome::Vision(Ok(vision))) => {
                PipelineState::Analyzed { screenshot, vision }
            }
            (PipelineState::Captured { .. }, StageOutcome::Vision(Err(error))) => {
                PipelineState::Failed {
                    stage: PipelineStage::VisionAnalysis,
                    error,
                }
            }
            (
                PipelineState::Analyzed { screenshot, vision },
                StageOutcome::Scrape(metadata),
            ) => PipelineState::Scraped {
                screenshot,
                vision,
                metadata,
            },
            (
                PipelineState::Scraped {
                    screenshot,
                    vision,
                    metadata,
                },
                StageOutcome::Research(owner_info),
            ) => PipelineState::Researched {
                screenshot,
                vision,
                metadata,
                owner_info,
            },
            (
                PipelineState::Researched {
                    screenshot,
                    vision,
                    metadata,
                    owner_info,
                },
                StageOutcome::Proposal(proposal),
            ) => PipelineState::Proposed {
                screenshot,
                vision,
                metadata,
                owner_info,
                proposal,
            },
            (failed @ PipelineState::Failed { .. }, _) => failed,
            (_, outcome) => PipelineState::Failed {
                stage: outcome.stage(),
                error: format!("Stage '{}' ran out of order", outcome.stage()),
            },
        }
    }

    pub fn into_record(self, url: &str) -> AnalysisRecord {
        match self {
            PipelineState::Proposed {
                screenshot,
                vision,
                metadata,
                owner_info,
                proposal,
            } => AnalysisRecord::complete(
                url,
                screenshot,
                vision.zones,
                vision.language,
                metadata,
                owner_info,
                proposal,
            ),
            PipelineState::Failed { stage, error } => {
                AnalysisRecord::failure(url, format!("Failed at {} stage: {}", stage, error))
            }
            _ => AnalysisRecord::failure(url, "Pipeline ended before completion".to_string()),
        }
    }
}

/// Run the full capture → vision → scrape → research → proposal sequence for
/// one URL and assemble a single record. Stages are strictly sequential; a
/// vision failure aborts before scraping begins.
pub async fn run_complete_analysis(
    openai_client: &OpenaiClient,
    settings: &Settings,
    request: &AnalysisRequest,
) -> AnalysisRecord {
    let url = request.as_str();
    let timeout_secs = settings.pipeline.request_timeout_secs;
    let mut state = PipelineState::Pending;

    loop {
        state = match state {
            PipelineState::Pending => {
                log::info!("[{}] stage 1: capture", url);
                let outcome = capture_stage(settings, url).await;
                PipelineState::Pending.advance(StageOutcome::Capture(outcome))
            }
            PipelineState::Captured { screenshot } => {
                log::info!("[{}] stage 2: vision analysis", url);
                let outcome = openai_client
                    .analyze_screenshot_zones(url, &screenshot)
                    .await
                    .map_err(|e| e.to_string());
                PipelineState::Captured { screenshot }.advance(StageOutcome::Vision(outcome))
            }
            PipelineState::Analyzed { screenshot, vision } => {
                log::info!("[{}] stage 3: scrape", url);
                let metadata = scrape_site_data(url, timeout_secs).await;
                PipelineState::Analyzed { screenshot, vision }
                    .advance(StageOutcome::Scrape(metadata))
            }
            PipelineState::Scraped {
                screenshot,
                vision,
                metadata,
            } => {
                log::info!("[{}] stage 4: research", url);
                let owner_info =
                    research_stage(openai_client, metadata.company_name.as_deref(), url).await;
                PipelineState::Scraped {
                    screenshot,
                    vision,
                    metadata,
                }
                .advance(StageOutcome::Research(owner_info))
            }
            PipelineState::Researched {
                screenshot,
                vision,
                metadata,
                owner_info,
            } => {
                log::info!("[{}] stage 5: proposal", url);
                let proposal =
                    proposal_stage(openai_client, url, &vision, &metadata, &owner_info).await;
                PipelineState::Researched {
                    screenshot,
                    vision,
                    metadata,
                    owner_info,
                }
                .advance(StageOutcome::Proposal(proposal))
            }
            terminal => {
                let record = terminal.into_record(url);
                match record.success {
                    true => log::info!("[{}] analysis complete, id {}", url, record.id),
                    false => log::error!(
                        "[{}] analysis failed: {}",
                        url,
                        record.error.as_deref().unwrap_or("unknown")
                    ),
                }
                return record;
            }
        };
    }
}

async fn capture_stage(settings: &Settings, url: &str) -> Result<String, String> {
    let droid = Droid::new(&settings.browser)
        .await
        .map_err(|e| format!("{:#}", e))?;

    let result = droid
        .capture_screenshot(url, settings.pipeline.request_timeout_secs)
        .await;
    droid.quit().await;

    let screenshot_png = result.map_err(|e| format!("{:#}", e))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(screenshot_png);

    Ok(format!("data:image/png;base64,{}", encoded))
}

async fn research_stage(
    openai_client: &OpenaiClient,
    company_name: Option<&str>,
    url: &str,
) -> String {
    let Some(company_name) = company_name else {
        return OWNER_NOT_FOUND.to_string();
    };

    match openai_client.research_company(company_name, url).await {
        Ok(insights) => insights,
        Err(e) => {
            log::error!("Research failed for '{}': {:?}", company_name, e);
            format!("Ошибка при поиске информации: {}", e)
        }
    }
}

async fn proposal_stage(
    openai_client: &OpenaiClient,
    url: &str,
    vision: &VisionAnalysis,
    metadata: &SiteMetadata,
    owner_info: &str,
) -> String {
    let ctx = ProposalContext {
        website_url: url,
        zones: &vision.zones,
        language: &vision.language,
        company_name: metadata.company_name.as_deref(),
        owner_info,
    };

    match openai_client.generate_proposal(ctx).await {
        Ok(proposal) => proposal,
        Err(e) => {
            log::error!("Proposal generation failed for {}: {:?}", url, e);
            format!("Ошибка при генерации предложения: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::zone::{Priority, ZoneFinding};

    fn sample_vision() -> VisionAnalysis {
        VisionAnalysis {
            zones: vec![ZoneFinding {
                zone: "Header".to_string(),
                priority: Some(Priority::High),
                occupancy: None,
                size: Some("728x90".to_string()),
                reason: Some("visible".to_string()),
            }],
            language: "en".to_string(),
        }
    }

    #[test]
    fn capture_failure_yields_failure_record_without_derived_fields() {
        let state = PipelineState::Pending
            .advance(StageOutcome::Capture(Err("navigation timed out".to_string())));
        let record = state.into_record("https://example.com/");

        assert!(!record.success);
        assert!(record.error.as_deref().unwrap().contains("capture"));
        assert!(record.error.as_deref().unwrap().contains("navigation timed out"));
        assert!(record.screenshot.is_none());
        assert!(record.zones.is_empty());
        assert!(record.proposal.is_none());
    }

    #[test]
    fn vision_failure_is_terminal_before_scrape() {
        let state = PipelineState::Pending
            .advance(StageOutcome::Capture(Ok("data:image/png;base64,AA==".to_string())))
            .advance(StageOutcome::Vision(Err("bad envelope".to_string())));

        assert!(matches!(
            state,
            PipelineState::Failed {
                stage: PipelineStage::VisionAnalysis,
                ..
            }
        ));

        // A failed run stays failed no matter what arrives later.
        let state = state.advance(StageOutcome::Scrape(SiteMetadata::default()));
        let record = state.into_record("https://example.com/");
        assert!(!record.success);
        assert!(record.zones.is_empty());
    }

    #[test]
    fn scrape_failure_degrades_to_empty_metadata_and_run_completes() {
        let state = PipelineState::Pending
            .advance(StageOutcome::Capture(Ok("data:image/png;base64,AA==".to_string())))
            .advance(StageOutcome::Vision(Ok(sample_vision())))
            .advance(StageOutcome::Scrape(SiteMetadata::default()))
            .advance(StageOutcome::Research(OWNER_NOT_FOUND.to_string()))
            .advance(StageOutcome::Proposal("Dear owner".to_string()));

        let record = state.into_record("https://example.com/");

        assert!(record.success);
        assert!(record.emails.is_empty());
        assert!(record.company_name.is_none());
        assert_eq!(record.owner_info.as_deref(), Some(OWNER_NOT_FOUND));
        assert_eq!(record.proposal.as_deref(), Some("Dear owner"));
        assert_eq!(record.zones.len(), 1);
    }

    #[test]
    fn out_of_order_stage_fails_the_run() {
        let state =
            PipelineState::Pending.advance(StageOutcome::Research("too early".to_string()));

        assert!(matches!(
            state,
            PipelineState::Failed {
                stage: PipelineStage::Research,
                ..
            }
        ));
    }

    #[test]
    fn complete_run_populates_all_fields() {
        let metadata = SiteMetadata {
            language: Some("en".to_string()),
            emails: vec!["owner@example.com".to_string()],
            company_name: Some("Acme".to_string()),
            title: Some("Acme | Home".to_string()),
            description: Some("Widgets".to_string()),
        };

        let record = PipelineState::Pending
            .advance(StageOutcome::Capture(Ok("data:image/png;base64,AA==".to_string())))
            .advance(StageOutcome::Vision(Ok(sample_vision())))
            .advance(StageOutcome::Scrape(metadata))
            .advance(StageOutcome::Research("Acme makes widgets".to_string()))
            .advance(StageOutcome::Proposal("Hello Acme".to_string()))
            .into_record("https://example.com/");

        assert!(record.success);
        assert!(record.error.is_none());
        assert_eq!(record.language.as_deref(), Some("en"));
        assert_eq!(record.company_name.as_deref(), Some("Acme"));
        assert_eq!(record.emails, vec!["owner@example.com".to_string()]);
        assert!(record.screenshot.as_deref().unwrap().starts_with("data:image/png"));
    }
}
