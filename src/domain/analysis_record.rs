use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::site_metadata::SiteMetadata;
use super::zone::ZoneFinding;

/// The finalized result of one orchestrator run. Either fully populated
/// (success) or a failure record carrying only the terminal error; nothing
/// in between is ever stored.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    pub zones: Vec<ZoneFinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_estimate: Option<String>,
    pub emails: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal: Option<String>,
}

impl AnalysisRecord {
    pub fn failure(url: &str, error: String) -> Self {
        AnalysisRecord {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
            created_at: Utc::now(),
            success: false,
            error: Some(error),
            screenshot: None,
            zones: vec![],
            language: None,
            site_type: None,
            traffic_estimate: None,
            emails: vec![],
            company_name: None,
            title: None,
            description: None,
            owner_info: None,
            proposal: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn complete(
        url: &str,
        screenshot: String,
        zones: Vec<ZoneFinding>,
        language: String,
        metadata: SiteMetadata,
        owner_info: String,
        proposal: String,
    ) -> Self {
        AnalysisRecord {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
            created_at: Utc::now(),
            success: true,
            error: None,
            screenshot: Some(screenshot),
            zones,
            language: Some(language),
            site_type: None,
            traffic_estimate: None,
            emails: metadata.emails,
            company_name: metadata.company_name,
            title: metadata.title,
            description: metadata.description,
            owner_info: Some(owner_info),
            proposal: Some(proposal),
        }
    }

    /// Record produced by the simple analyze route: HTML analysis plus the
    /// template proposal, no vision/research fields.
    pub fn simple(
        url: &str,
        site_type: String,
        traffic_estimate: String,
        zones: Vec<ZoneFinding>,
        proposal: String,
    ) -> Self {
        AnalysisRecord {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
            created_at: Utc::now(),
            success: true,
            error: None,
            screenshot: None,
            zones,
            language: None,
            site_type: Some(site_type),
            traffic_estimate: Some(traffic_estimate),
            emails: vec![],
            company_name: None,
            title: None,
            description: None,
            owner_info: None,
            proposal: Some(proposal),
        }
    }
}
