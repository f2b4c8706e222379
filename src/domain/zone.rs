use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_russian(&self) -> &'static str {
        match self {
            Priority::High => "высокий приоритет",
            Priority::Medium => "средний приоритет",
            Priority::Low => "низкий приоритет",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occupancy {
    Free,
    Occupied,
}

impl Occupancy {
    fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "free" | "available" => Some(Occupancy::Free),
            "occupied" | "taken" => Some(Occupancy::Occupied),
            _ => None,
        }
    }
}

/// One candidate ad placement region reported by the model. The orchestrator
/// never invents zones, it only validates shape and drops malformed entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneFinding {
    pub zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancy: Option<Occupancy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ZoneFinding {
    pub fn is_free(&self) -> bool {
        self.occupancy == Some(Occupancy::Free)
    }

    pub fn is_occupied(&self) -> bool {
        self.occupancy == Some(Occupancy::Occupied)
    }
}

/// Raw model output. Two shapes exist in the wild: the HTML analyzer returns
/// `zone`/`occupancy`/`reason`, the vision prompt returns
/// `name`/`available`/`description`. Both normalize into [`ZoneFinding`].
#[derive(Deserialize)]
struct RawZone {
    zone: Option<String>,
    name: Option<String>,
    priority: Option<String>,
    occupancy: Option<String>,
    available: Option<bool>,
    size: Option<String>,
    reason: Option<String>,
    description: Option<String>,
}

impl RawZone {
    fn normalize(self) -> Option<ZoneFinding> {
        let zone = self
            .zone
            .or(self.name)
            .map(|z| z.trim().to_string())
            .filter(|z| !z.is_empty())?;

        let priority = self.priority.as_deref().and_then(Priority::from_raw);
        let occupancy = match self.available {
            Some(true) => Some(Occupancy::Free),
            Some(false) => Some(Occupancy::Occupied),
            None => self.occupancy.as_deref().and_then(Occupancy::from_raw),
        };

        // A finding must carry at least one usable signal besides its label.
        if priority.is_none() && occupancy.is_none() {
            return None;
        }

        Some(ZoneFinding {
            zone,
            priority,
            occupancy,
            size: self.size,
            reason: self.reason.or(self.description),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisionAnalysis {
    pub zones: Vec<ZoneFinding>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteAnalysis {
    pub site_type: String,
    pub traffic_estimate: String,
    pub zones: Vec<ZoneFinding>,
}

#[derive(Deserialize)]
struct RawVisionEnvelope {
    zones: Vec<RawZone>,
    language: Option<String>,
}

#[derive(Deserialize)]
struct RawSiteEnvelope {
    #[serde(rename = "siteType")]
    site_type: Option<String>,
    #[serde(rename = "trafficEstimate")]
    traffic_estimate: Option<String>,
    zones: Vec<RawZone>,
}

fn strip_code_fences(content: &str) -> &str {
    let content = content.trim();
    let content = content.strip_prefix("```json").unwrap_or(content);
    let content = content.strip_prefix("```").unwrap_or(content);
    content.strip_suffix("```").unwrap_or(content).trim()
}

/// Decode the vision-stage model response. An envelope without a decodable
/// `zones` collection fails the stage; individual malformed entries are
/// dropped silently.
pub fn parse_vision_response(content: &str) -> anyhow::Result<VisionAnalysis> {
    let envelope: RawVisionEnvelope = serde_json::from_str(strip_code_fences(content))
        .map_err(|e| anyhow::anyhow!("Model response is not a valid zones object: {}", e))?;

    Ok(VisionAnalysis {
        zones: envelope
            .zones
            .into_iter()
            .filter_map(RawZone::normalize)
            .collect(),
        language: envelope.language.unwrap_or_else(|| "en".to_string()),
    })
}

/// Decode the HTML-analysis model response used by the simple analyze route.
pub fn parse_site_response(content: &str) -> anyhow::Result<SiteAnalysis> {
    let envelope: RawSiteEnvelope = serde_json::from_str(strip_code_fences(content))
        .map_err(|e| anyhow::anyhow!("Model response is not a valid zones object: {}", e))?;

    Ok(SiteAnalysis {
        site_type: envelope.site_type.unwrap_or_else(|| "unknown".to_string()),
        traffic_estimate: envelope
            .traffic_estimate
            .unwrap_or_else(|| "medium".to_string()),
        zones: envelope
            .zones
            .into_iter()
            .filter_map(RawZone::normalize)
            .collect(),
    })
}
