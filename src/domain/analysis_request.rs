use url::Url;

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    url: Url,
}

impl AnalysisRequest {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let url = Url::parse(raw).map_err(|e| format!("Invalid URL '{}': {}", raw, e))?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(format!("Unsupported URL scheme '{}'", other)),
        }

        match url.host_str() {
            Some(host) if !host.is_empty() => Ok(AnalysisRequest { url }),
            _ => Err(format!("URL '{}' has no host", raw)),
        }
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl std::fmt::Display for AnalysisRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::AnalysisRequest;

    #[test]
    fn accepts_absolute_http_urls() {
        assert!(AnalysisRequest::parse("https://example.com").is_ok());
        assert!(AnalysisRequest::parse("http://example.com/path?q=1").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_relative_urls() {
        assert!(AnalysisRequest::parse("ftp://example.com").is_err());
        assert!(AnalysisRequest::parse("file:///etc/passwd").is_err());
        assert!(AnalysisRequest::parse("example.com").is_err());
        assert!(AnalysisRequest::parse("/relative/path").is_err());
    }
}
