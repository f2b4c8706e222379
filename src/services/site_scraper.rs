use std::time::Duration;

use fake_user_agent::get_rua;

use crate::domain::site_metadata::SiteMetadata;

/// Independent re-fetch of the page for contact/company extraction. Never
/// fatal: any failure degrades to an empty [`SiteMetadata`].
pub async fn scrape_site_data(url: &str, timeout_secs: u64) -> SiteMetadata {
    let client = match reqwest::Client::builder()
        .user_agent(get_rua())
        .timeout(Duration::from_secs(timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to build scrape client: {:?}", e);
            return SiteMetadata::default();
        }
    };

    let html_content = match client.get(url).send().await {
        Ok(res) => match res.text().await {
            Ok(text) => text,
            Err(e) => {
                log::error!("Failed to read scrape response body for {}: {:?}", url, e);
                return SiteMetadata::default();
            }
        },
        Err(e) => {
            log::error!("Scrape request to {} failed: {:?}", url, e);
            return SiteMetadata::default();
        }
    };

    let metadata = SiteMetadata::from_html(&html_content);
    log::info!(
        "Scraped {}: {} emails, company: {:?}",
        url,
        metadata.emails.len(),
        metadata.company_name
    );

    metadata
}
