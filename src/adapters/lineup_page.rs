use crate::config::LineupSettings;
use crate::core::lineup::prepare_lineup;
use crate::domain::model::ArtistName;
use crate::domain::ports::LineupSource;
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

/// Lineup scraped from a festival web page: every element matching the
/// selector holds one artist name.
pub struct HtmlLineupSource {
    client: Client,
    url: String,
    selector: Selector,
}

impl HtmlLineupSource {
    pub fn new(settings: &LineupSettings) -> Result<Self> {
        let selector =
            Selector::parse(&settings.selector).map_err(|e| PipelineError::InvalidConfigValueError {
                field: "lineup_selector".to_string(),
                value: settings.selector.clone(),
                reason: e.to_string(),
            })?;
        let client = Client::builder()
            .user_agent(concat!("lineup-playlist/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            client,
            url: settings.url.clone(),
            selector,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Raw text of every element matching `selector`, in document order.
pub fn extract_artist_names(html: &str, selector: &Selector) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .map(|element| element.text().collect::<String>())
        .collect()
}

#[async_trait]
impl LineupSource for HtmlLineupSource {
    async fn fetch_lineup(&self) -> Result<Vec<ArtistName>> {
        tracing::debug!("Fetching lineup page {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::LineupError {
                message: format!("{} returned {}", self.url, status),
            });
        }

        let html = response.text().await?;
        tracing::debug!("Lineup page is {} bytes", html.len());

        let raw_names = extract_artist_names(&html, &self.selector);
        let names = prepare_lineup(&raw_names);
        if names.is_empty() {
            return Err(PipelineError::LineupError {
                message: format!("no artist names found on {}", self.url),
            });
        }

        tracing::debug!(
            "Extracted {} names ({} unique)",
            raw_names.len(),
            names.len()
        );
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="gc-thumbnail"><span class="gc-title gc__general-fonts-titles__font">Volbeat (DK)</span></div>
          <div class="gc-thumbnail"><span class="gc-title gc__general-fonts-titles__font">The Hellacopters</span></div>
          <div class="gc-thumbnail"><span class="gc-title gc__general-fonts-titles__font">Volbeat</span></div>
          <div class="gc-thumbnail"><span class="gc-subtitle">Friday</span></div>
          <div class="gc-thumbnail"><span class="gc-title"><b>Amon</b> Amarth</span></div>
        </body></html>
    "#;

    #[test]
    fn test_extracts_text_of_matching_elements() {
        let selector = Selector::parse("span.gc-title").unwrap();
        let names = extract_artist_names(PAGE, &selector);
        assert_eq!(
            names,
            vec!["Volbeat (DK)", "The Hellacopters", "Volbeat", "Amon Amarth"]
        );
        assert_eq!(
            prepare_lineup(&names),
            vec!["Amon Amarth", "The Hellacopters", "Volbeat"]
        );
    }

    #[test]
    fn test_invalid_selector_is_a_config_error() {
        let settings = LineupSettings {
            url: "https://example.com".to_string(),
            selector: "span[".to_string(),
        };
        assert!(matches!(
            HtmlLineupSource::new(&settings),
            Err(PipelineError::InvalidConfigValueError { .. })
        ));
    }
}
