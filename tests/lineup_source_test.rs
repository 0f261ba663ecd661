use anyhow::Result;
use httpmock::prelude::*;
use lineup_playlist::config::LineupSettings;
use lineup_playlist::core::LineupSource;
use lineup_playlist::{HtmlLineupSource, PipelineError};

const LINEUP_HTML: &str = r##"<!DOCTYPE html>
<html>
  <body>
    <section class="program">
      <a href="#/artist/slayer"><span class="gc-title gc__general-fonts-titles__font">Slayer (US)</span></a>
      <a href="#/artist/the-hu"><span class="gc-title gc__general-fonts-titles__font">The HU</span></a>
      <a href="#/artist/baest"><span class="gc-title gc__general-fonts-titles__font">Baest</span></a>
      <a href="#/artist/slayer-2"><span class="gc-title gc__general-fonts-titles__font">Slayer</span></a>
      <a href="#/artist/blank"><span class="gc-title gc__general-fonts-titles__font">   </span></a>
    </section>
  </body>
</html>"##;

fn source(server: &MockServer, path: &str) -> HtmlLineupSource {
    HtmlLineupSource::new(&LineupSettings {
        url: server.url(path),
        selector: "span.gc-title".to_string(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetches_normalized_sorted_lineup() -> Result<()> {
    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/program");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(LINEUP_HTML);
    });

    let names = source(&server, "/program").fetch_lineup().await?;

    page_mock.assert();
    assert_eq!(names, vec!["Baest", "The HU", "Slayer"]);
    Ok(())
}

#[tokio::test]
async fn test_page_error_fails_the_fetch() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/program");
        then.status(503);
    });

    let result = source(&server, "/program").fetch_lineup().await;

    assert!(matches!(result, Err(PipelineError::LineupError { .. })));
    Ok(())
}

#[tokio::test]
async fn test_page_without_names_is_an_error() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/program");
        then.status(200)
            .body("<html><body><p>Lineup coming soon</p></body></html>");
    });

    let err = source(&server, "/program").fetch_lineup().await.unwrap_err();

    assert!(matches!(err, PipelineError::LineupError { .. }));
    assert!(err.to_string().contains("no artist names"));
    Ok(())
}
