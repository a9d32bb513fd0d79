use super::*;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

const PAGE: &str = r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Rust Release Notes</title>
        <meta name="description" content="What changed in the latest release">
    </head>
    <body>
        <h1>Release notes</h1>
        <p>Faster builds and better diagnostics.</p>
    </body>
    </html>
"#;

fn test_scraper(timeout_seconds: u64) -> HttpScraper {
    HttpScraper::new(&ScraperConfig {
        timeout_seconds,
        ..ScraperConfig::default()
    })
}

#[tokio::test]
async fn scrapes_html_page_with_browser_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .and(header("user-agent", "Mozilla/5.0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE, "text/html; charset=utf-8"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/notes", server.uri());
    let page = test_scraper(15)
        .scrape(&url)
        .await
        .expect("page should be scraped");

    assert_eq!(page.url, url);
    assert_eq!(page.title, "Rust Release Notes");
    assert_eq!(page.description, "What changed in the latest release");
    assert_eq!(
        page.snippet,
        "Release notes Faster builds and better diagnostics."
    );
}

#[tokio::test]
async fn non_success_status_is_reported_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let result = test_scraper(15).scrape(&url).await;

    assert_eq!(result, Err(ScrapeError::Status { url, status: 404 }));
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/flaky", server.uri());
    let result = test_scraper(15).scrape(&url).await;

    assert!(matches!(
        result,
        Err(ScrapeError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn slow_page_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(PAGE, "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let url = format!("{}/slow", server.uri());
    let result = test_scraper(1).scrape(&url).await;

    assert!(
        matches!(
            result,
            Err(ScrapeError::Timeout { .. } | ScrapeError::Transport { .. })
        ),
        "expected a timeout, got {:?}",
        result
    );
}

#[tokio::test]
async fn non_html_content_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"a":1}"#, "application/json"))
        .mount(&server)
        .await;

    let url = format!("{}/data.json", server.uri());
    let result = test_scraper(15).scrape(&url).await;

    assert_eq!(
        result,
        Err(ScrapeError::NotHtml {
            url,
            content_type: "application/json".to_string(),
        })
    );
}

#[tokio::test]
async fn malformed_url_is_a_transport_failure() {
    let result = test_scraper(15).scrape("http://").await;

    assert!(matches!(result, Err(ScrapeError::Transport { .. })));
}

#[test]
fn html_content_types() {
    assert!(is_html_content_type("text/html"));
    assert!(is_html_content_type("text/html; charset=UTF-8"));
    assert!(is_html_content_type("Application/XHTML+XML"));
    assert!(!is_html_content_type("application/json"));
    assert!(!is_html_content_type("image/png"));
    assert!(!is_html_content_type(""));
}
