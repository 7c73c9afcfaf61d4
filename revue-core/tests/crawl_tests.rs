// Tests for crawl orchestration

use revue_core::crawl::{CrawlOptions, execute_crawl, execute_extract, execute_walk, extract_url_path};
use revue_scanner::{ExtractMode, ReviewRecord, ScanError};
use std::sync::{Arc, Mutex};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param, query_param_is_missing},
};

fn review_card(text: &str, rating: &str) -> String {
    format!(
        r#"<div class="review-card-review-holder">
            <div class="review-card-meta">
                <div class="stareval stareval-medium stareval-theme-default">
                    <span class="stareval-note">{rating}</span>
                </div>
            </div>
            <div class="content-txt review-card-content">{text}</div>
        </div>"#
    )
}

fn listing_page(links: &[&str], cards: &[String]) -> ResponseTemplate {
    let mut html = String::from("<html><body><nav class=\"pagination\">");
    for link in links {
        html.push_str(&format!(r#"<a href="{}">page</a>"#, link));
    }
    html.push_str("</nav>");
    html.push_str(&cards.concat());
    html.push_str("</body></html>");

    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(html)
}

/// Seed page linking to page 2, which links to nothing further.
async fn two_page_site(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/film/critiques/"))
        .and(query_param_is_missing("page"))
        .respond_with(listing_page(
            &["?page=2", "/film/fiche/", "https://other.com/y"],
            &[review_card("  Super film  ", "4,5"), review_card("Long", "3,0")],
        ))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/film/critiques/"))
        .and(query_param("page", "2"))
        .respond_with(listing_page(&[], &[review_card("Page deux", "1,5")]))
        .mount(mock_server)
        .await;
}

// ============================================================================
// URL Path Extraction Tests
// ============================================================================

#[test]
fn test_extract_url_path_root() {
    assert_eq!(extract_url_path("http://example.com/"), "/");
    assert_eq!(extract_url_path("http://example.com"), "/");
}

#[test]
fn test_extract_url_path_keeps_query() {
    assert_eq!(
        extract_url_path("https://example.com/film/critiques/?page=3"),
        "/film/critiques/?page=3"
    );
}

#[test]
fn test_extract_url_path_drops_fragment() {
    assert_eq!(
        extract_url_path("https://example.com/film/?page=3#reviews"),
        "/film/?page=3"
    );
}

#[test]
fn test_extract_url_path_invalid_url() {
    let url = "not a valid url";
    assert_eq!(extract_url_path(url), url);
}

// ============================================================================
// Orchestration Tests
// ============================================================================

#[tokio::test]
async fn test_execute_walk_returns_visit_list() {
    let mock_server = MockServer::start().await;
    two_page_site(&mock_server).await;

    let seed = format!("{}/film/critiques/", mock_server.uri());
    let urls = execute_walk(&CrawlOptions::new(seed.clone()), None)
        .await
        .unwrap();

    // Page 2 was popped and fetched, so only the seed remains.
    assert_eq!(urls, vec![seed]);
}

#[tokio::test]
async fn test_execute_crawl_end_to_end() {
    let mock_server = MockServer::start().await;
    two_page_site(&mock_server).await;

    let seed = format!("{}/film/critiques/", mock_server.uri());
    let messages = Arc::new(Mutex::new(Vec::new()));
    let messages_clone = messages.clone();

    let outcome = execute_crawl(
        CrawlOptions::new(seed.clone()).with_max_visits(3),
        Some(Arc::new(move |msg: String| {
            messages_clone.lock().unwrap().push(msg);
        })),
    )
    .await
    .unwrap();

    // Three anchors on the seed page use up the budget before page 2 is popped.
    assert_eq!(outcome.urls, vec![format!("{}?page=2", seed), seed.clone()]);
    assert_eq!(
        outcome.table.records(),
        &[
            ReviewRecord::new("Page deux", "1,5"),
            ReviewRecord::new("Super film", "4,5"),
            ReviewRecord::new("Long", "3,0"),
        ]
    );
    assert_eq!(outcome.stats.pages_fetched, 2);

    let messages = messages.lock().unwrap();
    assert!(messages.iter().any(|m| m.contains("Found 2 listing pages")));
}

#[tokio::test]
async fn test_execute_crawl_fails_on_broken_page() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/film/critiques/"))
        .respond_with(listing_page(
            &[],
            &[r#"<div class="review-card-review-holder">sans contenu</div>"#.to_string()],
        ))
        .mount(&mock_server)
        .await;

    let seed = format!("{}/film/critiques/", mock_server.uri());

    let err = execute_crawl(CrawlOptions::new(seed.clone()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::MissingElement { .. }));

    let outcome = execute_crawl(
        CrawlOptions::new(seed).with_extract_mode(ExtractMode::Lenient),
        None,
    )
    .await
    .unwrap();
    assert!(outcome.table.is_empty());
    assert_eq!(outcome.stats.containers_skipped, 1);
}

#[tokio::test]
async fn test_execute_crawl_fails_when_seed_is_unreachable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let seed = format!("{}/film/critiques/", mock_server.uri());
    let err = execute_crawl(CrawlOptions::new(seed.clone()), None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains(&seed));
}

#[tokio::test]
async fn test_execute_extract_with_workers() {
    let mock_server = MockServer::start().await;
    two_page_site(&mock_server).await;

    let seed = format!("{}/film/critiques/", mock_server.uri());
    let urls = vec![format!("{}?page=2", seed), seed];

    let (table, stats) = execute_extract(&urls, &CrawlOptions::new("unused").with_workers(2), None)
        .await
        .unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.records()[0].text, "Page deux");
    assert_eq!(stats.pages_fetched, 2);
}
