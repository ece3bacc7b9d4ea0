//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock card-list servers and test
//! the full harvest cycle end-to-end.

use std::time::{Duration, Instant};
use sve_cardlist::config::Config;
use sve_cardlist::crawler::{harvest, inspect_search, Fetcher, RetryPolicy};
use sve_cardlist::output::{read_tsv, write_tsv};
use sve_cardlist::{CardlistError, PaginationMode, TargetState};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server, with no delay
/// and no retries
fn create_test_config(server: &MockServer, seeds: Vec<String>) -> Config {
    let mut config = Config::default();
    config.fetch.delay_secs = 0.0;
    config.fetch.max_retries = 0;
    config.fetch.retry_backoff_secs = 0.0;
    config.fetch.timeout_secs = 5.0;
    config.crawl.base_url = server.uri();
    config.crawl.seeds = seeds;
    config
}

fn card_item(cardno: &str, name: &str) -> String {
    format!(
        r#"<li class="ex-item">
             <a href="/cardlist/?cardno={cardno}"><img src="/img/{cardno}.png" alt="{name}"></a>
           </li>"#
    )
}

fn pager(max: u32) -> String {
    let links: String = (1..=max)
        .map(|n| format!(r#"<a href="?page={n}">{n}</a>"#))
        .collect();
    format!(r#"<div class="pager">{links}</div>"#)
}

fn list_page(cards: &[(&str, &str)], footer: &str) -> String {
    let items: String = cards
        .iter()
        .map(|(cardno, name)| card_item(cardno, name))
        .collect();
    format!(
        r#"<html><body><ul class="cardlist-Result_List">{items}</ul>{footer}</body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_classic_page(server: &MockServer, page: u32, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/cardlist/"))
        .and(query_param("expansion_name", "BP16"))
        .and(query_param("page", page.to_string()))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

fn classic_seed(server: &MockServer) -> String {
    format!("{}/cardlist/?expansion_name=BP16", server.uri())
}

fn scroll_seed(server: &MockServer) -> String {
    format!("{}/cardlist/cardsearch/?expansion_name=BP16", server.uri())
}

#[tokio::test]
async fn test_classic_pagination_fetches_every_page() {
    let server = MockServer::start().await;

    mount_classic_page(
        &server,
        1,
        list_page(&[("BP16-001", "Archer"), ("BP16-002", "Fairy")], &pager(3)),
        1,
    )
    .await;
    mount_classic_page(
        &server,
        2,
        list_page(&[("BP16-003", "Knight"), ("BP16-004", "Dragon")], &pager(3)),
        1,
    )
    .await;
    mount_classic_page(&server, 3, list_page(&[("BP16-005", "Witch")], &pager(3)), 1).await;

    let config = create_test_config(&server, vec![classic_seed(&server)]);
    let outcome = harvest(&config).await.expect("harvest failed");

    let ids: Vec<&str> = outcome.records.iter().map(|r| r.cardno.as_str()).collect();
    assert_eq!(ids, vec!["BP16-001", "BP16-002", "BP16-003", "BP16-004", "BP16-005"]);

    let report = &outcome.seeds[0];
    assert_eq!(report.mode, Some(PaginationMode::Classic));
    assert_eq!(report.state, TargetState::Exhausted);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.records_added, 5);
    assert_eq!(outcome.requests, 3);

    let first = &outcome.records[0];
    assert_eq!(first.name.as_deref(), Some("Archer"));
    assert_eq!(first.expansion.as_deref(), Some("BP16"));
    assert_eq!(
        first.url.as_deref(),
        Some(format!("{}/cardlist/?cardno=BP16-001", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_infinite_scroll_without_max_page_is_single_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(html(list_page(&[("BP16-001", "Archer")], "")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch_ex"))
        .respond_with(html(list_page(&[("BP16-099", "Never")], "")))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, vec![scroll_seed(&server)]);
    let outcome = harvest(&config).await.expect("harvest failed");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.seeds[0].mode, Some(PaginationMode::InfiniteScroll));
    assert_eq!(outcome.seeds[0].pages_fetched, 1);
    assert_eq!(outcome.seeds[0].state, TargetState::Exhausted);
}

#[tokio::test]
async fn test_infinite_scroll_follows_endpoint_until_max_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(html(list_page(
            &[("BP16-001", "Archer")],
            "<script>var max_page = 3;</script>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    for (page, cardno) in [(2u32, "BP16-002"), (3, "BP16-003")] {
        Mock::given(method("GET"))
            .and(path("/cardlist/cardsearch_ex"))
            .and(query_param("expansion_name", "BP16"))
            .and(query_param("class[]", "elf"))
            .and(query_param("page", page.to_string()))
            .respond_with(html(list_page(&[(cardno, "Scrolled")], "")))
            .expect(1)
            .mount(&server)
            .await;
    }

    let seed = format!(
        "{}/cardlist/cardsearch/?expansion_name=BP16&class%5B0%5D=elf",
        server.uri()
    );
    let config = create_test_config(&server, vec![seed]);
    let outcome = harvest(&config).await.expect("harvest failed");

    let ids: Vec<&str> = outcome.records.iter().map(|r| r.cardno.as_str()).collect();
    assert_eq!(ids, vec!["BP16-001", "BP16-002", "BP16-003"]);
    assert_eq!(outcome.seeds[0].pages_fetched, 3);
}

#[tokio::test]
async fn test_duplicates_keep_first_occurrence() {
    let server = MockServer::start().await;

    mount_classic_page(
        &server,
        1,
        list_page(&[("BP16-001", "Archer"), ("BP16-002", "Fairy")], &pager(2)),
        1,
    )
    .await;
    mount_classic_page(
        &server,
        2,
        list_page(&[("BP16-002", "Fairy (reprint)"), ("BP16-003", "Knight")], &pager(2)),
        1,
    )
    .await;

    let config = create_test_config(&server, vec![classic_seed(&server)]);
    let outcome = harvest(&config).await.expect("harvest failed");

    assert_eq!(outcome.records.len(), 3);
    let fairy = outcome
        .records
        .iter()
        .find(|r| r.cardno == "BP16-002")
        .expect("BP16-002 kept");
    assert_eq!(fairy.name.as_deref(), Some("Fairy"));
}

#[tokio::test]
async fn test_page_without_new_cards_stops_pagination() {
    let server = MockServer::start().await;
    let repeated = list_page(&[("BP16-001", "Archer")], &pager(5));

    mount_classic_page(&server, 1, repeated.clone(), 1).await;
    mount_classic_page(&server, 2, repeated.clone(), 1).await;
    mount_classic_page(&server, 3, repeated, 0).await;

    let config = create_test_config(&server, vec![classic_seed(&server)]);
    let outcome = harvest(&config).await.expect("harvest failed");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.seeds[0].pages_fetched, 2);
    assert_eq!(outcome.seeds[0].state, TargetState::Exhausted);
}

#[tokio::test]
async fn test_limit_stops_crawl() {
    let server = MockServer::start().await;

    mount_classic_page(
        &server,
        1,
        list_page(&[("BP16-001", "A"), ("BP16-002", "B")], &pager(3)),
        1,
    )
    .await;
    mount_classic_page(
        &server,
        2,
        list_page(&[("BP16-003", "C"), ("BP16-004", "D")], &pager(3)),
        1,
    )
    .await;
    mount_classic_page(&server, 3, list_page(&[("BP16-005", "E")], &pager(3)), 0).await;

    let seeds = vec![classic_seed(&server), scroll_seed(&server)];
    let mut config = create_test_config(&server, seeds);
    config.crawl.limit = 3;
    let outcome = harvest(&config).await.expect("harvest failed");

    let ids: Vec<&str> = outcome.records.iter().map(|r| r.cardno.as_str()).collect();
    assert_eq!(ids, vec!["BP16-001", "BP16-002", "BP16-003"]);
    assert_eq!(outcome.seeds[0].state, TargetState::LimitReached);

    // The second seed is never fetched once the limit is reached
    assert_eq!(outcome.seeds[1].state, TargetState::LimitReached);
    assert_eq!(outcome.seeds[1].pages_fetched, 0);
    assert_eq!(outcome.requests, 2);
}

#[tokio::test]
async fn test_expansion_filter_applies_before_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(html(list_page(
            &[
                ("CP01-001", "Collab"),
                ("BP16-001", "Archer"),
                ("CP01-002", "Collab 2"),
                ("BP16-002", "Fairy"),
            ],
            "",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, vec![scroll_seed(&server)]);
    config.crawl.only_expansions = vec!["bp16".to_string()];
    config.crawl.limit = 2;
    let outcome = harvest(&config).await.expect("harvest failed");

    let ids: Vec<&str> = outcome.records.iter().map(|r| r.cardno.as_str()).collect();
    assert_eq!(ids, vec!["BP16-001", "BP16-002"]);
}

#[tokio::test]
async fn test_repeated_seed_adds_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(html(list_page(
            &[("BP16-001", "Archer"), ("BP16-002", "Fairy")],
            "",
        )))
        .expect(2)
        .mount(&server)
        .await;

    let seed = scroll_seed(&server);
    let config = create_test_config(&server, vec![seed.clone(), seed]);
    let outcome = harvest(&config).await.expect("harvest failed");

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.seeds.len(), 2);
    assert_eq!(outcome.seeds[1].records_added, 0);
    assert_eq!(outcome.seeds[1].state, TargetState::Exhausted);
}

#[tokio::test]
async fn test_failing_seed_does_not_abort_others() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/"))
        .and(query_param("expansion_name", "BP15"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(html(list_page(&[("BP16-001", "Archer")], "")))
        .expect(1)
        .mount(&server)
        .await;

    let broken = format!("{}/cardlist/?expansion_name=BP15", server.uri());
    let config = create_test_config(&server, vec![broken, scroll_seed(&server)]);
    let outcome = harvest(&config).await.expect("harvest failed");

    assert_eq!(outcome.seeds[0].state, TargetState::Failed);
    assert!(outcome.seeds[0]
        .error
        .as_deref()
        .is_some_and(|e| e.contains("500")));
    assert_eq!(outcome.seeds[1].state, TargetState::Exhausted);
    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.no_records_error().is_none());
}

#[tokio::test]
async fn test_unparseable_page_halts_only_that_seed() {
    let server = MockServer::start().await;

    mount_classic_page(
        &server,
        1,
        list_page(&[("BP16-001", "Archer")], &pager(3)),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"error":"maintenance"}"#))
        .expect(1)
        .mount(&server)
        .await;
    mount_classic_page(&server, 3, list_page(&[("BP16-003", "C")], &pager(3)), 0).await;

    let config = create_test_config(&server, vec![classic_seed(&server)]);
    let outcome = harvest(&config).await.expect("harvest failed");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.seeds[0].state, TargetState::Failed);
    assert_eq!(outcome.seeds[0].pages_fetched, 1);
}

#[tokio::test]
async fn test_all_seeds_failed_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news/"))
        .respond_with(html(list_page(&[("BP16-001", "Archer")], "")))
        .expect(0)
        .mount(&server)
        .await;

    let unsupported = format!("{}/news/", server.uri());
    let config = create_test_config(&server, vec![scroll_seed(&server), unsupported]);
    let outcome = harvest(&config).await.expect("harvest failed");

    assert!(outcome.records.is_empty());
    assert!(outcome.all_seeds_failed());
    assert!(outcome.seeds[1].mode.is_none());
    assert!(matches!(
        outcome.no_records_error(),
        Some(CardlistError::NoRecords {
            all_seeds_failed: true
        })
    ));
}

#[tokio::test]
async fn test_everything_filtered_out_is_not_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(html(list_page(&[("BP16-001", "Archer")], "")))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, vec![scroll_seed(&server)]);
    config.crawl.only_expansions = vec!["XX99".to_string()];
    let outcome = harvest(&config).await.expect("harvest failed");

    assert!(matches!(
        outcome.no_records_error(),
        Some(CardlistError::NoRecords {
            all_seeds_failed: false
        })
    ));
}

#[tokio::test]
async fn test_transient_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(html(list_page(&[("BP16-001", "Archer")], "")))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, vec![scroll_seed(&server)]);
    config.fetch.max_retries = 1;
    let outcome = harvest(&config).await.expect("harvest failed");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.requests, 2);
    assert_eq!(outcome.seeds[0].state, TargetState::Exhausted);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, vec![scroll_seed(&server)]);
    config.fetch.max_retries = 3;
    let outcome = harvest(&config).await.expect("harvest failed");

    assert_eq!(outcome.seeds[0].state, TargetState::Failed);
    assert_eq!(outcome.requests, 1);
}

#[tokio::test]
async fn test_delay_is_enforced_between_requests() {
    let server = MockServer::start().await;

    mount_classic_page(&server, 1, list_page(&[("BP16-001", "A")], &pager(3)), 1).await;
    mount_classic_page(&server, 2, list_page(&[("BP16-002", "B")], &pager(3)), 1).await;
    mount_classic_page(&server, 3, list_page(&[("BP16-003", "C")], &pager(3)), 1).await;

    let mut config = create_test_config(&server, vec![classic_seed(&server)]);
    config.fetch.delay_secs = 0.15;

    let started = Instant::now();
    let outcome = harvest(&config).await.expect("harvest failed");

    assert_eq!(outcome.records.len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_detail_pass_fills_missing_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(html(list_page(
            &[("BP16-001", "Archer"), ("BP16-002", "Fairy")],
            "",
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/"))
        .and(query_param("cardno", "BP16-001"))
        .respond_with(html(
            r#"<html><body><div class="cardlist-Detail"><div class="txt">
                 <h1 class="ttl">Archer of the Woods</h1>
                 <dl>
                   <dt>クラス</dt><dd>エルフ</dd>
                   <dt>カード種類</dt><dd>フォロワー</dd>
                 </dl>
                 <div class="status">
                   <span class="status-Item-Cost">2</span>
                   <span class="status-Item-Power">2</span>
                   <span class="status-Item-Hp">3</span>
                 </div>
                 <div class="detail">[ファンファーレ] draw a card.<br>[進化時] deal 1.</div>
               </div></div></body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/"))
        .and(query_param("cardno", "BP16-002"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, vec![scroll_seed(&server)]);
    config.crawl.details = true;
    let outcome = harvest(&config).await.expect("harvest failed");

    let archer = &outcome.records[0];
    assert_eq!(archer.cardno, "BP16-001");
    // The list page's name is kept
    assert_eq!(archer.name.as_deref(), Some("Archer"));
    assert_eq!(archer.class.as_deref(), Some("エルフ"));
    assert_eq!(archer.hp.as_deref(), Some("3"));
    assert_eq!(
        archer.ability.as_deref(),
        Some("[ファンファーレ] draw a card.\n[進化時] deal 1.")
    );

    let fairy = &outcome.records[1];
    assert_eq!(fairy.name.as_deref(), Some("Fairy"));
    assert!(fairy.hp.is_none());

    let details = outcome.details.expect("detail pass ran");
    assert_eq!(details.enriched, 1);
    assert_eq!(details.failed, 1);
    assert_eq!(outcome.requests, 3);
}

#[tokio::test]
async fn test_discovery_without_seeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/"))
        .respond_with(html(
            r#"<html><body><form>
                 <select name="expansion_name">
                   <option value="">ALL</option>
                   <option value="BP16">BP16</option>
                   <option value="CP01">CP01</option>
                 </select>
               </form></body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    for (code, cardno) in [("BP16", "BP16-001"), ("CP01", "CP01-001")] {
        Mock::given(method("GET"))
            .and(path("/cardlist/cardsearch/"))
            .and(query_param("expansion_name", code))
            .and(query_param("class[]", "all"))
            .respond_with(html(list_page(&[(cardno, "Card")], "")))
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = create_test_config(&server, vec![]);
    let outcome = harvest(&config).await.expect("harvest failed");

    let ids: Vec<&str> = outcome.records.iter().map(|r| r.cardno.as_str()).collect();
    assert_eq!(ids, vec!["BP16-001", "CP01-001"]);
    assert_eq!(outcome.seeds.len(), 2);
    assert_eq!(outcome.requests, 3);
}

#[tokio::test]
async fn test_discovery_honors_allow_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/"))
        .respond_with(html(
            r#"<select name="expansion_name">
                 <option value="BP16">BP16</option>
                 <option value="CP01">CP01</option>
               </select>"#
                .to_string(),
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .and(query_param("expansion_name", "BP16"))
        .respond_with(html(list_page(&[("BP16-001", "Card")], "")))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .and(query_param("expansion_name", "CP01"))
        .respond_with(html(list_page(&[("CP01-001", "Card")], "")))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, vec![]);
    config.crawl.only_expansions = vec!["CP01".to_string()];
    let outcome = harvest(&config).await.expect("harvest failed");

    assert_eq!(outcome.seeds.len(), 1);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].cardno, "CP01-001");
}

#[tokio::test]
async fn test_harvest_to_tsv_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(html(
            r#"<html><body><ul>
                 <li data-cardno="BP16-010" data-cost="4" data-kind="スペル">
                   <p class="ttl">Storm Call</p>
                   <div class="detail">Deal 3 damage.<br>Draw a card.</div>
                 </li>
                 <li data-cardno="BP16-011"><p class="ttl">Plain</p></li>
               </ul></body></html>"#
                .to_string(),
        ))
        .mount(&server)
        .await;

    let config = create_test_config(&server, vec![scroll_seed(&server)]);
    let outcome = harvest(&config).await.expect("harvest failed");
    assert_eq!(
        outcome.records[0].ability.as_deref(),
        Some("Deal 3 damage.\nDraw a card.")
    );

    let dir = TempDir::new().expect("Failed to create temp dir");
    let out = dir.path().join("out").join("cards.tsv");
    let written = write_tsv(&outcome.records, &out).expect("Failed to write TSV");
    assert_eq!(written, 2);

    let content = std::fs::read_to_string(&out).expect("Failed to read TSV");
    assert_eq!(content.lines().count(), 3);
    assert!(content.contains(r"Deal 3 damage.\nDraw a card."));

    let restored = read_tsv(&out).expect("Failed to read back TSV");
    assert_eq!(restored, outcome.records);
}

#[tokio::test]
async fn test_timeout_halts_only_that_seed() {
    let server = MockServer::start().await;

    mount_classic_page(
        &server,
        1,
        list_page(&[("BP16-001", "Archer"), ("BP16-002", "Fairy")], &pager(2)),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/"))
        .and(query_param("page", "2"))
        .respond_with(
            html(list_page(&[("BP16-003", "Too Late")], &pager(2)))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(html(list_page(&[("BP16-050", "Survivor")], "")))
        .expect(1)
        .mount(&server)
        .await;

    let seeds = vec![classic_seed(&server), scroll_seed(&server)];
    let mut config = create_test_config(&server, seeds);
    config.fetch.timeout_secs = 0.5;
    let outcome = harvest(&config).await.expect("harvest failed");

    let ids: Vec<&str> = outcome.records.iter().map(|r| r.cardno.as_str()).collect();
    assert_eq!(ids, vec!["BP16-001", "BP16-002", "BP16-050"]);

    let timed_out = &outcome.seeds[0];
    assert_eq!(timed_out.state, TargetState::Failed);
    assert_eq!(timed_out.pages_fetched, 1);
    assert_eq!(timed_out.records_added, 2);
    assert!(timed_out
        .error
        .as_deref()
        .is_some_and(|e| e.contains("timeout")));

    assert_eq!(outcome.seeds[1].state, TargetState::Exhausted);
    assert!(outcome.no_records_error().is_none());
}

#[tokio::test]
async fn test_empty_scroll_fragment_ends_seed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(html(list_page(
            &[("BP16-001", "Archer")],
            "<script>var max_page = 4;</script>",
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch_ex"))
        .and(query_param("page", "2"))
        .respond_with(html(list_page(&[("BP16-002", "Fairy")], "")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch_ex"))
        .and(query_param("page", "3"))
        .respond_with(html(String::new()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch_ex"))
        .and(query_param("page", "4"))
        .respond_with(html(list_page(&[("BP16-004", "Never")], "")))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, vec![scroll_seed(&server)]);
    let outcome = harvest(&config).await.expect("harvest failed");

    assert_eq!(outcome.records.len(), 2);
    let report = &outcome.seeds[0];
    assert_eq!(report.state, TargetState::Exhausted);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.error, None);
}

#[tokio::test]
async fn test_inspect_reports_duplicates_and_bare_links() {
    let server = MockServer::start().await;

    mount_classic_page(
        &server,
        1,
        list_page(&[("BP16-001", "Archer"), ("BP16-002", "Fairy")], &pager(2)),
        1,
    )
    .await;
    mount_classic_page(
        &server,
        2,
        list_page(&[("BP16-002", "Fairy"), ("BP16-003", "Knight")], &pager(2)),
        1,
    )
    .await;

    let config = create_test_config(&server, vec![]);
    let mut fetcher = Fetcher::new(&config.fetch).expect("Failed to build fetcher");
    let report = inspect_search(&mut fetcher, &RetryPolicy::none(), &classic_seed(&server), 5)
        .await
        .expect("inspection failed");

    assert_eq!(report.mode, PaginationMode::Classic);
    assert_eq!(report.pages_scanned, 2);
    assert_eq!(report.card_blocks, 4);
    assert_eq!(report.distinct_cardnos, 3);
    assert_eq!(report.error, None);

    assert_eq!(report.duplicates.len(), 1);
    let duplicate = &report.duplicates[0];
    assert_eq!(duplicate.cardno, "BP16-002");
    assert_eq!(duplicate.count, 2);
    assert_eq!(
        duplicate.links,
        vec![format!("{}/cardlist/?cardno=BP16-002", server.uri())]
    );

    assert!(!report.links_without_cardno.is_empty());
    assert!(report
        .links_without_cardno
        .iter()
        .all(|link| link.contains("/cardlist/") && !link.contains("cardno=")));
    assert!(report.render().contains("BP16-002 x 2"));
}

#[tokio::test]
async fn test_inspect_keeps_first_pages_when_later_page_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch/"))
        .respond_with(html(list_page(
            &[("BP16-001", "Archer")],
            "<script>var max_page = 2;</script>",
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cardlist/cardsearch_ex"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, vec![]);
    let mut fetcher = Fetcher::new(&config.fetch).expect("Failed to build fetcher");
    let report = inspect_search(&mut fetcher, &RetryPolicy::none(), &scroll_seed(&server), 5)
        .await
        .expect("inspection failed");

    assert_eq!(report.mode, PaginationMode::InfiniteScroll);
    assert_eq!(report.pages_scanned, 1);
    assert_eq!(report.card_blocks, 1);
    assert!(report.error.as_deref().is_some_and(|e| e.contains("500")));
}

#[tokio::test]
async fn test_inspect_rejects_unusable_urls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardlist/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, vec![]);
    let mut fetcher = Fetcher::new(&config.fetch).expect("Failed to build fetcher");
    let retry = RetryPolicy::none();

    let unsupported = format!("{}/news/", server.uri());
    assert!(matches!(
        inspect_search(&mut fetcher, &retry, &unsupported, 5).await,
        Err(CardlistError::UnsupportedSeed { .. })
    ));
    assert!(matches!(
        inspect_search(&mut fetcher, &retry, &classic_seed(&server), 5).await,
        Err(CardlistError::HttpStatus { status: 404, .. })
    ));
}
