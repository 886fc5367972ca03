//! End-to-end tests of the device list miner

use crate::support::{
    empty_list_page, list_page, list_page_with_pagination, stored_ids, test_config,
    write_summaries,
};
use phonedb_miner::miner::scrape_brand_devices;
use phonedb_miner::storage::{DeviceSummary, JsonCollection};
use phonedb_miner::StopReason;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a response for the search page at `offset`
async fn mount_page(server: &MockServer, offset: usize, body: String) {
    Mock::given(method("POST"))
        .and(path("/index.php"))
        .and(body_string_contains(format!("result_lower_limit={}", offset)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Every search page not mounted explicitly is empty
async fn mount_empty_fallback(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_list_page()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_run_collects_every_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());

    mount_page(&server, 0, list_page(58, 1..=29, "Phone")).await;
    mount_page(&server, 29, list_page(58, 30..=58, "Phone")).await;

    let output = config.output.devices_list_path();
    let report = scrape_brand_devices("Acme", false, &output, &config)
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Complete);
    assert_eq!(report.collected, 58);
    assert_eq!(report.total(), 58);
    assert_eq!(report.pages_fetched, 2);

    let ids = stored_ids::<DeviceSummary>(&output.join("acme_devices.json"));
    assert_eq!(ids.len(), 58);
    assert_eq!(ids.first().map(String::as_str), Some("1"));
    assert_eq!(ids.last().map(String::as_str), Some("58"));
}

#[tokio::test]
async fn test_first_page_empty_stops_immediately() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_list_page()))
        .expect(1)
        .mount(&server)
        .await;

    let output = config.output.devices_list_path();
    let report = scrape_brand_devices("Nobody", false, &output, &config)
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::NoMatches);
    assert_eq!(report.collected, 0);
    assert_eq!(report.total(), 0);
    assert!(!output.join("nobody_devices.json").exists());
}

#[tokio::test]
async fn test_duplicates_across_pages_are_stored_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());

    // Page 2 repeats ids 20..=29 under different names
    mount_page(&server, 0, list_page(58, 1..=29, "First")).await;
    mount_page(&server, 29, list_page(58, 20..=48, "Second")).await;

    let output = config.output.devices_list_path();
    let report = scrape_brand_devices("Acme", false, &output, &config)
        .await
        .unwrap();

    assert_eq!(report.collected, 58);
    assert_eq!(report.stored, 48);
    assert_eq!(report.new_devices, 48);

    let devices: Vec<DeviceSummary> = JsonCollection::new(output.join("acme_devices.json"))
        .load()
        .unwrap();
    assert_eq!(devices.len(), 48);
    let twenty = devices
        .iter()
        .find(|d| d.id.as_deref() == Some("20"))
        .unwrap();
    assert_eq!(twenty.name, "First 20");
}

#[tokio::test]
async fn test_rebuild_replaces_existing_collection() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let output = config.output.devices_list_path();
    let file = output.join("acme_devices.json");

    write_summaries(&server, &file, 100..=110);
    mount_page(&server, 0, list_page(3, 1..=3, "Phone")).await;

    let report = scrape_brand_devices("Acme", false, &output, &config)
        .await
        .unwrap();

    assert!(!report.update_mode);
    assert_eq!(stored_ids::<DeviceSummary>(&file), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_update_merges_new_devices_only() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let output = config.output.devices_list_path();
    let file = output.join("acme_devices.json");

    write_summaries(&server, &file, 1..=3);
    mount_page(&server, 0, list_page(4, 2..=5, "Phone")).await;

    let report = scrape_brand_devices("Acme", true, &output, &config)
        .await
        .unwrap();

    assert!(report.update_mode);
    assert_eq!(report.new_devices, 2);
    assert_eq!(report.total(), 5);
    assert_eq!(
        stored_ids::<DeviceSummary>(&file),
        vec!["1", "2", "3", "4", "5"]
    );
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let output = config.output.devices_list_path();
    let file = output.join("acme_devices.json");

    write_summaries(&server, &file, 1..=3);
    mount_page(&server, 0, list_page(4, 2..=5, "Phone")).await;

    scrape_brand_devices("Acme", true, &output, &config)
        .await
        .unwrap();
    let after_first = std::fs::read_to_string(&file).unwrap();

    let second = scrape_brand_devices("Acme", true, &output, &config)
        .await
        .unwrap();
    let after_second = std::fs::read_to_string(&file).unwrap();

    assert_eq!(second.new_devices, 0);
    assert_eq!(second.total(), 5);
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn test_update_drops_devices_without_id() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let output = config.output.devices_list_path();
    let file = output.join("acme_devices.json");

    write_summaries(&server, &file, 1..=1);
    let page = list_page(3, 2..=2, "Phone").replace(
        "</body>",
        r#"<div class="content_block_title"><a href="index.php?m=device">Mystery</a></div>
        <div class="content_block_title">Unlinked</div></body>"#,
    );
    mount_page(&server, 0, page).await;

    let report = scrape_brand_devices("Acme", true, &output, &config)
        .await
        .unwrap();

    assert_eq!(report.collected, 3);
    assert_eq!(report.new_devices, 1);
    let devices: Vec<DeviceSummary> = JsonCollection::new(&file).load().unwrap();
    assert_eq!(devices.len(), 2);
}

#[tokio::test]
async fn test_corrupt_collection_falls_back_to_rebuild() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let output = config.output.devices_list_path();
    let file = output.join("acme_devices.json");

    std::fs::write(&file, "{ this is not json").unwrap();
    mount_page(&server, 0, list_page(2, 1..=2, "Phone")).await;

    let report = scrape_brand_devices("Acme", true, &output, &config)
        .await
        .unwrap();

    assert!(!report.update_mode);
    assert_eq!(report.total(), 2);
    assert_eq!(stored_ids::<DeviceSummary>(&file), vec!["1", "2"]);
}

#[tokio::test]
async fn test_pagination_widget_raises_estimate() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());

    // The banner alone would end the run after the first page
    mount_page(&server, 0, list_page_with_pagination(29, 1..=29, 29)).await;
    mount_page(&server, 29, list_page(29, 30..=58, "Phone")).await;
    mount_empty_fallback(&server).await;

    let output = config.output.devices_list_path();
    let report = scrape_brand_devices("Acme", false, &output, &config)
        .await
        .unwrap();

    assert_eq!(report.estimate, 58);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.collected, 58);
    assert_eq!(report.stored, 58);
    assert_eq!(report.stop_reason, StopReason::Complete);
}

#[tokio::test]
async fn test_stops_after_consecutive_empty_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());

    mount_page(&server, 0, list_page(100, 1..=29, "Phone")).await;
    mount_empty_fallback(&server).await;

    let output = config.output.devices_list_path();
    let report = scrape_brand_devices("Acme", false, &output, &config)
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::EmptyPageLimit);
    assert_eq!(report.pages_fetched, 4);
    assert_eq!(report.collected, 29);
}

#[tokio::test]
async fn test_failed_page_is_skipped_like_an_empty_one() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());

    mount_page(&server, 0, list_page(58, 1..=29, "Phone")).await;
    Mock::given(method("POST"))
        .and(body_string_contains("result_lower_limit=29"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, 58, list_page(58, 30..=58, "Phone")).await;

    let output = config.output.devices_list_path();
    let report = scrape_brand_devices("Acme", false, &output, &config)
        .await
        .unwrap();

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.collected, 58);
    assert_eq!(report.estimate, 58);
    assert_eq!(report.stop_reason, StopReason::Complete);
}
