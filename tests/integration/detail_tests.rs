//! End-to-end tests of the device detail miner

use crate::support::{detail_page, stored_ids, summary, test_config, write_summaries};
use phonedb_miner::miner::{scrape_brand_device_details, DeviceListSource};
use phonedb_miner::storage::{DeviceDetail, JsonCollection};
use phonedb_miner::MinerError;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Answers every detail request with a valid page
async fn mount_details(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("Acme Phone")))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_extracts_every_listed_device() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let list_dir = config.output.devices_list_path();
    let output = config.output.device_detail_path();

    write_summaries(&server, &list_dir.join("acme_devices.json"), 1..=3);
    mount_details(&server).await;

    let source = DeviceListSource::BrandList(list_dir);
    let report = scrape_brand_device_details("Acme", None, false, &output, &source, &config)
        .await
        .unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(report.stored, 3);

    let details: Vec<DeviceDetail> = JsonCollection::new(output.join("acme_devices.json"))
        .load()
        .unwrap();
    assert_eq!(details.len(), 3);
    assert_eq!(details[0].id.as_deref(), Some("1"));
    assert_eq!(details[0].name.as_deref(), Some("Phone 1"));
    assert_eq!(details[0].brand.as_deref(), Some("Acme"));
    assert_eq!(details[0].full_name.as_deref(), Some("Acme Phone"));
    assert_eq!(details[0].attributes["ram_capacity"], "8 GiB RAM");
    assert_eq!(
        details[0].images,
        vec![format!("{}/img/front.jpg", server.uri())]
    );
}

#[tokio::test]
async fn test_max_devices_caps_the_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let list_dir = config.output.devices_list_path();
    let output = config.output.device_detail_path();

    write_summaries(&server, &list_dir.join("acme_devices.json"), 1..=20);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("Acme Phone")))
        .expect(5)
        .mount(&server)
        .await;

    let source = DeviceListSource::BrandList(list_dir);
    let report = scrape_brand_device_details("Acme", Some(5), false, &output, &source, &config)
        .await
        .unwrap();

    assert_eq!(report.processed, 5);
    assert_eq!(report.succeeded, 5);
    assert_eq!(
        stored_ids::<DeviceDetail>(&output.join("acme_devices.json")),
        vec!["1", "2", "3", "4", "5"]
    );
}

#[tokio::test]
async fn test_update_skips_devices_with_details() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let list_dir = config.output.devices_list_path();
    let output = config.output.device_detail_path();
    let details_file = output.join("acme_devices.json");

    write_summaries(&server, &list_dir.join("acme_devices.json"), 1..=3);

    // Details for devices 1 and 2 already exist
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("Acme Phone")))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    let source = DeviceListSource::BrandList(list_dir);
    scrape_brand_device_details("Acme", Some(2), false, &output, &source, &config)
        .await
        .unwrap();
    server.reset().await;

    Mock::given(method("GET"))
        .and(query_param("id", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("Acme Three")))
        .expect(1)
        .mount(&server)
        .await;

    let report = scrape_brand_device_details("Acme", None, true, &output, &source, &config)
        .await
        .unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.stored, 3);
    assert_eq!(stored_ids::<DeviceDetail>(&details_file), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_update_with_corrupt_details_starts_empty() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let list_dir = config.output.devices_list_path();
    let output = config.output.device_detail_path();
    let details_file = output.join("acme_devices.json");

    write_summaries(&server, &list_dir.join("acme_devices.json"), 1..=2);
    std::fs::write(&details_file, "[{\"id\": ").unwrap();
    mount_details(&server).await;

    let source = DeviceListSource::BrandList(list_dir);
    let report = scrape_brand_device_details("Acme", None, true, &output, &source, &config)
        .await
        .unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(stored_ids::<DeviceDetail>(&details_file), vec!["1", "2"]);
}

#[tokio::test]
async fn test_partial_save_every_ten_successes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let list_dir = config.output.devices_list_path();
    let output = config.output.device_detail_path();
    let details_file = output.join("acme_devices.json");

    write_summaries(&server, &list_dir.join("acme_devices.json"), 1..=11);

    // The 11th device answers slowly so the partial save can be observed
    Mock::given(method("GET"))
        .and(query_param("id", "11"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_page("Acme Slow"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    mount_details(&server).await;

    let run = {
        let config = config.clone();
        let output = output.clone();
        let source = DeviceListSource::BrandList(list_dir);
        tokio::spawn(async move {
            scrape_brand_device_details("Acme", None, false, &output, &source, &config).await
        })
    };

    let mut partial = Vec::new();
    for _ in 0..150 {
        if let Ok(records) = JsonCollection::new(&details_file).load::<DeviceDetail>() {
            partial = records;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(partial.len(), 10);

    let report = run.await.unwrap().unwrap();
    assert_eq!(report.partial_saves, 1);
    assert_eq!(report.stored, 11);
    assert_eq!(stored_ids::<DeviceDetail>(&details_file).len(), 11);
}

#[tokio::test]
async fn test_failed_devices_are_counted_and_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let list_dir = config.output.devices_list_path();
    let output = config.output.device_detail_path();

    let mut devices: Vec<_> = (1..=3).map(|id| summary(&server, id)).collect();
    devices[2].url = None;
    JsonCollection::new(list_dir.join("acme_devices.json"))
        .save(&devices)
        .unwrap();

    Mock::given(method("GET"))
        .and(query_param("id", "2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;
    mount_details(&server).await;

    let source = DeviceListSource::BrandList(list_dir);
    let report = scrape_brand_device_details("Acme", None, false, &output, &source, &config)
        .await
        .unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 2);
    assert_eq!(
        stored_ids::<DeviceDetail>(&output.join("acme_devices.json")),
        vec!["1"]
    );
}

#[tokio::test]
async fn test_duplicate_ids_in_input_are_fetched_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let list_dir = config.output.devices_list_path();
    let output = config.output.device_detail_path();

    let devices = vec![summary(&server, 1), summary(&server, 1), summary(&server, 2)];
    JsonCollection::new(list_dir.join("acme_devices.json"))
        .save(&devices)
        .unwrap();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("Acme Phone")))
        .expect(2)
        .mount(&server)
        .await;

    let source = DeviceListSource::BrandList(list_dir);
    let report = scrape_brand_device_details("Acme", None, false, &output, &source, &config)
        .await
        .unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        stored_ids::<DeviceDetail>(&output.join("acme_devices.json")),
        vec!["1", "2"]
    );
}

#[tokio::test]
async fn test_input_file_overrides_brand_list() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let output = config.output.device_detail_path();
    let input = dir.path().join("picked.json");

    write_summaries(&server, &input, 7..=8);
    mount_details(&server).await;

    let source = DeviceListSource::File(input);
    let report = scrape_brand_device_details("Acme", None, false, &output, &source, &config)
        .await
        .unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(
        stored_ids::<DeviceDetail>(&output.join("acme_devices.json")),
        vec!["7", "8"]
    );
}

#[tokio::test]
async fn test_missing_device_list_is_an_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let source = DeviceListSource::BrandList(config.output.devices_list_path());
    let result = scrape_brand_device_details(
        "Acme",
        None,
        false,
        &config.output.device_detail_path(),
        &source,
        &config,
    )
    .await;

    assert!(matches!(
        result,
        Err(MinerError::DeviceListUnavailable { .. })
    ));
    assert!(!config
        .output
        .device_detail_path()
        .join("acme_devices.json")
        .exists());
}
