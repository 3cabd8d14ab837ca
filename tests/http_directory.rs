//! HttpDirectory against a canned device store on a local socket

use smartclass::directory::{DeviceDirectory, HttpDirectory};
use smartclass::model::{DeviceFields, DeviceState, DeviceType, LightStatus, NewStatusLog};
use smartclass::DashboardError;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    target: String,
    body: String,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

/// Start a store that answers every request with `status` and `body`.
async fn canned_store(status: u16, body: &'static str) -> (String, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&log);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let seen = Arc::clone(&seen);
            tokio::spawn(async move {
                let mut reader = BufReader::new(stream);
                let mut request_line = String::new();
                reader.read_line(&mut request_line).await.unwrap();
                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let target = parts.next().unwrap_or_default().to_string();

                let mut content_length = 0;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).await.unwrap();
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap();
                        }
                    }
                }
                let mut raw = vec![0u8; content_length];
                reader.read_exact(&mut raw).await.unwrap();

                seen.lock().unwrap().push(Recorded {
                    method,
                    target,
                    body: String::from_utf8(raw).unwrap(),
                });

                let response = format!(
                    "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let mut stream = reader.into_inner();
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            });
        }
    });

    (format!("http://{}", addr), log)
}

fn last(log: &Log) -> Recorded {
    log.lock().unwrap().last().cloned().unwrap()
}

#[tokio::test]
async fn test_list_devices_skips_invalid_records() {
    let (url, log) = canned_store(
        200,
        r#"[
            {"id":"1","name":"Lamp","type":"light","status":"on","location":"Room 101"},
            {"id":"2","name":"Broken","type":"toaster","status":"on","location":"Room 101"},
            {"id":"3","name":"Front door","type":"door","status":"locked","location":"Lab"}
        ]"#,
    )
    .await;
    let directory = HttpDirectory::new(url, None).unwrap();

    let devices = directory.list_devices().await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].id, "1");
    assert_eq!(devices[1].status(), "locked");

    let request = last(&log);
    assert_eq!(request.method, "GET");
    assert_eq!(request.target, "/devices");
}

#[tokio::test]
async fn test_create_device_sends_flat_body() {
    let (url, log) = canned_store(
        201,
        r#"{"id":"9","name":"Lamp","type":"light","status":"off","location":"Room 101"}"#,
    )
    .await;
    let directory = HttpDirectory::new(url, None).unwrap();

    let fields = DeviceFields::new("Lamp", "Room 101", DeviceState::Light(LightStatus::Off));
    let device = directory.create_device(&fields).await.unwrap();
    assert_eq!(device.id, "9");

    let request = last(&log);
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/devices");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"name":"Lamp","type":"light","status":"off","location":"Room 101"})
    );
}

#[tokio::test]
async fn test_update_device_puts_by_id() {
    let (url, log) = canned_store(
        200,
        r#"{"id":"4","name":"Lamp","type":"light","status":"on","location":"Room 101"}"#,
    )
    .await;
    let directory = HttpDirectory::new(url, None).unwrap();

    let fields = DeviceFields::new("Lamp", "Room 101", DeviceState::Light(LightStatus::On));
    let device = directory.update_device("4", &fields).await.unwrap();
    assert_eq!(device.status(), "on");

    let request = last(&log);
    assert_eq!(request.method, "PUT");
    assert_eq!(request.target, "/devices/4");
}

#[tokio::test]
async fn test_delete_device() {
    let (url, log) = canned_store(200, r#"{"id":"4"}"#).await;
    let directory = HttpDirectory::new(url, None).unwrap();

    directory.delete_device("4").await.unwrap();

    let request = last(&log);
    assert_eq!(request.method, "DELETE");
    assert_eq!(request.target, "/devices/4");
}

#[tokio::test]
async fn test_missing_device_maps_to_not_found() {
    let (url, _) = canned_store(404, r#""Not found""#).await;
    let directory = HttpDirectory::new(url, None).unwrap();

    assert!(matches!(
        directory.get_device("77").await,
        Err(DashboardError::DeviceNotFound(id)) if id == "77"
    ));
    assert!(matches!(
        directory.delete_device("77").await,
        Err(DashboardError::DeviceNotFound(_))
    ));
}

#[tokio::test]
async fn test_server_error_maps_to_http_status() {
    let (url, _) = canned_store(500, "{}").await;
    let directory = HttpDirectory::new(url, None).unwrap();

    let err = directory.list_devices().await.unwrap_err();
    assert!(matches!(err, DashboardError::HttpStatus { status: 500, .. }));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_recent_logs_query() {
    let (url, log) = canned_store(
        200,
        r#"[{"id":"1","deviceId":"4","deviceName":"Lamp","newStatus":"on","timestamp":"2025-09-20T10:00:00.000Z"}]"#,
    )
    .await;
    let directory = HttpDirectory::new(url, None).unwrap();

    let logs = directory.list_recent_logs(5).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].device_name, "Lamp");

    let request = last(&log);
    assert_eq!(request.method, "GET");
    assert_eq!(
        request.target,
        "/status_logs?sortBy=timestamp&order=desc&limit=5"
    );
}

#[tokio::test]
async fn test_append_log_body() {
    let (url, log) = canned_store(
        201,
        r#"{"id":"12","deviceId":"4","deviceName":"Lamp","newStatus":"on","timestamp":"2025-09-20T10:00:00.000Z"}"#,
    )
    .await;
    let directory = HttpDirectory::new(url, None).unwrap();

    let device = DeviceFields::new("Lamp", "Room 101", DeviceState::initial(DeviceType::Light))
        .into_device("4");
    let timestamp = "2025-09-20T10:00:00Z".parse().unwrap();
    let stored = directory
        .append_log(&NewStatusLog::for_device(&device, timestamp))
        .await
        .unwrap();
    assert_eq!(stored.id, "12");

    let request = last(&log);
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/status_logs");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["deviceId"], "4");
    assert_eq!(body["newStatus"], "on");
    assert_eq!(body["timestamp"], "2025-09-20T10:00:00.000Z");
}

#[tokio::test]
async fn test_unreachable_store_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let directory = HttpDirectory::new(url, None).unwrap();
    assert!(matches!(
        directory.list_devices().await,
        Err(DashboardError::Transport { .. })
    ));
}

#[tokio::test]
async fn test_reserved_characters_stay_inside_the_id_segment() {
    let (url, log) = canned_store(
        200,
        r#"{"id":"7?x=1","name":"Lamp","type":"light","status":"on","location":"Lab"}"#,
    )
    .await;
    let directory = HttpDirectory::new(url, None).unwrap();

    directory.delete_device("../status_logs").await.unwrap();
    assert_eq!(last(&log).method, "DELETE");
    assert_eq!(last(&log).target, "/devices/..%2Fstatus_logs");

    directory.get_device("7?x=1").await.unwrap();
    assert_eq!(last(&log).target, "/devices/7%3Fx%3D1");

    let fields = DeviceFields::new("Lamp", "Lab", DeviceState::Light(LightStatus::On));
    directory.update_device("a/b", &fields).await.unwrap();
    assert_eq!(last(&log).target, "/devices/a%2Fb");
}

#[tokio::test]
async fn test_list_devices_skips_records_missing_fields() {
    let (url, _) = canned_store(
        200,
        r#"[
            {"id":"1","name":"Lamp","type":"light","status":"on","location":"Room 101"},
            {"id":"2","name":"Door","type":"door","location":"Room 101"}
        ]"#,
    )
    .await;
    let directory = HttpDirectory::new(url, None).unwrap();

    let devices = directory.list_devices().await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "1");
}

#[tokio::test]
async fn test_recent_logs_skip_malformed_entries() {
    let (url, _) = canned_store(
        200,
        r#"[
            {"id":"2","deviceId":"4","deviceName":"Lamp","newStatus":"off","timestamp":"2025-09-20T10:00:01.000Z"},
            {"id":"1","deviceId":"4","deviceName":"Lamp","newStatus":"on","timestamp":"not a date"}
        ]"#,
    )
    .await;
    let directory = HttpDirectory::new(url, None).unwrap();

    let logs = directory.list_recent_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].id, "2");
}

#[tokio::test]
async fn test_non_array_list_is_decode_error() {
    let (url, _) = canned_store(200, r#"{"devices":[]}"#).await;
    let directory = HttpDirectory::new(url, None).unwrap();

    assert!(matches!(
        directory.list_devices().await,
        Err(DashboardError::Decode { .. })
    ));
}
