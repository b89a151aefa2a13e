//! Contract tests for `ConsoleClient` against a minimal in-process
//! HTTP stub. The stub keeps cluster variables in a shared map and
//! serves canned machine/version payloads, close enough to the real
//! service to exercise the client's request and response handling.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use forge_client::{ClientError, ConsoleClient};
use forge_core::config::ConsoleConfig;

type VarStore = Arc<Mutex<HashMap<String, String>>>;

const MACHINES_JSON: &str = r#"[
  {"name": "node-1", "nic": "52:54:00:00:00:01", "ip": "10.0.0.11", "type": 1,
   "firstAssigned": 1461000000, "lastAssigned": 1461100000},
  {"name": "node-2-bmc", "nic": "52:54:00:00:00:02", "ip": "10.0.0.12", "type": 3,
   "firstAssigned": 1461000000, "lastAssigned": 1461200000}
]"#;

const VERSION_JSON: &str = r#"{"ip": "10.0.0.1", "webPort": 8000, "version": "0.9.1",
  "commit": "deadbee", "buildTime": "2016-04-21T10:00:00Z", "debugMode": "false",
  "serviceStartTime": 1461234000}"#;

const FILES_JSON: &str = r#"[
  {"name": "kernel", "size": 31744, "lastModifiedDate": 1461234567},
  {"name": "initrd.cpio.gz", "size": 209715200, "lastModifiedDate": 1461234568}
]"#;

async fn read_request(stream: &mut TcpStream) -> (String, String, Vec<u8>) {
    let mut buf = Vec::new();
    let header_end;
    loop {
        let mut chunk = [0u8; 4096];
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed mid-request");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            header_end = pos + 4;
            break;
        }
    }

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let content_length: usize = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())?
        })
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = [0u8; 4096];
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed mid-body");
        body.extend_from_slice(&chunk[..n]);
    }
    (method, target, body)
}

async fn respond(stream: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await.unwrap();
    stream.shutdown().await.unwrap();
}

/// Start the stub and return its address plus a handle on its variable
/// store. One connection per request, `connection: close` semantics.
async fn spawn_stub() -> (SocketAddr, VarStore) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let vars: VarStore = Arc::new(Mutex::new(HashMap::new()));
    let vars_for_server = Arc::clone(&vars);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let vars = Arc::clone(&vars_for_server);
            tokio::spawn(async move {
                let (method, target, body) = read_request(&mut stream).await;
                route(&mut stream, &vars, &method, &target, &body).await;
            });
        }
    });

    (addr, vars)
}

async fn route(stream: &mut TcpStream, vars: &VarStore, method: &str, target: &str, body: &[u8]) {
    match (method, target) {
        ("GET", "/api/machines") => respond(stream, "200 OK", MACHINES_JSON).await,
        ("GET", "/api/version") => respond(stream, "200 OK", VERSION_JSON).await,
        ("GET", "/api/variables") => {
            let snapshot = vars.lock().unwrap().clone();
            let json = serde_json::to_string(&snapshot).unwrap();
            respond(stream, "200 OK", &json).await;
        }
        ("PUT", path) if path.starts_with("/api/variables/") => {
            let name = path.trim_start_matches("/api/variables/").to_string();
            let body = String::from_utf8_lossy(body).into_owned();
            let value = body.strip_prefix("value=").unwrap_or(&body).to_string();
            vars.lock().unwrap().insert(name, value);
            respond(stream, "200 OK", "\"OK\"").await;
        }
        ("DELETE", path) if path.starts_with("/api/variables/") => {
            let name = path.trim_start_matches("/api/variables/");
            vars.lock().unwrap().remove(name);
            respond(stream, "200 OK", "\"OK\"").await;
        }
        ("DELETE", path) if path.starts_with("/api/machines/") => {
            respond(stream, "200 OK", "\"OK\"").await;
        }
        ("GET", "/files/") => respond(stream, "200 OK", FILES_JSON).await,
        ("DELETE", path) if path.starts_with("/files?name=") => {
            respond(stream, "200 OK", "\"OK\"").await;
        }
        ("POST", "/upload/") => respond(stream, "200 OK", "\"OK\"").await,
        _ => respond(stream, "500 Internal Server Error", r#"{"error": "boom"}"#).await,
    }
}

fn client_for(addr: SocketAddr) -> ConsoleClient {
    let config = ConsoleConfig::default().with_endpoint(&format!("http://{}", addr));
    ConsoleClient::new(&config).unwrap()
}

#[tokio::test]
async fn set_variable_is_idempotent() {
    let (addr, _vars) = spawn_stub().await;
    let client = client_for(addr);

    client.set_variable("coreos_version", "835.1.0").await.unwrap();
    client.set_variable("coreos_version", "835.1.0").await.unwrap();

    let listed = client.variables().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed.get("coreos_version").map(String::as_str), Some("835.1.0"));
}

#[tokio::test]
async fn set_variable_last_write_wins() {
    let (addr, _vars) = spawn_stub().await;
    let client = client_for(addr);

    client.set_variable("channel", "alpha").await.unwrap();
    client.set_variable("channel", "stable").await.unwrap();

    let listed = client.variables().await.unwrap();
    assert_eq!(listed.get("channel").map(String::as_str), Some("stable"));
}

#[tokio::test]
async fn delete_then_list_excludes_key() {
    let (addr, _vars) = spawn_stub().await;
    let client = client_for(addr);

    client.set_variable("a", "1").await.unwrap();
    client.set_variable("b", "2").await.unwrap();
    client.delete_variable("a").await.unwrap();

    let listed = client.variables().await.unwrap();
    assert!(!listed.contains_key("a"));
    assert!(listed.contains_key("b"));

    // Deleting an already-absent key is tolerated.
    client.delete_variable("a").await.unwrap();
}

#[tokio::test]
async fn machines_parse_backend_payload() {
    let (addr, _vars) = spawn_stub().await;
    let client = client_for(addr);

    let machines = client.machines().await.unwrap();
    assert_eq!(machines.len(), 2);
    assert_eq!(machines[0].name, "node-1");
    assert_eq!(machines[0].nic.to_string(), "52:54:00:00:00:01");
    assert_eq!(machines[1].machine_type.to_string(), "bmc");
}

#[tokio::test]
async fn version_reports_uptime_source() {
    let (addr, _vars) = spawn_stub().await;
    let client = client_for(addr);

    let info = client.version().await.unwrap();
    assert_eq!(info.version, "0.9.1");
    assert_eq!(info.uptime_secs(1461234065), 65);
}

#[tokio::test]
async fn files_list_and_delete_by_name() {
    let (addr, _vars) = spawn_stub().await;
    let client = client_for(addr);

    let files = client.files().await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "kernel");
    assert_eq!(files[1].size, 209715200);

    client.delete_file("kernel").await.unwrap();
}

#[tokio::test]
async fn server_error_message_is_kept_verbatim() {
    let (addr, _vars) = spawn_stub().await;
    let client = client_for(addr);

    // The stub has no route for machine-scoped variables, so this
    // exercises the error envelope path.
    let mac = "52:54:00:00:00:01".parse().unwrap();
    let err = client.machine_variables(&mac).await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_variable_name_never_reaches_the_wire() {
    // No stub at all: the guard must fire before any request is built.
    let config = ConsoleConfig::default().with_endpoint("http://127.0.0.1:1");
    let client = ConsoleClient::new(&config).unwrap();
    assert!(matches!(
        client.set_variable("", "x").await,
        Err(ClientError::EmptyKey)
    ));
    assert!(matches!(
        client.delete_variable("  ").await,
        Err(ClientError::EmptyKey)
    ));
}

#[tokio::test]
async fn upload_progress_is_monotonic_and_ends_at_100() {
    let (addr, _vars) = spawn_stub().await;
    let client = client_for(addr);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image.bin");
    tokio::fs::write(&path, vec![0u8; 300 * 1024]).await.unwrap();

    let seen: Arc<Mutex<Vec<forge_client::UploadProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    client
        .upload(&path, move |progress| sink.lock().unwrap().push(progress))
        .await
        .unwrap();

    let events = seen.lock().unwrap();
    assert!(!events.is_empty());
    for pair in events.windows(2) {
        assert!(pair[1].percent >= pair[0].percent, "progress went backwards");
    }
    let last = events.last().unwrap();
    assert_eq!(last.percent, 100);
    assert!(last.saved);
    assert_eq!(last.status, None);
}

#[tokio::test]
async fn upload_many_respects_per_file_identity() {
    let (addr, _vars) = spawn_stub().await;
    let client = client_for(addr);

    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for i in 0..3 {
        let path = dir.path().join(format!("file-{}.bin", i));
        tokio::fs::write(&path, vec![i as u8; 100 * 1024]).await.unwrap();
        paths.push(path);
    }

    let seen: Arc<Mutex<HashMap<std::path::PathBuf, Vec<u8>>>> =
        Arc::new(Mutex::new(HashMap::new()));
    let sink = Arc::clone(&seen);
    let results = client
        .upload_many(paths.clone(), move |path, progress| {
            sink.lock().unwrap().entry(path.to_path_buf()).or_default().push(progress.percent);
        })
        .await;

    assert_eq!(results.len(), 3);
    for (_, result) in &results {
        result.as_ref().unwrap();
    }
    let seen = seen.lock().unwrap();
    for path in &paths {
        let percents = seen.get(path).expect("progress per file");
        // Each file's slot is keyed by the file itself, so concurrent
        // uploads cannot corrupt one another's sequence.
        for pair in percents.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert_eq!(*percents.last().unwrap(), 100);
    }
}
