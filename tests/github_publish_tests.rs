//! GitHub release publishing against a local HTTP stub

use release_pipeline::error::PublishError;
use release_pipeline::github::{GitHubClient, GitHubReleasePublisher};
use release_pipeline::{ReleaseError, ReleasePublisher, ReleaseRequest};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    target: String,
    body: Vec<u8>,
}

const ARCHIVE_BYTES: &[u8] = b"PK\x05\x06 fake archive";

type Handler = Arc<dyn Fn(&Recorded, u16) -> (u16, String) + Send + Sync>;

struct Stub {
    port: u16,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Stub {
    async fn start(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = handler.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    serve(stream, handler, recorded, port).await;
                });
            }
        });

        Self { port, requests }
    }

    fn base(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve(
    mut stream: TcpStream,
    handler: Handler,
    recorded: Arc<Mutex<Vec<Recorded>>>,
    port: u16,
) {
    let mut data = Vec::new();
    let mut chunk = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        data.extend_from_slice(&chunk[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap().split_whitespace();
    let method = request_line.next().unwrap().to_string();
    let target = request_line.next().unwrap().to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .map(|(_, value)| value.trim().parse::<usize>().unwrap())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
    }

    let request = Recorded {
        method,
        target,
        body: data[header_end..].to_vec(),
    };
    let (status, body) = handler(&request, port);
    recorded.lock().unwrap().push(request);

    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn release_json(port: u16, tag: &str, name: &str) -> String {
    serde_json::json!({
        "id": 1,
        "name": name,
        "tag_name": tag,
        "html_url": format!("https://github.com/octo/tool/releases/tag/{tag}"),
        "upload_url": format!("http://127.0.0.1:{port}/uploads/1/assets{{?name,label}}"),
        "draft": false,
        "prerelease": false,
        "assets": []
    })
    .to_string()
}

fn happy_path() -> Handler {
    Arc::new(|request: &Recorded, port: u16| {
        match (request.method.as_str(), request.target.as_str()) {
            ("GET", "/repos/octo/tool/releases/tags/2.0.0") => {
                (404, r#"{"message":"Not Found"}"#.to_string())
            }
            ("POST", "/repos/octo/tool/releases") => {
                let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
                let tag = body["tag_name"].as_str().unwrap();
                let name = body["name"].as_str().unwrap();
                (201, release_json(port, tag, name))
            }
            ("POST", target) if target.starts_with("/uploads/1/assets?name=") => {
                let name = target.trim_start_matches("/uploads/1/assets?name=");
                let asset = serde_json::json!({
                    "id": 7,
                    "name": name,
                    "size": request.body.len(),
                    "browser_download_url": format!("https://github.com/octo/tool/releases/download/2.0.0/{name}")
                });
                (201, asset.to_string())
            }
            _ => (500, r#"{"message":"unexpected request"}"#.to_string()),
        }
    })
}

fn publisher(stub: &Stub) -> GitHubReleasePublisher {
    let client = GitHubClient::new(
        &stub.base(),
        "token".to_string(),
        "octo/tool".parse().unwrap(),
        Duration::from_secs(10),
    )
    .unwrap();
    GitHubReleasePublisher::new(client)
}

fn archive(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("tool_2.0.0_x86_64-pc-windows-gnu.zip");
    std::fs::write(&path, ARCHIVE_BYTES).unwrap();
    path
}

#[tokio::test]
async fn creates_release_and_uploads_archive() {
    let stub = Stub::start(happy_path()).await;
    let dir = tempfile::tempdir().unwrap();
    let asset = archive(&dir);

    let info = publisher(&stub)
        .publish_release(&ReleaseRequest::for_tag("2.0.0", vec![asset]))
        .await
        .unwrap();

    assert_eq!(info.name, "Release 2.0.0");
    assert_eq!(info.tag, "2.0.0");
    assert_eq!(info.assets.len(), 1);
    assert_eq!(info.assets[0].name, "tool_2.0.0_x86_64-pc-windows-gnu.zip");
    assert_eq!(info.assets[0].size, ARCHIVE_BYTES.len() as u64);

    let requests = stub.requests();
    let methods: Vec<&str> = requests.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, ["GET", "POST", "POST"]);

    let created: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(created["tag_name"], "2.0.0");
    assert_eq!(created["name"], "Release 2.0.0");
    assert_eq!(created["draft"], false);
    assert_eq!(requests[2].body, ARCHIVE_BYTES);
}

#[tokio::test]
async fn existing_release_is_a_conflict() {
    let stub = Stub::start(Arc::new(|request: &Recorded, port: u16| match request.method.as_str() {
        "GET" => (200, release_json(port, "2.0.0", "Release 2.0.0")),
        _ => (500, "{}".to_string()),
    }))
    .await;
    let dir = tempfile::tempdir().unwrap();

    let err = publisher(&stub)
        .publish_release(&ReleaseRequest::for_tag("2.0.0", vec![archive(&dir)]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReleaseError::Publish(PublishError::DuplicateRelease { ref tag }) if tag == "2.0.0"
    ));
    assert!(err.is_conflict());
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn already_exists_validation_is_a_conflict() {
    let stub = Stub::start(Arc::new(|request: &Recorded, _: u16| match request.method.as_str() {
        "GET" => (404, "{}".to_string()),
        _ => (
            422,
            r#"{"message":"Validation Failed","errors":[{"resource":"Release","code":"already_exists","field":"tag_name"}]}"#
                .to_string(),
        ),
    }))
    .await;
    let dir = tempfile::tempdir().unwrap();

    let err = publisher(&stub)
        .publish_release(&ReleaseRequest::for_tag("2.0.0", vec![archive(&dir)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReleaseError::Publish(PublishError::DuplicateRelease { .. })
    ));
}

#[tokio::test]
async fn rejected_token_is_an_auth_error() {
    let stub = Stub::start(Arc::new(|_: &Recorded, _: u16| {
        (401, r#"{"message":"Bad credentials"}"#.to_string())
    }))
    .await;
    let dir = tempfile::tempdir().unwrap();

    let err = publisher(&stub)
        .publish_release(&ReleaseRequest::for_tag("2.0.0", vec![archive(&dir)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaseError::Publish(PublishError::Auth { .. })));
}

#[tokio::test]
async fn failed_upload_names_the_asset() {
    let stub = Stub::start(Arc::new(|request: &Recorded, port: u16| {
        match (request.method.as_str(), request.target.as_str()) {
            ("GET", _) => (404, "{}".to_string()),
            ("POST", "/repos/octo/tool/releases") => (201, release_json(port, "2.0.0", "Release 2.0.0")),
            _ => (500, r#"{"message":"storage unavailable"}"#.to_string()),
        }
    }))
    .await;
    let dir = tempfile::tempdir().unwrap();

    let err = publisher(&stub)
        .publish_release(&ReleaseRequest::for_tag("2.0.0", vec![archive(&dir)]))
        .await
        .unwrap_err();
    match err {
        ReleaseError::Publish(PublishError::Upload { asset, reason }) => {
            assert_eq!(asset, "tool_2.0.0_x86_64-pc-windows-gnu.zip");
            assert!(reason.contains("storage unavailable"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
