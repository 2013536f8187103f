use std::io;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use link_blob::prelude::*;
use link_blob::{Catbox, Gofile, HcCdn, Litterbox};

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    headers: HeaderMap,
    body: Bytes,
}

type Log = Arc<Mutex<Vec<Captured>>>;

async fn record(State(log): State<Log>, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let path = uri.path().to_string();
    log.lock().unwrap().push(Captured {
        path: path.clone(),
        headers,
        body,
    });

    match path.as_str() {
        "/catbox" => "https://files.catbox.moe/abc123.bin".into_response(),
        "/litterbox" => "https://litter.catbox.moe/tmp456.bin\n".into_response(),
        "/gofile" => axum::Json(serde_json::json!({
            "status": "ok",
            "data": {"downloadPage": "https://gofile.io/d/Xy12", "code": "Xy12"}
        }))
        .into_response(),
        "/hccdn" => axum::Json(serde_json::json!({
            "files": [{"deployedUrl": "https://hc-cdn.hel1.your-objectstorage.com/s/v3/abc_file"}]
        }))
        .into_response(),
        "/wrong-host" => "https://evil.example/abc".into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "database on fire").into_response(),
    }
}

async fn spawn_host() -> (String, Log) {
    let log: Log = Arc::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let router = Router::new().fallback(record).with_state(log.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (base, log)
}

fn client() -> UploadClient {
    UploadClient::new(UploadConfig::default().with_channel_capacity(4)).unwrap()
}

fn chunked(data: &[u8], chunk: usize) -> ByteSource {
    let chunks: Vec<io::Result<Bytes>> = data
        .chunks(chunk)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    let stream: ByteStream = Box::pin(futures_util::stream::iter(chunks));
    ByteSource::stream(stream, data.len() as u64)
}

fn boundary_of(headers: &HeaderMap) -> String {
    headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap()
        .to_string()
}

fn only_request(log: &Log) -> Captured {
    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    log[0].clone()
}

#[tokio::test]
async fn catbox_receives_exact_multipart_body() {
    let (base, log) = spawn_host().await;
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();

    let url = Catbox::new(client())
        .with_endpoint(format!("{base}/catbox"))
        .upload(chunked(&data, 4096), "data.bin")
        .await
        .unwrap();
    assert_eq!(url, "https://files.catbox.moe/abc123.bin");

    let request = only_request(&log);
    let boundary = boundary_of(&request.headers);
    let mut expected = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"reqtype\"\r\n\r\nfileupload\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"fileToUpload\"; filename=\"data.bin\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    expected.extend_from_slice(&data);
    expected.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    assert_eq!(request.body.len(), expected.len());
    assert_eq!(request.body.as_ref(), expected.as_slice());
    assert_eq!(
        request.headers.get("content-length").unwrap().to_str().unwrap(),
        expected.len().to_string()
    );
    assert!(request.headers.get("transfer-encoding").is_none());
    assert!(request
        .headers
        .get("user-agent")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("link-blob/"));
}

#[tokio::test]
async fn litterbox_sends_retention_field() {
    let (base, log) = spawn_host().await;

    let url = Litterbox::new(client())
        .with_endpoint(format!("{base}/litterbox"))
        .with_ttl("12h")
        .upload(ByteSource::from("temporary"), "t.txt")
        .await
        .unwrap();
    assert_eq!(url, "https://litter.catbox.moe/tmp456.bin");

    let body = String::from_utf8(only_request(&log).body.to_vec()).unwrap();
    assert!(body.contains("name=\"time\"\r\n\r\n12h\r\n"));
    assert!(body.contains("filename=\"t.txt\""));
}

#[tokio::test]
async fn gofile_uses_file_field_and_returns_download_page() {
    let (base, log) = spawn_host().await;

    let url = Gofile::new(client())
        .with_endpoint(format!("{base}/gofile"))
        .upload(chunked(b"hello gofile", 3), "g.txt")
        .await
        .unwrap();
    assert_eq!(url, "https://gofile.io/d/Xy12");

    let body = String::from_utf8(only_request(&log).body.to_vec()).unwrap();
    assert!(body.contains("name=\"file\"; filename=\"g.txt\""));
    assert!(!body.contains("reqtype"));
}

#[tokio::test]
async fn hc_cdn_receives_data_url_json_with_bearer() {
    let (base, log) = spawn_host().await;
    let data = b"seven!!";

    let url = HcCdn::new(UploadClient::new(UploadConfig::default().with_hc_cdn_token("tok")).unwrap())
        .with_endpoint(format!("{base}/hccdn"))
        .upload(chunked(data, 2), "ignored.bin")
        .await
        .unwrap();
    assert_eq!(url, "https://hc-cdn.hel1.your-objectstorage.com/s/v3/abc_file");

    let request = only_request(&log);
    assert_eq!(request.headers.get("authorization").unwrap(), "Bearer tok");
    assert_eq!(request.headers.get("content-type").unwrap(), "application/json");

    let urls: Vec<String> = serde_json::from_slice(&request.body).unwrap();
    let encoded = urls[0].strip_prefix("data:application/octet-stream;base64,").unwrap();
    assert_eq!(encoded.len(), 12);
    assert_eq!(STANDARD.decode(encoded).unwrap(), data);
}

#[tokio::test]
async fn error_status_becomes_upstream_error() {
    let (base, _log) = spawn_host().await;

    let err = Catbox::new(client())
        .with_endpoint(format!("{base}/broken"))
        .upload(ByteSource::from("x"), "x.txt")
        .await
        .unwrap_err();

    match err {
        BlobError::Upstream { provider, status, message } => {
            assert_eq!(provider, "catbox");
            assert_eq!(status, 500);
            assert!(message.contains("database on fire"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_reply_is_rejected() {
    let (base, _log) = spawn_host().await;

    let err = Catbox::new(client())
        .with_endpoint(format!("{base}/wrong-host"))
        .upload(ByteSource::from("x"), "x.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, BlobError::InvalidResponse { provider: "catbox", .. }));
}

#[tokio::test]
async fn short_stream_aborts_the_request() {
    let (base, _log) = spawn_host().await;
    let stream: ByteStream = Box::pin(futures_util::stream::iter(vec![Ok::<_, io::Error>(
        Bytes::from_static(b"only five"),
    )]));

    let result = Catbox::new(client())
        .with_endpoint(format!("{base}/catbox"))
        .upload(ByteSource::stream(stream, 1024), "short.bin")
        .await;
    assert!(result.is_err());
}
