use std::collections::HashMap;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use link_axum::{LinkAxumApp, LinkAxumState};
use link_blob::{GofileDownloader, UploadClient, UploadConfig};
use link_core::{Link, LinkApp};
use serde_json::json;
use tower::ServiceExt;

/// Stand-in for the gofile API, account and download hosts.
async fn spawn_fake_gofile() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let router = Router::new()
        .route(
            "/accounts",
            post(|| async { Json(json!({"status": "ok", "data": {"id": "g1", "token": "guest-token"}})) }),
        )
        .route(
            "/dist/js/global.js",
            get(|| async { "var appdata = {};\nappdata.wt = \"web-token\";\n" }),
        )
        .route(
            "/contents/{code}",
            get(
                |State(base): State<String>,
                 Path(code): Path<String>,
                 Query(query): Query<HashMap<String, String>>,
                 headers: HeaderMap| async move {
                    let authorized = headers.get("authorization").and_then(|v| v.to_str().ok())
                        == Some("Bearer guest-token");
                    if query.get("wt").map(String::as_str) != Some("web-token") || !authorized {
                        return StatusCode::UNAUTHORIZED.into_response();
                    }
                    // `Expired` lists a file whose download link no longer exists
                    let link = match code.as_str() {
                        "AbC123" => format!("{base}/download/f1/report.txt"),
                        "Expired" => format!("{base}/download/f2/old.txt"),
                        _ => return StatusCode::NOT_FOUND.into_response(),
                    };
                    Json(json!({
                        "status": "ok",
                        "data": {"children": {"f1": {"name": "report.txt", "link": link}}}
                    }))
                    .into_response()
                },
            ),
        )
        .route(
            "/download/f1/report.txt",
            get(|headers: HeaderMap| async move {
                let cookie = headers.get("cookie").and_then(|v| v.to_str().ok());
                if cookie != Some("accountToken=guest-token") {
                    return StatusCode::FORBIDDEN.into_response();
                }
                ([("content-type", "application/x-unknown")], "quarterly numbers").into_response()
            }),
        )
        .with_state(base.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    base
}

#[tokio::test]
async fn gofile_pages_are_resolved_and_streamed() {
    let base = spawn_fake_gofile().await;

    let app = LinkApp::in_memory();
    app.store()
        .insert(Link::AttachmentFile {
            path: "report".to_string(),
            url: "https://gofile.io/d/AbC123".to_string(),
            content_type: "text/plain".to_string(),
            filename: "report.txt".to_string(),
            download: false,
        })
        .await
        .unwrap();

    let client = UploadClient::new(UploadConfig::default()).unwrap();
    let state = LinkAxumState::from_app(app)
        .unwrap()
        .with_gofile_downloader(GofileDownloader::new(client).with_api_base(&base));
    let ax = LinkAxumApp::new(state);

    let res = ax
        .router
        .oneshot(Request::builder().uri("/report").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.headers().get("content-type").unwrap(), "text/plain");
    assert_eq!(
        res.headers().get("content-disposition").unwrap(),
        "inline; filename=\"report.txt\""
    );
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"quarterly numbers");
}

#[tokio::test]
async fn failed_gofile_resolution_falls_back_to_redirect() {
    let base = spawn_fake_gofile().await;

    let app = LinkApp::in_memory();
    app.store()
        .insert(Link::AttachmentFile {
            path: "gone".to_string(),
            url: "https://gofile.io/d/Missing".to_string(),
            content_type: "text/plain".to_string(),
            filename: "gone.txt".to_string(),
            download: true,
        })
        .await
        .unwrap();

    let client = UploadClient::new(UploadConfig::default()).unwrap();
    let state = LinkAxumState::from_app(app)
        .unwrap()
        .with_gofile_downloader(GofileDownloader::new(client).with_api_base(&base));

    let res = LinkAxumApp::new(state)
        .router
        .oneshot(Request::builder().uri("/gone").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 307);
    assert_eq!(res.headers().get("location").unwrap(), "https://gofile.io/d/Missing");
}

#[tokio::test]
async fn upstream_error_status_falls_back_to_redirect() {
    let base = spawn_fake_gofile().await;

    let app = LinkApp::in_memory();
    app.store()
        .insert(Link::AttachmentFile {
            path: "old".to_string(),
            url: "https://gofile.io/d/Expired".to_string(),
            content_type: "text/plain".to_string(),
            filename: "old.txt".to_string(),
            download: true,
        })
        .await
        .unwrap();

    let client = UploadClient::new(UploadConfig::default()).unwrap();
    let state = LinkAxumState::from_app(app)
        .unwrap()
        .with_gofile_downloader(GofileDownloader::new(client).with_api_base(&base));

    let res = LinkAxumApp::new(state)
        .router
        .oneshot(Request::builder().uri("/old").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 307);
    assert_eq!(res.headers().get("location").unwrap(), "https://gofile.io/d/Expired");
    assert!(res.headers().get("content-disposition").is_none());
}
