#![cfg(feature = "web")]

use base64::{Engine as _, engine::general_purpose::STANDARD};
use filter_studio::{
    config::Storage,
    logic::{
        server::{self, ErrorResponse},
        single_shot::SingleShot,
        storage::ArtifactStore,
    },
};
use image::{ImageFormat, Rgb, RgbImage};
use image_effect::{FilterBank, FilterKind};
use reqwest::StatusCode;
use std::{collections::HashMap, fs, io::Cursor, net::SocketAddr};
use tempfile::TempDir;
use tokio::{net::TcpListener, sync::oneshot};

struct TestServer {
    addr: SocketAddr,
    dir: TempDir,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage {
            root: dir.path().to_path_buf(),
            ..Default::default()
        };

        let single_shot = SingleShot::new(FilterBank::new(), ArtifactStore::new(&storage).unwrap());
        let app = server::create_router(single_shot, &storage, 16 * 1024 * 1024);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(server::serve(listener, app, async {
            _ = rx.await;
        }));

        Self {
            addr,
            dir,
            _shutdown: tx,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

fn png_data_url() -> String {
    let image = RgbImage::from_fn(40, 30, |x, y| Rgb([(x * 6) as u8, (y * 8) as u8, 120]));
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();

    format!("data:image/png;base64,{}", STANDARD.encode(bytes.get_ref()))
}

#[tokio::test]
async fn test_index_page() {
    let server = TestServer::start().await;

    let response = reqwest::get(server.url("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("/process_image"));
}

#[tokio::test]
async fn test_process_image_ok() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/process_image"))
        .json(&serde_json::json!({ "image": png_data_url() }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let locations = response.json::<HashMap<String, String>>().await.unwrap();
    assert_eq!(locations.len(), 6);

    for kind in FilterKind::ALL {
        let location = &locations[kind.name()];
        assert!(location.starts_with("/static/"), "{location}");

        let file = client.get(server.url(location)).send().await.unwrap();
        assert_eq!(file.status(), StatusCode::OK, "{location}");
        assert!(!file.bytes().await.unwrap().is_empty());
    }

    assert!(locations["original"].ends_with(".png"));
    assert!(locations["binary"].ends_with(".png"));
    assert!(locations["sepia"].ends_with(".jpg"));
}

#[tokio::test]
async fn test_process_image_bad_payload() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    for body in [
        serde_json::json!({ "image": "data:image/jpeg;base64,bm90IGFuIGltYWdl" }),
        serde_json::json!({ "image": "" }),
        serde_json::json!({}),
    ] {
        let response = client
            .post(server.url("/process_image"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");

        let error = response.json::<ErrorResponse>().await.unwrap();
        assert!(error.error.starts_with("Invalid image data"), "{}", error.error);
    }
}

#[tokio::test]
async fn test_process_image_malformed_json() {
    let server = TestServer::start().await;

    let response = reqwest::Client::new()
        .post(server.url("/process_image"))
        .header("content-type", "application/json")
        .body("{\"image\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.json::<ErrorResponse>().await.is_ok());
}

#[tokio::test]
async fn test_process_image_storage_failure() {
    let server = TestServer::start().await;
    fs::remove_dir_all(server.dir.path().join("uploads")).unwrap();

    let response = reqwest::Client::new()
        .post(server.url("/process_image"))
        .json(&serde_json::json!({ "image": png_data_url() }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error = response.json::<ErrorResponse>().await.unwrap();
    assert!(error.error.starts_with("IO error"), "{}", error.error);

    let processed = fs::read_dir(server.dir.path().join("processed")).unwrap();
    assert_eq!(processed.count(), 0);
}
