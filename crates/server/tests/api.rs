//! End-to-end tests against a server bound to an ephemeral local port.

use std::{future::pending, io::Cursor};

use fontconv_server::{Backend, ServerConfig, config::BANNER, serve};
use reqwest::{
    Client, StatusCode,
    header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_DISPOSITION, CONTENT_TYPE, ORIGIN},
    multipart::{Form, Part},
};
use serde_json::Value;
use tokio::net::TcpListener;
use zip::ZipArchive;

async fn spawn_server(backend: Backend) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ServerConfig { backend, ..ServerConfig::default() };
    tokio::spawn(serve(listener, config, pending()));
    format!("http://{addr}")
}

fn font_part(name: &str) -> Part {
    Part::bytes(font_test_data::CMAP12_FONT1).file_name(name.to_owned())
}

#[tokio::test]
async fn test_root_reports_running() {
    let base = spawn_server(Backend::InProcess).await;

    let body: Value = reqwest::get(format!("{base}/")).await.unwrap().json().await.unwrap();

    assert_eq!(body["message"], BANNER);
}

#[tokio::test]
async fn test_converts_single_upload_to_woff() {
    let base = spawn_server(Backend::InProcess).await;
    let form = Form::new().part("file", font_part("Sample.ttf")).text("target_format", "woff");

    let response =
        Client::new().post(format!("{base}/convert")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "font/woff");
    assert_eq!(response.headers()[CONTENT_DISPOSITION], "attachment; filename=\"Sample.woff\"");
    let body = response.bytes().await.unwrap();
    assert_eq!(&body[..4], b"wOFF");
}

#[tokio::test]
async fn test_target_format_is_case_insensitive() {
    let base = spawn_server(Backend::InProcess).await;
    let form = Form::new().part("file", font_part("Sample.ttf")).text("target_format", "TTF");

    let response =
        Client::new().post(format!("{base}/convert")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "font/ttf");
}

#[tokio::test]
async fn test_rejects_unsupported_target() {
    let base = spawn_server(Backend::InProcess).await;
    let form = Form::new().part("file", font_part("Sample.ttf")).text("target_format", "svg");

    let response =
        Client::new().post(format!("{base}/convert")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "unsupported target format: svg");
}

#[tokio::test]
async fn test_rejects_missing_file() {
    let base = spawn_server(Backend::InProcess).await;
    let form = Form::new().text("target_format", "woff");

    let response =
        Client::new().post(format!("{base}/convert")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "missing form field 'file'");
}

#[tokio::test]
async fn test_reports_conversion_failure() {
    let base = spawn_server(Backend::InProcess).await;
    let part = Part::bytes(b"this is not a font".as_slice()).file_name("notes.txt");
    let form = Form::new().part("file", part).text("target_format", "woff2");

    let response =
        Client::new().post(format!("{base}/convert")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Font conversion failed");
    assert!(body["detail"].as_str().unwrap().contains("unrecognized"));
}

#[tokio::test]
async fn test_subprocess_that_cannot_start_is_a_conversion_failure() {
    let program = std::env::temp_dir().join("fontconv-missing-binary");
    let base = spawn_server(Backend::Subprocess { program }).await;
    let form = Form::new().part("file", font_part("Sample.ttf")).text("target_format", "ttf");

    let response =
        Client::new().post(format!("{base}/convert")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().starts_with("failed to start"));
}

#[tokio::test]
async fn test_batch_returns_zip_with_unique_names() {
    let base = spawn_server(Backend::InProcess).await;
    let form = Form::new()
        .part("files", font_part("Sample.ttf"))
        .part("files", font_part("Sample.otf"))
        .part("files", font_part("Other.ttf"))
        .text("format", "woff");

    let response =
        Client::new().post(format!("{base}/api/convert")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/zip");
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION],
        "attachment; filename=\"converted_fonts.zip\""
    );

    let bytes = response.bytes().await.unwrap();
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<_> = archive.file_names().map(str::to_owned).collect();
    names.sort();
    assert_eq!(names, ["Other.woff", "Sample-2.woff", "Sample.woff"]);
}

#[tokio::test]
async fn test_batch_suffix_does_not_collide_with_upload_name() {
    let base = spawn_server(Backend::InProcess).await;
    let form = Form::new()
        .part("files", font_part("A.ttf"))
        .part("files", font_part("A.otf"))
        .part("files", font_part("A-2.ttf"))
        .text("format", "woff");

    let response =
        Client::new().post(format!("{base}/api/convert")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.bytes().await.unwrap();
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<_> = archive.file_names().map(str::to_owned).collect();
    names.sort();
    assert_eq!(names, ["A-2-2.woff", "A-2.woff", "A.woff"]);
}

#[tokio::test]
async fn test_converts_woff2_upload_to_ttf() {
    let base = spawn_server(Backend::InProcess).await;
    let client = Client::new();

    let form = Form::new().part("file", font_part("Sample.ttf")).text("target_format", "woff2");
    let woff2 = client
        .post(format!("{base}/convert"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(&woff2[..4], b"wOF2");

    let part = Part::bytes(woff2.to_vec()).file_name("Sample.woff2");
    let form = Form::new().part("file", part).text("target_format", "ttf");
    let response = client.post(format!("{base}/convert")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.bytes().await.unwrap();
    assert_eq!(&body[..4], b"\x00\x01\x00\x00");
}

#[tokio::test]
async fn test_batch_without_files_is_rejected() {
    let base = spawn_server(Backend::InProcess).await;
    let form = Form::new().text("format", "woff");

    let response =
        Client::new().post(format!("{base}/api/convert")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "no files found");
}

#[tokio::test]
async fn test_batch_failure_names_the_file() {
    let base = spawn_server(Backend::InProcess).await;
    let broken = Part::bytes(b"garbage".as_slice()).file_name("broken.ttf");
    let form = Form::new()
        .part("files", font_part("Sample.ttf"))
        .part("files", broken)
        .text("format", "woff");

    let response =
        Client::new().post(format!("{base}/api/convert")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("broken.ttf: "));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let base = spawn_server(Backend::InProcess).await;

    let response = Client::new()
        .get(format!("{base}/"))
        .header(ORIGIN, "https://fonts.example")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
