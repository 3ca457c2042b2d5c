//! End-to-end pipeline tests over the pinboard path: locate, stream to
//! storage, enforce the size ceiling, deliver, clean up.

use async_trait::async_trait;
use clipfetch::fetch::MediaHttpClient;
use clipfetch::fetch::pinterest::PinterestSource;
use clipfetch::{DeliverySink, FetchError, MediaArtifact, MediaFormat, deliver_and_discard};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a pin page whose og:video tag points back at the mock server's
/// `/media.mp4`, plus the media endpoint itself.
async fn serve_pin_with_media(media_bytes: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;
    let html = format!(
        r#"<html><head><meta property="og:video" content="{}/media.mp4" /></head></html>"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/pin/123/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(media_bytes))
        .mount(&server)
        .await;
    server
}

fn source() -> PinterestSource {
    PinterestSource::new(MediaHttpClient::new())
}

#[tokio::test]
async fn test_acquire_streams_media_into_storage() {
    let media = b"fake mp4 payload".to_vec();
    let server = serve_pin_with_media(media.clone()).await;
    let storage = TempDir::new().expect("temp dir");

    let artifact = source()
        .acquire(&format!("{}/pin/123/", server.uri()), storage.path(), 1024)
        .await
        .expect("acquisition should succeed under the ceiling");

    assert_eq!(artifact.title, "Pinterest video");
    assert_eq!(artifact.duration_secs, 0, "pinboard duration is unknown");
    assert_eq!(artifact.size_bytes, media.len() as u64);

    let name = artifact
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .expect("artifact has a file name");
    assert!(name.ends_with("_pinterest.mp4"), "filename shape: {name}");
    assert_eq!(
        std::fs::read(&artifact.path).expect("read artifact"),
        media,
        "stored bytes must match the served media"
    );
}

#[tokio::test]
async fn test_acquire_over_size_ceiling_deletes_file_and_reports_size() {
    let media = vec![0u8; 4096];
    let server = serve_pin_with_media(media).await;
    let storage = TempDir::new().expect("temp dir");

    let err = source()
        .acquire(&format!("{}/pin/123/", server.uri()), storage.path(), 1024)
        .await
        .expect_err("a 4 KB file must not pass a 1 KB ceiling");

    match err {
        FetchError::SizeExceeded {
            size_bytes,
            limit_bytes,
        } => {
            assert_eq!(size_bytes, 4096);
            assert_eq!(limit_bytes, 1024);
        }
        other => panic!("expected SizeExceeded, got {other}"),
    }
    assert_eq!(
        std::fs::read_dir(storage.path()).expect("list storage").count(),
        0,
        "the oversized file must not remain in storage"
    );
}

#[tokio::test]
async fn test_acquire_with_failing_media_endpoint_leaves_no_partial_file() {
    let server = MockServer::start().await;
    let html = format!(
        r#"<meta property="og:video" content="{}/media.mp4""#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/pin/123/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media.mp4"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let storage = TempDir::new().expect("temp dir");

    let err = source()
        .acquire(&format!("{}/pin/123/", server.uri()), storage.path(), 1024)
        .await
        .expect_err("a failing media endpoint is a download failure");
    assert!(matches!(err, FetchError::NetworkFailed { .. }), "{err}");
    assert_eq!(
        std::fs::read_dir(storage.path()).expect("list storage").count(),
        0,
        "no partial file may remain after a failed download"
    );
}

struct FailingSink;

#[async_trait]
impl DeliverySink for FailingSink {
    async fn deliver(
        &self,
        _artifact: &MediaArtifact,
        _format: MediaFormat,
    ) -> Result<(), FetchError> {
        Err(FetchError::send("transport says the file is too large"))
    }
}

/// A request that acquires fine but fails in delivery still ends with empty
/// storage — the errored-request invariant across the whole pipeline.
#[tokio::test]
async fn test_delivery_failure_after_acquisition_leaves_no_file() {
    let server = serve_pin_with_media(b"payload".to_vec()).await;
    let storage = TempDir::new().expect("temp dir");

    let artifact = source()
        .acquire(&format!("{}/pin/123/", server.uri()), storage.path(), 1024)
        .await
        .expect("acquisition succeeds");

    let err = deliver_and_discard(&FailingSink, artifact, MediaFormat::Video)
        .await
        .expect_err("the sink failure must propagate");
    assert!(matches!(err, FetchError::SendFailed { .. }), "{err}");
    assert_eq!(
        std::fs::read_dir(storage.path()).expect("list storage").count(),
        0,
        "storage must be empty after an errored request"
    );
}
