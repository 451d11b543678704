use std::time::Duration;

use buildmon_engine::{decode_document, Credentials, FailureKind, FetchSettings, Fetcher, ReqwestFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetcher_returns_feed_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job/app/rssAll"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<feed><title>app</title></feed>", "application/atom+xml;charset=UTF-8"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/job/app/rssAll", server.uri());

    let output = fetcher.fetch(&url, None).await.expect("fetch ok");
    assert_eq!(output.metadata.original_url, url);
    assert_eq!(output.metadata.final_url, output.metadata.original_url);
    assert_eq!(output.metadata.redirect_count, 0);
    assert_eq!(output.bytes, b"<feed><title>app</title></feed>");

    let decoded = decode_document(&output.bytes, output.metadata.content_type.as_deref()).unwrap();
    assert_eq!(decoded.text, "<feed><title>app</title></feed>");
    assert_eq!(decoded.encoding_label, "UTF-8");
}

#[tokio::test]
async fn fetcher_sends_basic_auth_when_configured() {
    let server = MockServer::start().await;
    // "bot:secret" in base64.
    Mock::given(method("GET"))
        .and(path("/secure/rssAll"))
        .and(header("authorization", "Basic Ym90OnNlY3JldA=="))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<feed/>", "application/atom+xml"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/secure/rssAll"))
        .respond_with(ResponseTemplate::new(401).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/secure/rssAll", server.uri());

    let credentials = Credentials::new("bot", Some("secret".to_string()));
    let output = fetcher.fetch(&url, Some(&credentials)).await.expect("authorized");
    assert_eq!(output.bytes, b"<feed/>");

    let err = fetcher.fetch(&url, None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(401));
    assert_eq!(err.body.as_deref(), Some("<html>login</html>"));
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/missing", server.uri());

    let err = fetcher.fetch(&url, None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn fetcher_rejects_invalid_url() {
    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let err = fetcher.fetch("not a url", None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch(&url, None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/xml")
                .insert_header("Content-Length", "11")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/large", server.uri());

    let err = fetcher.fetch(&url, None).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn fetcher_rejects_unexpected_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/image"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8, 1, 2], "image/png"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/image", server.uri());

    let err = fetcher.fetch(&url, None).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "image/png".to_string()
        }
    );
}

#[tokio::test]
async fn error_body_is_cut_at_size_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("0123456789abcdefghij"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/broken", server.uri());

    let err = fetcher.fetch(&url, None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(err.body.as_deref(), Some("0123456789"));
}
