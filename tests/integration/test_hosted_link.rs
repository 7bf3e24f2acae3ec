use serde_json::json;
use shortcut_source::core::config::AppConfig;
use shortcut_source::core::fetcher::RelayTemplate;
use shortcut_source::core::types::{ErrorCategory, SourceKind};
use shortcut_source::core::Normalizer;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LINK: &str = "https://www.icloud.com/shortcuts/abc123";
const RECORD_URL: &str = "https://www.icloud.com/shortcuts/api/records/abc123";
const DOWNLOAD_URL: &str = "https://cvws.icloud-content.com/B/abc123/Morning.shortcut";

const PLIST_PAYLOAD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>WFWorkflowActions</key>
	<array>
		<dict>
			<key>WFWorkflowActionIdentifier</key>
			<string>is.workflow.actions.comment</string>
			<key>WFWorkflowActionParameters</key>
			<dict>
				<key>WFCommentActionText</key>
				<string>hello</string>
			</dict>
		</dict>
		<dict>
			<key>WFWorkflowActionIdentifier</key>
			<string>is.workflow.actions.showresult</string>
		</dict>
	</array>
	<key>WFWorkflowClientVersion</key>
	<string>1146.14</string>
	<key>WFWorkflowMinimumClientVersion</key>
	<integer>900</integer>
</dict>
</plist>"#;

fn normalizer(server: &MockServer, relays: &[&str], retain: bool) -> Normalizer {
    let mut config = AppConfig::default();
    config.fetcher.relays = relays
        .iter()
        .map(|name| RelayTemplate::new(format!("{}/{}?url={{target}}", server.uri(), name)))
        .collect();
    config.fetcher.timeout_seconds = Some(5);
    config.normalizer.retain_download_payload = retain;
    Normalizer::new(&config).expect("failed to build normalizer")
}

fn record_with_download() -> serde_json::Value {
    json!({
        "recordName": "abc123",
        "fields": {
            "name": {"value": "Morning"},
            "shortcut": {"value": {"downloadURL": DOWNLOAD_URL}}
        }
    })
}

async fn mount_record(server: &MockServer, relay: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", relay)))
        .and(query_param("url", RECORD_URL))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_download(server: &MockServer, relay: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", relay)))
        .and(query_param("url", DOWNLOAD_URL))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_record_without_download_reference_uses_embedded_fields() {
    let server = MockServer::start().await;
    mount_record(
        &server,
        "relay",
        json!({
            "fields": {
                "name": {"value": "Embedded"},
                "shortcut": {"fields": {
                    "WFWorkflowActions": [
                        {"WFWorkflowActionIdentifier": "is.workflow.actions.comment"}
                    ],
                    "WFWorkflowClientVersion": "1146.14",
                    "WFWorkflowMinimumClientVersionString": "900"
                }}
            }
        }),
    )
    .await;

    let result = normalizer(&server, &["relay"], true).normalize(LINK).await;

    assert_eq!(result.source_kind, SourceKind::HostedLink);
    assert_eq!(result.identifier.as_deref(), Some("abc123"));
    assert_eq!(result.name.as_deref(), Some("Embedded"));
    assert_eq!(
        result.step_identifiers().collect::<Vec<_>>(),
        vec!["is.workflow.actions.comment"]
    );
    assert_eq!(result.client_version.unwrap().to_string(), "1146.14");
    assert_eq!(result.minimum_version.unwrap().to_string(), "900");
    assert!(result.diagnostic.is_none());
}

#[tokio::test]
async fn test_binary_payload_yields_unsupported_encoding() {
    let server = MockServer::start().await;
    mount_record(&server, "relay", record_with_download()).await;
    mount_download(&server, "relay", "bplist00\u{1}\u{2}binary").await;

    let result = normalizer(&server, &["relay"], true).normalize(LINK).await;

    let diagnostic = result.diagnostic.expect("diagnostic expected");
    assert_eq!(diagnostic.category, ErrorCategory::UnsupportedEncoding);
    assert!(diagnostic.message.contains("binary property lists are not supported"));
    assert!(diagnostic.suggestion.is_some());
    assert!(result.steps.is_empty());
    assert_eq!(result.name.as_deref(), Some("Morning"));
    assert_eq!(
        result.auxiliary.unwrap()["fields"]["shortcut"]["value"]["downloadURL"],
        DOWNLOAD_URL
    );
}

#[tokio::test]
async fn test_download_reuses_the_relay_that_answered_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    mount_record(&server, "live", record_with_download()).await;
    mount_download(&server, "live", PLIST_PAYLOAD).await;

    let result = normalizer(&server, &["dead", "live"], true)
        .normalize(LINK)
        .await;

    assert!(result.diagnostic.is_none(), "{:?}", result.diagnostic);
    assert_eq!(result.name.as_deref(), Some("Morning"));
    assert_eq!(
        result.step_identifiers().collect::<Vec<_>>(),
        vec![
            "is.workflow.actions.comment",
            "is.workflow.actions.showresult"
        ]
    );
    assert_eq!(result.steps[0].parameters["WFCommentActionText"], "hello");
    assert_eq!(result.minimum_version.unwrap().to_string(), "900");
    assert_eq!(result.raw_payload.as_deref(), Some(PLIST_PAYLOAD));

    let document = result.document.expect("decoded document");
    let keys: Vec<&String> = document.keys().collect();
    assert_eq!(
        keys,
        vec![
            "WFWorkflowActions",
            "WFWorkflowClientVersion",
            "WFWorkflowMinimumClientVersion"
        ]
    );
    let auxiliary = result.auxiliary.unwrap();
    assert_eq!(auxiliary["downloadURL"], DOWNLOAD_URL);
    assert_eq!(auxiliary["relay"]["index"], 0);
}

#[tokio::test]
async fn test_payload_retention_can_be_disabled() {
    let server = MockServer::start().await;
    mount_record(&server, "relay", record_with_download()).await;
    mount_download(&server, "relay", PLIST_PAYLOAD).await;

    let result = normalizer(&server, &["relay"], false).normalize(LINK).await;

    assert!(result.raw_payload.is_none());
    assert_eq!(result.steps.len(), 2);
}

#[tokio::test]
async fn test_broken_payload_yields_decode_failure() {
    let server = MockServer::start().await;
    mount_record(&server, "relay", record_with_download()).await;
    mount_download(&server, "relay", "<?xml version=\"1.0\"?><plist><dict><key>").await;

    let result = normalizer(&server, &["relay"], true).normalize(LINK).await;

    let diagnostic = result.diagnostic.unwrap();
    assert_eq!(diagnostic.category, ErrorCategory::DecodeFailure);
    assert!(diagnostic.message.starts_with("failed to parse shortcut file"));
    assert_eq!(result.name.as_deref(), Some("Morning"));
    assert!(result.steps.is_empty());
}

#[tokio::test]
async fn test_binary_header_behind_junk_prefix_is_detected() {
    let server = MockServer::start().await;
    mount_record(&server, "relay", record_with_download()).await;
    mount_download(&server, "relay", "\0\0garbage-prefix bplist00 tail").await;

    let result = normalizer(&server, &["relay"], true).normalize(LINK).await;

    let diagnostic = result.diagnostic.unwrap();
    assert_eq!(diagnostic.category, ErrorCategory::UnsupportedEncoding);
    assert_eq!(result.name.as_deref(), Some("Morning"));
}

#[tokio::test]
async fn test_deeply_nested_download_degrades_instead_of_crashing() {
    let server = MockServer::start().await;
    mount_record(&server, "relay", record_with_download()).await;
    let payload = format!(
        "<?xml version=\"1.0\"?>\n<plist version=\"1.0\">{}{}</plist>",
        "<array>".repeat(200),
        "</array>".repeat(200)
    );
    mount_download(&server, "relay", &payload).await;

    let result = normalizer(&server, &["relay"], true).normalize(LINK).await;

    let diagnostic = result.diagnostic.unwrap();
    assert_eq!(diagnostic.category, ErrorCategory::DecodeFailure);
    assert!(diagnostic.message.contains("nests deeper than 128 levels"));
    assert!(result.document.is_none());
}

#[tokio::test]
async fn test_unnamed_record_gets_generated_name() {
    let server = MockServer::start().await;
    mount_record(
        &server,
        "relay",
        json!({"fields": {"shortcut": {"value": {"downloadURL": DOWNLOAD_URL}}}}),
    )
    .await;
    mount_download(&server, "relay", "bplist00").await;

    let result = normalizer(&server, &["relay"], true).normalize(LINK).await;
    assert_eq!(result.name.as_deref(), Some("shortcut_abc123"));
}

#[tokio::test]
async fn test_record_without_fields_is_a_schema_miss() {
    let server = MockServer::start().await;
    mount_record(&server, "relay", json!({"reason": "not found"})).await;

    let result = normalizer(&server, &["relay"], true).normalize(LINK).await;

    let diagnostic = result.diagnostic.unwrap();
    assert_eq!(diagnostic.category, ErrorCategory::SchemaMiss);
    assert_eq!(diagnostic.message, "missing fields");
    assert_eq!(result.identifier.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_all_relays_failing_degrades_with_suggestion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = normalizer(&server, &["a", "b"], true).normalize(LINK).await;

    assert_eq!(result.source_kind, SourceKind::HostedLink);
    assert!(result.name.is_none());
    assert!(result.steps.is_empty());
    let diagnostic = result.diagnostic.unwrap();
    assert_eq!(diagnostic.category, ErrorCategory::NetworkFailure);
    assert!(diagnostic.message.contains("/b?url={target} returned status 502"));
    assert!(diagnostic.suggestion.unwrap().contains("paste"));
}

#[tokio::test]
async fn test_download_failure_keeps_metadata() {
    let server = MockServer::start().await;
    mount_record(&server, "relay", record_with_download()).await;
    Mock::given(method("GET"))
        .and(path("/relay"))
        .and(query_param("url", DOWNLOAD_URL))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = normalizer(&server, &["relay"], true).normalize(LINK).await;

    let diagnostic = result.diagnostic.unwrap();
    assert_eq!(diagnostic.category, ErrorCategory::NetworkFailure);
    assert!(diagnostic.message.starts_with("failed to download shortcut file"));
    assert_eq!(result.name.as_deref(), Some("Morning"));
    assert!(result.auxiliary.unwrap()["fields"].is_object());
}
