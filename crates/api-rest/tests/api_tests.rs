use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use tower::ServiceExt;

use api_rest::{router, AppState};
use xds_core::mtom::MtomCodec;
use xds_core::{
    Document, MemoryTransactionLog, OutboundRequest, RegistryConfig, RegistryRequestHandler,
    RegistryResponseParser, ResponseStatus, ValidationMode,
};
use xds_files::DocumentStore;

// -- Helpers --------------------------------------------------------------

const CONFIG_YAML: &str = r#"
source_id: "1.3.6.1.4.1.21367.2010.1.2"
codes:
  class: { code: "34133-9", display_name: "Summary of episode note", coding_system: "2.16.840.1.113883.6.1" }
  type: { code: "34133-9", display_name: "Summary of episode note", coding_system: "2.16.840.1.113883.6.1" }
  format: { code: "urn:ihe:pcc:xphr:2007", display_name: "HL7 CCD Document", coding_system: "1.3.6.1.4.1.19376.1.2.3" }
  confidentiality: { code: "N", display_name: "Normal", coding_system: "2.16.840.1.113883.5.25" }
  healthcare_facility_type: { code: "OF", display_name: "Outpatient", coding_system: "2.16.840.1.113883.5.10588" }
  practice_setting: { code: "394802001", display_name: "General medicine", coding_system: "2.16.840.1.113883.6.96" }
"#;

fn build_state(store: Option<DocumentStore>) -> (AppState, Arc<MemoryTransactionLog>) {
    let log = Arc::new(MemoryTransactionLog::new());
    let handler = RegistryRequestHandler::new(ValidationMode::Strict, log.clone());
    (AppState::new(handler, store), log)
}

fn outbound(content: &[u8]) -> OutboundRequest {
    OutboundRequest::build(
        Arc::new(RegistryConfig::from_yaml_str(CONFIG_YAML).unwrap()),
        "PAT-1",
        "1.2.3.4.5",
        Document::new("ccd-1", "PAT-1", content.to_vec()),
        None,
        &MtomCodec::new(),
    )
    .unwrap()
}

fn iti41_request(content_type: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/xds/iti41")
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

// -- Tests ----------------------------------------------------------------

#[tokio::test]
async fn health_returns_200() {
    let (state, _) = build_state(None);

    let response = router(state)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["ok"], true);
}

#[tokio::test]
async fn missing_boundary_returns_invalid_content_type_fault() {
    let (state, log) = build_state(None);

    let response = router(state)
        .oneshot(iti41_request(
            "multipart/related; type=\"application/xop+xml\"",
            b"--x\r\n\r\n<a/>\r\n--x--".to_vec(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "application/soap+xml; charset=UTF-8"
    );
    let parsed = RegistryResponseParser::new()
        .parse(&body_text(response).await)
        .unwrap();
    assert_eq!(parsed.status, ResponseStatus::Failure);
    assert_eq!(parsed.errors[0].code, "SOAP:Sender");
    assert_eq!(parsed.errors[0].context, "Invalid Content-Type");
    assert_eq!(log.records()[0].http_status, 400);
}

#[tokio::test]
async fn valid_submission_is_acknowledged() {
    let (state, log) = build_state(None);
    let request = outbound(b"<ClinicalDocument/>");
    let content_type = request.content_type().to_owned();

    let response = router(state)
        .oneshot(iti41_request(
            &content_type,
            request.body.clone().into_bytes().to_vec(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = RegistryResponseParser::new()
        .parse(&body_text(response).await)
        .unwrap();
    assert_eq!(parsed.status, ResponseStatus::Success);
    assert_eq!(
        parsed.submission_set_id.as_deref(),
        Some(request.submission_set_id.as_str())
    );
    assert_eq!(parsed.document_ids, vec![request.document_entry_id.clone()]);
    assert_eq!(
        parsed.request_correlation_id.as_deref(),
        Some(request.message_id.as_str())
    );

    let records = log.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].request_message_id, Some(request.message_id));
}

#[tokio::test]
async fn large_submission_is_accepted() {
    let (state, _) = build_state(None);
    let content: Vec<u8> = (0..5 * 1024 * 1024u32).map(|i| b'a' + (i % 26) as u8).collect();
    let request = outbound(&content);
    let content_type = request.content_type().to_owned();

    let response = router(state)
        .oneshot(iti41_request(&content_type, request.body.into_bytes().to_vec()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn accepted_documents_are_persisted() {
    let temp = tempfile::TempDir::new().unwrap();
    let store = DocumentStore::new(temp.path()).unwrap();
    let (state, log) = build_state(Some(store.clone()));
    let request = outbound(b"<ClinicalDocument>persist me</ClinicalDocument>");
    let content_type = request.content_type().to_owned();

    let response = router(state)
        .oneshot(iti41_request(&content_type, request.body.into_bytes().to_vec()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let expected = b"<ClinicalDocument>persist me</ClinicalDocument>";
    let mut probe = Document::new("probe", "PAT-1", expected.to_vec());
    probe.ensure_integrity();
    let hex = probe.hash().unwrap().as_str().to_owned();

    let mut stored = None;
    for _ in 0..100 {
        if let Ok(meta) = store.metadata(&hex) {
            stored = Some(meta);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let stored = stored.expect("document should be persisted");
    assert_eq!(stored.correlation_id.as_str(), log.records()[0].correlation_id);
    assert_eq!(store.read(&hex).unwrap(), expected);
}
