use crate::http::BackendClient;
use crate::pledge::{
    Address, ApplicationRecord, ApplicationRecordWriter, ApplicationStatus, BackendError,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record() -> ApplicationRecord {
    ApplicationRecord {
        pledge: "12.5".to_string(),
        shares: 4,
        applicant_address: "0x1111111111111111111111111111111111111111"
            .parse::<Address>()
            .unwrap(),
        organization_address: "0x2222222222222222222222222222222222222222"
            .parse::<Address>()
            .unwrap(),
        status: ApplicationStatus::New,
    }
}

#[test]
fn test_applications_url_joins_cleanly() {
    let client =
        BackendClient::new("https://api.example.org/", "/moloch/apply", Duration::from_secs(5))
            .unwrap();
    assert_eq!(client.applications_url(), "https://api.example.org/moloch/apply");
}

#[tokio::test]
async fn test_persist_posts_application() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/moloch/apply"))
        .and(body_json(json!({
            "pledge": "12.5",
            "shares": 4,
            "applicantAddress": "0x1111111111111111111111111111111111111111",
            "molochContractAddress": "0x2222222222222222222222222222222222222222",
            "status": "new",
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = BackendClient::new(server.uri(), "moloch/apply", Duration::from_secs(5)).unwrap();
    client.persist(&record()).await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = BackendClient::new(server.uri(), "moloch/apply", Duration::from_secs(5)).unwrap();
    let error = client.persist(&record()).await.unwrap_err();
    assert!(matches!(error, BackendError::Rejected { status: 500 }));
}
