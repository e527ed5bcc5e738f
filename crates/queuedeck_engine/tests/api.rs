use std::sync::Arc;
use std::time::Duration;

use queuedeck_core::{Action, JobId, JobStatus, LogStream, TaskId};
use queuedeck_engine::{
    ApiSettings, Credentials, FailureKind, JobQueueApi, ReqwestApi, StaticTokens,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestApi {
    let settings = ApiSettings {
        root: format!("{}/api", server.uri()),
        ..ApiSettings::default()
    };
    let tokens = StaticTokens::new(Some(Credentials::new("key-1", "sess-1")));
    ReqwestApi::new(&settings, Arc::new(tokens)).expect("client builds")
}

#[tokio::test]
async fn authenticated_calls_carry_both_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/get_all"))
        .and(header("Api-Token", "key-1"))
        .and(header("Session-Token", "\"sess-1\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let jobs = api_for(&server).list_jobs().await.expect("listing ok");
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn liveness_probe_is_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server).ping().await.expect("ping ok");

    let requests = server.received_requests().await.expect("recording on");
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("api-token"));
    assert!(!requests[0].headers.contains_key("session-token"));
}

#[tokio::test]
async fn create_job_posts_form_and_reads_job_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/new"))
        .and(body_string_contains("format=mp3"))
        .and(body_string_contains("url=https%3A%2F%2Fvideo.example%2Fwatch"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "job_id": "job-9",
            "status": "Waiting",
            "created_at": "2024-03-01T10:00:00Z",
            "tasks": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let job_id = api_for(&server)
        .create_job("https://video.example/watch", "mp3")
        .await
        .expect("created");
    assert_eq!(job_id, JobId::new("job-9"));
}

#[tokio::test]
async fn create_job_requires_accepted_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"job_id": "x"})))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .create_job("https://video.example/watch", "mp3")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(200));
}

#[tokio::test]
async fn job_status_reads_only_the_status_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/get/job-3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "Processing", "extra": 1})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/get/job-4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Exploded"})))
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert_eq!(
        api.job_status(&JobId::new("job-3")).await.unwrap(),
        JobStatus::Processing
    );
    let err = api.job_status(&JobId::new("job-4")).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn actions_hit_their_endpoints() {
    let server = MockServer::start().await;
    for endpoint in ["/api/jobs/pause/job-7", "/api/jobs/retry_all", "/api/tasks/cancel/t-1"] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .and(header("Api-Token", "key-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let api = api_for(&server);
    api.job_action(&JobId::new("job-7"), Action::Pause).await.unwrap();
    api.bulk_action(Action::Retry).await.unwrap();
    api.task_action(&TaskId::new("t-1"), Action::Cancel).await.unwrap();
}

#[tokio::test]
async fn failed_action_reports_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/delete/job-7"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .job_action(&JobId::new("job-7"), Action::Delete)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert!(!err.kind.is_connectivity());
}

#[tokio::test]
async fn task_log_returns_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/get_stderr/t-2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ERROR: no formats\n".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = api_for(&server)
        .task_log(&TaskId::new("t-2"), LogStream::Stderr)
        .await
        .unwrap();
    assert_eq!(bytes, b"ERROR: no formats\n");
}

#[tokio::test]
async fn set_config_sends_json_as_form_value() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/config"))
        .and(body_string_contains("value=%7B%22workers%22%3A2%7D"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server)
        .set_config(&json!({"workers": 2}))
        .await
        .expect("accepted");
}

#[tokio::test]
async fn shutdown_accepts_any_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/shutdown_server"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server).shutdown().await.expect("accepted");
}

#[tokio::test]
async fn unreachable_server_is_a_connectivity_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let settings = ApiSettings {
        root: format!("http://127.0.0.1:{port}/api/"),
        ..ApiSettings::default()
    };
    let api = ReqwestApi::new(&settings, Arc::new(StaticTokens::default())).unwrap();

    let err = api.ping().await.unwrap_err();
    assert!(err.kind.is_connectivity(), "unexpected {err}");
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let settings = ApiSettings {
        root: format!("{}/api/", server.uri()),
        request_timeout: Duration::from_millis(100),
        ..ApiSettings::default()
    };
    let api = ReqwestApi::new(&settings, Arc::new(StaticTokens::default())).unwrap();
    let err = api.status_summary().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[test]
fn invalid_root_is_rejected() {
    let settings = ApiSettings {
        root: "not a url".into(),
        ..ApiSettings::default()
    };
    let err = ReqwestApi::new(&settings, Arc::new(StaticTokens::default()))
        .err()
        .expect("invalid root");
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[test]
fn credentials_debug_is_redacted() {
    let rendered = format!("{:?}", Credentials::new("key-1", "sess-1"));
    assert!(!rendered.contains("key-1"));
    assert!(!rendered.contains("sess-1"));
}
