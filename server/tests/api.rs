//! HTTP API tests against a server bound to an ephemeral port.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use uuid::Uuid;

use guideline::gateway::{CompletionRequest, GatewayError, LlmGateway, Stage};
use guideline::queue::{self, QueueReceiver};
use guideline::{Database, JobProcessor, JobQueue, ProcessOutcome, QueueError, SqliteJobStore};
use guideline_server::{serve, AppState};

struct Fixed;

impl LlmGateway for Fixed {
    fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        match request.stage {
            Stage::Summary if request.prompt.contains("fail me") => Err(GatewayError::Timeout),
            Stage::Summary => Ok("Wear eye protection.".to_string()),
            Stage::Checklist => Ok(r#"["Wear goggles"]"#.to_string()),
        }
    }
}

struct TestServer {
    base_url: String,
    store: Arc<SqliteJobStore>,
    receiver: QueueReceiver,
    client: reqwest::Client,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    async fn start() -> Self {
        let store = Arc::new(SqliteJobStore::new(Database::open_in_memory().unwrap()));
        let (job_queue, receiver) = queue::channel(16);
        Self::start_with(store, Arc::new(job_queue), receiver).await
    }

    async fn start_with(
        store: Arc<SqliteJobStore>,
        job_queue: Arc<dyn JobQueue>,
        receiver: QueueReceiver,
    ) -> Self {
        let state = AppState::new(store.clone(), job_queue, 100);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            serve(listener, state, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });

        Self {
            base_url,
            store,
            receiver,
            client: reqwest::Client::new(),
            _shutdown: tx,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    /// Runs the queued jobs the way a worker would.
    async fn process_queued(&self) -> Vec<ProcessOutcome> {
        let processor = JobProcessor::new(self.store.clone(), Arc::new(Fixed));
        let receiver = self.receiver.clone();
        tokio::task::spawn_blocking(move || {
            let mut outcomes = Vec::new();
            while let Ok(Some(id)) = receiver.dequeue(std::time::Duration::from_millis(10)) {
                outcomes.push(processor.process(id));
            }
            outcomes
        })
        .await
        .unwrap()
    }
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_submit_then_poll_until_completed() {
    let server = TestServer::start().await;

    let (status, body) = server
        .post_json("/api/jobs/", json!({"input_text": "Always wear safety goggles."}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();
    assert!(Uuid::parse_str(&id).is_ok());

    let (status, body) = server.get(&format!("/api/jobs/{}/", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["result"], Value::Null);

    assert_eq!(server.process_queued().await, vec![ProcessOutcome::Completed]);

    let (status, body) = server.get(&format!("/api/jobs/{}/", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["status"], "completed");
    assert_eq!(
        body["result"],
        json!({"summary": "Wear eye protection.", "checklist": ["Wear goggles"]})
    );
    assert!(body["created_at"].is_string());
    assert!(body["updated_at"].is_string());
}

#[tokio::test]
async fn test_failed_job_reports_error() {
    let server = TestServer::start().await;

    let (_, body) = server
        .post_json("/api/jobs", json!({"input_text": "please fail me"}))
        .await;
    let id = body["id"].as_str().unwrap().to_string();

    assert_eq!(server.process_queued().await, vec![ProcessOutcome::Failed]);

    let (status, body) = server.get(&format!("/api/jobs/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["result"], json!({"error": "timeout"}));
}

#[tokio::test]
async fn test_validation_errors() {
    let server = TestServer::start().await;

    let (status, body) = server.post_json("/api/jobs/", json!({"input_text": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"input_text": ["This field may not be blank."]}));

    let (status, body) = server.post_json("/api/jobs/", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"input_text": ["This field is required."]}));

    let (status, body) = server
        .post_json("/api/jobs/", json!({"input_text": "x".repeat(101)}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"input_text": ["Ensure this field has no more than 100 characters."]})
    );

    assert!(server.receiver.is_empty());
}

#[tokio::test]
async fn test_unparseable_body() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .post(server.url("/api/jobs/"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["non_field_errors"][0].is_string());
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_404() {
    let server = TestServer::start().await;

    let (status, body) = server.get(&format!("/api/jobs/{}/", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Job not found"}));

    let (status, body) = server.get("/api/jobs/not-a-uuid/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Job not found"}));
}

#[tokio::test]
async fn test_enqueue_failure_is_500() {
    struct Closed;
    impl JobQueue for Closed {
        fn enqueue(&self, _job_id: Uuid) -> Result<(), QueueError> {
            Err(QueueError::Closed)
        }
    }

    let store = Arc::new(SqliteJobStore::new(Database::open_in_memory().unwrap()));
    let (_unused, receiver) = queue::channel(1);
    let server = TestServer::start_with(store, Arc::new(Closed), receiver).await;

    let (status, body) = server
        .post_json("/api/jobs/", json!({"input_text": "Guideline."}))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("could not be queued"));
}
