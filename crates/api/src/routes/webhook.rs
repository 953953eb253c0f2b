//! Alertmanager Webhook Route

use alerting::WebhookPayload;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::AppState;

/// Acknowledgement body
#[derive(Debug, Serialize)]
pub struct Ack {
    pub msg: &'static str,
}

/// Receive one Alertmanager batch.
///
/// Always answers 200 once the body parses; delivery failures only show up
/// in logs and metrics.
pub async fn receive_webhook(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Rejecting webhook with invalid JSON");
            return (StatusCode::BAD_REQUEST, "invalid JSON").into_response();
        }
    };

    let outcome = state.processor.process(&payload).await;

    (StatusCode::OK, Json(Ack { msg: outcome.ack() })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_router;
    use alerting::AlertProcessor;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use sms_gateway::{Deadline, DeliveryError, SmsSender};
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct FakeSender {
        messages: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl SmsSender for FakeSender {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn send_bulk(
            &self,
            _receivers: &[String],
            message: &str,
            _deadline: Deadline,
        ) -> Result<(), DeliveryError> {
            self.messages.lock().unwrap().push(message.to_string());
            if self.fail {
                return Err(DeliveryError::ProviderRejected {
                    status: 500,
                    body: "quota exceeded".to_string(),
                });
            }
            Ok(())
        }
    }

    fn app(sender: Arc<FakeSender>) -> axum::Router {
        let processor = AlertProcessor::new(sender, vec!["0912".to_string()]);
        create_router(Arc::new(AppState::new(processor)))
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/kavenegar")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    const MIXED_BATCH: &str = r#"{"alerts": [
        {"status": "firing",
         "labels": {"alertname": "DiskFull", "severity": "critical", "instance": "db-1"},
         "annotations": {"description": "Disk usage at 95%"}},
        {"status": "resolved",
         "labels": {"alertname": "DiskFull", "severity": "critical", "instance": "db-2"},
         "annotations": {}}
    ]}"#;

    #[tokio::test]
    async fn test_empty_batch() {
        let sender = Arc::new(FakeSender::default());
        let response = app(sender.clone()).oneshot(post(r#"{"alerts": []}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"msg":"no alerts"}"#);
        assert!(sender.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mixed_batch_sends_critical_only() {
        let sender = Arc::new(FakeSender::default());
        let response = app(sender.clone()).oneshot(post(MIXED_BATCH)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_string(response).await, r#"{"msg":"alerts processed"}"#);

        let messages = sender.messages.lock().unwrap();
        assert_eq!(
            *messages,
            vec!["ALERT DiskFull [critical]\nInstance: db-1\nDisk usage at 95%".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_still_acknowledged() {
        let sender = Arc::new(FakeSender {
            fail: true,
            ..Default::default()
        });
        let response = app(sender.clone()).oneshot(post(MIXED_BATCH)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"msg":"alerts processed"}"#);
        assert_eq!(sender.messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let sender = Arc::new(FakeSender::default());
        let response = app(sender.clone()).oneshot(post("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(sender.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_content_type_is_accepted() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/kavenegar")
            .body(Body::from(r#"{"alerts": []}"#))
            .unwrap();
        let response = app(Arc::new(FakeSender::default())).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_is_method_not_allowed() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/kavenegar")
            .body(Body::empty())
            .unwrap();
        let response = app(Arc::new(FakeSender::default())).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
