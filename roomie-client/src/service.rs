use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use roomie_core::{
    ApiConfig, Conversation, Message, Paginated, ReadAck, SendMessage, UnreadCount,
};
use serde::de::DeserializeOwned;
use tracing;

use crate::error::ApiError;

/// Conversation and message operations of the messaging API.
///
/// Every call is a single round-trip: no retries and no caching. Errors are
/// handed back to the caller untouched.
#[async_trait]
pub trait MessageApi: Send + Sync {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError>;

    async fn list_messages(
        &self,
        conversation_id: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Message>, ApiError>;

    async fn send_message(&self, request: &SendMessage) -> Result<Message, ApiError>;

    /// Idempotent on the server: marking a read conversation is a no-op.
    async fn mark_read(&self, conversation_id: &str) -> Result<ReadAck, ApiError>;

    async fn unread_count(&self) -> Result<u64, ApiError>;
}

/// HTTP implementation of [`MessageApi`] rooted at `<api url>/messages`.
#[derive(Clone)]
pub struct MessageService {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl MessageService {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base = Url::parse(config.url.trim()).map_err(|_| ApiError::InvalidUrl {
            url: config.url.clone(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: config.url.clone(),
            });
        }

        let client = Client::builder().timeout(config.timeout()).build()?;

        tracing::info!("Message service targeting {}", base);
        if config.token.is_none() {
            tracing::warn!("No API token configured, requests are sent unauthenticated");
        }

        Ok(Self {
            client,
            base,
            token: config.token.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| ApiError::InvalidUrl {
                url: self.base.to_string(),
            })?;
            path.pop_if_empty().push("messages").extend(segments);
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = self.authorized(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("Messaging API answered {}: {}", status, body);
            return Err(ApiError::Status { status, body });
        }

        Ok(response.text().await?)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MessageApi for MessageService {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        let url = self.endpoint(&["conversations"])?;
        tracing::debug!("GET {}", url);
        self.fetch(self.client.get(url)).await
    }

    async fn list_messages(
        &self,
        conversation_id: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Message>, ApiError> {
        let url = self.endpoint(&["conversations", conversation_id])?;
        tracing::debug!("GET {} (page {:?}, limit {:?})", url, page, limit);

        let mut query: Vec<(&str, u32)> = Vec::new();
        if let Some(page) = page {
            query.push(("page", page));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit));
        }

        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(&query);
        }
        self.fetch(request).await
    }

    async fn send_message(&self, request: &SendMessage) -> Result<Message, ApiError> {
        let url = self.endpoint(&[])?;
        tracing::debug!("POST {} for conversation {}", url, request.conversation_id);
        self.fetch(self.client.post(url).json(request)).await
    }

    async fn mark_read(&self, conversation_id: &str) -> Result<ReadAck, ApiError> {
        let url = self.endpoint(&["conversations", conversation_id, "read"])?;
        tracing::debug!("POST {}", url);

        let body = self.execute(self.client.post(url)).await?;
        if body.trim().is_empty() {
            return Ok(ReadAck::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn unread_count(&self) -> Result<u64, ApiError> {
        let url = self.endpoint(&["unread"])?;
        tracing::debug!("GET {}", url);
        let count: UnreadCount = self.fetch(self.client.get(url)).await?;
        Ok(count.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, RawQuery, State},
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
        bodies: Arc<Mutex<Vec<Value>>>,
        auth: Arc<Mutex<Vec<Option<String>>>>,
    }

    impl Recorder {
        fn record(&self, call: String, headers: &HeaderMap) {
            self.calls.lock().unwrap().push(call);
            self.auth.lock().unwrap().push(
                headers
                    .get("authorization")
                    .and_then(|h| h.to_str().ok())
                    .map(str::to_string),
            );
        }
    }

    fn message_json(id: &str, content: &str) -> Value {
        json!({
            "id": id,
            "type": "TEXT",
            "content": content,
            "isRead": false,
            "createdAt": "2024-03-01T12:00:00Z",
            "sender": { "id": "me", "name": "Yo" },
            "isMine": true
        })
    }

    async fn conversations(State(rec): State<Recorder>, headers: HeaderMap) -> Json<Value> {
        rec.record("GET conversations".to_string(), &headers);
        Json(json!([{
            "id": "C1",
            "matchId": "M1",
            "otherUser": { "id": "u2", "name": "Diego" },
            "room": { "id": "r1", "title": "Pieza amoblada en Providencia" },
            "lastMessage": null,
            "unreadCount": 3,
            "lastMessageAt": "2024-03-01T10:00:00Z"
        }]))
    }

    async fn messages(
        State(rec): State<Recorder>,
        Path(id): Path<String>,
        RawQuery(query): RawQuery,
        headers: HeaderMap,
    ) -> Result<Json<Value>, StatusCode> {
        rec.record(
            format!("GET conversations/{}?{}", id, query.unwrap_or_default()),
            &headers,
        );
        if id == "missing" {
            return Err(StatusCode::NOT_FOUND);
        }
        Ok(Json(json!({
            "items": [message_json("m1", "hola")],
            "total": 1,
            "page": 1,
            "limit": 50,
            "totalPages": 1
        })))
    }

    async fn send(
        State(rec): State<Recorder>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        rec.record("POST messages".to_string(), &headers);
        let content = body["content"].as_str().unwrap_or_default().to_string();
        rec.bodies.lock().unwrap().push(body);
        Json(message_json("m2", &content))
    }

    async fn read(
        State(rec): State<Recorder>,
        Path(id): Path<String>,
        headers: HeaderMap,
    ) -> (StatusCode, String) {
        rec.record(format!("POST conversations/{}/read", id), &headers);
        if id == "C2" {
            return (StatusCode::OK, json!({ "success": true, "count": 4 }).to_string());
        }
        (StatusCode::CREATED, String::new())
    }

    async fn unread(State(rec): State<Recorder>, headers: HeaderMap) -> Json<Value> {
        rec.record("GET unread".to_string(), &headers);
        Json(json!({ "count": 5 }))
    }

    async fn spawn_api(token: Option<&str>) -> (MessageService, Recorder) {
        let recorder = Recorder::default();
        let app = Router::new()
            .route("/api/messages", post(send))
            .route("/api/messages/unread", get(unread))
            .route("/api/messages/conversations", get(conversations))
            .route("/api/messages/conversations/:id", get(messages))
            .route("/api/messages/conversations/:id/read", post(read))
            .with_state(recorder.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = ApiConfig {
            url: format!("http://{}/api/", addr),
            token: token.map(str::to_string),
            timeout_secs: 5,
        };
        (MessageService::new(&config).unwrap(), recorder)
    }

    #[tokio::test]
    async fn test_list_conversations_sends_bearer_token() {
        let (service, recorder) = spawn_api(Some("secret")).await;

        let conversations = service.list_conversations().await.unwrap();

        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].id, "C1");
        assert_eq!(conversations[0].unread_count, 3);
        assert_eq!(
            recorder.auth.lock().unwrap().as_slice(),
            &[Some("Bearer secret".to_string())]
        );
    }

    #[tokio::test]
    async fn test_list_messages_query_params() {
        let (service, recorder) = spawn_api(None).await;

        let page = service.list_messages("C1", Some(2), Some(20)).await.unwrap();
        assert_eq!(page.items[0].content, "hola");
        service.list_messages("C1", None, None).await.unwrap();

        let calls = recorder.calls.lock().unwrap().clone();
        assert_eq!(calls[0], "GET conversations/C1?page=2&limit=20");
        assert_eq!(calls[1], "GET conversations/C1?");
        assert_eq!(recorder.auth.lock().unwrap()[0], None);
    }

    #[tokio::test]
    async fn test_send_message_posts_camel_case_body() {
        let (service, recorder) = spawn_api(None).await;

        let message = service
            .send_message(&SendMessage::text("C1", "hola"))
            .await
            .unwrap();

        assert_eq!(message.id, "m2");
        assert_eq!(message.content, "hola");
        assert_eq!(
            recorder.bodies.lock().unwrap().as_slice(),
            &[json!({ "conversationId": "C1", "content": "hola" })]
        );
    }

    #[tokio::test]
    async fn test_mark_read_with_and_without_body() {
        let (service, recorder) = spawn_api(None).await;

        let ack = service.mark_read("C1").await.unwrap();
        assert_eq!(ack, ReadAck::default());

        let ack = service.mark_read("C2").await.unwrap();
        assert_eq!(ack.success, Some(true));
        assert_eq!(ack.count, Some(4));

        assert_eq!(
            recorder.calls.lock().unwrap().as_slice(),
            &[
                "POST conversations/C1/read".to_string(),
                "POST conversations/C2/read".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_unread_count_object_body() {
        let (service, _) = spawn_api(None).await;
        assert_eq!(service.unread_count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_error_status_is_surfaced() {
        let (service, _) = spawn_api(None).await;

        let err = service.list_messages("missing", None, None).await.unwrap_err();

        assert!(matches!(err, ApiError::Status { .. }));
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = ApiConfig {
            url: "not a url".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(
            MessageService::new(&config),
            Err(ApiError::InvalidUrl { .. })
        ));
    }
}
