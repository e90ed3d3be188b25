use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Envelope, Priority, Todo};
use serde_json::Value;
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn content_type(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let resp = app().oneshot(empty_request("GET", "/api/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(content_type(&resp).starts_with("application/json"));
    let envelope: Envelope<Vec<Todo>> = body_json(resp).await;
    assert!(envelope.success);
    assert!(envelope.data.unwrap().is_empty());
}

#[tokio::test]
async fn list_rejects_unknown_priority() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/todos?priority=urgent"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/api/todos", r#"{"title":"Buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let envelope: Envelope<Todo> = body_json(resp).await;
    let todo = envelope.data.unwrap();
    assert_eq!(todo.title, "Buy milk");
    assert!(!todo.completed);
    assert_eq!(todo.priority, Priority::Low);
    assert!(todo.due_date.is_none());
}

#[tokio::test]
async fn create_todo_echoes_due_date_as_timestamp() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/todos",
            r#"{"title":"File taxes","priority":"high","dueDate":"2024-04-15"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["data"]["priority"], "high");
    assert_eq!(envelope["data"]["dueDate"], "2024-04-15T00:00:00Z");
}

#[tokio::test]
async fn create_todo_blank_title_returns_400_envelope() {
    let resp = app()
        .oneshot(json_request("POST", "/api/todos", r#"{"title":"   "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let envelope: Envelope<Todo> = body_json(resp).await;
    assert!(!envelope.success);
    assert_eq!(envelope.message.as_deref(), Some("Title is required"));
}

#[tokio::test]
async fn create_todo_malformed_json_returns_422_envelope() {
    let resp = app()
        .oneshot(json_request("POST", "/api/todos", r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let envelope: Envelope<Todo> = body_json(resp).await;
    assert!(!envelope.success);
    assert!(envelope.message.is_some());
}

// --- unknown ids ---

#[tokio::test]
async fn update_todo_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/api/todos/nope", r#"{"title":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let envelope: Envelope<Todo> = body_json(resp).await;
    assert_eq!(envelope.message.as_deref(), Some("Todo not found"));
}

#[tokio::test]
async fn toggle_todo_not_found() {
    let resp = app()
        .oneshot(empty_request("PATCH", "/api/todos/nope/toggle"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/api/todos/nope"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_is_not_json() {
    let resp = app().oneshot(empty_request("GET", "/todos")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(!content_type(&resp).contains("json"));
}

// --- full lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let mut app = app().into_service();

    async fn call(
        app: &mut axum::routing::RouterIntoService<String>,
        request: Request<String>,
    ) -> axum::response::Response {
        ServiceExt::ready(app).await.unwrap().call(request).await.unwrap()
    }

    // create two; newest comes first
    let resp = call(&mut app, json_request("POST", "/api/todos", r#"{"title":"Walk dog"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let dog = body_json::<Envelope<Todo>>(resp).await.data.unwrap();

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/api/todos",
            r#"{"title":"Pay rent","priority":"high","dueDate":"2024-06-01"}"#,
        ),
    )
    .await;
    let rent = body_json::<Envelope<Todo>>(resp).await.data.unwrap();

    let resp = call(&mut app, empty_request("GET", "/api/todos")).await;
    let todos = body_json::<Envelope<Vec<Todo>>>(resp).await.data.unwrap();
    let ids: Vec<&str> = todos.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, [rent.id.as_str(), dog.id.as_str()]);

    // toggle
    let resp = call(&mut app, empty_request("PATCH", &format!("/api/todos/{}/toggle", dog.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let toggled = body_json::<Envelope<Todo>>(resp).await.data.unwrap();
    assert!(toggled.completed);
    assert_eq!(toggled.title, "Walk dog");

    // filters
    let resp = call(&mut app, empty_request("GET", "/api/todos?completed=true")).await;
    let done = body_json::<Envelope<Vec<Todo>>>(resp).await.data.unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, dog.id);

    let resp = call(&mut app, empty_request("GET", "/api/todos?completed=false&priority=high")).await;
    let urgent = body_json::<Envelope<Vec<Todo>>>(resp).await.data.unwrap();
    assert_eq!(urgent.len(), 1);
    assert_eq!(urgent[0].id, rent.id);

    let resp = call(&mut app, empty_request("GET", "/api/todos?priority=medium")).await;
    let medium = body_json::<Envelope<Vec<Todo>>>(resp).await.data.unwrap();
    assert!(medium.is_empty());

    // full replace clearing the due date
    let resp = call(
        &mut app,
        json_request(
            "PUT",
            &format!("/api/todos/{}", rent.id),
            r#"{"title":"Pay rent (late)","priority":"medium","dueDate":null}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json::<Envelope<Todo>>(resp).await.data.unwrap();
    assert_eq!(updated.title, "Pay rent (late)");
    assert_eq!(updated.priority, Priority::Medium);
    assert!(updated.due_date.is_none());
    assert!(!updated.completed);

    // update without dueDate leaves it unchanged
    let resp = call(
        &mut app,
        json_request("PUT", &format!("/api/todos/{}", dog.id), r#"{"title":"Walk cat"}"#),
    )
    .await;
    let updated = body_json::<Envelope<Todo>>(resp).await.data.unwrap();
    assert_eq!(updated.title, "Walk cat");
    assert!(updated.completed);

    // delete
    let resp = call(&mut app, empty_request("DELETE", &format!("/api/todos/{}", dog.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(envelope, serde_json::json!({ "success": true }));

    // delete again is a 404
    let resp = call(&mut app, empty_request("DELETE", &format!("/api/todos/{}", dog.id))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete: only rent remains
    let resp = call(&mut app, empty_request("GET", "/api/todos")).await;
    let todos = body_json::<Envelope<Vec<Todo>>>(resp).await.data.unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, rent.id);
}
