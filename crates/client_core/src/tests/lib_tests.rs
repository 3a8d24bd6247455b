use super::*;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response as AxumResponse},
    routing::get,
    Json, Router,
};
use shared::protocol::DeleteResponse;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct MockDirectory {
    employees: Arc<Mutex<Vec<EmployeeRecord>>>,
    captured_bodies: Arc<Mutex<Vec<serde_json::Value>>>,
    fail_lists: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
    create_rejection: Arc<Mutex<Option<String>>>,
}

fn sample_employee(id: i64, first: &str, last: &str, email: &str) -> EmployeeRecord {
    EmployeeRecord {
        id: EmployeeId(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        phone: None,
        department: None,
        title: None,
        salary: None,
        date_hired: None,
        is_active: true,
    }
}

async fn handle_list(State(state): State<MockDirectory>) -> AxumResponse {
    if state.fail_lists.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let employees = state.employees.lock().await.clone();
    Json(EmployeeListResponse {
        total: employees.len() as u64,
        limit: LIST_PAGE_LIMIT,
        offset: 0,
        data: employees,
    })
    .into_response()
}

async fn handle_create(
    State(state): State<MockDirectory>,
    Json(body): Json<serde_json::Value>,
) -> AxumResponse {
    state.captured_bodies.lock().await.push(body.clone());
    if let Some(detail) = state.create_rejection.lock().await.clone() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                detail: Some(detail),
            }),
        )
            .into_response();
    }

    let mut employees = state.employees.lock().await;
    let id = employees.iter().map(|e| e.id.0).max().unwrap_or(0) + 1;
    let record = EmployeeRecord {
        id: EmployeeId(id),
        first_name: body["first_name"].as_str().unwrap_or_default().to_string(),
        last_name: body["last_name"].as_str().unwrap_or_default().to_string(),
        email: body["email"].as_str().unwrap_or_default().to_string(),
        phone: body["phone"].as_str().map(str::to_string),
        department: body["department"].as_str().map(str::to_string),
        title: body["title"].as_str().map(str::to_string),
        salary: body["salary"].as_f64(),
        date_hired: None,
        is_active: true,
    };
    employees.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn handle_get(
    State(state): State<MockDirectory>,
    Path(id): Path<i64>,
) -> AxumResponse {
    let employees = state.employees.lock().await;
    match employees.iter().find(|e| e.id.0 == id) {
        Some(record) => Json(record.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                detail: Some("Employee not found".to_string()),
            }),
        )
            .into_response(),
    }
}

async fn handle_update(
    State(state): State<MockDirectory>,
    Path(id): Path<i64>,
    Json(body): Json<serde_json::Value>,
) -> AxumResponse {
    state.captured_bodies.lock().await.push(body.clone());
    let mut employees = state.employees.lock().await;
    let Some(record) = employees.iter_mut().find(|e| e.id.0 == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                detail: Some("Employee not found".to_string()),
            }),
        )
            .into_response();
    };
    if let Some(first) = body["first_name"].as_str() {
        record.first_name = first.to_string();
    }
    if let Some(last) = body["last_name"].as_str() {
        record.last_name = last.to_string();
    }
    if let Some(title) = body["title"].as_str() {
        record.title = Some(title.to_string());
    }
    Json(record.clone()).into_response()
}

async fn handle_delete(
    State(state): State<MockDirectory>,
    Path(id): Path<i64>,
) -> AxumResponse {
    if state.fail_deletes.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let mut employees = state.employees.lock().await;
    let before = employees.len();
    employees.retain(|e| e.id.0 != id);
    if employees.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                detail: Some("Employee not found".to_string()),
            }),
        )
            .into_response();
    }
    Json(DeleteResponse { deleted: true }).into_response()
}

async fn spawn_directory_server(state: MockDirectory) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/api/employees", get(handle_list).post(handle_create))
        .route(
            "/api/employees/:id",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn seeded_state(employees: Vec<EmployeeRecord>) -> MockDirectory {
    let state = MockDirectory::default();
    *state.employees.lock().await = employees;
    state
}

async fn next_notification(rx: &mut broadcast::Receiver<ClientEvent>) -> Notification {
    loop {
        match rx.recv().await.expect("event") {
            ClientEvent::Notify(notification) => return notification,
            ClientEvent::DirectoryRefreshed { .. } => continue,
        }
    }
}

#[tokio::test]
async fn refresh_replaces_cache_and_emits_snapshot() {
    let state = seeded_state(vec![
        sample_employee(1, "Ann", "Lee", "a@x.com"),
        sample_employee(2, "Bob", "Ng", "b@x.com"),
    ])
    .await;
    let server_url = spawn_directory_server(state).await;
    let client = DirectoryClient::new(server_url);
    let mut rx = client.subscribe_events();

    let employees = client.refresh().await.expect("refresh");
    assert_eq!(employees.len(), 2);
    assert_eq!(client.cached_employees().await, employees);

    match rx.recv().await.expect("event") {
        ClientEvent::DirectoryRefreshed { employees } => {
            assert_eq!(employees[0].first_name, "Ann");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn refresh_failure_keeps_previous_snapshot() {
    let state = seeded_state(vec![sample_employee(1, "Ann", "Lee", "a@x.com")]).await;
    let fail_lists = Arc::clone(&state.fail_lists);
    let server_url = spawn_directory_server(state).await;
    let client = DirectoryClient::new(server_url);

    client.refresh().await.expect("initial refresh");
    fail_lists.store(true, Ordering::SeqCst);

    let mut rx = client.subscribe_events();
    let err = client.refresh().await.expect_err("must fail");
    assert_eq!(err.status(), Some(500));

    let cached = client.cached_employees().await;
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].first_name, "Ann");

    let notification = next_notification(&mut rx).await;
    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.message, "Failed to load employees");
}

#[tokio::test]
async fn transport_failure_maps_to_transport_error() {
    // Nothing listens on this port.
    let client = DirectoryClient::new("http://127.0.0.1:9");
    let err = client.refresh().await.expect_err("must fail");
    assert!(err.is_transport(), "unexpected error: {err}");
}

#[tokio::test]
async fn create_strips_empty_fields_from_payload() {
    let state = MockDirectory::default();
    let captured = Arc::clone(&state.captured_bodies);
    let server_url = spawn_directory_server(state).await;
    let client = DirectoryClient::new(server_url);

    let draft = EmployeeDraft {
        first_name: Some("Jo".to_string()),
        last_name: Some("Doe".to_string()),
        email: Some("jo@x.com".to_string()),
        department: Some(String::new()),
        ..Default::default()
    };
    client.create_employee(draft).await.expect("create");

    let bodies = captured.lock().await;
    let body = bodies.first().expect("captured body");
    let object = body.as_object().expect("json object");
    assert!(!object.contains_key("department"));
    assert_eq!(object["first_name"], "Jo");
    assert_eq!(object["last_name"], "Doe");
    assert_eq!(object["email"], "jo@x.com");
}

#[tokio::test]
async fn create_success_refreshes_and_notifies_with_full_name() {
    let state = MockDirectory::default();
    let server_url = spawn_directory_server(state).await;
    let client = DirectoryClient::new(server_url);
    let mut rx = client.subscribe_events();

    let draft = EmployeeDraft {
        first_name: Some("Jo".to_string()),
        last_name: Some("Doe".to_string()),
        email: Some("jo@x.com".to_string()),
        ..Default::default()
    };
    let record = client.create_employee(draft).await.expect("create");
    assert_eq!(record.id, EmployeeId(1));

    let notification = next_notification(&mut rx).await;
    assert_eq!(notification.kind, NotificationKind::Success);
    assert!(
        notification.message.contains("Jo Doe"),
        "unexpected message: {}",
        notification.message
    );

    // The post-create refresh replaces the cache with the server copy.
    match rx.recv().await.expect("event") {
        ClientEvent::DirectoryRefreshed { employees } => {
            assert_eq!(employees.len(), 1);
            assert_eq!(employees[0].email, "jo@x.com");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn create_failure_surfaces_server_detail() {
    let state = MockDirectory::default();
    *state.create_rejection.lock().await = Some("Email already exists".to_string());
    let server_url = spawn_directory_server(state).await;
    let client = DirectoryClient::new(server_url);
    let mut rx = client.subscribe_events();

    let draft = EmployeeDraft {
        first_name: Some("Jo".to_string()),
        last_name: Some("Doe".to_string()),
        email: Some("jo@x.com".to_string()),
        ..Default::default()
    };
    let err = client.create_employee(draft).await.expect_err("must fail");
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "Email already exists");

    let notification = next_notification(&mut rx).await;
    assert_eq!(notification.kind, NotificationKind::Error);
    assert!(notification.message.contains("Email already exists"));
}

#[tokio::test]
async fn server_error_without_detail_falls_back_to_status_message() {
    let state = MockDirectory::default();
    state.fail_lists.store(true, Ordering::SeqCst);
    let server_url = spawn_directory_server(state).await;
    let client = DirectoryClient::new(server_url);

    let err = client.refresh().await.expect_err("must fail");
    assert!(
        err.user_message().contains("500"),
        "unexpected message: {}",
        err.user_message()
    );
}

#[tokio::test]
async fn update_sends_partial_payload() {
    let state = seeded_state(vec![sample_employee(3, "Ann", "Lee", "a@x.com")]).await;
    let captured = Arc::clone(&state.captured_bodies);
    let server_url = spawn_directory_server(state).await;
    let client = DirectoryClient::new(server_url);

    let draft = EmployeeDraft {
        title: Some("Lead".to_string()),
        ..Default::default()
    };
    let record = client
        .update_employee(EmployeeId(3), draft)
        .await
        .expect("update");
    assert_eq!(record.title.as_deref(), Some("Lead"));

    let bodies = captured.lock().await;
    let object = bodies.first().expect("captured body").as_object().expect("object");
    assert_eq!(object.len(), 1);
    assert_eq!(object["title"], "Lead");
}

#[tokio::test]
async fn delete_http_500_keeps_record_cached_and_reports_error() {
    let state = seeded_state(vec![sample_employee(1, "Ann", "Lee", "a@x.com")]).await;
    let fail_deletes = Arc::clone(&state.fail_deletes);
    let server_url = spawn_directory_server(state).await;
    let client = DirectoryClient::new(server_url);

    client.refresh().await.expect("refresh");
    fail_deletes.store(true, Ordering::SeqCst);

    let mut rx = client.subscribe_events();
    let err = client
        .delete_employee(EmployeeId(1))
        .await
        .expect_err("must fail");
    assert_eq!(err.status(), Some(500));

    let cached = client.cached_employees().await;
    assert!(cached.iter().any(|e| e.id == EmployeeId(1)));

    let notification = next_notification(&mut rx).await;
    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.message, "Failed to delete employee");
}

#[tokio::test]
async fn delete_success_notifies_by_name_and_refreshes() {
    let state = seeded_state(vec![sample_employee(1, "Ann", "Lee", "a@x.com")]).await;
    let server_url = spawn_directory_server(state).await;
    let client = DirectoryClient::new(server_url);

    client.refresh().await.expect("refresh");
    let mut rx = client.subscribe_events();

    client
        .delete_employee(EmployeeId(1))
        .await
        .expect("delete");

    let notification = next_notification(&mut rx).await;
    assert_eq!(notification.kind, NotificationKind::Success);
    assert!(notification.message.contains("Ann Lee"));

    assert!(client.cached_employees().await.is_empty());
}

#[tokio::test]
async fn fetch_employee_not_found_maps_to_server_error() {
    let state = MockDirectory::default();
    let server_url = spawn_directory_server(state).await;
    let client = DirectoryClient::new(server_url);
    let mut rx = client.subscribe_events();

    let err = client
        .fetch_employee(EmployeeId(42))
        .await
        .expect_err("must fail");
    assert_eq!(err.status(), Some(404));

    let notification = next_notification(&mut rx).await;
    assert_eq!(notification.message, "Failed to load employee details");
}

#[test]
fn filter_empty_query_returns_full_list_in_order() {
    let records = vec![
        sample_employee(1, "Ann", "Lee", "a@x.com"),
        sample_employee(2, "Bob", "Ng", "b@x.com"),
    ];
    assert_eq!(filter_employees(&records, ""), records);
    assert_eq!(filter_employees(&records, "   "), records);
}

#[test]
fn filter_matches_case_insensitive_substring() {
    let records = vec![
        sample_employee(1, "Ann", "Lee", "a@x.com"),
        sample_employee(2, "Bob", "Ng", "b@x.com"),
    ];

    let matched = filter_employees(&records, "an");
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].first_name, "Ann");

    let matched = filter_employees(&records, "NG");
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].first_name, "Bob");
}

#[test]
fn filter_matches_email_field() {
    let records = vec![
        sample_employee(1, "Ann", "Lee", "ann@corp.example"),
        sample_employee(2, "Bob", "Ng", "bob@other.example"),
    ];
    let matched = filter_employees(&records, "corp");
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].email, "ann@corp.example");
}

#[test]
fn filter_with_no_match_returns_empty() {
    let records = vec![sample_employee(1, "Ann", "Lee", "a@x.com")];
    assert!(filter_employees(&records, "zzz").is_empty());
}
