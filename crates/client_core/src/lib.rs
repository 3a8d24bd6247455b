use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{EmployeeId, EmployeeRecord},
    error::ErrorBody,
    protocol::{EmployeeDraft, EmployeeListResponse},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

pub mod error;
pub mod view;

use crate::error::DirectoryError;

const API_ROOT: &str = "/api/employees";
const LIST_PAGE_LIMIT: u32 = 100;

pub type Result<T> = std::result::Result<T, DirectoryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// Transient user-facing message; adapters decide how to display and
/// expire it.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The cache snapshot was replaced after a successful list fetch.
    DirectoryRefreshed { employees: Vec<EmployeeRecord> },
    Notify(Notification),
}

/// Case-insensitive substring match against first name, last name, and
/// email. An empty or whitespace query matches everything, preserving
/// order. Never mutates the cache it reads from.
pub fn filter_employees(records: &[EmployeeRecord], query: &str) -> Vec<EmployeeRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|employee| {
            employee.first_name.to_lowercase().contains(&needle)
                || employee.last_name.to_lowercase().contains(&needle)
                || employee.email.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Seam between the directory workflow and UI adapters.
#[async_trait]
pub trait DirectoryHandle: Send + Sync {
    async fn refresh(&self) -> Result<Vec<EmployeeRecord>>;
    async fn fetch_employee(&self, id: EmployeeId) -> Result<EmployeeRecord>;
    async fn create_employee(&self, draft: EmployeeDraft) -> Result<EmployeeRecord>;
    async fn update_employee(&self, id: EmployeeId, draft: EmployeeDraft)
        -> Result<EmployeeRecord>;
    async fn delete_employee(&self, id: EmployeeId) -> Result<()>;
    async fn cached_employees(&self) -> Vec<EmployeeRecord>;
    fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent>;
}

struct DirectoryState {
    cache: Vec<EmployeeRecord>,
}

/// REST client for the employee directory. Holds the cache snapshot
/// behind a mutex and fans out events to any number of subscribers.
pub struct DirectoryClient {
    http: Client,
    server_url: String,
    inner: Mutex<DirectoryState>,
    events: broadcast::Sender<ClientEvent>,
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // Error bodies are expected as JSON with an optional `detail`;
    // anything else just loses the detail.
    let detail = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail);
    Err(DirectoryError::Server {
        status: status.as_u16(),
        detail,
    })
}

async fn read_success<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .map_err(|err| DirectoryError::Payload(err.to_string()))
}

impl DirectoryClient {
    pub fn new(server_url: impl Into<String>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            http: Client::new(),
            server_url: server_url.into().trim_end_matches('/').to_string(),
            inner: Mutex::new(DirectoryState { cache: Vec::new() }),
            events,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn collection_url(&self) -> String {
        format!("{}{API_ROOT}", self.server_url)
    }

    fn record_url(&self, id: EmployeeId) -> String {
        format!("{}{API_ROOT}/{}", self.server_url, id.0)
    }

    fn notify(&self, notification: Notification) {
        let _ = self.events.send(ClientEvent::Notify(notification));
    }

    /// Fetches the first page of the directory and replaces the cache.
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<Vec<EmployeeRecord>> {
        let result: Result<Vec<EmployeeRecord>> = async {
            let response = self
                .http
                .get(self.collection_url())
                .query(&[("limit", LIST_PAGE_LIMIT)])
                .send()
                .await?;
            let body: EmployeeListResponse = read_success(response).await?;
            Ok(body.data)
        }
        .await;

        match result {
            Ok(employees) => {
                {
                    let mut inner = self.inner.lock().await;
                    inner.cache = employees.clone();
                }
                info!(count = employees.len(), "directory refreshed");
                let _ = self.events.send(ClientEvent::DirectoryRefreshed {
                    employees: employees.clone(),
                });
                Ok(employees)
            }
            Err(err) => {
                error!("failed to load employees: {err}");
                self.notify(Notification::error("Failed to load employees"));
                Err(err)
            }
        }
    }

    pub async fn fetch_employee(&self, id: EmployeeId) -> Result<EmployeeRecord> {
        let result: Result<EmployeeRecord> = async {
            let response = self.http.get(self.record_url(id)).send().await?;
            read_success(response).await
        }
        .await;

        if let Err(err) = &result {
            error!(employee_id = id.0, "failed to load employee: {err}");
            self.notify(Notification::error("Failed to load employee details"));
        }
        result
    }

    pub async fn create_employee(&self, draft: EmployeeDraft) -> Result<EmployeeRecord> {
        let draft = draft.normalized();
        let result: Result<EmployeeRecord> = async {
            let response = self
                .http
                .post(self.collection_url())
                .json(&draft)
                .send()
                .await?;
            read_success(response).await
        }
        .await;

        match result {
            Ok(record) => {
                info!(employee_id = record.id.0, "employee created");
                self.notify(Notification::success(format!(
                    "{} created successfully",
                    record.full_name()
                )));
                if let Err(err) = self.refresh().await {
                    warn!("post-create refresh failed: {err}");
                }
                Ok(record)
            }
            Err(err) => {
                error!("failed to create employee: {err}");
                self.notify(Notification::error(format!(
                    "Failed to create employee: {}",
                    err.user_message()
                )));
                Err(err)
            }
        }
    }

    pub async fn update_employee(
        &self,
        id: EmployeeId,
        draft: EmployeeDraft,
    ) -> Result<EmployeeRecord> {
        let draft = draft.normalized();
        let result: Result<EmployeeRecord> = async {
            let response = self
                .http
                .put(self.record_url(id))
                .json(&draft)
                .send()
                .await?;
            read_success(response).await
        }
        .await;

        match result {
            Ok(record) => {
                info!(employee_id = record.id.0, "employee updated");
                self.notify(Notification::success(format!(
                    "{} updated successfully",
                    record.full_name()
                )));
                if let Err(err) = self.refresh().await {
                    warn!("post-update refresh failed: {err}");
                }
                Ok(record)
            }
            Err(err) => {
                error!(employee_id = id.0, "failed to update employee: {err}");
                self.notify(Notification::error(format!(
                    "Failed to update employee: {}",
                    err.user_message()
                )));
                Err(err)
            }
        }
    }

    /// Single-attempt delete; confirmation is the caller's job. On
    /// failure the cached record stays visible.
    pub async fn delete_employee(&self, id: EmployeeId) -> Result<()> {
        let display_name = {
            let inner = self.inner.lock().await;
            inner
                .cache
                .iter()
                .find(|employee| employee.id == id)
                .map(EmployeeRecord::full_name)
        }
        .unwrap_or_else(|| format!("#{}", id.0));

        let result: Result<()> = async {
            let response = self.http.delete(self.record_url(id)).send().await?;
            check_status(response).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                info!(employee_id = id.0, "employee deleted");
                self.notify(Notification::success(format!(
                    "{display_name} deleted successfully"
                )));
                if let Err(err) = self.refresh().await {
                    warn!("post-delete refresh failed: {err}");
                }
                Ok(())
            }
            Err(err) => {
                error!(employee_id = id.0, "failed to delete employee: {err}");
                self.notify(Notification::error("Failed to delete employee"));
                Err(err)
            }
        }
    }

    pub async fn cached_employees(&self) -> Vec<EmployeeRecord> {
        self.inner.lock().await.cache.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl DirectoryHandle for DirectoryClient {
    async fn refresh(&self) -> Result<Vec<EmployeeRecord>> {
        DirectoryClient::refresh(self).await
    }

    async fn fetch_employee(&self, id: EmployeeId) -> Result<EmployeeRecord> {
        DirectoryClient::fetch_employee(self, id).await
    }

    async fn create_employee(&self, draft: EmployeeDraft) -> Result<EmployeeRecord> {
        DirectoryClient::create_employee(self, draft).await
    }

    async fn update_employee(
        &self,
        id: EmployeeId,
        draft: EmployeeDraft,
    ) -> Result<EmployeeRecord> {
        DirectoryClient::update_employee(self, id, draft).await
    }

    async fn delete_employee(&self, id: EmployeeId) -> Result<()> {
        DirectoryClient::delete_employee(self, id).await
    }

    async fn cached_employees(&self) -> Vec<EmployeeRecord> {
        DirectoryClient::cached_employees(self).await
    }

    fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
