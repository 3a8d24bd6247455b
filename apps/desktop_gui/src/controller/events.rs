//! UI/backend events and error modeling for the desktop GUI controller.

use client_core::{error::DirectoryError, Notification};
use shared::domain::{EmployeeId, EmployeeRecord};

pub enum UiEvent {
    DirectoryLoaded(Vec<EmployeeRecord>),
    EditLoaded(EmployeeRecord),
    CreateCompleted,
    UpdateCompleted,
    DeleteCompleted {
        id: EmployeeId,
    },
    /// The delete control for `id` must be re-enabled; the record stays
    /// in the table.
    DeleteFailed {
        id: EmployeeId,
        error: UiError,
    },
    Toast(Notification),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    NotFound,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Delete,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_directory_error(context: UiErrorContext, err: &DirectoryError) -> Self {
        let category = if err.is_transport() {
            UiErrorCategory::Transport
        } else {
            match err.status() {
                Some(400) | Some(422) => UiErrorCategory::Validation,
                Some(404) => UiErrorCategory::NotFound,
                _ => UiErrorCategory::Unknown,
            }
        };
        Self {
            category,
            context,
            message: err.user_message(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Unknown,
            context,
            message: message.into(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
