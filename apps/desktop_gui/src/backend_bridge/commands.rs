//! Backend commands queued from UI to backend worker.

use shared::{domain::EmployeeId, protocol::EmployeeDraft};

pub enum BackendCommand {
    Refresh,
    LoadForEdit {
        id: EmployeeId,
    },
    Create {
        draft: EmployeeDraft,
    },
    Update {
        id: EmployeeId,
        draft: EmployeeDraft,
    },
    Delete {
        id: EmployeeId,
    },
}
