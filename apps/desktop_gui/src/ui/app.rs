//! Application shell: directory table, create form, edit dialog, delete
//! confirmation, search input, and toast notifications.

use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use client_core::{
    filter_employees, view, ClientEvent, DirectoryClient, Notification, NotificationKind,
};
use crossbeam_channel::{Receiver, Sender};
use shared::{
    domain::{EmployeeId, EmployeeRecord},
    protocol::EmployeeDraft,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

const TOAST_LIFETIME: Duration = Duration::from_secs(5);

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::NotFound => "Not found",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

struct Toast {
    kind: NotificationKind,
    message: String,
    expires_at: Instant,
}

fn toast_accent(kind: NotificationKind) -> egui::Color32 {
    match kind {
        NotificationKind::Success => egui::Color32::from_rgb(46, 160, 67),
        NotificationKind::Error => egui::Color32::from_rgb(218, 54, 51),
        NotificationKind::Warning => egui::Color32::from_rgb(210, 153, 34),
        NotificationKind::Info => egui::Color32::from_rgb(47, 129, 247),
    }
}

#[derive(Default, Clone)]
struct EmployeeFormFields {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    department: String,
    title: String,
    salary: String,
    date_hired: String,
}

impl EmployeeFormFields {
    fn from_record(record: &EmployeeRecord) -> Self {
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone().unwrap_or_default(),
            department: record.department.clone().unwrap_or_default(),
            title: record.title.clone().unwrap_or_default(),
            salary: record.salary.map(|s| s.to_string()).unwrap_or_default(),
            date_hired: record.date_hired.map(|d| d.to_string()).unwrap_or_default(),
        }
    }

    /// Converts the raw inputs into a draft; blank fields are stripped
    /// so they never reach the server as empty strings. Unparseable
    /// salary or date inputs are reported instead of being sent.
    fn to_draft(&self) -> Result<EmployeeDraft, String> {
        let salary = match self.salary.trim() {
            "" => None,
            raw => {
                let value: f64 = raw.parse().map_err(|_| "Salary must be a number".to_string())?;
                if value < 0.0 {
                    return Err("Salary must be zero or positive".to_string());
                }
                Some(value)
            }
        };
        let date_hired = match self.date_hired.trim() {
            "" => None,
            raw => Some(
                raw.parse::<NaiveDate>()
                    .map_err(|_| "Hire date must be YYYY-MM-DD".to_string())?,
            ),
        };

        Ok(EmployeeDraft {
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
            department: Some(self.department.clone()),
            title: Some(self.title.clone()),
            salary,
            date_hired,
            is_active: None,
        }
        .normalized())
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn show_grid(&mut self, ui: &mut egui::Ui, id_salt: &str) {
        egui::Grid::new(id_salt)
            .num_columns(4)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("First name");
                ui.text_edit_singleline(&mut self.first_name);
                ui.label("Last name");
                ui.text_edit_singleline(&mut self.last_name);
                ui.end_row();

                ui.label("Email");
                ui.text_edit_singleline(&mut self.email);
                ui.label("Phone");
                ui.text_edit_singleline(&mut self.phone);
                ui.end_row();

                ui.label("Department");
                ui.text_edit_singleline(&mut self.department);
                ui.label("Title");
                ui.text_edit_singleline(&mut self.title);
                ui.end_row();

                ui.label("Salary");
                ui.text_edit_singleline(&mut self.salary);
                ui.label("Hired (YYYY-MM-DD)");
                ui.text_edit_singleline(&mut self.date_hired);
                ui.end_row();
            });
    }
}

struct EditFormState {
    id: EmployeeId,
    fields: EmployeeFormFields,
}

struct PendingDelete {
    id: EmployeeId,
    name: String,
}

pub struct DirectoryGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    employees: Vec<EmployeeRecord>,
    search_query: String,
    create_form: EmployeeFormFields,
    edit_form: Option<EditFormState>,
    pending_delete: Option<PendingDelete>,
    deletes_in_flight: HashSet<EmployeeId>,
    toasts: Vec<Toast>,
    status_line: String,
    initial_refresh_sent: bool,
}

impl DirectoryGuiApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            employees: Vec::new(),
            search_query: String::new(),
            create_form: EmployeeFormFields::default(),
            edit_form: None,
            pending_delete: None,
            deletes_in_flight: HashSet::new(),
            toasts: Vec::new(),
            status_line: String::new(),
            initial_refresh_sent: false,
        }
    }

    fn push_toast(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.toasts.push(Toast {
            kind,
            message: message.into(),
            expires_at: Instant::now() + TOAST_LIFETIME,
        });
    }

    fn expire_toasts(&mut self) {
        let now = Instant::now();
        self.toasts.retain(|toast| toast.expires_at > now);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::DirectoryLoaded(employees) => {
                    self.employees = employees;
                }
                UiEvent::EditLoaded(record) => {
                    self.edit_form = Some(EditFormState {
                        id: record.id,
                        fields: EmployeeFormFields::from_record(&record),
                    });
                }
                UiEvent::CreateCompleted => {
                    self.create_form.clear();
                }
                UiEvent::UpdateCompleted => {
                    self.edit_form = None;
                }
                UiEvent::DeleteCompleted { id } => {
                    self.deletes_in_flight.remove(&id);
                }
                UiEvent::DeleteFailed { id, error } => {
                    self.deletes_in_flight.remove(&id);
                    self.status_line =
                        format!("{}: {}", err_label(error.category()), error.message());
                }
                UiEvent::Toast(Notification { kind, message }) => {
                    self.push_toast(kind, message);
                }
                UiEvent::Error(error) => {
                    self.status_line =
                        format!("{}: {}", err_label(error.category()), error.message());
                    self.push_toast(NotificationKind::Error, error.message().to_string());
                }
            }
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Employee Directory");
                ui.separator();
                ui.label("Search");
                ui.add(
                    egui::TextEdit::singleline(&mut self.search_query)
                        .hint_text("name or email")
                        .desired_width(220.0),
                );
                if ui.button("Refresh").clicked() {
                    dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::Refresh,
                        &mut self.status_line,
                    );
                }
            });
            if !self.status_line.is_empty() {
                ui.colored_label(egui::Color32::LIGHT_RED, &self.status_line);
            }
        });
    }

    fn show_table(&mut self, ctx: &egui::Context) {
        let visible = filter_employees(&self.employees, &self.search_query);
        let table = view::build_table(&visible);
        let mut edit_requested: Option<EmployeeId> = None;
        let mut delete_requested: Option<PendingDelete> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(&table.count_label);
            ui.separator();

            if table.empty {
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.weak(view::NO_EMPLOYEES_PLACEHOLDER);
                });
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                egui::Grid::new("employees_table")
                    .num_columns(6)
                    .striped(true)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.strong("ID");
                        ui.strong("Name");
                        ui.strong("Email");
                        ui.strong("Department");
                        ui.strong("Title");
                        ui.strong("Actions");
                        ui.end_row();

                        for row in &table.rows {
                            let id = EmployeeId(row.id);
                            ui.label(row.id.to_string());
                            ui.label(&row.name);
                            ui.label(&row.email);
                            ui.label(&row.department);
                            ui.label(&row.title);
                            ui.horizontal(|ui| {
                                if ui.button("Edit").clicked() {
                                    edit_requested = Some(id);
                                }
                                let delete_enabled = !self.deletes_in_flight.contains(&id);
                                if ui
                                    .add_enabled(delete_enabled, egui::Button::new("Delete"))
                                    .clicked()
                                {
                                    delete_requested = Some(PendingDelete {
                                        id,
                                        name: row.name.clone(),
                                    });
                                }
                            });
                            ui.end_row();
                        }
                    });
            });
        });

        if let Some(id) = edit_requested {
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::LoadForEdit { id },
                &mut self.status_line,
            );
        }
        if let Some(pending) = delete_requested {
            self.pending_delete = Some(pending);
        }
    }

    fn show_create_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("create_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.strong("Add employee");
            self.create_form.show_grid(ui, "create_form");
            let submitted = ui.button("Create").clicked();
            ui.add_space(4.0);

            if submitted {
                match self.create_form.to_draft() {
                    Ok(draft) if draft.is_empty() => {
                        self.push_toast(NotificationKind::Warning, "Nothing to submit");
                    }
                    Ok(draft) => {
                        dispatch_backend_command(
                            &self.cmd_tx,
                            BackendCommand::Create { draft },
                            &mut self.status_line,
                        );
                    }
                    Err(message) => {
                        self.push_toast(NotificationKind::Warning, message);
                    }
                }
            }
        });
    }

    fn show_edit_dialog(&mut self, ctx: &egui::Context) {
        let Some(mut state) = self.edit_form.take() else {
            return;
        };
        let mut open = true;
        let mut submit = false;
        let mut cancel = false;

        egui::Window::new("Edit employee")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Employee #{}", state.id.0));
                state.fields.show_grid(ui, "edit_form");
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        submit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if submit {
            match state.fields.to_draft() {
                Ok(draft) if draft.is_empty() => {
                    self.push_toast(NotificationKind::Warning, "Nothing to save");
                }
                Ok(draft) => {
                    dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::Update {
                            id: state.id,
                            draft,
                        },
                        &mut self.status_line,
                    );
                }
                Err(message) => {
                    self.push_toast(NotificationKind::Warning, message);
                }
            }
        }

        // The dialog stays up until the update round trip completes.
        if open && !cancel {
            self.edit_form = Some(state);
        }
    }

    fn show_delete_confirm(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.pending_delete.take() else {
            return;
        };
        let mut decision: Option<bool> = None;

        egui::Window::new("Confirm delete")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Delete {}? This cannot be undone.", pending.name));
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision {
            Some(true) => self.confirm_delete(pending.id),
            Some(false) => {}
            None => self.pending_delete = Some(pending),
        }
    }

    /// The row's delete control is disabled only once the command is
    /// actually queued; a dropped command would otherwise leave it
    /// disabled forever.
    fn confirm_delete(&mut self, id: EmployeeId) {
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Delete { id },
            &mut self.status_line,
        );
        if queued {
            self.deletes_in_flight.insert(id);
        }
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        let mut dismissed: Option<usize> = None;
        egui::Area::new(egui::Id::new("toast_area"))
            .anchor(egui::Align2::RIGHT_TOP, [-12.0, 36.0])
            .show(ctx, |ui| {
                for (index, toast) in self.toasts.iter().enumerate() {
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.5, toast_accent(toast.kind)))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.colored_label(toast_accent(toast.kind), &toast.message);
                                if ui.small_button("x").clicked() {
                                    dismissed = Some(index);
                                }
                            });
                        });
                    ui.add_space(4.0);
                }
            });
        if let Some(index) = dismissed {
            self.toasts.remove(index);
        }
    }
}

impl eframe::App for DirectoryGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.initial_refresh_sent {
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::Refresh,
                &mut self.status_line,
            );
            self.initial_refresh_sent = true;
        }

        self.process_ui_events();
        self.expire_toasts();

        self.show_top_bar(ctx);
        self.show_create_panel(ctx);
        self.show_table(ctx);
        self.show_edit_dialog(ctx);
        self.show_delete_confirm(ctx);
        self.show_toasts(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

pub fn start_backend_bridge(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    server_url: String,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let client = DirectoryClient::new(server_url);

            // Client notifications and refreshed snapshots flow to the UI
            // as events; the worker loop only reports completion.
            let mut events = client.subscribe_events();
            let ui_tx_events = ui_tx.clone();
            tokio::spawn(async move {
                while let Ok(event) = events.recv().await {
                    let forwarded = match event {
                        ClientEvent::DirectoryRefreshed { employees } => {
                            UiEvent::DirectoryLoaded(employees)
                        }
                        ClientEvent::Notify(notification) => UiEvent::Toast(notification),
                    };
                    let _ = ui_tx_events.try_send(forwarded);
                }
            });

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Refresh => {
                        tracing::info!("backend: refresh");
                        if let Err(err) = client.refresh().await {
                            tracing::error!("backend: refresh failed: {err}");
                        }
                    }
                    BackendCommand::LoadForEdit { id } => {
                        tracing::info!(employee_id = id.0, "backend: load_for_edit");
                        match client.fetch_employee(id).await {
                            Ok(record) => {
                                let _ = ui_tx.try_send(UiEvent::EditLoaded(record));
                            }
                            Err(err) => {
                                tracing::error!(
                                    employee_id = id.0,
                                    "backend: load_for_edit failed: {err}"
                                );
                            }
                        }
                    }
                    BackendCommand::Create { draft } => {
                        tracing::info!("backend: create");
                        match client.create_employee(draft).await {
                            Ok(_) => {
                                let _ = ui_tx.try_send(UiEvent::CreateCompleted);
                            }
                            Err(err) => {
                                tracing::error!("backend: create failed: {err}");
                            }
                        }
                    }
                    BackendCommand::Update { id, draft } => {
                        tracing::info!(employee_id = id.0, "backend: update");
                        match client.update_employee(id, draft).await {
                            Ok(_) => {
                                let _ = ui_tx.try_send(UiEvent::UpdateCompleted);
                            }
                            Err(err) => {
                                tracing::error!(
                                    employee_id = id.0,
                                    "backend: update failed: {err}"
                                );
                            }
                        }
                    }
                    BackendCommand::Delete { id } => {
                        tracing::info!(employee_id = id.0, "backend: delete");
                        match client.delete_employee(id).await {
                            Ok(()) => {
                                let _ = ui_tx.try_send(UiEvent::DeleteCompleted { id });
                            }
                            Err(err) => {
                                tracing::error!(
                                    employee_id = id.0,
                                    "backend: delete failed: {err}"
                                );
                                let _ = ui_tx.try_send(UiEvent::DeleteFailed {
                                    id,
                                    error: UiError::from_directory_error(
                                        UiErrorContext::Delete,
                                        &err,
                                    ),
                                });
                            }
                        }
                    }
                }
            }
        });
    });
}
