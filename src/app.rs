use crate::cli::{Command, ItemFields, Options};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::events::{CaptureAdapter, Handler as ScanHandler, LineCapture, Scanner};
use crate::export::{ExportFormat, Exporter};
use crate::inventory::{ItemId, ScannedItem, Task, TaskId};
use crate::session::Session;
use crate::state::{ItemForm, StateError};
use crate::store::{InventoryStore, MemoryStore, SqliteStore};
use crate::utils::text_processing::format_local_time;
use chrono::Utc;
use log::*;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Oversees command processing, session management, and terminal output.
///
pub struct App {
    config: Config,
    session: Session,
}

impl App {
    /// Open the configured store and begin a session over it.
    ///
    pub fn start(config: Config, options: &Options) -> AppResult<App> {
        info!("Starting application...");
        let store: Arc<dyn InventoryStore> = if options.memory {
            debug!("Using in-memory store");
            Arc::new(MemoryStore::new())
        } else {
            debug!("Opening database {}...", config.database_path.display());
            Arc::new(SqliteStore::open(&config.database_path)?)
        };
        Ok(App::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn InventoryStore>) -> App {
        App {
            config,
            session: Session::begin(store),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// End the session. Returns the store for reuse.
    ///
    pub fn finish(self) -> Arc<dyn InventoryStore> {
        info!("Exiting application...");
        self.session.end()
    }

    /// Run one command, writing its output to `out`.
    ///
    pub async fn run(&mut self, command: Command, out: &mut dyn Write) -> AppResult<()> {
        debug!("Processing command '{:?}'...", command);
        match command {
            Command::TaskNew { name } => {
                let task = self.session.create_task(&name).await?;
                writeln!(out, "{}", self.task_line(&task))?;
            }
            Command::TaskList => {
                for task in self.session.store().list_tasks().await? {
                    writeln!(out, "{}", self.task_line(&task))?;
                }
            }
            Command::TaskShow { task } => {
                let data = self.session.export_task_data(task).await?;
                writeln!(out, "{}", to_json(&data)?)?;
            }
            Command::TaskRename { task, name } => {
                let task = self.session.rename_task(task, &name).await?;
                writeln!(out, "{}", self.task_line(&task))?;
            }
            Command::TaskDelete { task } => {
                self.session.delete_task(task).await?;
                writeln!(out, "Deleted task {}", task)?;
            }
            Command::ItemAdd { task, code, fields } => {
                self.session.open_task(task).await?;
                self.session.state_mut().clear_selection().open_item_form();
                if let Some(form) = self.session.state_mut().item_form_mut() {
                    form.code = code;
                    apply_fields(form, fields);
                }
                let item = self.session.submit_open_item_form().await?;
                writeln!(out, "{}", self.item_line(&item))?;
            }
            Command::ItemList { task } => {
                self.session.open_task(task).await?;
                for item in self.session.state().scanned_items() {
                    writeln!(out, "{}", self.item_line(item))?;
                }
            }
            Command::ItemEdit { task, item, fields } => {
                self.load_item(task, item).await?;
                self.session.state_mut().open_item_form();
                if let Some(form) = self.session.state_mut().item_form_mut() {
                    apply_fields(form, fields);
                }
                let item = self.session.submit_open_item_form().await?;
                writeln!(out, "{}", self.item_line(&item))?;
            }
            Command::ItemDelete { task, item } => {
                self.load_item(task, item).await?;
                self.session.delete_scanned_item(item).await?;
                writeln!(out, "Deleted item {}", item)?;
            }
            Command::Scan { task, continuous } => {
                let mut capture = self.config.capture_config();
                capture.continuous |= continuous;
                let scanner = Scanner::new(LineCapture::stdin()?, capture);
                self.scan(task, scanner, out).await?;
            }
            Command::Export { task, format, out: dir } => {
                let file_name = self.export(task, format, dir).await?;
                writeln!(out, "{}", file_name)?;
            }
            Command::Summary { task } => {
                self.session.open_task(task).await?;
                writeln!(out, "{}", to_json(&self.session.summary())?)?;
            }
            Command::Reset { confirmed } => {
                if !confirmed {
                    return Err(AppError::Other(
                        "Refusing to delete all data without --yes".to_string(),
                    ));
                }
                self.session.clear_all_data().await?;
                writeln!(out, "All data deleted")?;
            }
        }
        Ok(())
    }

    /// Record codes from `scanner` into `task` until it goes idle.
    ///
    pub async fn scan<A: CaptureAdapter>(
        &mut self,
        task: TaskId,
        mut scanner: Scanner<A>,
        out: &mut dyn Write,
    ) -> AppResult<Vec<ScannedItem>> {
        self.session.open_task(task).await?;
        let recorded = ScanHandler::new(&mut self.session, &mut scanner).run().await?;
        for item in &recorded {
            writeln!(out, "{}", self.item_line(item))?;
        }
        Ok(recorded)
    }

    /// Export a task, returning the name of the written file.
    ///
    pub async fn export(
        &mut self,
        task: TaskId,
        format: ExportFormat,
        directory: Option<PathBuf>,
    ) -> AppResult<String> {
        let data = self.session.export_task_data(task).await?;
        let directory = directory.unwrap_or_else(|| self.config.export_directory.clone());
        let exporter = Exporter::new(directory, self.config.time_format.clone())?;
        let exported = exporter.export(&data, format, Utc::now())?;
        info!("Wrote {}", exported.path.display());
        Ok(exported.file_name)
    }

    /// Load `task` and select one of its items.
    ///
    async fn load_item(&mut self, task: TaskId, item: ItemId) -> AppResult<()> {
        self.session.open_task(task).await?;
        if self.session.state().find_item(item).is_none() {
            return Err(StateError::ItemNotLoaded { id: item.0 }.into());
        }
        self.session.state_mut().select_item(item);
        Ok(())
    }

    fn task_line(&self, task: &Task) -> String {
        format!(
            "{}\t{}\t{}",
            task.id,
            task.name,
            format_local_time(&task.created_at, &self.config.time_format)
        )
    }

    fn item_line(&self, item: &ScannedItem) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            item.id,
            item.scanned_data.display_text(),
            item.location,
            item.condition.map(|c| c.as_str()).unwrap_or(""),
            item.notes,
            format_local_time(&item.timestamp, &self.config.time_format)
        )
    }
}

fn apply_fields(form: &mut ItemForm, fields: ItemFields) {
    if let Some(location) = fields.location {
        form.location = location;
    }
    if let Some(notes) = fields.notes {
        form.notes = notes;
    }
    if let Some(condition) = fields.condition {
        form.condition = Some(condition);
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Other(e.to_string()))
}
