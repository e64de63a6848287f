use std::sync::Arc;

use anyhow::Context;
use td_autosave::{AutoSaveScheduler, EventBus, TaskCollection};
use td_config::TaskdeckConfig;
use td_core::repository::TaskRepository;
use td_db::{InMemoryTaskRepository, SqlTaskRepository};
use td_service::TaskService;

use crate::bootstrap::resolve_db_path;
use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: TaskService,
    pub events: EventBus,
    pub scheduler: AutoSaveScheduler,
}

impl AppContext {
    /// Open the task store selected by flags and config and wire the
    /// auto-save scheduler to it.
    pub async fn init(config: &TaskdeckConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let repo: Arc<dyn TaskRepository> =
            if flags.in_memory || (flags.db.is_none() && config.database.is_in_memory()) {
                tracing::debug!("using in-memory task store");
                Arc::new(InMemoryTaskRepository::new())
            } else {
                let path = resolve_db_path(flags.db.as_deref(), config);
                let repo = SqlTaskRepository::open(&path)
                    .await
                    .with_context(|| format!("failed to open task database at {path}"))?;
                Arc::new(repo)
            };

        let service = TaskService::new(repo);
        let events = EventBus::new();
        let scheduler =
            AutoSaveScheduler::new(service.clone(), events.clone(), config.autosave.debounce());

        Ok(Self {
            service,
            events,
            scheduler,
        })
    }

    /// A fresh, empty collection sharing this context's scheduler and events.
    #[must_use]
    pub fn collection(&self) -> TaskCollection {
        TaskCollection::new(
            self.service.clone(),
            self.scheduler.clone(),
            self.events.clone(),
        )
    }
}
