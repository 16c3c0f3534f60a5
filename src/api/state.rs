use std::sync::Arc;

use crate::config::Config;
use crate::observability::Metrics;
use crate::service::TaskService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tasks: Arc<TaskService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, tasks: TaskService, metrics: Arc<Metrics>) -> Self {
        Self {
            config: Arc::new(config),
            tasks: Arc::new(tasks),
            metrics,
        }
    }
}
