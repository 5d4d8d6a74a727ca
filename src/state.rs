use crate::config::Config;
use crate::models::AppData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub window_days: u32,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(config: &Config, data: AppData) -> Self {
        Self {
            data_path: config.data_path.clone(),
            window_days: config.window_days,
            data: Arc::new(Mutex::new(data)),
        }
    }
}
