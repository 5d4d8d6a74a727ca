use crate::errors::AppError;
use crate::models::AppData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, warn};

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                set_aside(path).await;
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data)?;
    let staging = sibling(path, ".tmp");
    fs::write(&staging, payload).await?;
    fs::rename(&staging, path).await?;
    Ok(())
}

// Keeps an unreadable data file out of the way of the next save.
async fn set_aside(path: &Path) {
    let target = sibling(path, ".corrupt");
    match fs::rename(path, &target).await {
        Ok(()) => warn!("moved unreadable data file to {}", target.display()),
        Err(err) => error!("failed to move unreadable data file aside: {err}"),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
