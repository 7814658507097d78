//! Best-effort display brightness.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::app::{Result, TilawaError};

const BACKLIGHT_ROOT: &str = "/sys/class/backlight";

/// Platform brightness hooks. `level` is in `[0.0, 1.0]`.
#[async_trait]
pub trait BrightnessControl: Send + Sync {
    /// Device-wide brightness; usually needs elevated permission.
    async fn set_system_brightness(&self, level: f32) -> Result<()>;

    /// Brightness scoped to the app's own window.
    async fn set_window_brightness(&self, level: f32) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessOutcome {
    System,
    Window,
    Unavailable,
}

/// Try system brightness, fall back to window brightness, and give up
/// quietly if both fail.
pub async fn apply_brightness<B>(control: &B, level: f32) -> BrightnessOutcome
where
    B: BrightnessControl + ?Sized,
{
    match control.set_system_brightness(level).await {
        Ok(()) => return BrightnessOutcome::System,
        Err(e) => tracing::debug!("System brightness unavailable: {}", e),
    }

    match control.set_window_brightness(level).await {
        Ok(()) => BrightnessOutcome::Window,
        Err(e) => {
            tracing::debug!("Window brightness unavailable: {}", e);
            BrightnessOutcome::Unavailable
        }
    }
}

/// Linux backlight via sysfs. A terminal has no window of its own, so the
/// window-level fallback is always unsupported.
pub struct SysfsBrightness {
    root: PathBuf,
    device: Option<String>,
}

impl SysfsBrightness {
    pub fn new(device: Option<String>) -> Self {
        Self::with_root(BACKLIGHT_ROOT, device)
    }

    pub fn with_root(root: impl Into<PathBuf>, device: Option<String>) -> Self {
        Self {
            root: root.into(),
            device,
        }
    }

    async fn device_dir(&self) -> Result<PathBuf> {
        if let Some(device) = &self.device {
            return Ok(self.root.join(device));
        }

        let mut entries = tokio::fs::read_dir(&self.root).await?;
        match entries.next_entry().await? {
            Some(entry) => Ok(entry.path()),
            None => Err(TilawaError::Unsupported("no backlight device".into())),
        }
    }
}

async fn read_u32(path: &Path) -> Result<u32> {
    let raw = tokio::fs::read_to_string(path).await?;
    raw.trim()
        .parse()
        .map_err(|_| TilawaError::Other(format!("unreadable value in {}", path.display())))
}

#[async_trait]
impl BrightnessControl for SysfsBrightness {
    async fn set_system_brightness(&self, level: f32) -> Result<()> {
        let dir = self.device_dir().await?;
        let max = read_u32(&dir.join("max_brightness")).await?;
        let value = (level.clamp(0.0, 1.0) * max as f32).round() as u32;

        tokio::fs::write(dir.join("brightness"), value.to_string()).await?;
        tracing::debug!("Backlight {} set to {}/{}", dir.display(), value, max);
        Ok(())
    }

    async fn set_window_brightness(&self, _level: f32) -> Result<()> {
        Err(TilawaError::Unsupported(
            "window brightness on a terminal".into(),
        ))
    }
}
