use super::settings::AppConfig;
use anyhow::Result;

impl AppConfig {
    /// Validate configuration values are sane.
    pub(crate) fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.port > 0, "Port must be > 0");
        anyhow::ensure!(
            !self.mount_table.is_empty() || !self.volumes.is_empty(),
            "Either MOUNT_TABLE or VOLUMES must be set"
        );
        if let Some(pattern) = &self.preferred_volume {
            if let Err(e) = regex::Regex::new(pattern) {
                anyhow::bail!("PREFERRED_VOLUME is not a valid regex: {e}");
            }
        }
        Ok(())
    }
}
