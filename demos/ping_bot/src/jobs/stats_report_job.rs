use std::sync::atomic::{AtomicU64, Ordering};

use talon::prelude::*;
use tracing::info;

/// Logs a heartbeat with the number of runs so far.
#[export]
pub struct StatsReportJob {
    runs: AtomicU64,
}

#[async_trait]
impl Job for StatsReportJob {
    fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
        Ok(Self {
            runs: AtomicU64::new(0),
        })
    }

    fn schedule(&self) -> Option<&str> {
        Some("0 * * * *")
    }

    async fn run(&self) -> anyhow::Result<()> {
        let runs = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
        info!(runs, "Stats report");
        Ok(())
    }
}
