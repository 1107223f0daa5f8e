use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::messenger::{ChatId, Messenger};
use crate::pipeline::QuotePipeline;
use crate::translate::Language;

/// Wrapper around tokio-cron-scheduler for background delivery.
pub struct Scheduler {
    inner: JobScheduler,
}

impl Scheduler {
    pub async fn new() -> Result<Self> {
        let inner = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;
        Ok(Self { inner })
    }

    /// Add a recurring cron job.
    pub async fn add_cron_job<F>(&self, cron_expr: &str, name: &str, task: F) -> Result<()>
    where
        F: Fn() -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
            + Send
            + Sync
            + 'static,
    {
        let job_name = name.to_string();
        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let name = job_name.clone();
            let fut = task();
            Box::pin(async move {
                info!("Running scheduled task: {}", name);
                fut.await;
            })
        })
        .with_context(|| format!("Failed to create cron job: {}", name))?;

        self.inner
            .add(job)
            .await
            .with_context(|| format!("Failed to add job: {}", name))?;

        info!("Scheduled task '{}' with cron: {}", name, cron_expr);
        Ok(())
    }

    pub async fn start(&self) -> Result<()> {
        self.inner
            .start()
            .await
            .context("Failed to start scheduler")?;
        info!("Scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner
            .shutdown()
            .await
            .context("Failed to shutdown scheduler")?;
        info!("Scheduler stopped");
        Ok(())
    }
}

/// Register the periodic quote delivery to the default chat.
pub async fn register_quote_delivery(
    scheduler: &Scheduler,
    cron_expr: &str,
    pipeline: QuotePipeline,
    messenger: Arc<dyn Messenger>,
    chat: ChatId,
    lang: Language,
) -> Result<()> {
    scheduler
        .add_cron_job(cron_expr, "quote-delivery", move || {
            let pipeline = pipeline.clone();
            let messenger = messenger.clone();
            Box::pin(async move {
                deliver_scheduled_quote(&pipeline, messenger.as_ref(), chat, lang).await;
            })
        })
        .await
}

/// One scheduled firing: produce a quote and plain-send it (no keyboard).
/// Any failure is logged and the tick is skipped; the recipient chat gets
/// nothing until the next successful tick.
async fn deliver_scheduled_quote(
    pipeline: &QuotePipeline,
    messenger: &dyn Messenger,
    chat: ChatId,
    lang: Language,
) {
    let text = match pipeline.formatted_quote(lang).await {
        Ok(text) => text,
        Err(e) => {
            error!(chat = %chat, "Scheduled quote failed: {e}");
            return;
        }
    };

    match messenger.send_message(chat, &text).await {
        Ok(()) => info!(chat = %chat, "Scheduled quote delivered"),
        Err(e) => error!(chat = %chat, "Scheduled delivery failed: {e}"),
    }
}
