use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs units of work as independent tasks, at most `max_concurrent` at a time.
/// A failing unit is logged and counted; it never stops the others.
#[derive(Clone)]
pub struct TaskQueue {
    semaphore: Arc<Semaphore>,
}

impl TaskQueue {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub async fn run_batch<I, F, Fut, T>(&self, label: &str, items: Vec<I>, work: F) -> BatchReport
    where
        I: std::fmt::Display + Send + 'static,
        F: Fn(I) -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let mut handles = Vec::with_capacity(items.len());

        for item in items {
            let semaphore = Arc::clone(&self.semaphore);
            let name = item.to_string();
            let unit = work(item);
            handles.push((
                name,
                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| anyhow::anyhow!("task queue closed: {}", e))?;
                    unit.await
                }),
            ));
        }

        let mut report = BatchReport {
            submitted: handles.len(),
            ..Default::default()
        };

        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(_)) => report.succeeded += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    tracing::warn!("{} task for {} failed: {:#}", label, name, e);
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!("{} task for {} panicked: {}", label, name, e);
                }
            }
        }

        tracing::info!(
            "{} batch done: {} submitted, {} ok, {} failed",
            label,
            report.submitted,
            report.succeeded,
            report.failed
        );
        report
    }
}
