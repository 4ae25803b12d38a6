//! Price monitor command.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::prices::{
    CheckOutcome, HttpPageFetcher, LogNotifier, Notifier, PriceMonitor, WebhookNotifier,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// Run the monitor command.
pub async fn run_monitor(once: bool, settings: Settings) -> Result<()> {
    let fetcher = Arc::new(HttpPageFetcher::new(&settings.prices.url)?);

    let notifier: Arc<dyn Notifier> = match &settings.prices.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url)?),
        None => {
            Output::info("No webhook configured; changes will only be logged.");
            Arc::new(LogNotifier)
        }
    };

    let monitor = PriceMonitor::new(
        fetcher,
        notifier,
        settings.price_state_path(),
        settings.price_lock_path(),
        Duration::from_secs(settings.prices.interval_hours * 3600),
    );

    if once {
        let outcome = monitor.check_once().await?;
        match outcome {
            CheckOutcome::Initialized => Output::success("Baseline recorded."),
            CheckOutcome::Unchanged => Output::success("No changes detected."),
            CheckOutcome::Changed => Output::warning("Price page structure changed; alert sent."),
            CheckOutcome::NoContent => Output::warning("No price tables found on the page."),
        }
        return Ok(());
    }

    Output::info(&format!(
        "Monitoring {} every {} hours. Press Ctrl+C to stop.",
        settings.prices.url, settings.prices.interval_hours
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received");
            let _ = shutdown_tx.send(true);
        }
    });

    monitor.run(shutdown_rx).await
}
