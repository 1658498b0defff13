// src/shutdown.rs
// =============================================================================
// Making sure the report gets written no matter how the crawl ends.
//
// Four things can end a crawl:
// - the frontier runs dry (Completed)
// - Ctrl+C (Interrupt)
// - SIGTERM from a supervisor (Terminate)
// - the process simply unwinding past the hook (Exit, fired from Drop)
//
// Whichever comes first flushes the aggregator; the rest are no-ops.
// =============================================================================

use crate::analytics::{Aggregator, FlushOutcome};
use crate::error::Result;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    Completed,
    Interrupt,
    Terminate,
    Exit,
}

impl fmt::Display for ShutdownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShutdownTrigger::Completed => "completed",
            ShutdownTrigger::Interrupt => "interrupt",
            ShutdownTrigger::Terminate => "terminate",
            ShutdownTrigger::Exit => "exit",
        };
        f.write_str(name)
    }
}

pub struct ShutdownHook {
    aggregator: Arc<Aggregator>,
    fired: AtomicBool,
}

impl ShutdownHook {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self {
            aggregator,
            fired: AtomicBool::new(false),
        }
    }

    // Flushes the analytics if no trigger has fired yet
    //
    // Returns `Ok(true)` for the one call that wrote the report.
    pub fn trigger(&self, trigger: ShutdownTrigger) -> Result<bool> {
        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(%trigger, "shutdown already handled");
            return Ok(false);
        }

        info!(%trigger, "shutting down, flushing analytics");
        match self.aggregator.flush()? {
            FlushOutcome::Written(paths) => {
                info!(summary = %paths.summary.display(), "report ready");
                Ok(true)
            }
            FlushOutcome::AlreadyWritten => Ok(false),
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Drop for ShutdownHook {
    fn drop(&mut self) {
        if let Err(e) = self.trigger(ShutdownTrigger::Exit) {
            error!(error = %e, "report flush on exit failed");
        }
    }
}

// Resolves on the first Ctrl+C or SIGTERM
//
// A signal that cannot be registered is logged and never fires, so the
// other one still works.
pub async fn wait_for_signal() -> ShutdownTrigger {
    tokio::select! {
        _ = wait_for_ctrl_c() => ShutdownTrigger::Interrupt,
        _ = wait_for_sigterm() => ShutdownTrigger::Terminate,
    }
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "failed to listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await;
}
