use std::any::Any;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::thread;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::error;
use tracing::trace;

use super::BackgroundFailure;
use super::Event;
use crate::Callback;
use crate::ExecutorKind;

/// Spawns one detached task per background observer call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Executor {
    kind: ExecutorKind,
}

impl Executor {
    pub(crate) fn new(kind: ExecutorKind) -> Self {
        Self { kind }
    }

    /// Fire and forget: nothing waits for `job`.
    pub(crate) fn spawn(
        &self,
        name: String,
        job: BackgroundJob,
    ) {
        if self.kind == ExecutorKind::Auto {
            if let Ok(handle) = Handle::try_current() {
                trace!("spawning {name} on the tokio blocking pool");
                // Dropping the JoinHandle detaches the task
                drop(handle.spawn_blocking(move || job.run()));
                return;
            }
        }

        let reporter = job.reporter.clone();
        let failure = job.failure(String::new());
        let spawned = thread::Builder::new()
            .name(name.clone())
            .spawn(move || job.run());
        if let Err(e) = spawned {
            reporter.report(BackgroundFailure {
                reason: format!("failed to spawn observer thread {name}: {e}"),
                ..failure
            });
        }
    }
}

pub(crate) struct BackgroundJob {
    pub(crate) callback: Callback,
    pub(crate) event: Event,
    pub(crate) reporter: FailureReporter,
}

impl BackgroundJob {
    pub(crate) fn run(self) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.callback.notify(&self.event)));
        let reason = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("observer panicked: {}", panic_message(payload.as_ref())),
        };
        self.reporter.report(self.failure(reason));
    }

    fn failure(
        &self,
        reason: String,
    ) -> BackgroundFailure {
        BackgroundFailure {
            property: self.event.property().to_string(),
            access: self.event.kind(),
            target: self.event.target_id(),
            reason,
        }
    }
}

/// Error reporting channel for background observers.
#[derive(Clone)]
pub(crate) struct FailureReporter {
    sender: broadcast::Sender<BackgroundFailure>,
    log: bool,
}

impl FailureReporter {
    pub(crate) fn new(
        sender: broadcast::Sender<BackgroundFailure>,
        log: bool,
    ) -> Self {
        Self { sender, log }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<BackgroundFailure> {
        self.sender.subscribe()
    }

    pub(crate) fn report(
        &self,
        failure: BackgroundFailure,
    ) {
        if self.log {
            error!(
                "background {} observer of {:?} on {} failed: {}",
                failure.access, failure.property, failure.target, failure.reason
            );
        }
        // Err only means there is no subscriber right now
        let _ = self.sender.send(failure);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
