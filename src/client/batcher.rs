//! Debounced message batching
//!
//! Users often send several short messages in a row. [`MessageBatcher`]
//! holds them until no new message has arrived for a fixed delay, then
//! hands the whole batch over at once so a single reply covers them all.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Delay used by the chat UI
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1500);

enum Command {
    Push(String),
    Flush,
}

/// Handle to a running batcher task
///
/// Dropping the handle flushes whatever is still pending and stops the task.
pub struct MessageBatcher {
    commands: mpsc::UnboundedSender<Command>,
}

impl MessageBatcher {
    /// Spawn the batcher; batches arrive on the returned receiver
    pub fn spawn(delay: Duration) -> (Self, mpsc::UnboundedReceiver<Vec<String>>) {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(delay, command_rx, batch_tx));
        (Self { commands }, batch_rx)
    }

    /// Queue a message and restart the delay
    ///
    /// Returns false once the batch receiver has been dropped.
    pub fn push(&self, message: impl Into<String>) -> bool {
        self.commands.send(Command::Push(message.into())).is_ok()
    }

    /// Emit the pending messages without waiting for the delay
    pub fn flush_now(&self) -> bool {
        self.commands.send(Command::Flush).is_ok()
    }
}

async fn run(
    delay: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
    batches: mpsc::UnboundedSender<Vec<String>>,
) {
    let mut pending: Vec<String> = Vec::new();
    let timer = sleep(delay);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Push(message)) => {
                    pending.push(message);
                    timer.as_mut().reset(Instant::now() + delay);
                }
                Some(Command::Flush) => {
                    if !flush(&mut pending, &batches) {
                        return;
                    }
                }
                None => {
                    flush(&mut pending, &batches);
                    return;
                }
            },
            () = &mut timer, if !pending.is_empty() => {
                if !flush(&mut pending, &batches) {
                    return;
                }
            }
        }
    }
}

/// Send the pending batch; false when nobody is listening any more
fn flush(pending: &mut Vec<String>, batches: &mpsc::UnboundedSender<Vec<String>>) -> bool {
    if pending.is_empty() {
        return true;
    }
    let batch = std::mem::take(pending);
    debug!(size = batch.len(), "Flushing message batch");
    batches.send(batch).is_ok()
}
