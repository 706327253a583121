//! Debouncing of rapidly changing values.
//!
//! A [`Debouncer`] accepts every raw value and publishes a "settled" value
//! only once the input has stayed unchanged for the quiescence window.
//! Every new input restarts the window; intermediate values are never
//! published. Dropping the debouncer cancels any pending emission.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Delay-and-coalesce stage between raw input and its consumers.
///
/// Must be created inside a tokio runtime; the window timer runs on a
/// spawned task.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    settled: watch::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Start a debouncer whose settled value begins as `initial`.
    pub fn new(initial: T, window: Duration) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (settled_tx, settled_rx) = watch::channel(initial);

        let task = tokio::spawn(run_debounce_loop(input_rx, settled_tx, window));

        Self {
            input: input_tx,
            settled: settled_rx,
            task,
        }
    }

    /// Feed a new raw value, restarting the quiescence window.
    pub fn push(&self, value: T) {
        // The loop only exits once this sender is dropped.
        let _ = self.input.send(value);
    }

    /// The most recently settled value.
    pub fn settled(&self) -> T {
        self.settled.borrow().clone()
    }

    /// Receiver that is notified each time a new value settles.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.settled.clone()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Wait for a value, then keep absorbing newer ones until the window
/// elapses with no input, then publish the latest.
async fn run_debounce_loop<T: PartialEq>(
    mut input: mpsc::UnboundedReceiver<T>,
    settled: watch::Sender<T>,
    window: Duration,
) {
    loop {
        let mut latest = match input.recv().await {
            Some(value) => value,
            None => break,
        };

        loop {
            match tokio::time::timeout(window, input.recv()).await {
                Ok(Some(value)) => latest = value,
                // Torn down mid-window: the pending value is discarded.
                Ok(None) => return,
                Err(_) => break,
            }
        }

        settled.send_if_modified(|current| {
            if *current == latest {
                false
            } else {
                *current = latest;
                true
            }
        });
    }
}
