//! Debounced query scheduling
//!
//! [`Debouncer`] is the cooperative core: the caller feeds it input changes and
//! polls it with the current instant, the same way an event loop checks
//! `last_input_time.elapsed()` each frame. [`QueryScheduler`] drives a
//! debouncer from a background timer thread for callers without a loop of
//! their own.
//!
//! Every schedule call hands out a new [`Ticket`] and invalidates the previous
//! one. Polling takes the pending entry out before it is run, so a cancel that
//! arrives after an execution started has nothing left to cancel.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Quiet period before a search is committed
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Identifies one scheduled execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug)]
struct Pending {
    ticket: Ticket,
    text: String,
    due: Instant,
}

/// A committed input, ready to be searched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired {
    pub ticket: Ticket,
    pub text: String,
}

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    next_ticket: u64,
    pending: Option<Pending>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_ticket: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending execution with `text`, due `delay` after `now`
    pub fn schedule(&mut self, text: impl Into<String>, now: Instant) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        if let Some(old) = self.pending.replace(Pending {
            ticket,
            text: text.into(),
            due: now + self.delay,
        }) {
            log::trace!("Debounce superseded {:?}", old.ticket);
        }
        ticket
    }

    /// Drop whatever is pending. Returns false if nothing was.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Drop the pending execution only if it is still `ticket`
    pub fn cancel_ticket(&mut self, ticket: Ticket) -> bool {
        if self.pending.as_ref().is_some_and(|p| p.ticket == ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending execution becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Take the pending execution if its quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<Fired> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            self.pending.take().map(|p| Fired {
                ticket: p.ticket,
                text: p.text,
            })
        } else {
            None
        }
    }
}

enum Command {
    Input(String),
    Cancel,
}

/// Debouncer running on its own timer thread.
///
/// Searches run one at a time on that thread, so no two executions overlap.
/// Dropping the scheduler abandons any pending input and joins the thread.
pub struct QueryScheduler {
    tx: Option<Sender<Command>>,
    handle: Option<JoinHandle<()>>,
}

impl QueryScheduler {
    pub fn spawn<F>(delay: Duration, run: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || timer_loop(Debouncer::new(delay), rx, run));
        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// Report a raw input change
    pub fn input(&self, text: impl Into<String>) {
        self.send(Command::Input(text.into()));
    }

    /// Cancel the pending search, if it has not started yet
    pub fn cancel(&self) {
        self.send(Command::Cancel);
    }

    fn send(&self, command: Command) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(command);
        }
    }
}

impl Drop for QueryScheduler {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn timer_loop<F: FnMut(String)>(mut debouncer: Debouncer, rx: Receiver<Command>, mut run: F) {
    loop {
        let command = match debouncer.deadline() {
            Some(due) => match rx.recv_timeout(due.saturating_duration_since(Instant::now())) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            },
        };

        match command {
            Some(Command::Input(text)) => {
                debouncer.schedule(text, Instant::now());
            }
            Some(Command::Cancel) => {
                debouncer.cancel();
            }
            None => {}
        }

        if let Some(fired) = debouncer.poll(Instant::now()) {
            log::debug!("Running debounced query {:?}", fired.text);
            run(fired.text);
        }
    }
}
