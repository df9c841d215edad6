/// Loop thread: runs `step` at the phase's interval on its own thread.
///
/// The `Session` is owned by exactly one side at a time: the `Driver`
/// while stopped, the loop thread while running. `start` moves it in,
/// `stop` raises the flag, joins, and takes it back. Both are idempotent.
///
/// The stop flag is read only between ticks, so a stop never lands
/// mid-tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::config::Difficulty;
use crate::domain::entity::Intent;
use super::session::{Session, Snapshot};
use super::step;

/// What the UI thread can ask of a running loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    Intent(Intent),
    Difficulty(Difficulty),
    NewGame,
    Quit,
}

pub struct Driver {
    session: Option<Session>,
    handle: Option<JoinHandle<Session>>,
    stop: Arc<AtomicBool>,
    requests: Option<Sender<Request>>,
    snapshot_tx: Sender<Snapshot>,
    snapshot_rx: Receiver<Snapshot>,
}

impl Driver {
    pub fn new(session: Session) -> Self {
        let (snapshot_tx, snapshot_rx) = mpsc::channel();
        Driver {
            session: Some(session),
            handle: None,
            stop: Arc::new(AtomicBool::new(false)),
            requests: None,
            snapshot_tx,
            snapshot_rx,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    #[cfg(test)]
    /// The session, while the loop is stopped.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }
        let Some(session) = self.session.take() else { return };

        self.stop.store(false, Ordering::Release);
        let (tx, rx) = mpsc::channel();
        self.requests = Some(tx);

        let stop = Arc::clone(&self.stop);
        let snapshots = self.snapshot_tx.clone();
        self.handle = Some(thread::spawn(move || run_loop(session, &stop, &rx, &snapshots)));
        log::debug!("loop thread started");
    }

    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else { return };
        self.stop.store(true, Ordering::Release);
        self.requests = None;
        match handle.join() {
            Ok(session) => self.session = Some(session),
            Err(_) => log::error!("loop thread panicked; session lost"),
        }
        log::debug!("loop thread stopped");
    }

    /// Forward a request to the loop, or apply it now if stopped.
    pub fn send(&mut self, request: Request) {
        if let Some(tx) = &self.requests {
            if tx.send(request).is_ok() {
                return;
            }
        }
        if let Some(session) = self.session.as_mut() {
            apply(session, request);
        }
    }

    /// Every snapshot published since the last call, oldest first.
    pub fn drain_snapshots(&self) -> Vec<Snapshot> {
        self.snapshot_rx.try_iter().collect()
    }

    #[cfg(test)]
    pub fn snapshots(&self) -> &Receiver<Snapshot> {
        &self.snapshot_rx
    }

    /// Snapshot of the held session (stopped only).
    pub fn peek(&self) -> Option<Snapshot> {
        self.session.as_ref().map(|s| s.snapshot(Vec::new()))
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn apply(session: &mut Session, request: Request) {
    match request {
        Request::Intent(intent) => session.queue_intent(intent),
        Request::Difficulty(d) => session.set_difficulty(d),
        Request::NewGame => session.new_game(),
        Request::Quit => session.quit(),
    }
}

fn run_loop(
    mut session: Session,
    stop: &AtomicBool,
    requests: &Receiver<Request>,
    snapshots: &Sender<Snapshot>,
) -> Session {
    let mut deadline = Instant::now();
    while !stop.load(Ordering::Acquire) {
        for request in requests.try_iter() {
            apply(&mut session, request);
        }

        let events = step::step(&mut session);
        if snapshots.send(session.snapshot(events)).is_err() {
            break;
        }

        deadline += step::interval(&session);
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        } else {
            deadline = now;
        }
    }
    session
}
