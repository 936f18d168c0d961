use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::model::ticket::is_ticket_path;

/// Debounced events waiting for the consumer. Further events are dropped.
pub const EVENT_QUEUE_CAPACITY: usize = 100;

/// Watcher errors waiting for the consumer. Further errors are dropped.
pub const ERROR_QUEUE_CAPACITY: usize = 10;

/// How long the loop sleeps when no timer is pending.
const IDLE_WAIT: Duration = Duration::from_secs(1);

/// What happened to a file, as last reported before its quiet period ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Modify,
    Remove,
    Other,
}

impl ChangeKind {
    /// Map a notify event kind. Pure access events carry no change.
    fn from_event_kind(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(ChangeKind::Create),
            EventKind::Modify(_) => Some(ChangeKind::Modify),
            EventKind::Remove(_) => Some(ChangeKind::Remove),
            EventKind::Access(_) => None,
            EventKind::Any | EventKind::Other => Some(ChangeKind::Other),
        }
    }
}

/// One debounced change to a ticket file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    #[error("could not start file watcher: {0}")]
    Init(#[source] notify::Error),
    #[error("could not start watcher thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("could not watch {path}: {source}")]
    Setup {
        path: PathBuf,
        source: notify::Error,
    },
    #[error("could not stop watching {path}: {source}")]
    Unwatch {
        path: PathBuf,
        source: notify::Error,
    },
    #[error("file watcher error: {0}")]
    Runtime(#[source] notify::Error),
}

/// Messages from the notify callback to the debounce thread.
enum Raw {
    Changes(Vec<(PathBuf, ChangeKind)>),
    Error(notify::Error),
    Shutdown,
}

// ---------------------------------------------------------------------------
// Debouncing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Pending {
    deadline: Instant,
    kind: ChangeKind,
}

/// Per-path quiet-period timers.
///
/// Every change to a path pushes that path's deadline out to `now + interval`
/// and remembers the change kind. A path is released once its deadline passes
/// with no further change. Owned by the watcher thread alone.
#[derive(Debug)]
pub struct Debouncer {
    interval: Duration,
    pending: HashMap<PathBuf, Pending>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Debouncer {
            interval,
            pending: HashMap::new(),
        }
    }

    /// Record a raw change, restarting the path's timer.
    pub fn record(&mut self, path: PathBuf, kind: ChangeKind, now: Instant) {
        self.pending.insert(
            path,
            Pending {
                deadline: now + self.interval,
                kind,
            },
        );
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    /// Remove and return every path whose quiet period has ended, oldest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<FileEvent> {
        let mut due: Vec<(Instant, PathBuf)> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(path, p)| (p.deadline, path.clone()))
            .collect();
        due.sort();

        due.into_iter()
            .filter_map(|(_, path)| {
                self.pending
                    .remove(&path)
                    .map(|p| FileEvent { path, kind: p.kind })
            })
            .collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Ticket-file paths touched by a notify event, with the change kind.
fn ticket_changes(event: Event) -> Vec<(PathBuf, ChangeKind)> {
    let Some(kind) = ChangeKind::from_event_kind(&event.kind) else {
        return Vec::new();
    };
    event
        .paths
        .into_iter()
        .filter(|p| is_ticket_path(p))
        .map(|p| (p, kind))
        .collect()
}

// ---------------------------------------------------------------------------
// Watcher
// ---------------------------------------------------------------------------

/// Receiving side of a `BoardWatcher`: debounced events and runtime errors.
///
/// Both queues are bounded. Once the watcher is closed, blocked receives
/// return `Err` instead of waiting forever.
pub struct WatcherFeed {
    events: Receiver<FileEvent>,
    errors: Receiver<WatcherError>,
}

impl WatcherFeed {
    pub fn events(&self) -> &Receiver<FileEvent> {
        &self.events
    }

    pub fn errors(&self) -> &Receiver<WatcherError> {
        &self.errors
    }

    /// Non-blocking: every event queued so far (may be empty).
    pub fn drain_events(&self) -> Vec<FileEvent> {
        self.events.try_iter().collect()
    }

    /// Non-blocking: every error queued so far (may be empty).
    pub fn drain_errors(&self) -> Vec<WatcherError> {
        self.errors.try_iter().collect()
    }
}

/// Watches column directories for ticket file changes and reports each burst
/// of changes to a file once, after it has been quiet for the debounce
/// interval.
///
/// Runs a background thread from `start` until `close` (or drop). The notify
/// callback only forwards raw changes over an unbounded channel, so the OS
/// event source is never held up by a slow consumer.
pub struct BoardWatcher {
    watcher: RecommendedWatcher,
    raw_tx: Sender<Raw>,
    closed: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl BoardWatcher {
    /// Set up the OS subscription and start the debounce thread.
    pub fn start(debounce: Duration) -> Result<(Self, WatcherFeed), WatcherError> {
        let (raw_tx, raw_rx) = mpsc::channel();
        let (events_tx, events_rx) = mpsc::sync_channel(EVENT_QUEUE_CAPACITY);
        let (errors_tx, errors_rx) = mpsc::sync_channel(ERROR_QUEUE_CAPACITY);

        let callback_tx = raw_tx.clone();
        let watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let msg = match result {
                    Ok(event) => {
                        let changes = ticket_changes(event);
                        if changes.is_empty() {
                            return;
                        }
                        Raw::Changes(changes)
                    }
                    Err(e) => Raw::Error(e),
                };
                let _ = callback_tx.send(msg);
            },
            Config::default(),
        )
        .map_err(WatcherError::Init)?;

        let closed = Arc::new(AtomicBool::new(false));
        let loop_closed = Arc::clone(&closed);
        let thread = std::thread::Builder::new()
            .name("kanban-watcher".to_string())
            .spawn(move || run_loop(raw_rx, events_tx, errors_tx, loop_closed, debounce))
            .map_err(WatcherError::Spawn)?;

        let watcher = BoardWatcher {
            watcher,
            raw_tx,
            closed,
            thread: Some(thread),
        };
        let feed = WatcherFeed {
            events: events_rx,
            errors: errors_rx,
        };
        Ok((watcher, feed))
    }

    /// Start watching a directory (not its subdirectories).
    pub fn watch(&mut self, dir: &Path) -> Result<(), WatcherError> {
        self.watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatcherError::Setup {
                path: dir.to_path_buf(),
                source: e,
            })
    }

    pub fn unwatch(&mut self, dir: &Path) -> Result<(), WatcherError> {
        self.watcher
            .unwatch(dir)
            .map_err(|e| WatcherError::Unwatch {
                path: dir.to_path_buf(),
                source: e,
            })
    }

    /// Stop the thread and release the OS subscription. Pending timers are
    /// discarded; nothing is delivered afterwards.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.closed.store(true, Ordering::SeqCst);
            let _ = self.raw_tx.send(Raw::Shutdown);
            let _ = thread.join();
        }
    }
}

impl Drop for BoardWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Debounce loop: sleeps until the next raw change or the earliest deadline,
/// whichever comes first, then delivers every path that has gone quiet.
fn run_loop(
    raw_rx: Receiver<Raw>,
    events_tx: SyncSender<FileEvent>,
    errors_tx: SyncSender<WatcherError>,
    closed: Arc<AtomicBool>,
    interval: Duration,
) {
    let mut debouncer = Debouncer::new(interval);

    loop {
        let wait = debouncer
            .next_deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_WAIT);

        match raw_rx.recv_timeout(wait) {
            Ok(Raw::Changes(changes)) => {
                let now = Instant::now();
                for (path, kind) in changes {
                    debouncer.record(path, kind, now);
                }
            }
            Ok(Raw::Error(e)) => {
                // Best effort: dropped when the consumer is behind
                let _ = errors_tx.try_send(WatcherError::Runtime(e));
            }
            Ok(Raw::Shutdown) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {}
        }

        for event in debouncer.take_due(Instant::now()) {
            if closed.load(Ordering::SeqCst) {
                return;
            }
            match events_tx.try_send(event) {
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};

    const INTERVAL: Duration = Duration::from_millis(150);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_delivers_once_after_last_event() {
        let mut d = Debouncer::new(INTERVAL);
        let t0 = Instant::now();
        let path = PathBuf::from("/b/todo/a.md");
        for i in 0..5 {
            d.record(path.clone(), ChangeKind::Modify, t0 + ms(i * 20));
        }
        let last = t0 + ms(80);

        assert!(d.take_due(last + ms(149)).is_empty());
        let due = d.take_due(last + INTERVAL);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].path, path);
        assert_eq!(d.pending_len(), 0);
        assert!(d.take_due(last + ms(1000)).is_empty());
    }

    #[test]
    fn second_event_restarts_the_timer() {
        let mut d = Debouncer::new(INTERVAL);
        let t0 = Instant::now();
        let path = PathBuf::from("/b/todo/a.md");
        d.record(path.clone(), ChangeKind::Modify, t0);
        d.record(path.clone(), ChangeKind::Modify, t0 + ms(50));

        // Would have fired here without the second event
        assert!(d.take_due(t0 + ms(150)).is_empty());
        assert_eq!(d.next_deadline(), Some(t0 + ms(200)));
        assert_eq!(d.take_due(t0 + ms(200)).len(), 1);
    }

    #[test]
    fn last_seen_kind_wins() {
        let mut d = Debouncer::new(INTERVAL);
        let t0 = Instant::now();
        let path = PathBuf::from("/b/todo/a.md");
        d.record(path.clone(), ChangeKind::Create, t0);
        d.record(path.clone(), ChangeKind::Modify, t0 + ms(10));
        d.record(path.clone(), ChangeKind::Remove, t0 + ms(20));
        let due = d.take_due(t0 + ms(500));
        assert_eq!(due, vec![FileEvent { path, kind: ChangeKind::Remove }]);
    }

    #[test]
    fn paths_are_independent() {
        let mut d = Debouncer::new(INTERVAL);
        let t0 = Instant::now();
        d.record(PathBuf::from("/b/todo/a.md"), ChangeKind::Modify, t0);
        d.record(PathBuf::from("/b/todo/b.md"), ChangeKind::Modify, t0 + ms(100));

        let first = d.take_due(t0 + ms(160));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].path, PathBuf::from("/b/todo/a.md"));
        let second = d.take_due(t0 + ms(260));
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].path, PathBuf::from("/b/todo/b.md"));
    }

    #[test]
    fn due_events_come_out_oldest_first() {
        let mut d = Debouncer::new(INTERVAL);
        let t0 = Instant::now();
        d.record(PathBuf::from("/z.md"), ChangeKind::Modify, t0);
        d.record(PathBuf::from("/a.md"), ChangeKind::Modify, t0 + ms(5));
        let due = d.take_due(t0 + ms(400));
        let paths: Vec<_> = due.iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("/z.md"), PathBuf::from("/a.md")]);
    }

    #[test]
    fn only_ticket_files_pass_the_filter() {
        let event = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/b/todo/a.md"))
            .add_path(PathBuf::from("/b/todo/.a.md.swp"))
            .add_path(PathBuf::from("/b/todo/.tmpXYZ"));
        let changes = ticket_changes(event);
        assert_eq!(changes, vec![(PathBuf::from("/b/todo/a.md"), ChangeKind::Modify)]);
    }

    #[test]
    fn event_kinds_map() {
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/x.md"));
        assert_eq!(ticket_changes(create)[0].1, ChangeKind::Create);
        let remove = Event::new(EventKind::Remove(RemoveKind::File)).add_path(PathBuf::from("/x.md"));
        assert_eq!(ticket_changes(remove)[0].1, ChangeKind::Remove);
        let access = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/x.md"));
        assert!(ticket_changes(access).is_empty());
    }

    #[test]
    fn loop_delivers_and_stops_on_shutdown() {
        let (raw_tx, raw_rx) = mpsc::channel();
        let (events_tx, events_rx) = mpsc::sync_channel(EVENT_QUEUE_CAPACITY);
        let (errors_tx, _errors_rx) = mpsc::sync_channel(ERROR_QUEUE_CAPACITY);
        let closed = Arc::new(AtomicBool::new(false));
        let loop_closed = Arc::clone(&closed);
        let handle = std::thread::spawn(move || {
            run_loop(raw_rx, events_tx, errors_tx, loop_closed, ms(30))
        });

        let path = PathBuf::from("/b/todo/a.md");
        raw_tx
            .send(Raw::Changes(vec![(path.clone(), ChangeKind::Modify)]))
            .unwrap();
        raw_tx
            .send(Raw::Changes(vec![(path.clone(), ChangeKind::Modify)]))
            .unwrap();

        let event = events_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(event.path, path);
        assert!(events_rx.recv_timeout(ms(150)).is_err());

        raw_tx.send(Raw::Shutdown).unwrap();
        handle.join().unwrap();
        assert!(matches!(
            events_rx.recv(),
            Err(mpsc::RecvError)
        ));
    }

    #[test]
    fn closed_flag_discards_pending_timers() {
        let (raw_tx, raw_rx) = mpsc::channel();
        let (events_tx, events_rx) = mpsc::sync_channel(EVENT_QUEUE_CAPACITY);
        let (errors_tx, _errors_rx) = mpsc::sync_channel(ERROR_QUEUE_CAPACITY);
        let closed = Arc::new(AtomicBool::new(false));
        let loop_closed = Arc::clone(&closed);
        let handle = std::thread::spawn(move || {
            run_loop(raw_rx, events_tx, errors_tx, loop_closed, ms(50))
        });

        raw_tx
            .send(Raw::Changes(vec![(PathBuf::from("/a.md"), ChangeKind::Modify)]))
            .unwrap();
        closed.store(true, Ordering::SeqCst);

        handle.join().unwrap();
        assert!(events_rx.recv().is_err());
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (raw_tx, raw_rx) = mpsc::channel();
        let (events_tx, events_rx) = mpsc::sync_channel(2);
        let (errors_tx, _errors_rx) = mpsc::sync_channel(ERROR_QUEUE_CAPACITY);
        let closed = Arc::new(AtomicBool::new(false));
        let loop_closed = Arc::clone(&closed);
        let handle = std::thread::spawn(move || {
            run_loop(raw_rx, events_tx, errors_tx, loop_closed, ms(10))
        });

        let changes = (0..5)
            .map(|i| (PathBuf::from(format!("/t/{}.md", i)), ChangeKind::Create))
            .collect();
        raw_tx.send(Raw::Changes(changes)).unwrap();
        std::thread::sleep(ms(200));

        // The loop is still responsive after overflowing
        raw_tx.send(Raw::Shutdown).unwrap();
        handle.join().unwrap();
        assert_eq!(events_rx.try_iter().count(), 2);
    }
}
