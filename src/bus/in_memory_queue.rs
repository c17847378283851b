//! In-memory queue for tests and single-process deployments.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};

use super::{Event, PublishError, Publisher, Subscriber};

/// Thread-safe event log implementing both `Publisher` and `Subscriber`.
///
/// Clones share the log and the read position. `new_subscriber()` shares the
/// log with a fresh position. A nacked event is redelivered before anything
/// further down the log.
///
/// ```
/// use solve_stats::bus::{Event, InMemoryQueue, Publisher, Subscriber};
///
/// let queue = InMemoryQueue::new();
/// queue.publish(Event::new("evt-1", "record.mutated", vec![])).unwrap();
///
/// let event = queue.poll(100).unwrap().unwrap();
/// assert_eq!(event.id, "evt-1");
/// queue.ack(&event.id).unwrap();
/// assert_eq!(queue.acknowledged(), vec!["evt-1".to_string()]);
/// ```
#[derive(Clone)]
pub struct InMemoryQueue {
    log: Arc<RwLock<Vec<Event>>>,
    cursor: Arc<Mutex<Cursor>>,
}

#[derive(Default)]
struct Cursor {
    position: usize,
    redeliver: VecDeque<Event>,
    acked: Vec<String>,
    nacked: Vec<String>,
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self {
            log: Arc::new(RwLock::new(Vec::new())),
            cursor: Arc::new(Mutex::new(Cursor::default())),
        }
    }

    /// Independent consumer of the same log, starting from the beginning.
    pub fn new_subscriber(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            cursor: Arc::new(Mutex::new(Cursor::default())),
        }
    }

    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events not yet handed out, queued redeliveries included.
    pub fn pending(&self) -> usize {
        let consumed = self.cursor().map(|c| c.position).unwrap_or(0);
        self.len().saturating_sub(consumed)
            + self.cursor().map(|c| c.redeliver.len()).unwrap_or(0)
    }

    pub fn acknowledged(&self) -> Vec<String> {
        self.cursor().map(|c| c.acked.clone()).unwrap_or_default()
    }

    pub fn rejected(&self) -> Vec<String> {
        self.cursor().map(|c| c.nacked.clone()).unwrap_or_default()
    }

    fn cursor(&self) -> Result<MutexGuard<'_, Cursor>, PublishError> {
        self.cursor
            .lock()
            .map_err(|_| PublishError::ConnectionFailed("queue cursor lock poisoned".into()))
    }

    fn next(&self) -> Result<Option<Event>, PublishError> {
        let mut cursor = self.cursor()?;
        if let Some(event) = cursor.redeliver.pop_front() {
            return Ok(Some(event));
        }

        let log = self
            .log
            .read()
            .map_err(|_| PublishError::ConnectionFailed("queue log lock poisoned".into()))?;
        if cursor.position < log.len() {
            let event = log[cursor.position].clone();
            cursor.position += 1;
            return Ok(Some(event));
        }
        Ok(None)
    }
}

impl Publisher for InMemoryQueue {
    fn publish(&self, event: Event) -> Result<(), PublishError> {
        self.publish_batch(vec![event])
    }

    fn publish_batch(&self, events: Vec<Event>) -> Result<(), PublishError> {
        self.log
            .write()
            .map_err(|_| PublishError::ConnectionFailed("queue log lock poisoned".into()))?
            .extend(events);
        Ok(())
    }
}

impl Subscriber for InMemoryQueue {
    fn poll(&self, timeout_ms: u64) -> Result<Option<Event>, PublishError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            if let Some(event) = self.next()? {
                return Ok(Some(event));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn ack(&self, event_id: &str) -> Result<(), PublishError> {
        self.cursor()?.acked.push(event_id.to_string());
        Ok(())
    }

    /// Redelivers the event once. A second nack of the same id drops it.
    fn nack(&self, event_id: &str, reason: &str) -> Result<(), PublishError> {
        let mut cursor = self.cursor()?;
        let already_rejected = cursor.nacked.iter().any(|id| id == event_id);
        cursor.nacked.push(event_id.to_string());
        if already_rejected {
            log::warn!("dropping event {} after repeated rejection: {}", event_id, reason);
            return Ok(());
        }

        let log = self
            .log
            .read()
            .map_err(|_| PublishError::ConnectionFailed("queue log lock poisoned".into()))?;
        if let Some(event) = log[..cursor.position].iter().rev().find(|e| e.id == event_id) {
            cursor.redeliver.push_back(event.clone());
        }
        Ok(())
    }
}
