//! Background thread that turns bus notifications into recomputations.

use std::sync::mpsc::{channel, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::StatsService;
use crate::bus::{Event, Subscriber, RECORD_MUTATED};
use crate::record::MutationEvent;
use crate::stats_store::StatsStore;
use crate::store::RecordStore;

/// Counters collected by a [`RecomputeWorker`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerStats {
    /// `record.mutated` events decoded and handled.
    pub handled: usize,
    /// Events of other types, acked without work.
    pub skipped: usize,
    /// Undecodable payloads, nacked.
    pub failed: usize,
    pub polls: usize,
}

/// Polls a subscriber and recomputes the partitions each mutation names.
///
/// Recomputation failures are logged by the service and the event is still
/// acked; a later mutation of the same partition will refresh it.
///
/// ```ignore
/// let queue = InMemoryQueue::new();
/// let worker = RecomputeWorker::spawn(service.clone(), queue.clone(), config.poll_interval());
/// queue.publish(Event::record_mutated("evt-1", &mutation)?)?;
/// let stats = worker.stop();
/// ```
pub struct RecomputeWorker {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<WorkerStats>>,
}

impl RecomputeWorker {
    pub fn spawn<R, S, B>(service: Arc<StatsService<R, S>>, subscriber: B, poll_interval: Duration) -> Self
    where
        R: RecordStore + 'static,
        S: StatsStore + 'static,
        B: Subscriber + 'static,
    {
        let (stop_tx, stop_rx) = channel();

        let handle = thread::spawn(move || {
            let mut stats = WorkerStats::default();
            let timeout_ms = poll_interval.as_millis() as u64;

            loop {
                match stop_rx.try_recv() {
                    Ok(()) | Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                stats.polls += 1;

                match subscriber.poll(timeout_ms) {
                    Ok(Some(event)) => dispatch(&service, &subscriber, &event, &mut stats),
                    Ok(None) => {}
                    Err(e) => log::warn!("subscriber poll failed: {}", e),
                }
            }

            log::debug!("recompute worker stopped: {:?}", stats);
            stats
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the worker to stop and wait for it. Returns its counters.
    pub fn stop(mut self) -> WorkerStats {
        let _ = self.stop_tx.send(());
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => WorkerStats::default(),
        }
    }

    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for RecomputeWorker {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}

fn dispatch<R, S, B>(service: &StatsService<R, S>, subscriber: &B, event: &Event, stats: &mut WorkerStats)
where
    R: RecordStore,
    S: StatsStore,
    B: Subscriber,
{
    if event.event_type != RECORD_MUTATED {
        log::debug!("skipping event {} of type {}", event.id, event.event_type);
        stats.skipped += 1;
        settle(subscriber.ack(&event.id), &event.id);
        return;
    }

    match event.decode::<MutationEvent>() {
        Ok(mutation) => {
            service.handle_mutation(&mutation);
            stats.handled += 1;
            settle(subscriber.ack(&event.id), &event.id);
        }
        Err(e) => {
            log::warn!("undecodable mutation event {}: {}", event.id, e);
            stats.failed += 1;
            settle(subscriber.nack(&event.id, &e.to_string()), &event.id);
        }
    }
}

fn settle(result: Result<(), crate::bus::PublishError>, event_id: &str) {
    if let Err(e) = result {
        log::warn!("could not settle event {}: {}", event_id, e);
    }
}
