//! Work handed to the evaluator from other threads.
//!
//! Producers hold an [`EventSender`] and post closures; the thread that
//! owns the [`TreeEvaluator`] drains the [`EventQueue`] when it is safe to
//! touch interpreter state. Tasks must be `Send`, so they can only
//! capture owned data: values and trees never cross the boundary, only
//! what is needed to build them on the consumer side.

use crossbeam::channel::{self, Receiver, Sender};

use crate::TreeEvaluator;

/// Type-erased unit of interpreter work.
pub type Task = Box<dyn FnOnce(&mut TreeEvaluator) + Send + 'static>;

/// The consumer went away; the task was not queued.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("interpreter task queue is closed")]
pub struct QueueClosed;

/// Producer handle. Cheap to clone; one per posting thread.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<Task>,
}

impl EventSender {
    /// Queue `task` to run on the evaluator's thread.
    pub fn post<F>(&self, task: F) -> Result<(), QueueClosed>
    where
        F: FnOnce(&mut TreeEvaluator) + Send + 'static,
    {
        self.tx.send(Box::new(task)).map_err(|_| QueueClosed)
    }
}

/// Single-consumer end of the queue.
pub struct EventQueue {
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        EventQueue { tx, rx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Run every queued task, in posting order, against `evaluator`.
    /// Tasks posted while draining run in the same call. Returns how many
    /// ran.
    pub fn drain(&self, evaluator: &mut TreeEvaluator) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(evaluator);
            ran += 1;
        }
        if ran > 0 {
            tracing::debug!(tasks = ran, "drained interpreter task queue");
        }
        ran
    }
}
