//! Background solve worker.
//!
//! One worker thread solves submitted table snapshots in arrival order. Each
//! submission gets a generation number per [`TableKey`]; submitting the same
//! key again supersedes every earlier ticket for it. A superseded job is
//! skipped if it has not started yet, and its result is discarded if it has.
//!
//! Catalog, milestone and preference state are shared with the caller and
//! only read-locked while a job runs.

use crate::catalog::Catalog;
use crate::id::TableKey;
use crate::milestones::Milestones;
use crate::model::{ModelError, ProductionTable};
use crate::ordering::OrderingContext;
use crate::preferences::Preferences;
use crate::solve::{SolveReport, solve_table};
use crate::solver::{LinearSolver, SolverSettings};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Shared read-mostly state every solve consults.
#[derive(Debug, Clone)]
pub struct SolveEnvironment {
    pub catalog: Arc<Catalog>,
    pub milestones: Arc<RwLock<Milestones>>,
    pub preferences: Arc<RwLock<Preferences>>,
    pub settings: SolverSettings,
}

/// A solved snapshot handed back to the submitter.
#[derive(Debug)]
pub struct SolveOutput {
    pub key: TableKey,
    pub table: ProductionTable,
    pub report: Result<SolveReport, ModelError>,
}

#[derive(Debug)]
pub enum TicketStatus {
    Pending,
    Ready(SolveOutput),
    /// A newer submission for the same table replaced this one, or the
    /// worker shut down before answering.
    Superseded,
}

type Generations = Arc<Mutex<HashMap<TableKey, u64>>>;

struct Job {
    key: TableKey,
    generation: u64,
    table: ProductionTable,
    reply: Sender<SolveOutput>,
}

/// Handle to one pending solve.
#[derive(Debug)]
pub struct SolveTicket {
    key: TableKey,
    generation: u64,
    generations: Generations,
    receiver: Receiver<SolveOutput>,
}

impl SolveTicket {
    pub fn key(&self) -> TableKey {
        self.key
    }

    /// Whether no newer submission for this table exists.
    pub fn is_current(&self) -> bool {
        is_current(&self.generations, self.key, self.generation)
    }

    /// Non-blocking check.
    pub fn poll(&self) -> TicketStatus {
        match self.receiver.try_recv() {
            Ok(output) if self.is_current() => TicketStatus::Ready(output),
            Ok(_) => TicketStatus::Superseded,
            Err(TryRecvError::Empty) if self.is_current() => TicketStatus::Pending,
            Err(_) => TicketStatus::Superseded,
        }
    }

    /// Block until the result arrives. `None` when superseded.
    pub fn wait(self) -> Option<SolveOutput> {
        let output = self.receiver.recv().ok()?;
        self.is_current().then_some(output)
    }
}

fn is_current(generations: &Generations, key: TableKey, generation: u64) -> bool {
    generations.lock().get(&key).copied() == Some(generation)
}

pub struct SolveWorker {
    sender: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
    generations: Generations,
}

impl SolveWorker {
    pub fn spawn(env: SolveEnvironment, solver: Box<dyn LinearSolver>) -> std::io::Result<Self> {
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let generations: Generations = Arc::default();
        let thread_generations = Arc::clone(&generations);

        let handle = std::thread::Builder::new()
            .name("flowplan-solve".to_string())
            .spawn(move || run(env, solver.as_ref(), receiver, thread_generations))?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
            generations,
        })
    }

    /// Queue a snapshot of `table` for solving, superseding earlier tickets
    /// for `key`.
    pub fn submit(&self, key: TableKey, table: ProductionTable) -> SolveTicket {
        let generation = {
            let mut generations = self.generations.lock();
            let next = generations.get(&key).map_or(0, |g| g + 1);
            generations.insert(key, next);
            next
        };
        let (reply, receiver) = crossbeam_channel::bounded(1);
        if let Some(sender) = &self.sender
            && sender
                .send(Job {
                    key,
                    generation,
                    table,
                    reply,
                })
                .is_err()
        {
            tracing::warn!(key = key.0, "solve worker is gone");
        }
        SolveTicket {
            key,
            generation,
            generations: Arc::clone(&self.generations),
            receiver,
        }
    }
}

impl Drop for SolveWorker {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("solve worker panicked");
        }
    }
}

fn run(env: SolveEnvironment, solver: &dyn LinearSolver, jobs: Receiver<Job>, generations: Generations) {
    for mut job in jobs {
        if !is_current(&generations, job.key, job.generation) {
            tracing::debug!(key = job.key.0, generation = job.generation, "skipping superseded solve");
            continue;
        }

        let report = {
            let milestones = env.milestones.read();
            let preferences = env.preferences.read();
            let ctx = OrderingContext::new(&env.catalog, &milestones, &preferences);
            solve_table(&mut job.table, &ctx, &env.settings, solver)
        };

        if !is_current(&generations, job.key, job.generation) {
            tracing::debug!(key = job.key.0, generation = job.generation, "discarding superseded result");
            continue;
        }
        // The submitter may have dropped its ticket.
        let _ = job.reply.send(SolveOutput {
            key: job.key,
            table: job.table,
            report,
        });
    }
}
