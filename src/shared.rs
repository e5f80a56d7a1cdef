//! Board manager shared between concurrent callers
//!
//! Request handlers hold a cloned [`SharedBoard`]; each operation runs under
//! one lock, so callers are serialized and never observe a half-applied move.
//! When a storage backend is attached, every successful mutation hands its
//! snapshot to a background saver task and returns without waiting on I/O.
//! A failed save is logged and the in-memory board kept.

use crate::domain::{Board, ColumnId, NewTask, Task, TaskId, TaskPatch};
use crate::error::Result;
use crate::intent::{DropTarget, MoveIntent};
use crate::manager::{BoardManager, MoveOutcome};
use crate::storage::Storage;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};

enum SaveRequest {
    Snapshot(Board),
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct SharedBoard {
    manager: Arc<Mutex<BoardManager>>,
    saver: Option<mpsc::UnboundedSender<SaveRequest>>,
}

impl SharedBoard {
    /// Shares a manager without persistence
    pub fn new(manager: BoardManager) -> Self {
        Self {
            manager: Arc::new(Mutex::new(manager)),
            saver: None,
        }
    }

    /// Shares a manager and saves to `storage` after each mutation
    ///
    /// Spawns the saver task, so this must be called inside a tokio runtime.
    pub fn with_storage(manager: BoardManager, storage: Arc<dyn Storage>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_saver(storage, rx));

        Self {
            manager: Arc::new(Mutex::new(manager)),
            saver: Some(tx),
        }
    }

    /// Loads the saved board, or starts from `initial` and saves it
    pub async fn open(storage: Arc<dyn Storage>, initial: Board) -> Result<Self> {
        storage.initialize().await?;

        let manager = if storage.is_initialized().await {
            let board = storage.load_board().await?;
            tracing::info!(tasks = board.tasks.len(), "Loaded board snapshot");
            BoardManager::from_board(board)?
        } else {
            let manager = BoardManager::from_board(initial)?;
            storage.save_board(manager.board()).await?;
            tracing::info!("Initialized new board");
            manager
        };

        Ok(Self::with_storage(manager, storage))
    }

    /// Current board snapshot
    pub async fn snapshot(&self) -> Board {
        self.manager.lock().await.snapshot()
    }

    pub async fn task(&self, id: &TaskId) -> Result<Task> {
        self.manager.lock().await.task(id).cloned()
    }

    pub async fn create_task(&self, draft: NewTask) -> Result<Task> {
        self.mutate(|m| m.create_task(draft)).await
    }

    pub async fn update_task(&self, id: &TaskId, patch: TaskPatch) -> Result<Task> {
        self.mutate(|m| m.update_task(id, patch)).await
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<()> {
        self.mutate(|m| m.delete_task(id)).await
    }

    pub async fn reorder_columns(&self, order: Vec<ColumnId>) -> Result<Vec<ColumnId>> {
        self.mutate(|m| m.reorder_columns(order)).await
    }

    pub async fn move_task(&self, intent: &MoveIntent) -> Result<MoveOutcome> {
        self.mutate(|m| m.move_task(intent)).await
    }

    pub async fn dispatch_drop(
        &self,
        active: &TaskId,
        over: &DropTarget,
    ) -> Result<Option<MoveOutcome>> {
        self.mutate(|m| m.dispatch_drop(active, over)).await
    }

    /// Waits until every snapshot queued so far has been handed to storage
    pub async fn flush(&self) {
        let Some(saver) = &self.saver else { return };

        let (done_tx, done_rx) = oneshot::channel();
        if saver.send(SaveRequest::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    async fn mutate<T>(&self, op: impl FnOnce(&mut BoardManager) -> Result<T>) -> Result<T> {
        let mut manager = self.manager.lock().await;
        let value = op(&mut *manager)?;

        // Queued under the lock so snapshots reach storage in mutation order.
        if let Some(saver) = &self.saver {
            if saver.send(SaveRequest::Snapshot(manager.snapshot())).is_err() {
                tracing::warn!("Board saver has stopped; snapshot not saved");
            }
        }

        Ok(value)
    }
}

/// Saves queued snapshots one at a time until every sender is dropped
async fn run_saver(storage: Arc<dyn Storage>, mut rx: mpsc::UnboundedReceiver<SaveRequest>) {
    while let Some(request) = rx.recv().await {
        match request {
            SaveRequest::Snapshot(board) => {
                if let Err(e) = storage.save_board(&board).await {
                    tracing::warn!(error = %e, "Failed to save board snapshot");
                }
            }
            SaveRequest::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("Board saver stopped");
}
