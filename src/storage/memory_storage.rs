use crate::{
    domain::Board,
    error::{BoardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Keeps the last saved snapshot in memory
#[derive(Default)]
pub struct MemoryStorage {
    board: Mutex<Option<Board>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts out holding `board`, as if it had been saved earlier
    pub fn with_board(board: Board) -> Self {
        Self {
            board: Mutex::new(Some(board)),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        *self.board.lock().await = Some(board.clone());
        Ok(())
    }

    async fn load_board(&self) -> Result<Board> {
        self.board
            .lock()
            .await
            .clone()
            .ok_or_else(|| BoardError::StorageError("No board snapshot saved".to_string()))
    }

    async fn is_initialized(&self) -> bool {
        self.board.lock().await.is_some()
    }
}
