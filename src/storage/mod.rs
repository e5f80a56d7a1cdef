use crate::{domain::Board, error::Result};
use async_trait::async_trait;

pub mod file_storage;
pub mod memory_storage;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Storage trait for persisting board snapshots
///
/// Saves are observed after a mutation has completed; a failing save never
/// rolls the in-memory board back.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Saves the board snapshot
    async fn save_board(&self, board: &Board) -> Result<()>;

    /// Loads the last saved board snapshot
    async fn load_board(&self) -> Result<Board>;

    /// Checks whether a snapshot has been saved
    async fn is_initialized(&self) -> bool;
}
