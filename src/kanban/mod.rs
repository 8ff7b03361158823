//! Kanban board state.
//!
//! The board holds one ordered column per task status. Moves reorder the
//! in-memory columns only; writing a status change back to a data source
//! is the caller's job.

use crate::models::{Task, TaskStatus};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors raised by board operations. The board is unchanged when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("no card at index {index} in column '{status}' ({len} cards)")]
    SourceOutOfRange {
        status: TaskStatus,
        index: usize,
        len: usize,
    },

    #[error("cannot insert at index {index} in column '{status}' ({len} cards)")]
    DestinationOutOfRange {
        status: TaskStatus,
        index: usize,
        len: usize,
    },

    #[error("task not found on board: {0}")]
    TaskNotFound(String),
}

/// A card position: column and index inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub status: TaskStatus,
    pub index: usize,
}

impl Slot {
    pub fn new(status: TaskStatus, index: usize) -> Self {
        Self { status, index }
    }
}

/// Outcome of a successful move.
#[derive(Debug, Clone, PartialEq)]
pub struct MovedCard {
    pub task_id: String,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl MovedCard {
    /// Whether the move changed the task's status (not just its position).
    pub fn status_changed(&self) -> bool {
        self.from != self.to
    }
}

/// Four status columns of tasks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KanbanBoard {
    columns: [Vec<Task>; 4],
}

impl KanbanBoard {
    /// Build a board from a task list, keeping list order within each column.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut board = Self::default();
        for task in tasks {
            board.columns[task.status.index()].push(task);
        }
        board
    }

    /// Cards in one column, top to bottom.
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        &self.columns[status.index()]
    }

    /// Columns in board order.
    pub fn columns(&self) -> impl Iterator<Item = (TaskStatus, &[Task])> {
        TaskStatus::ALL
            .iter()
            .map(move |status| (*status, self.column(*status)))
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find a card by task id.
    pub fn locate(&self, task_id: &str) -> Option<Slot> {
        self.columns().find_map(|(status, cards)| {
            cards
                .iter()
                .position(|t| t.id == task_id)
                .map(|index| Slot::new(status, index))
        })
    }

    /// Move the card at `from` to `to`.
    ///
    /// When the columns differ, the card's status is overwritten with the
    /// destination column's status.
    pub fn move_card(&mut self, from: Slot, to: Slot) -> Result<MovedCard, BoardError> {
        let source_len = self.column(from.status).len();
        if from.index >= source_len {
            return Err(BoardError::SourceOutOfRange {
                status: from.status,
                index: from.index,
                len: source_len,
            });
        }

        // Length after removal when moving within the same column.
        let dest_len = if from.status == to.status {
            source_len - 1
        } else {
            self.column(to.status).len()
        };
        if to.index > dest_len {
            return Err(BoardError::DestinationOutOfRange {
                status: to.status,
                index: to.index,
                len: dest_len,
            });
        }

        let mut card = self.columns[from.status.index()].remove(from.index);
        card.status = to.status;
        let task_id = card.id.clone();
        self.columns[to.status.index()].insert(to.index, card);

        debug!(
            "Moved task {} from {}[{}] to {}[{}]",
            task_id,
            from.status.key(),
            from.index,
            to.status.key(),
            to.index
        );

        Ok(MovedCard {
            task_id,
            from: from.status,
            to: to.status,
        })
    }

    /// Flip a task between completed and todo, as the list-view checkbox does.
    ///
    /// The card goes to the bottom of its new column.
    pub fn toggle_completed(&mut self, task_id: &str) -> Result<MovedCard, BoardError> {
        let slot = self
            .locate(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;

        let target = if slot.status.is_completed() {
            TaskStatus::Todo
        } else {
            TaskStatus::Completed
        };
        let index = self.column(target).len();

        self.move_card(slot, Slot::new(target, index))
    }
}
