//! Demo board used when nothing has been saved yet

use crate::domain::board::{Board, BoardConfig};
use crate::domain::column::ColumnId;
use crate::domain::task::{Priority, Task, TaskId};
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};

struct SampleTask {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    due_in_days: i64,
    assignee: &'static str,
    priority: Priority,
    status: &'static str,
}

const SAMPLE_TASKS: &[SampleTask] = &[
    SampleTask {
        id: "task-1",
        title: "Create project requirements",
        description: "Outline the main features and scope of the project",
        due_in_days: 7,
        assignee: "Sarah Chen",
        priority: Priority::High,
        status: "todo",
    },
    SampleTask {
        id: "task-2",
        title: "Design UI mockups",
        description: "Create visual designs for the main screens",
        due_in_days: 5,
        assignee: "Miguel Alvarez",
        priority: Priority::Medium,
        status: "todo",
    },
    SampleTask {
        id: "task-3",
        title: "Set up project repository",
        description: "Initialize Git repository and configure CI/CD pipeline",
        due_in_days: 2,
        assignee: "Alex Johnson",
        priority: Priority::Low,
        status: "inProgress",
    },
    SampleTask {
        id: "task-4",
        title: "Implement authentication",
        description: "Add user login and registration functionality",
        due_in_days: 10,
        assignee: "Li Wei",
        priority: Priority::High,
        status: "inProgress",
    },
    SampleTask {
        id: "task-5",
        title: "Write documentation",
        description: "Create user and technical documentation",
        due_in_days: -2,
        assignee: "Emma Wilson",
        priority: Priority::Medium,
        status: "done",
    },
];

/// Builds the five-task demo board on the default columns
///
/// Deadlines are relative to `now`; the documentation task is already overdue.
pub fn sample_board(now: DateTime<Utc>) -> Result<Board> {
    let mut board = Board::new(BoardConfig::default())?;

    for sample in SAMPLE_TASKS {
        let status = ColumnId::from(sample.status);
        let mut task = Task::new(TaskId::from(sample.id), sample.title.to_string(), status.clone());
        task.description = sample.description.to_string();
        task.deadline = Some(now + Duration::days(sample.due_in_days));
        task.assignee = sample.assignee.to_string();
        task.priority = sample.priority;
        task.created_at = now;

        if let Some(column) = board.columns.get_mut(&status) {
            column.push(task.id.clone());
        }
        board.tasks.insert(task.id.clone(), task);
    }

    Ok(board)
}
