pub mod assistant;
pub mod config;
pub mod error;
pub mod note;
pub mod pomodoro;
pub mod state;
pub mod task;
pub mod theme;

// Re-export main types for convenience
pub use assistant::{AssistantClient, AssistantStore, ChatMessage, ChatRole, Conversation};
pub use config::Config;
pub use error::{CoreError, Result};
pub use note::{NewNote, Note, NoteStore};
pub use pomodoro::{PomodoroEngine, PomodoroSettings, TickOutcome, TimerStatus};
pub use state::AppState;
pub use task::{NewTask, Task, TaskStatus, TaskStore, TaskType};
pub use theme::{Palette, ThemeStore};
