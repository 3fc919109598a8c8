//! UI-agnostic application state
//!
//! Every store lives in one owned structure. Front ends hold it by value and
//! mutate it only through the stores' own methods.

use crate::assistant::AssistantStore;
use crate::config::Config;
use crate::note::NoteStore;
use crate::pomodoro::{FocusTips, PomodoroEngine};
use crate::task::TaskStore;
use crate::theme::ThemeStore;

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub theme: ThemeStore,
    pub tasks: TaskStore,
    pub notes: NoteStore,
    pub pomodoro: PomodoroEngine,
    pub tips: FocusTips,
    pub assistant: AssistantStore,
}

impl AppState {
    /// Fresh state seeded with the sample records, using saved preferences
    pub fn from_config(config: &Config) -> Self {
        Self {
            theme: ThemeStore::new(config.is_dark()),
            tasks: TaskStore::with_sample_data(),
            notes: NoteStore::with_sample_data(),
            pomodoro: PomodoroEngine::new(config.pomodoro_settings()),
            tips: FocusTips::default(),
            assistant: AssistantStore::with_sample_data(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pomodoro::{PomodoroSettings, TimerStatus};

    #[test]
    fn test_from_config_applies_preferences() {
        let config = Config {
            dark_mode: Some(false),
            pomodoro: Some(PomodoroSettings {
                work_duration: 45,
                ..PomodoroSettings::default()
            }),
            ..Config::new()
        };
        let state = AppState::from_config(&config);
        assert!(!state.theme.is_dark());
        assert_eq!(state.pomodoro.status(), TimerStatus::Idle);
        assert_eq!(state.pomodoro.time_remaining(), 45 * 60);
        assert_eq!(state.tasks.len(), 2);
        assert_eq!(state.notes.len(), 2);
        assert_eq!(state.assistant.conversations().len(), 1);
    }
}
