//! Pomodoro phase state machine.
//!
//! The engine owns no timer. Whoever drives it calls [`PomodoroEngine::tick`]
//! once per second while [`PomodoroEngine::is_running`] is true.

use serde::{Deserialize, Serialize};

/// User-tunable durations, all in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSettings {
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    pub sessions_before_long_break: u32,
    /// Pause inserted between phases; 0 disables it
    pub waiting_time: u32,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            sessions_before_long_break: 4,
            waiting_time: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerStatus {
    Idle,
    Work,
    ShortBreak,
    LongBreak,
    Paused,
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    Short,
    Long,
}

impl BreakKind {
    fn status(self) -> TimerStatus {
        match self {
            BreakKind::Short => TimerStatus::ShortBreak,
            BreakKind::Long => TimerStatus::LongBreak,
        }
    }
}

/// What the `Waiting` phase hands over to once it runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingPhase {
    /// A work session finished; this break is due next
    Break(BreakKind),
    /// This break finished; work resumes with the session counter adjusted for it
    WorkAfter(BreakKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not in a counting phase; nothing changed
    Inactive,
    Counting,
    Completed { from: TimerStatus, to: TimerStatus },
}

#[derive(Debug, Clone)]
pub struct PomodoroEngine {
    settings: PomodoroSettings,
    status: TimerStatus,
    current_session: u32,
    time_remaining: u32,
    pending_phase: Option<PendingPhase>,
}

impl Default for PomodoroEngine {
    fn default() -> Self {
        Self::new(PomodoroSettings::default())
    }
}

impl PomodoroEngine {
    pub fn new(settings: PomodoroSettings) -> Self {
        Self {
            settings,
            status: TimerStatus::Idle,
            current_session: 1,
            time_remaining: minutes(settings.work_duration),
            pending_phase: None,
        }
    }

    pub fn settings(&self) -> &PomodoroSettings {
        &self.settings
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn current_session(&self) -> u32 {
        self.current_session
    }

    /// Seconds left in the current phase
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn pending_phase(&self) -> Option<PendingPhase> {
        self.pending_phase
    }

    /// True in every phase the one-second tick counts down
    pub fn is_running(&self) -> bool {
        matches!(
            self.status,
            TimerStatus::Work | TimerStatus::ShortBreak | TimerStatus::LongBreak | TimerStatus::Waiting
        )
    }

    /// Begin a full work period from idle or paused, whatever phase was paused
    pub fn start(&mut self) {
        if matches!(self.status, TimerStatus::Idle | TimerStatus::Paused) {
            self.enter(TimerStatus::Work, minutes(self.settings.work_duration));
        }
    }

    pub fn pause(&mut self) {
        if matches!(
            self.status,
            TimerStatus::Work | TimerStatus::ShortBreak | TimerStatus::LongBreak
        ) {
            self.status = TimerStatus::Paused;
            tracing::debug!(remaining = self.time_remaining, "pomodoro paused");
        }
    }

    pub fn reset(&mut self) {
        self.status = TimerStatus::Idle;
        self.current_session = 1;
        self.time_remaining = minutes(self.settings.work_duration);
        self.pending_phase = None;
        tracing::debug!("pomodoro reset");
    }

    /// Jump straight to the next phase, never inserting a waiting interval
    pub fn skip_to_next(&mut self) {
        match self.status {
            TimerStatus::Work => {
                let kind = self.next_break_kind();
                self.enter_break(kind);
            }
            TimerStatus::ShortBreak => self.proceed_to_work(BreakKind::Short),
            TimerStatus::LongBreak => self.proceed_to_work(BreakKind::Long),
            _ => {}
        }
    }

    /// Replace the settings. Only an idle timer picks up the new work length
    /// immediately; a running countdown keeps its current value.
    pub fn update_settings(&mut self, settings: PomodoroSettings) {
        self.settings = settings;
        if self.status == TimerStatus::Idle {
            self.time_remaining = minutes(settings.work_duration);
        }
        tracing::info!(?settings, "pomodoro settings updated");
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Inactive;
        }

        if self.time_remaining <= 1 {
            self.time_remaining = 0;
            let from = self.status;
            self.complete();
            return TickOutcome::Completed {
                from,
                to: self.status,
            };
        }

        self.time_remaining -= 1;
        TickOutcome::Counting
    }

    fn complete(&mut self) {
        let waiting = minutes(self.settings.waiting_time);
        match self.status {
            TimerStatus::Work => {
                let kind = self.next_break_kind();
                if waiting > 0 {
                    self.pending_phase = Some(PendingPhase::Break(kind));
                    self.enter(TimerStatus::Waiting, waiting);
                } else {
                    self.enter_break(kind);
                }
            }
            TimerStatus::ShortBreak | TimerStatus::LongBreak => {
                let kind = if self.status == TimerStatus::LongBreak {
                    BreakKind::Long
                } else {
                    BreakKind::Short
                };
                if waiting > 0 {
                    self.pending_phase = Some(PendingPhase::WorkAfter(kind));
                    self.enter(TimerStatus::Waiting, waiting);
                } else {
                    self.proceed_to_work(kind);
                }
            }
            TimerStatus::Waiting => match self.pending_phase.take() {
                Some(PendingPhase::Break(kind)) => self.enter_break(kind),
                Some(PendingPhase::WorkAfter(kind)) => self.proceed_to_work(kind),
                None => self.enter(TimerStatus::Work, minutes(self.settings.work_duration)),
            },
            TimerStatus::Idle | TimerStatus::Paused => {}
        }
    }

    /// Long break when the session that just ended is a multiple of the cycle length
    fn next_break_kind(&self) -> BreakKind {
        let cycle = self.settings.sessions_before_long_break.max(1);
        if self.current_session % cycle == 0 {
            BreakKind::Long
        } else {
            BreakKind::Short
        }
    }

    fn enter_break(&mut self, kind: BreakKind) {
        let duration = match kind {
            BreakKind::Short => self.settings.short_break_duration,
            BreakKind::Long => self.settings.long_break_duration,
        };
        self.enter(kind.status(), minutes(duration));
    }

    fn proceed_to_work(&mut self, after: BreakKind) {
        match after {
            BreakKind::Long => self.current_session = 1,
            BreakKind::Short => self.current_session += 1,
        }
        self.enter(TimerStatus::Work, minutes(self.settings.work_duration));
    }

    fn enter(&mut self, status: TimerStatus, seconds: u32) {
        tracing::debug!(
            from = ?self.status,
            to = ?status,
            session = self.current_session,
            seconds,
            "pomodoro phase change"
        );
        self.status = status;
        self.time_remaining = seconds;
    }

    /// Full length in seconds of the phase currently shown
    pub fn phase_duration(&self) -> u32 {
        match self.status {
            TimerStatus::ShortBreak => minutes(self.settings.short_break_duration),
            TimerStatus::LongBreak => minutes(self.settings.long_break_duration),
            TimerStatus::Waiting => minutes(self.settings.waiting_time),
            _ => minutes(self.settings.work_duration),
        }
    }

    /// Fraction of the phase still remaining, 1.0 at the start
    pub fn progress(&self) -> f64 {
        let total = self.phase_duration();
        if total == 0 {
            return 0.0;
        }
        (self.time_remaining as f64 / total as f64).clamp(0.0, 1.0)
    }

    pub fn label(&self) -> &'static str {
        match self.status {
            TimerStatus::Work => "Focus Time",
            TimerStatus::ShortBreak => "Short Break",
            TimerStatus::LongBreak => "Long Break",
            TimerStatus::Paused => "Paused",
            TimerStatus::Waiting => "Waiting",
            TimerStatus::Idle => "Ready",
        }
    }
}

fn minutes(value: u32) -> u32 {
    value.saturating_mul(60)
}

/// "MM:SS"
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Deletable list of advice shown next to the timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTips {
    tips: Vec<String>,
}

impl Default for FocusTips {
    fn default() -> Self {
        Self {
            tips: vec![
                "Clear your workspace of distractions".to_string(),
                "Set clear goals for each focus session".to_string(),
                "Hydrate during breaks".to_string(),
                "Stand up and stretch during short breaks".to_string(),
            ],
        }
    }
}

impl FocusTips {
    pub fn all(&self) -> &[String] {
        &self.tips
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.tips.len()).then(|| self.tips.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(waiting_time: u32) -> PomodoroSettings {
        PomodoroSettings {
            waiting_time,
            ..PomodoroSettings::default()
        }
    }

    fn run_out(engine: &mut PomodoroEngine) -> TickOutcome {
        let mut outcome = TickOutcome::Inactive;
        for _ in 0..engine.time_remaining().max(1) {
            outcome = engine.tick();
        }
        outcome
    }

    #[test]
    fn test_initial_state() {
        let engine = PomodoroEngine::default();
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.current_session(), 1);
        assert_eq!(engine.time_remaining(), 1500);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_start_from_idle_enters_work() {
        let mut engine = PomodoroEngine::default();
        engine.start();
        assert_eq!(engine.status(), TimerStatus::Work);
        assert_eq!(engine.time_remaining(), 1500);
        engine.start();
        assert_eq!(engine.status(), TimerStatus::Work);
    }

    #[test]
    fn test_reset_always_returns_to_idle() {
        let mut engine = PomodoroEngine::default();
        engine.start();
        for _ in 0..1600 {
            engine.tick();
        }
        engine.pause();
        engine.reset();
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.current_session(), 1);
        assert_eq!(engine.time_remaining(), 1500);
        assert_eq!(engine.tick(), TickOutcome::Inactive);

        engine.start();
        engine.reset();
        engine.reset();
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.time_remaining(), 1500);
    }

    #[test]
    fn test_full_work_session_lands_on_short_break() {
        let mut engine = PomodoroEngine::new(settings(0));
        engine.start();
        let mut completions = 0;
        for _ in 0..1500 {
            if let TickOutcome::Completed { from, to } = engine.tick() {
                assert_eq!(from, TimerStatus::Work);
                assert_eq!(to, TimerStatus::ShortBreak);
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(engine.status(), TimerStatus::ShortBreak);
        assert_eq!(engine.time_remaining(), 300);
        assert_eq!(engine.current_session(), 1);
    }

    #[test]
    fn test_fourth_session_earns_long_break() {
        let mut engine = PomodoroEngine::new(settings(0));
        engine.start();
        for session in 1..=3 {
            run_out(&mut engine);
            assert_eq!(engine.status(), TimerStatus::ShortBreak, "after session {session}");
            run_out(&mut engine);
            assert_eq!(engine.status(), TimerStatus::Work);
            assert_eq!(engine.current_session(), session + 1);
        }
        run_out(&mut engine);
        assert_eq!(engine.status(), TimerStatus::LongBreak);
        assert_eq!(engine.time_remaining(), 900);

        run_out(&mut engine);
        assert_eq!(engine.status(), TimerStatus::Work);
        assert_eq!(engine.current_session(), 1);
    }

    #[test]
    fn test_waiting_interval_precedes_break() {
        let mut engine = PomodoroEngine::new(settings(2));
        engine.start();
        run_out(&mut engine);
        assert_eq!(engine.status(), TimerStatus::Waiting);
        assert_eq!(engine.time_remaining(), 120);
        assert_eq!(
            engine.pending_phase(),
            Some(PendingPhase::Break(BreakKind::Short))
        );

        let outcome = run_out(&mut engine);
        assert_eq!(
            outcome,
            TickOutcome::Completed {
                from: TimerStatus::Waiting,
                to: TimerStatus::ShortBreak
            }
        );
        assert_eq!(engine.time_remaining(), 300);
        assert_eq!(engine.current_session(), 1);
        assert_eq!(engine.pending_phase(), None);
    }

    #[test]
    fn test_waiting_interval_after_break_then_work() {
        let mut engine = PomodoroEngine::new(settings(2));
        engine.start();
        run_out(&mut engine); // work -> waiting
        run_out(&mut engine); // waiting -> short break
        run_out(&mut engine); // short break -> waiting
        assert_eq!(engine.status(), TimerStatus::Waiting);
        assert_eq!(engine.time_remaining(), 120);
        assert_eq!(engine.current_session(), 1);

        run_out(&mut engine);
        assert_eq!(engine.status(), TimerStatus::Work);
        assert_eq!(engine.current_session(), 2);
        assert_eq!(engine.time_remaining(), 1500);
    }

    #[test]
    fn test_waiting_remembers_long_break() {
        let mut engine = PomodoroEngine::new(PomodoroSettings {
            sessions_before_long_break: 1,
            waiting_time: 1,
            ..PomodoroSettings::default()
        });
        engine.start();
        run_out(&mut engine);
        assert_eq!(
            engine.pending_phase(),
            Some(PendingPhase::Break(BreakKind::Long))
        );
        run_out(&mut engine);
        assert_eq!(engine.status(), TimerStatus::LongBreak);

        run_out(&mut engine);
        assert_eq!(
            engine.pending_phase(),
            Some(PendingPhase::WorkAfter(BreakKind::Long))
        );
        run_out(&mut engine);
        assert_eq!(engine.status(), TimerStatus::Work);
        assert_eq!(engine.current_session(), 1);
    }

    #[test]
    fn test_skip_from_work_ignores_waiting_time() {
        let mut engine = PomodoroEngine::new(settings(5));
        engine.start();
        engine.skip_to_next();
        assert_eq!(engine.status(), TimerStatus::ShortBreak);
        assert_eq!(engine.time_remaining(), 300);
    }

    #[test]
    fn test_skip_from_breaks_adjusts_session() {
        let mut engine = PomodoroEngine::new(settings(0));
        engine.start();
        engine.skip_to_next();
        assert_eq!(engine.status(), TimerStatus::ShortBreak);
        engine.skip_to_next();
        assert_eq!(engine.status(), TimerStatus::Work);
        assert_eq!(engine.current_session(), 2);

        // sessions 2 and 3 take short breaks, session 4 a long one
        for _ in 0..2 {
            engine.skip_to_next();
            engine.skip_to_next();
        }
        assert_eq!(engine.current_session(), 4);
        engine.skip_to_next();
        assert_eq!(engine.status(), TimerStatus::LongBreak);
        engine.skip_to_next();
        assert_eq!(engine.status(), TimerStatus::Work);
        assert_eq!(engine.current_session(), 1);
    }

    #[test]
    fn test_skip_is_noop_when_idle_or_paused() {
        let mut engine = PomodoroEngine::default();
        engine.skip_to_next();
        assert_eq!(engine.status(), TimerStatus::Idle);
        engine.start();
        engine.pause();
        engine.skip_to_next();
        assert_eq!(engine.status(), TimerStatus::Paused);
    }

    #[test]
    fn test_start_from_paused_break_begins_work() {
        let mut engine = PomodoroEngine::default();
        engine.start();
        engine.skip_to_next();
        for _ in 0..10 {
            engine.tick();
        }
        engine.pause();
        assert_eq!(engine.status(), TimerStatus::Paused);
        assert_eq!(engine.tick(), TickOutcome::Inactive);
        assert_eq!(engine.time_remaining(), 290);

        engine.start();
        assert_eq!(engine.status(), TimerStatus::Work);
        assert_eq!(engine.time_remaining(), 1500);
        assert_eq!(engine.current_session(), 1);
    }

    #[test]
    fn test_start_from_paused_work_restarts_period() {
        let mut engine = PomodoroEngine::default();
        engine.start();
        for _ in 0..100 {
            engine.tick();
        }
        engine.pause();
        assert_eq!(engine.phase_duration(), 1500);

        engine.start();
        assert_eq!(engine.status(), TimerStatus::Work);
        assert_eq!(engine.time_remaining(), 1500);
    }

    #[test]
    fn test_pause_ignored_while_waiting() {
        let mut engine = PomodoroEngine::new(settings(1));
        engine.start();
        run_out(&mut engine);
        engine.pause();
        assert_eq!(engine.status(), TimerStatus::Waiting);
    }

    #[test]
    fn test_settings_update_while_idle_and_running() {
        let mut engine = PomodoroEngine::default();
        engine.update_settings(PomodoroSettings {
            work_duration: 50,
            ..PomodoroSettings::default()
        });
        assert_eq!(engine.time_remaining(), 3000);

        engine.start();
        engine.tick();
        engine.update_settings(PomodoroSettings::default());
        assert_eq!(engine.time_remaining(), 2999);
        assert_eq!(engine.settings().work_duration, 25);
    }

    #[test]
    fn test_zero_cycle_length_does_not_panic() {
        let mut engine = PomodoroEngine::new(PomodoroSettings {
            sessions_before_long_break: 0,
            ..PomodoroSettings::default()
        });
        engine.start();
        engine.skip_to_next();
        assert_eq!(engine.status(), TimerStatus::LongBreak);
    }

    #[test]
    fn test_progress_and_labels() {
        let mut engine = PomodoroEngine::default();
        assert_eq!(engine.label(), "Ready");
        assert_eq!(engine.progress(), 1.0);
        engine.start();
        for _ in 0..750 {
            engine.tick();
        }
        assert_eq!(engine.label(), "Focus Time");
        assert!((engine.progress() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(0), "00:00");
    }

    #[test]
    fn test_focus_tips_remove() {
        let mut tips = FocusTips::default();
        assert_eq!(tips.all().len(), 4);
        assert_eq!(tips.remove(2).as_deref(), Some("Hydrate during breaks"));
        assert_eq!(tips.all().len(), 3);
        assert_eq!(tips.remove(10), None);
    }
}
