//! Wake-triggered mode routines: cold start, alarm check, button interaction.
//!
//! Each routine is bounded by the user or by the network and ends by handing
//! a [`SleepPlan`] back to the caller; there is no state between cycles other
//! than [`PersistentState`].

use core::time::Duration;

use jiff::tz::TimeZone;
use log::{info, warn};

use crate::{
    clock::{ClockError, LocalTime, read_local},
    io::{Board, InputLine, OutputLine, TextDisplay},
    persist::{AlarmSetting, PersistentState},
    render::{TimeView, alarm_line},
    schedule::{AlarmScheduler, SLEEP_CEILING},
    sleep::SleepPlan,
    sync::{SyncTransport, TimeSynchronizer},
    wake::{Mode, WakeCause, classify},
};

const MINUTES_PER_DAY: i32 = 24 * 60;
const MIN_GUARD: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ControllerConfig {
    pub indicator_flash: Duration,
    pub motor_pulse: Duration,
    pub buzzer_delay: Duration,
    pub chirp_pause: Duration,
    pub chirp_length: Duration,
    pub retrigger_guard: Duration,
    pub display_refresh: Duration,
    pub alarm_redraw: Duration,
    pub release_poll: Duration,
    pub off_poll: Duration,
    /// Minutes before or after the alarm minute a timer wake still fires.
    /// 0 = exact.
    pub trigger_tolerance_minutes: u8,
    pub sleep_ceiling: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            indicator_flash: Duration::from_millis(500),
            motor_pulse: Duration::from_millis(500),
            buzzer_delay: Duration::from_secs(120),
            chirp_pause: Duration::from_secs(3),
            chirp_length: Duration::from_millis(500),
            retrigger_guard: Duration::from_secs(60),
            display_refresh: Duration::from_secs(1),
            alarm_redraw: Duration::from_millis(100),
            release_poll: Duration::from_millis(10),
            off_poll: Duration::from_millis(100),
            trigger_tolerance_minutes: 0,
            sleep_ceiling: SLEEP_CEILING,
        }
    }
}

impl ControllerConfig {
    pub const fn with_trigger_tolerance_minutes(mut self, minutes: u8) -> Self {
        self.trigger_tolerance_minutes = minutes;
        self
    }

    /// Whether `now` falls on the alarm minute, or within the tolerance on
    /// either side of it.
    pub fn alarm_due(&self, alarm: AlarmSetting, now: &LocalTime) -> bool {
        let Some(hour) = alarm.hour() else {
            return false;
        };
        let alarm_minutes = hour as i32 * 60 + alarm.minute() as i32;
        let now_minutes = now.hour() as i32 * 60 + now.minute() as i32;
        let mut offset = (now_minutes - alarm_minutes).rem_euclid(MINUTES_PER_DAY);
        if offset > MINUTES_PER_DAY / 2 {
            offset -= MINUTES_PER_DAY;
        }
        offset.abs() <= self.trigger_tolerance_minutes as i32
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlarmOutcome {
    Fired,
    Resynced,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ButtonOutcome {
    ShowedTime,
    EditedAlarm,
    NoLineHeld,
}

pub struct ModeController<B, D, T> {
    board: B,
    display: D,
    sync: TimeSynchronizer<T>,
    scheduler: AlarmScheduler,
    config: ControllerConfig,
    tz: TimeZone,
    display_fault_logged: bool,
}

impl<B, D, T> ModeController<B, D, T>
where
    B: Board,
    D: TextDisplay,
    T: SyncTransport,
{
    pub fn new(
        board: B,
        display: D,
        sync: TimeSynchronizer<T>,
        tz: TimeZone,
        config: ControllerConfig,
    ) -> Self {
        Self {
            board,
            display,
            sync,
            scheduler: AlarmScheduler::new(config.sleep_ceiling),
            config,
            tz,
            display_fault_logged: false,
        }
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn synchronizer(&self) -> &TimeSynchronizer<T> {
        &self.sync
    }

    pub fn into_parts(self) -> (B, D, TimeSynchronizer<T>) {
        (self.board, self.display, self.sync)
    }

    /// Classifies `cause`, runs the matching mode, and plans the next sleep.
    pub async fn run_cycle(&mut self, cause: WakeCause, state: &mut PersistentState) -> SleepPlan {
        let trigger = classify(cause);
        let mode = Mode::for_trigger(trigger);
        info!("cycle: cause={:?} trigger={:?} mode={}", cause, trigger, mode.as_str());
        self.run(mode, state).await
    }

    pub async fn run(&mut self, mode: Mode, state: &mut PersistentState) -> SleepPlan {
        self.display_fault_logged = false;
        match mode {
            Mode::ColdStart => self.cold_start(state).await,
            Mode::AlarmCheck => {
                let outcome = self.alarm_check(state).await;
                info!("alarm: {:?}", outcome);
            }
            Mode::ButtonInteraction => {
                let outcome = self.button_interaction(state).await;
                info!("buttons: {:?}", outcome);
            }
        }
        state.mode = mode;
        self.plan_sleep(state)
    }

    /// Resets retained state, blinks the indicator, and syncs time.
    pub async fn cold_start(&mut self, state: &mut PersistentState) {
        *state = PersistentState::cold_start();

        self.board.set_output(OutputLine::StatusLed, true);
        self.board.pause(self.config.indicator_flash).await;
        self.board.set_output(OutputLine::StatusLed, false);

        self.sync.sync(&mut self.board).await;
    }

    /// Fires the alarm if the clock is on the alarm minute, otherwise treats
    /// the wake as a drift-correction opportunity and only re-syncs.
    pub async fn alarm_check(&mut self, state: &mut PersistentState) -> AlarmOutcome {
        let due = match self.read_local() {
            Ok(now) => self.config.alarm_due(state.alarm, &now),
            Err(_) => false,
        };

        if !due {
            info!(
                "alarm: clock not on alarm {}:{:02}; re-syncing",
                state.alarm.raw_hour(),
                state.alarm.minute()
            );
            self.sync.sync(&mut self.board).await;
            return AlarmOutcome::Resynced;
        }

        self.pulse(OutputLine::MotorClockwise).await;
        self.pulse(OutputLine::MotorCounterClockwise).await;

        self.board.pause(self.config.buzzer_delay).await;
        self.board.set_output(OutputLine::Buzzer, true);

        let begun = self.display.begin();
        self.note_display(begun);
        let mut since_render = self.config.display_refresh;
        while !self.board.is_asserted(InputLine::AlarmOff) {
            if since_render >= self.config.display_refresh {
                self.render_time();
                since_render = Duration::ZERO;
            }
            self.board.pause(self.config.off_poll).await;
            since_render += self.config.off_poll;
        }

        // Acknowledge with a chirp.
        self.board.set_output(OutputLine::Buzzer, false);
        self.board.pause(self.config.chirp_pause).await;
        self.board.set_output(OutputLine::Buzzer, true);
        self.board.pause(self.config.chirp_length).await;
        self.board.set_output(OutputLine::Buzzer, false);

        let cleared = self.display.clear();
        self.note_display(cleared);

        self.sync.sync(&mut self.board).await;

        // Keep the next wake out of the window that just fired.
        let guard = self.config.retrigger_guard.max(MIN_GUARD);
        loop {
            self.board.pause(guard).await;
            match self.read_local() {
                Ok(now) if self.config.alarm_due(state.alarm, &now) => {}
                _ => break,
            }
        }
        AlarmOutcome::Fired
    }

    /// Time display while the display line is held, alarm editing while the
    /// alarm line is held. The display line wins if both are held.
    pub async fn button_interaction(&mut self, state: &mut PersistentState) -> ButtonOutcome {
        let outcome = if self.board.is_asserted(InputLine::DisplayTime) {
            let begun = self.display.begin();
            self.note_display(begun);
            while self.board.is_asserted(InputLine::DisplayTime) {
                self.render_time();
                self.board.pause(self.config.display_refresh).await;
            }
            ButtonOutcome::ShowedTime
        } else if self.board.is_asserted(InputLine::DisplayAlarm) {
            let begun = self.display.begin();
            self.note_display(begun);
            while self.board.is_asserted(InputLine::DisplayAlarm) {
                self.edit_alarm(&mut state.alarm).await;
                let shown = self.display.show("", alarm_line(state.alarm).as_str());
                self.note_display(shown);
                self.board.pause(self.config.alarm_redraw).await;
            }
            ButtonOutcome::EditedAlarm
        } else {
            ButtonOutcome::NoLineHeld
        };

        let cleared = self.display.clear();
        self.note_display(cleared);
        outcome
    }

    /// Suspend interval for the current alarm setting.
    pub fn plan_sleep(&mut self, state: &PersistentState) -> SleepPlan {
        let now = if state.alarm.is_enabled() {
            self.read_local().ok()
        } else {
            None
        };
        SleepPlan::after(self.scheduler.time_until_alarm(state.alarm, now.as_ref()))
    }

    async fn edit_alarm(&mut self, alarm: &mut AlarmSetting) {
        let line = if self.board.is_asserted(InputLine::SetAlarmHour) {
            alarm.increment_hour();
            InputLine::SetAlarmHour
        } else if self.board.is_asserted(InputLine::SetAlarmMinuteTens) {
            alarm.increment_minute_tens();
            InputLine::SetAlarmMinuteTens
        } else if self.board.is_asserted(InputLine::SetAlarmMinuteOnes) {
            alarm.increment_minute_ones();
            InputLine::SetAlarmMinuteOnes
        } else {
            return;
        };

        // One edit per press.
        while self.board.is_asserted(line) {
            self.board.pause(self.config.release_poll).await;
        }
    }

    async fn pulse(&mut self, line: OutputLine) {
        self.board.set_output(line, true);
        self.board.pause(self.config.motor_pulse).await;
        self.board.set_output(line, false);
    }

    fn read_local(&self) -> Result<LocalTime, ClockError> {
        let result = read_local(&self.board, &self.tz);
        if result.is_err() {
            warn!("clock: no time available (yet)");
        }
        result
    }

    /// Skipped, not stale-rendered, when the clock cannot be read.
    fn render_time(&mut self) {
        let Ok(now) = self.read_local() else {
            return;
        };
        let view = TimeView::new(&now);
        let shown = self.display.show(view.date.as_str(), view.time.as_str());
        self.note_display(shown);
    }

    fn note_display(&mut self, result: Result<(), D::Error>) {
        if let Err(err) = result
            && !self.display_fault_logged
        {
            warn!("display: write failed: {:?}", err);
            self.display_fault_logged = true;
        }
    }
}
