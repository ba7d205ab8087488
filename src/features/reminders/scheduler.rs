//! # Reminder Scheduler
//!
//! Background tick loop that fires a notification a fixed lead time before
//! each weekly event.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Closed-window matching, fired-state guard, cross-midnight occurrences,
//!   settings pre-check and route context enrichment
//! - 1.0.0: Exact "HH:MM" equality check once per minute

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use super::catalog::{notifications_enabled_value, EventCatalog, SettingsStore, NOTIFICATION_ENABLED_KEY};
use super::{RecurringEvent, ReminderFiredState};
use crate::core::{Clock, ScheduleError, SystemClock};
use crate::features::location::LocationResolver;
use crate::features::navigation::{estimate_route, CampusMap};
use crate::features::notifications::{NotificationIntent, NotificationSink};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_LEAD_MINUTES: i64 = 10;

const REMINDER_TITLE: &str = "课程提醒 ⏰";

pub struct ReminderScheduler {
    catalog: Arc<dyn EventCatalog>,
    sink: Arc<dyn NotificationSink>,
    settings: Option<Arc<dyn SettingsStore>>,
    clock: Arc<dyn Clock>,
    fired: ReminderFiredState,
    tick_interval: Duration,
    lead_minutes: i64,
    route_context: Option<(Arc<LocationResolver>, Arc<CampusMap>)>,
}

impl ReminderScheduler {
    pub fn new(catalog: Arc<dyn EventCatalog>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            catalog,
            sink,
            settings: None,
            clock: Arc::new(SystemClock),
            fired: ReminderFiredState::new(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            lead_minutes: DEFAULT_LEAD_MINUTES,
            route_context: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Consult the `notification_enabled` setting before each dispatch
    pub fn with_settings(mut self, settings: Arc<dyn SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Tick interval doubles as the match window width
    pub fn with_timing(mut self, tick_interval: Duration, lead_minutes: i64) -> Self {
        self.tick_interval = tick_interval.max(Duration::from_millis(1));
        self.lead_minutes = lead_minutes;
        self
    }

    /// Append distance and walking time to reminders whose location is on the campus map
    pub fn with_route_context(mut self, resolver: Arc<LocationResolver>, map: Arc<CampusMap>) -> Self {
        self.route_context = Some((resolver, map));
        self
    }

    pub fn fired_state(&self) -> &ReminderFiredState {
        &self.fired
    }

    /// Spawn the tick loop on the runtime.
    pub fn start(self) -> ReminderHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            self.run(shutdown_rx).await;
        });
        ReminderHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    /// Tick until shutdown is signalled. A tick in progress always completes.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.tick_interval);
        // A late tick must not be followed by a burst of catch-up ticks
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Reminder scheduler started (interval: {:?}, lead: {} min)",
            self.tick_interval, self.lead_minutes
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.changed() => break,
            }
            if *shutdown.borrow() {
                break;
            }
            self.tick().await;
        }

        info!("Reminder scheduler stopped");
    }

    /// Run one reconciliation pass and return the intents emitted.
    pub async fn tick(&self) -> Vec<NotificationIntent> {
        let tick_id = Uuid::new_v4().simple().to_string()[..8].to_string();
        let now = self.clock.now();

        let pruned = self.fired.roll_over(now.date());
        if pruned > 0 {
            debug!("[{tick_id}] New day {}, pruned {pruned} fired entries", now.date());
        }

        if !self.notifications_enabled(&tick_id).await {
            debug!("[{tick_id}] Notifications disabled, skipping tick");
            return Vec::new();
        }

        let events = match self.catalog.list_events().await {
            Ok(events) => events,
            Err(e) => {
                error!("[{tick_id}] Failed to read event catalog: {e}");
                return Vec::new();
            }
        };

        let mut emitted = Vec::new();
        for event in events {
            let occurrence = match self.due_occurrence(&event, now) {
                Ok(Some(date)) => date,
                Ok(None) => continue,
                Err(e) => {
                    error!("[{tick_id}] Skipping event: {e}");
                    continue;
                }
            };

            if !self.fired.try_mark(event.key(), occurrence) {
                debug!(
                    "[{tick_id}] Reminder for '{}' already fired for {occurrence}",
                    event.name
                );
                continue;
            }

            let intent = self.build_intent(&event, now);
            info!(
                "[{tick_id}] Reminder due: '{}' at {} on {occurrence}",
                event.name, event.time_slot
            );

            // Already marked: a failed delivery is not retried
            if let Err(e) = self.sink.notify(&intent).await {
                warn!("[{tick_id}] Reminder for '{}' not delivered: {e}", event.name);
            }
            emitted.push(intent);
        }

        emitted
    }

    async fn notifications_enabled(&self, tick_id: &str) -> bool {
        let Some(settings) = &self.settings else {
            return true;
        };
        match settings.get_setting(NOTIFICATION_ENABLED_KEY).await {
            Ok(value) => notifications_enabled_value(value.as_deref()),
            Err(e) => {
                warn!("[{tick_id}] Could not read {NOTIFICATION_ENABLED_KEY}, assuming enabled: {e}");
                true
            }
        }
    }

    /// Occurrence date whose reminder instant lies within one tick of `now`.
    ///
    /// Neighbouring dates are checked so an event shortly after midnight is
    /// reminded on the previous evening.
    fn due_occurrence(
        &self,
        event: &RecurringEvent,
        now: NaiveDateTime,
    ) -> Result<Option<NaiveDate>, ScheduleError> {
        event.day_number()?;
        let time = event.time_of_day()?;

        let window_ms = self.tick_interval.as_millis() as i64;
        let lead = ChronoDuration::minutes(self.lead_minutes);

        for offset in -1..=1 {
            let Some(date) = now.date().checked_add_signed(ChronoDuration::days(offset)) else {
                continue;
            };
            if !event.occurs_on(date) {
                continue;
            }
            let target = date.and_time(time) - lead;
            if (now - target).num_milliseconds().abs() < window_ms {
                return Ok(Some(date));
            }
        }

        Ok(None)
    }

    fn build_intent(&self, event: &RecurringEvent, now: NaiveDateTime) -> NotificationIntent {
        let mut body = format!(
            "【{}】将在{}分钟后开始！\n地点: {}",
            event.name,
            self.lead_minutes,
            event.location_label()
        );

        if let (Some((resolver, map)), Some(location)) = (&self.route_context, &event.location) {
            match estimate_route(&resolver.get_current_location(), location, map) {
                Ok(route) => body.push_str(&format!(
                    "\n{}，预计 {} 分钟",
                    route.distance_text(),
                    route.walking_minutes
                )),
                Err(e) => debug!("No route context for '{}': {e}", event.name),
            }
        }

        NotificationIntent::new(REMINDER_TITLE, body, now).for_event(event.clone())
    }
}

/// Handle to a running scheduler task.
pub struct ReminderHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReminderHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signal shutdown and wait for the in-flight tick to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("Reminder scheduler task ended abnormally: {e}");
        }
    }
}
