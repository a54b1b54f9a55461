//! Polling/refresh controller
//!
//! Each concern owns at most one timer task. Timer tasks only send ticks
//! into a channel; the view loop receives them and does the actual work, so
//! the session context is never touched from a timer. Every scheduled timer
//! carries a sequence number and ticks from a cancelled or replaced timer
//! are dropped on receipt, which keeps a stale view from being refreshed
//! after a transition.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::Config;
use crate::models::AutorefreshInterval;

/// Delay before the single post-join refresh when polling is disabled.
pub const AFTER_JOIN_FALLBACK: Duration = Duration::from_secs(15);

/// What a timer refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concern {
    AllMeetings,
    OneMeeting,
    Recordings,
    /// One-shot refresh of a meeting after the user joined it.
    MeetingOnce,
}

#[derive(Debug)]
struct Tick {
    concern: Concern,
    seq: u64,
}

struct Timer {
    seq: u64,
    handle: JoinHandle<()>,
    repeating: bool,
}

/// Effective polling periods; `None` means no timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshIntervals {
    pub meetings: Option<Duration>,
    pub recordings: Option<Duration>,
}

impl RefreshIntervals {
    /// Server intervals, overridden by local config when set. Zero disables.
    pub fn resolve(server: &AutorefreshInterval, config: &Config) -> Self {
        let period = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));
        Self {
            meetings: period(config.meetings_refresh_ms.unwrap_or(server.meetings)),
            recordings: period(config.recordings_refresh_ms.unwrap_or(server.recordings)),
        }
    }

    pub fn after_join_delay(&self) -> Duration {
        self.meetings.unwrap_or(AFTER_JOIN_FALLBACK)
    }
}

pub struct RefreshController {
    tx: mpsc::UnboundedSender<Tick>,
    rx: mpsc::UnboundedReceiver<Tick>,
    timers: HashMap<Concern, Timer>,
    next_seq: u64,
}

impl Default for RefreshController {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshController {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            timers: HashMap::new(),
            next_seq: 0,
        }
    }

    fn install(&mut self, concern: Concern, repeating: bool, spawn: impl FnOnce(u64) -> JoinHandle<()>) {
        self.cancel(concern);
        self.next_seq += 1;
        let seq = self.next_seq;
        let handle = spawn(seq);
        self.timers.insert(
            concern,
            Timer {
                seq,
                handle,
                repeating,
            },
        );
    }

    /// Tick `concern` every `period`, replacing any timer it already has.
    /// `None` or a zero period only cancels. Returns whether a timer runs.
    pub fn schedule_every(&mut self, concern: Concern, period: Option<Duration>) -> bool {
        let Some(period) = period.filter(|p| !p.is_zero()) else {
            self.cancel(concern);
            return false;
        };
        tracing::info!("Refreshing {:?} every {:?}", concern, period);
        let tx = self.tx.clone();
        self.install(concern, true, move |seq| {
            tokio::spawn(async move {
                let mut interval = time::interval(period);
                interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
                interval.tick().await; // skip first immediate tick
                loop {
                    interval.tick().await;
                    if tx.send(Tick { concern, seq }).is_err() {
                        break;
                    }
                }
            })
        });
        true
    }

    /// Tick `concern` once after `delay`, replacing any timer it already has.
    pub fn schedule_once(&mut self, concern: Concern, delay: Duration) {
        tracing::info!("Refreshing {:?} once in {:?}", concern, delay);
        let tx = self.tx.clone();
        self.install(concern, false, move |seq| {
            tokio::spawn(async move {
                time::sleep(delay).await;
                let _ = tx.send(Tick { concern, seq });
            })
        });
    }

    pub fn cancel(&mut self, concern: Concern) {
        if let Some(timer) = self.timers.remove(&concern) {
            tracing::debug!("Cancelled {:?} refresh", concern);
            timer.handle.abort();
        }
    }

    /// Cancel every timer. Ticks already queued are discarded.
    pub fn cancel_all(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.handle.abort();
        }
    }

    pub fn is_active(&self, concern: Concern) -> bool {
        self.timers.contains_key(&concern)
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Wait for the next tick of a live timer.
    ///
    /// Never resolves while nothing is scheduled, so it can sit inside
    /// `tokio::select!` next to other events.
    pub async fn recv(&mut self) -> Option<Concern> {
        loop {
            let tick = self.rx.recv().await?;
            let current = match self.timers.get(&tick.concern) {
                Some(timer) => timer.seq == tick.seq,
                None => false,
            };
            if !current {
                tracing::debug!("Dropped stale {:?} tick", tick.concern);
                continue;
            }
            if self
                .timers
                .get(&tick.concern)
                .map_or(false, |timer| !timer.repeating)
            {
                self.timers.remove(&tick.concern);
            }
            return Some(tick.concern);
        }
    }
}

impl Drop for RefreshController {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Instant};
    use tokio_test::{assert_err, assert_ok};

    const SECOND: Duration = Duration::from_secs(1);

    #[tokio::test(start_paused = true)]
    async fn test_interval_ticks_repeat() {
        let mut ctl = RefreshController::new();
        assert!(ctl.schedule_every(Concern::AllMeetings, Some(10 * SECOND)));

        let start = Instant::now();
        assert_eq!(ctl.recv().await, Some(Concern::AllMeetings));
        assert_eq!(start.elapsed(), 10 * SECOND);
        assert_eq!(ctl.recv().await, Some(Concern::AllMeetings));
        assert_eq!(start.elapsed(), 20 * SECOND);
        assert!(ctl.is_active(Concern::AllMeetings));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_schedules_nothing() {
        let mut ctl = RefreshController::new();
        assert!(!ctl.schedule_every(Concern::Recordings, Some(Duration::ZERO)));
        assert!(!ctl.schedule_every(Concern::Recordings, None));
        assert_eq!(ctl.active_count(), 0);
        assert_err!(timeout(3600 * SECOND, ctl.recv()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_timer_per_concern() {
        let mut ctl = RefreshController::new();
        ctl.schedule_every(Concern::OneMeeting, Some(5 * SECOND));
        ctl.schedule_every(Concern::OneMeeting, Some(30 * SECOND));
        assert_eq!(ctl.active_count(), 1);

        let start = Instant::now();
        assert_eq!(ctl.recv().await, Some(Concern::OneMeeting));
        assert_eq!(start.elapsed(), 30 * SECOND);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_discards_queued_ticks() {
        let mut ctl = RefreshController::new();
        ctl.schedule_every(Concern::AllMeetings, Some(SECOND));
        ctl.schedule_every(Concern::OneMeeting, Some(SECOND));

        // Let both timers fire and queue ticks nobody has received yet.
        time::sleep(3 * SECOND).await;
        ctl.cancel_all();
        assert_eq!(ctl.active_count(), 0);

        ctl.schedule_once(Concern::Recordings, 2 * SECOND);
        assert_eq!(ctl.recv().await, Some(Concern::Recordings));
        assert!(!ctl.is_active(Concern::Recordings));
        assert_err!(timeout(60 * SECOND, ctl.recv()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_once_replaces_interval() {
        let mut ctl = RefreshController::new();
        ctl.schedule_every(Concern::OneMeeting, Some(SECOND));
        ctl.cancel(Concern::OneMeeting);
        ctl.schedule_once(Concern::MeetingOnce, 15 * SECOND);

        let start = Instant::now();
        let tick = assert_ok!(timeout(60 * SECOND, ctl.recv()).await);
        assert_eq!(tick, Some(Concern::MeetingOnce));
        assert_eq!(start.elapsed(), 15 * SECOND);
    }

    #[test]
    fn test_intervals_from_settings() {
        let server = AutorefreshInterval {
            meetings: 30_000,
            recordings: 0,
        };
        let config = Config::default();
        let i = RefreshIntervals::resolve(&server, &config);
        assert_eq!(i.meetings, Some(30 * SECOND));
        assert_eq!(i.recordings, None);
        assert_eq!(i.after_join_delay(), 30 * SECOND);

        let config = Config {
            meetings_refresh_ms: Some(0),
            recordings_refresh_ms: Some(60_000),
            ..Config::default()
        };
        let i = RefreshIntervals::resolve(&server, &config);
        assert_eq!(i.meetings, None);
        assert_eq!(i.recordings, Some(60 * SECOND));
        assert_eq!(i.after_join_delay(), AFTER_JOIN_FALLBACK);
    }
}
