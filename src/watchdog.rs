//! Session liveness watchdog.
//!
//! Polls the session status endpoint on a fixed interval. A transport or
//! decode failure is a missed beat, not an expiry. Once the server says the
//! session is gone the schedule is disarmed for good, the expiry overlay is
//! shown and the page moves to the login entry point after a grace delay.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backend::SessionStatus;
use crate::event::{Component, EventResponse, PageEvent};
use crate::surface::{Modal, Services};
use crate::timer::{Scheduler, Task, TimerId};

pub const POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const EXPIRY_GRACE: Duration = Duration::from_secs(3);
pub const LOGIN_PATH: &str = "/login";

pub struct SessionWatchdog {
    services: Services,
    period: Duration,
    poll: Option<TimerId>,
    redirect: Option<TimerId>,
    expired: bool,
    attached: bool,
}

impl SessionWatchdog {
    pub fn new(services: Services) -> Self {
        Self::with_period(services, POLL_INTERVAL)
    }

    pub fn with_period(services: Services, period: Duration) -> Self {
        Self {
            services,
            period,
            poll: None,
            redirect: None,
            expired: false,
            attached: false,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.poll.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Start polling. No-op when already armed or after an expiry.
    pub fn arm(&mut self, timers: &mut Scheduler) -> bool {
        if self.expired || self.poll.is_some() {
            return false;
        }
        self.poll = Some(timers.set_interval(self.period, Task::PollSession));
        debug!(period_secs = self.period.as_secs(), "session watchdog armed");
        true
    }

    /// Stop polling. Safe to call any number of times.
    pub fn disarm(&mut self, timers: &mut Scheduler) {
        if let Some(id) = self.poll.take() {
            timers.clear(id);
            debug!("session watchdog disarmed");
        }
    }

    /// One liveness request. Returns the status when the server answered.
    pub fn check(&mut self, timers: &mut Scheduler) -> Option<SessionStatus> {
        if self.expired {
            return None;
        }
        match self.services.backend.session_status() {
            Ok(status) => {
                if status.authenticated {
                    debug!("session still valid");
                } else {
                    self.expire(timers);
                }
                Some(status)
            }
            Err(err) => {
                warn!(error = %err, "session check failed");
                None
            }
        }
    }

    fn expire(&mut self, timers: &mut Scheduler) {
        info!("session expired, redirecting to login");
        self.expired = true;
        self.disarm(timers);
        self.services.modals.show(Modal::SessionExpired);
        self.redirect = Some(timers.set_timeout(EXPIRY_GRACE, Task::RedirectToLogin));
    }
}

impl Component for SessionWatchdog {
    fn name(&self) -> &'static str {
        "session-watchdog"
    }

    fn init(&mut self, timers: &mut Scheduler) -> bool {
        self.attached = true;
        self.arm(timers);
        true
    }

    fn handle(&mut self, event: &PageEvent, _timers: &mut Scheduler) -> EventResponse {
        if self.attached && *event == (PageEvent::PageShow { persisted: true }) {
            debug!("page restored from back/forward cache, reloading");
            self.services.navigator.reload();
        }
        EventResponse::IGNORED
    }

    fn on_timer(&mut self, task: Task, timers: &mut Scheduler) -> bool {
        match task {
            Task::PollSession => {
                self.check(timers);
                true
            }
            Task::RedirectToLogin => {
                self.redirect = None;
                self.services.navigator.navigate(LOGIN_PATH);
                true
            }
            _ => false,
        }
    }

    fn dispose(&mut self, timers: &mut Scheduler) {
        self.disarm(timers);
        if let Some(id) = self.redirect.take() {
            timers.clear(id);
        }
        self.attached = false;
    }
}
