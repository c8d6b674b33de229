//! Deadlines for requests that wait on another component: an outgoing call
//! placed on behalf of a headset, and a voice recognition session requested
//! by a headset. Each one fires at most once and is dropped when resolved.

use std::fmt;
use std::time::Duration;

use log::warn;
use tokio::time::Instant;

use super::service::HeadsetServiceInner;
use super::state_machine::SessionMessage;
use super::worker::WorkItem;
use crate::core::address::RawAddress;

#[derive(Debug, Default)]
struct PendingRequest {
    device: Option<RawAddress>,
    deadline: Option<Instant>,
}

impl PendingRequest {
    fn arm(&mut self, device: RawAddress, timeout: Duration) {
        self.device = Some(device);
        self.deadline = Some(Instant::now() + timeout);
    }

    fn clear(&mut self) -> Option<RawAddress> {
        self.deadline = None;
        self.device.take()
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.deadline.map_or(false, |deadline| deadline <= now)
    }
}

impl fmt::Display for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.device, self.deadline) {
            (None, _) => write!(f, "none"),
            (Some(device), None) => write!(f, "{} (resolved)", device),
            (Some(device), Some(deadline)) => {
                let left = deadline.saturating_duration_since(Instant::now());
                write!(f, "{} ({}ms left)", device, left.as_millis())
            }
        }
    }
}

/// Timeouts that expired and must be reported
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct Expired {
    pub(super) dialing_out: Option<RawAddress>,
    pub(super) voice_recognition: Option<RawAddress>,
}

#[derive(Debug, Default)]
pub(super) struct TimeoutSupervisor {
    dialing_out: PendingRequest,
    voice_recognition: PendingRequest,
}

impl TimeoutSupervisor {
    pub(super) fn arm_dialing_out(&mut self, device: RawAddress, timeout: Duration) {
        self.dialing_out.arm(device, timeout);
    }

    /// The device waiting for an outgoing call, until the call goes active or idle
    pub(super) fn dialing_out_device(&self) -> Option<RawAddress> {
        self.dialing_out.device
    }

    /// The call started dialing: the deadline no longer applies. Returns whether
    /// the request was still waiting.
    pub(super) fn resolve_dialing_out(&mut self) -> bool {
        self.dialing_out.deadline.take().is_some()
    }

    pub(super) fn clear_resolved_dialing_out(&mut self) {
        if self.dialing_out.deadline.is_none() {
            self.dialing_out.device = None;
        }
    }

    pub(super) fn arm_voice_recognition(&mut self, device: RawAddress, timeout: Duration) {
        self.voice_recognition.arm(device, timeout);
    }

    pub(super) fn voice_recognition_device(&self) -> Option<RawAddress> {
        self.voice_recognition.device
    }

    pub(super) fn cancel_voice_recognition(&mut self) -> Option<RawAddress> {
        self.voice_recognition.clear()
    }

    pub(super) fn next_deadline(&self) -> Option<Instant> {
        match (self.dialing_out.deadline, self.voice_recognition.deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub(super) fn take_expired(&mut self, now: Instant) -> Expired {
        let mut expired = Expired::default();
        if self.dialing_out.is_expired(now) {
            expired.dialing_out = self.dialing_out.clear();
        }
        if self.voice_recognition.is_expired(now) {
            expired.voice_recognition = self.voice_recognition.clear();
        }
        expired
    }

    /// Drops everything. Returns whether a voice recognition request was pending.
    pub(super) fn clear(&mut self) -> bool {
        self.dialing_out.clear();
        self.voice_recognition.clear().is_some()
    }
}

impl fmt::Display for TimeoutSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "dialing_out={}, voice_recognition={}", self.dialing_out, self.voice_recognition)
    }
}

impl HeadsetServiceInner {
    /// Wakes the worker so it picks up a new deadline
    pub(super) fn timers_changed(&self) {
        if !self.on_worker {
            self.post(WorkItem::TimersChanged);
        }
    }

    pub(super) fn fire_expired_timeouts(&mut self, now: Instant) {
        let expired = self.timeouts.take_expired(now);
        if let Some(device) = expired.dialing_out {
            warn!("dialing out from {} timed out", device);
            self.send_to_session(device, SessionMessage::DialingOutResult(false));
        }
        if let Some(device) = expired.voice_recognition {
            warn!("voice recognition request from {} timed out", device);
            self.system.release_voice_recognition_wake_lock();
            self.send_to_session(device, SessionMessage::VoiceRecognitionResult(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::task::block_on_locally;

    const DEVICE: RawAddress = RawAddress::new([1, 2, 3, 4, 5, 6]);

    #[test]
    fn nothing_armed() {
        let supervisor = TimeoutSupervisor::default();
        assert_eq!(supervisor.next_deadline(), None);
        assert_eq!(supervisor.dialing_out_device(), None);
        assert_eq!(supervisor.voice_recognition_device(), None);
    }

    #[test]
    fn expires_once() {
        block_on_locally(async {
            let mut supervisor = TimeoutSupervisor::default();
            supervisor.arm_voice_recognition(DEVICE, Duration::from_millis(100));
            let deadline = supervisor.next_deadline().unwrap();

            assert_eq!(supervisor.take_expired(Instant::now()), Expired::default());

            let expired = supervisor.take_expired(deadline);
            assert_eq!(expired.voice_recognition, Some(DEVICE));
            assert_eq!(supervisor.take_expired(deadline), Expired::default());
            assert_eq!(supervisor.voice_recognition_device(), None);
        });
    }

    #[test]
    fn earliest_deadline_first() {
        block_on_locally(async {
            let mut supervisor = TimeoutSupervisor::default();
            supervisor.arm_dialing_out(DEVICE, Duration::from_secs(10));
            supervisor.arm_voice_recognition(DEVICE, Duration::from_secs(5));
            let now = Instant::now();
            assert_eq!(supervisor.next_deadline(), Some(now + Duration::from_secs(5)));
        });
    }

    #[test]
    fn resolved_dial_keeps_device_until_call_settles() {
        block_on_locally(async {
            let mut supervisor = TimeoutSupervisor::default();
            supervisor.arm_dialing_out(DEVICE, Duration::from_secs(10));

            assert!(supervisor.resolve_dialing_out());
            assert!(!supervisor.resolve_dialing_out());
            assert_eq!(supervisor.next_deadline(), None);
            assert_eq!(supervisor.dialing_out_device(), Some(DEVICE));

            supervisor.clear_resolved_dialing_out();
            assert_eq!(supervisor.dialing_out_device(), None);
        });
    }

    #[test]
    fn unresolved_dial_survives_clear_resolved() {
        block_on_locally(async {
            let mut supervisor = TimeoutSupervisor::default();
            supervisor.arm_dialing_out(DEVICE, Duration::from_secs(10));
            supervisor.clear_resolved_dialing_out();
            assert_eq!(supervisor.dialing_out_device(), Some(DEVICE));
        });
    }

    #[test]
    fn clear_reports_pending_voice_recognition() {
        block_on_locally(async {
            let mut supervisor = TimeoutSupervisor::default();
            assert!(!supervisor.clear());
            supervisor.arm_voice_recognition(DEVICE, Duration::from_secs(5));
            assert!(supervisor.clear());
            assert_eq!(supervisor.next_deadline(), None);
        });
    }
}
