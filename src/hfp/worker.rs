//! The service worker. Runs queued work items and expired timeouts one at a
//! time, with the service lock held.

use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use tokio::select;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep_until, Instant};

use super::phone_state::HeadsetCallState;
use super::service::{lock, HeadsetServiceInner};
use super::state_machine::SessionMessage;
use crate::core::address::RawAddress;

#[derive(Debug)]
pub(super) enum WorkItem {
    /// Deliver a message to the session of a device
    Session(RawAddress, SessionMessage),
    /// Apply a telephony update to the snapshot
    UpdatePhoneState(HeadsetCallState),
    /// Let the sessions resume A2DP if there is no call
    ResumeA2dpIfIdle(Vec<RawAddress>),
    /// Suspend or release A2DP directly when no headset is connected
    SyncA2dpWithoutDevices,
    /// A deadline was armed outside of the worker
    TimersChanged,
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

pub(super) async fn run(inner: Arc<Mutex<HeadsetServiceInner>>, mut rx: UnboundedReceiver<WorkItem>) {
    loop {
        let deadline = lock(&inner).timeouts.next_deadline();
        let item = select! {
            item = rx.recv() => match item {
                Some(item) => Some(item),
                None => break,
            },
            _ = sleep_until_deadline(deadline) => None,
        };

        let mut guard = lock(&inner);
        guard.on_worker = true;
        match item {
            Some(item) => guard.handle_work_item(item),
            None => guard.fire_expired_timeouts(Instant::now()),
        }
        guard.on_worker = false;
    }
    info!("headset service worker exiting");
}

impl HeadsetServiceInner {
    fn handle_work_item(&mut self, item: WorkItem) {
        match item {
            WorkItem::Session(device, message) => self.process_session_message(device, message),
            WorkItem::UpdatePhoneState(state) => self.phone_state.update(&state),
            WorkItem::ResumeA2dpIfIdle(devices) => {
                if self.phone_state.is_in_call() || self.phone_state.is_ringing() {
                    return;
                }
                info!("no call, asking sessions to resume A2DP");
                for device in devices {
                    if self.sessions.contains_key(&device) {
                        self.send_to_session(device, SessionMessage::ResumeA2dp);
                    } else {
                        warn!("resume A2DP: {} was never connected/connecting", device);
                    }
                }
            }
            WorkItem::SyncA2dpWithoutDevices => {
                if self.phone_state.is_in_call() || self.phone_state.is_ringing() {
                    debug!("no device connected and call ongoing, suspending A2DP");
                    self.system.suspend_a2dp();
                } else {
                    debug!("no device connected and no call, releasing A2DP");
                    self.system.release_a2dp();
                }
            }
            WorkItem::TimersChanged => (),
        }
    }
}
