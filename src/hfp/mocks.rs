//! Mocked collaborators, used by the service tests

pub mod mock_adapter;
pub mod mock_native;
pub mod mock_system;

use tokio::sync::mpsc::UnboundedReceiver;

/// Take every event currently queued on a mock channel
pub fn drain<T>(rx: &mut UnboundedReceiver<T>) -> Vec<T> {
    let mut events = vec![];
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
