#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bluetooth_hfp::{
    config::HfpConfig,
    core::address::RawAddress,
    hfp::{
        mocks::{
            drain,
            mock_adapter::MockAdapterInterface,
            mock_native::{MockNativeInterface, NativeCall},
            mock_system::{MockSystemInterface, SystemCall},
        },
        native::{BthfAudioState, BthfConnectionState, StackEvent},
        HeadsetService,
    },
};
use tokio::{sync::mpsc::UnboundedReceiver, task::LocalSet};

pub const DEVICE_A: RawAddress = RawAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x0a]);
pub const DEVICE_B: RawAddress = RawAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x0b]);
pub const DEVICE_C: RawAddress = RawAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x0c]);

pub fn start_test(f: impl Future<Output = ()>) {
    tokio_test::block_on(async move {
        bluetooth_hfp::init_logging();
        tokio::time::pause();
        LocalSet::new().run_until(f).await;
    });
}

/// Let the service worker drain its queue. Time is paused, so this never
/// reaches a service deadline.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

pub struct TestBench {
    pub service: HeadsetService,
    pub native: Arc<MockNativeInterface>,
    pub native_rx: UnboundedReceiver<NativeCall>,
    pub system: Arc<MockSystemInterface>,
    pub system_rx: UnboundedReceiver<SystemCall>,
    pub adapter: Arc<MockAdapterInterface>,
}

impl TestBench {
    pub fn new(config: HfpConfig) -> Self {
        Self::with_adapter(config, MockAdapterInterface::new())
    }

    pub fn with_adapter(config: HfpConfig, adapter: MockAdapterInterface) -> Self {
        let (native, native_rx) = MockNativeInterface::new();
        let (system, system_rx) = MockSystemInterface::new();
        let native = Arc::new(native);
        let system = Arc::new(system);
        let adapter = Arc::new(adapter);
        let service = HeadsetService::start(
            config.reconcile(),
            native.clone(),
            system.clone(),
            adapter.clone(),
        );
        Self { service, native, native_rx, system, system_rx, adapter }
    }

    pub async fn stack_event(&self, device: RawAddress, event: StackEvent) {
        self.service.message_from_native(device, event).unwrap();
        settle().await;
    }

    pub async fn slc_connected(&self, device: RawAddress) {
        self.stack_event(device, StackEvent::ConnectionStateChanged(BthfConnectionState::Connected))
            .await;
        self.stack_event(
            device,
            StackEvent::ConnectionStateChanged(BthfConnectionState::SlcConnected),
        )
        .await;
    }

    pub async fn link_lost(&self, device: RawAddress) {
        self.stack_event(
            device,
            StackEvent::ConnectionStateChanged(BthfConnectionState::Disconnected),
        )
        .await;
    }

    /// Connect a device locally and complete the link from the stack side
    pub async fn connect(&self, device: RawAddress) {
        assert!(self.service.connect(device));
        settle().await;
        self.slc_connected(device).await;
    }

    pub async fn audio_connected(&self, device: RawAddress) {
        self.stack_event(device, StackEvent::AudioStateChanged(BthfAudioState::Connected)).await;
    }

    pub async fn audio_disconnected(&self, device: RawAddress) {
        self.stack_event(device, StackEvent::AudioStateChanged(BthfAudioState::Disconnected))
            .await;
    }

    pub fn native_calls(&mut self) -> Vec<NativeCall> {
        drain(&mut self.native_rx)
    }

    pub fn system_calls(&mut self) -> Vec<SystemCall> {
        drain(&mut self.system_rx)
    }

    pub fn clear_calls(&mut self) {
        self.native_calls();
        self.system_calls();
    }
}

pub fn config(max_connected_audio_devices: usize) -> HfpConfig {
    HfpConfig { max_connected_audio_devices, ..HfpConfig::default() }
}

pub fn tws_plus_config(max_connected_audio_devices: usize) -> HfpConfig {
    HfpConfig { max_connected_audio_devices, tws_plus_enabled: true, ..HfpConfig::default() }
}
