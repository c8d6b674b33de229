use bluetooth_hfp::hfp::{
    mocks::{mock_adapter::MockAdapterInterface, mock_native::NativeCall, mock_system::SystemCall},
    phone_state::HeadsetCallState,
    AudioState, CallState,
};

use utils::{config, settle, start_test, tws_plus_config, TestBench, DEVICE_A, DEVICE_B, DEVICE_C};

mod utils;

async fn start_active_call(bench: &TestBench) {
    bench.service.phone_state_changed(HeadsetCallState::new(1, 0, CallState::Idle));
    settle().await;
}

#[test]
fn test_set_active_device() {
    start_test(async move {
        // arrange
        let mut bench = TestBench::new(config(2));
        bench.connect(DEVICE_A).await;
        bench.connect(DEVICE_B).await;
        bench.clear_calls();

        // act
        assert!(bench.service.set_active_device(Some(DEVICE_B)));

        // assert
        assert_eq!(bench.service.active_device(), Some(DEVICE_B));
        assert_eq!(bench.native_calls(), vec![NativeCall::SetActiveDevice(Some(DEVICE_B))]);
        assert_eq!(bench.system_calls(), vec![SystemCall::BroadcastActiveDevice(Some(DEVICE_B))]);
    })
}

#[test]
fn test_set_same_active_device_is_a_no_op() {
    start_test(async move {
        // arrange
        let mut bench = TestBench::new(config(1));
        bench.connect(DEVICE_A).await;
        bench.clear_calls();

        // act + assert
        assert!(bench.service.set_active_device(Some(DEVICE_A)));
        assert!(bench.native_calls().is_empty());
        assert!(bench.system_calls().is_empty());
    })
}

#[test]
fn test_only_connected_device_can_be_active() {
    start_test(async move {
        // arrange
        let bench = TestBench::new(config(2));
        bench.connect(DEVICE_A).await;
        assert!(bench.service.connect(DEVICE_B));
        settle().await;

        // act + assert
        assert!(!bench.service.set_active_device(Some(DEVICE_B)));
        assert!(!bench.service.set_active_device(Some(DEVICE_C)));
        assert_eq!(bench.service.active_device(), Some(DEVICE_A));
    })
}

#[test]
fn test_native_failure_keeps_active_device() {
    start_test(async move {
        // arrange
        let bench = TestBench::new(config(2));
        bench.connect(DEVICE_A).await;
        bench.connect(DEVICE_B).await;
        bench.native.set_failing(|call| matches!(call, NativeCall::SetActiveDevice(Some(_))));

        // act + assert
        assert!(!bench.service.set_active_device(Some(DEVICE_B)));
        assert_eq!(bench.service.active_device(), Some(DEVICE_A));
    })
}

#[test]
fn test_clear_active_device() {
    start_test(async move {
        // arrange
        let mut bench = TestBench::new(config(1));
        bench.connect(DEVICE_A).await;
        bench.clear_calls();

        // act
        assert!(bench.service.set_active_device(None));

        // assert
        assert_eq!(bench.service.active_device(), None);
        assert_eq!(bench.native_calls(), vec![NativeCall::SetActiveDevice(None)]);
        assert_eq!(bench.system_calls(), vec![SystemCall::BroadcastActiveDevice(None)]);
    })
}

#[test]
fn test_active_device_disconnect_clears_active() {
    start_test(async move {
        // arrange
        let mut bench = TestBench::new(config(1));
        bench.connect(DEVICE_A).await;
        bench.clear_calls();

        // act
        bench.link_lost(DEVICE_A).await;

        // assert
        assert_eq!(bench.service.active_device(), None);
        assert!(bench.system_calls().contains(&SystemCall::BroadcastActiveDevice(None)));
    })
}

#[test]
fn test_earbud_disconnect_hands_over_to_peer() {
    start_test(async move {
        // arrange
        let adapter = MockAdapterInterface::new();
        adapter.add_tws_plus_pair(DEVICE_A, DEVICE_B);
        let bench = TestBench::with_adapter(tws_plus_config(2), adapter);
        bench.connect(DEVICE_A).await;
        bench.connect(DEVICE_B).await;

        // act
        bench.link_lost(DEVICE_A).await;

        // assert
        assert_eq!(bench.service.active_device(), Some(DEVICE_B));
    })
}

#[test]
fn test_switch_between_earbuds_is_ignored() {
    start_test(async move {
        // arrange
        let adapter = MockAdapterInterface::new();
        adapter.add_tws_plus_pair(DEVICE_A, DEVICE_B);
        let bench = TestBench::with_adapter(tws_plus_config(2), adapter);
        bench.connect(DEVICE_A).await;
        bench.connect(DEVICE_B).await;

        // act + assert
        assert!(!bench.service.set_active_device(Some(DEVICE_B)));
        assert_eq!(bench.service.active_device(), Some(DEVICE_A));
    })
}

#[test]
fn test_switch_moves_audio_to_new_device() {
    start_test(async move {
        // arrange
        let mut bench = TestBench::new(config(2));
        bench.connect(DEVICE_A).await;
        bench.connect(DEVICE_B).await;
        start_active_call(&bench).await;
        assert!(bench.service.connect_audio(DEVICE_A));
        settle().await;
        bench.audio_connected(DEVICE_A).await;
        bench.clear_calls();

        // act
        assert!(bench.service.set_active_device(Some(DEVICE_B)));
        settle().await;

        // assert
        assert!(bench.native_calls().contains(&NativeCall::DisconnectAudio(DEVICE_A)));
        assert_eq!(bench.service.audio_state(DEVICE_A), AudioState::Disconnecting);

        // act
        bench.audio_disconnected(DEVICE_A).await;

        // assert
        assert!(bench.native_calls().contains(&NativeCall::ConnectAudio(DEVICE_B)));
        assert_eq!(bench.service.audio_state(DEVICE_B), AudioState::Connecting);
    })
}

#[test]
fn test_switch_during_call_connects_audio() {
    start_test(async move {
        // arrange
        let mut bench = TestBench::new(config(2));
        bench.connect(DEVICE_A).await;
        bench.connect(DEVICE_B).await;
        start_active_call(&bench).await;
        bench.clear_calls();

        // act
        assert!(bench.service.set_active_device(Some(DEVICE_B)));
        settle().await;

        // assert
        assert!(bench.native_calls().contains(&NativeCall::ConnectAudio(DEVICE_B)));
    })
}

#[test]
fn test_switch_rolls_back_when_audio_cannot_follow() {
    start_test(async move {
        // arrange
        let mut bench = TestBench::new(config(2));
        bench.connect(DEVICE_A).await;
        bench.connect(DEVICE_B).await;
        start_active_call(&bench).await;
        bench.service.set_audio_route_allowed(false);
        bench.clear_calls();

        // act
        assert!(!bench.service.set_active_device(Some(DEVICE_B)));

        // assert
        assert_eq!(bench.service.active_device(), Some(DEVICE_A));
        assert_eq!(
            bench.native_calls(),
            vec![
                NativeCall::SetActiveDevice(Some(DEVICE_B)),
                NativeCall::SetActiveDevice(Some(DEVICE_A))
            ]
        );
        assert!(bench.system_calls().is_empty());
    })
}

#[test]
fn test_silence_mode() {
    start_test(async move {
        // arrange
        let bench = TestBench::new(config(1));
        bench.connect(DEVICE_A).await;

        // act
        assert!(bench.service.set_silence_mode(DEVICE_A, true));

        // assert
        assert_eq!(bench.service.active_device(), None);

        // act
        assert!(bench.service.set_silence_mode(DEVICE_A, false));

        // assert
        assert_eq!(bench.service.active_device(), Some(DEVICE_A));
        assert!(!bench.service.set_silence_mode(DEVICE_B, true));
    })
}

#[test]
fn test_first_connected_audio_device_is_oldest() {
    start_test(async move {
        // arrange
        let bench = TestBench::new(config(2));
        bench.connect(DEVICE_B).await;
        bench.connect(DEVICE_A).await;

        // act + assert
        assert_eq!(bench.service.first_connected_audio_device(), Some(DEVICE_B));
    })
}
