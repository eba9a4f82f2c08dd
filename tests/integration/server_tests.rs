//! End-to-end server scenarios: devices send measurements through the
//! event channel and record the deciphered replies.

use crate::mock_device::Bench;

use devmon::config::{DeviceWorkSchedule, ServerConfig};
use devmon::engine::Phase;
use devmon::protocol::cipher::{MIRROR, MULTIPLY41, ROT3};
use devmon::protocol::{ErrorKind, Message};
use devmon::server::MonitoringServer;

const DEVICE: u64 = 111;

fn schedule(device_id: u64, pairs: &[(u64, u8)]) -> DeviceWorkSchedule {
    DeviceWorkSchedule {
        device_id,
        phases: pairs.iter().copied().map(Phase::from).collect(),
    }
}

fn commands(values: &[i8]) -> Vec<Message> {
    values.iter().copied().map(Message::Command).collect()
}

#[test]
fn no_schedule() {
    let mut bench = Bench::new();
    bench.connect(DEVICE);
    bench.start(DEVICE, &[0]);
    bench.run();
    assert_eq!(bench.messages(DEVICE), [Message::Error(ErrorKind::NoSchedule)]);
}

#[test]
fn no_timestamp() {
    let mut bench = Bench::new();
    bench.connect(DEVICE);
    bench.server.set_device_work_schedule(&schedule(DEVICE, &[(1, 0)]));
    bench.start(DEVICE, &[0]);
    bench.run();
    assert_eq!(bench.messages(DEVICE), [Message::Error(ErrorKind::NoTimestamp)]);
}

#[test]
fn obsolete() {
    let mut bench = Bench::new();
    bench.connect(DEVICE);
    bench.start(DEVICE, &[0]);
    bench.run();
    bench.start(DEVICE, &[0]);
    bench.run();
    assert_eq!(
        bench.messages(DEVICE),
        [
            Message::Error(ErrorKind::NoSchedule),
            Message::Error(ErrorKind::Obsolete)
        ]
    );
}

#[test]
fn command() {
    let mut bench = Bench::new();
    bench.connect(DEVICE);
    bench
        .server
        .set_device_work_schedule(&schedule(DEVICE, &[(0, 0), (1, 0), (2, 100)]));
    bench.start(DEVICE, &[0, 100, 0]);
    bench.run();
    assert_eq!(bench.messages(DEVICE), commands(&[0, -100, 100]));
}

#[test]
fn two_devices() {
    let (first, second) = (111, 654);
    let mut bench = Bench::new();
    bench.connect(first);
    bench.connect(second);
    bench
        .server
        .set_device_work_schedule(&schedule(first, &[(0, 0), (1, 0), (2, 3)]));
    bench
        .server
        .set_device_work_schedule(&schedule(second, &[(1, 100), (2, 50), (3, 0)]));
    bench.start(first, &[0, 1, 2]);
    bench.start(second, &[0, 0, 50, 100]);
    bench.run();

    assert_eq!(bench.messages(first), commands(&[0, -1, 1]));
    assert_eq!(
        bench.messages(second),
        [
            Message::Error(ErrorKind::NoTimestamp),
            Message::Command(100),
            Message::Command(0),
            Message::Command(-100),
        ]
    );
}

fn ciphered_bench(server_cipher: &str, device_cipher: &str) -> Bench {
    let mut bench = Bench::new();
    bench.server.encoder_mut().select(server_cipher).unwrap();
    bench.connect(DEVICE);
    bench.device(DEVICE).encoder_mut().select(device_cipher).unwrap();
    bench
        .server
        .set_device_work_schedule(&schedule(DEVICE, &[(0, 0), (1, 0), (2, 3)]));
    bench.start(DEVICE, &[0, 1, 2]);
    bench.run();
    bench
}

#[test]
fn matching_ciphers_talk() {
    for name in [ROT3, MIRROR, MULTIPLY41] {
        let bench = ciphered_bench(name, name);
        assert_eq!(bench.messages(DEVICE), commands(&[0, -1, 1]), "cipher {name}");
    }
}

#[test]
fn mismatched_ciphers_get_no_reply() {
    let bench = ciphered_bench(ROT3, MIRROR);
    assert!(bench.messages(DEVICE).is_empty());
    assert!(bench.server.deviation_stats(DEVICE).is_empty());
}

#[test]
fn unselected_server_cipher_stays_silent() {
    let mut bench = Bench::with_server(MonitoringServer::new());
    bench.connect(DEVICE);
    bench.start(DEVICE, &[0]);
    bench.run();
    assert!(bench.messages(DEVICE).is_empty());
}

#[test]
fn disconnect_keeps_state_by_default() {
    let mut bench = Bench::new();
    bench.connect(DEVICE);
    bench.server.set_device_work_schedule(&schedule(DEVICE, &[(0, 5)]));
    bench.start(DEVICE, &[0]);
    bench.run();
    bench.disconnect(DEVICE);
    bench.connect(DEVICE);
    bench.start(DEVICE, &[0]);
    bench.run();

    assert_eq!(bench.messages(DEVICE), [Message::Error(ErrorKind::Obsolete)]);
    assert_eq!(bench.server.deviation_stats(DEVICE).len(), 1);
}

#[test]
fn disconnect_forgets_when_configured() {
    let config = ServerConfig {
        cipher: Some("Dummy".into()),
        forget_on_disconnect: true,
        schedules: vec![schedule(DEVICE, &[(0, 5)])],
        ..ServerConfig::default()
    };
    let mut bench = Bench::with_server(MonitoringServer::from_config(&config).unwrap());
    bench.connect(DEVICE);
    bench.start(DEVICE, &[0]);
    bench.run();
    assert_eq!(bench.messages(DEVICE), [Message::Command(5)]);

    bench.disconnect(DEVICE);
    bench.connect(DEVICE);
    bench.start(DEVICE, &[0]);
    bench.run();

    assert_eq!(bench.messages(DEVICE), [Message::Error(ErrorKind::NoSchedule)]);
    assert!(bench.server.deviation_stats(DEVICE).is_empty());
}

#[test]
fn deviation_stats_accumulate_through_the_server() {
    let mut bench = Bench::new();
    bench.connect(DEVICE);
    bench
        .server
        .set_device_work_schedule(&schedule(DEVICE, &[(0, 50), (3, 90)]));
    bench.start(DEVICE, &[100, 0, 100, 0, 50, 100]);
    bench.run();

    let stats = bench.server.deviation_stats(DEVICE);
    assert_eq!(stats.len(), 2);
    assert!((stats[0].deviation - 50.0).abs() < 1.0);
    assert!((stats[1].deviation - 57.15).abs() < 1.0);
}
