#![cfg(feature = "baseline-file")]

use std::fs;

use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

use sgp30_driver::baseline;
use sgp30_driver::sgp30::{Baseline, Sgp30, DEFAULT_ADDRESS};

fn sensor(expectations: &[Transaction]) -> Sgp30<I2cMock, NoopDelay> {
    Sgp30::new(I2cMock::new(expectations), DEFAULT_ADDRESS, NoopDelay::new())
}

#[test]
fn store_then_restore_round_trips_through_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sgp30_baseline.txt");

    // The simulated device hands out one baseline with correct CRCs, then
    // accepts the identical value back.
    let expectations = [
        Transaction::write(DEFAULT_ADDRESS, vec![0x20, 0x15]),
        Transaction::read(
            DEFAULT_ADDRESS,
            vec![0x8A, 0x2F, 0xE4, 0x9E, 0x66, 0xBC],
        ),
        Transaction::write(
            DEFAULT_ADDRESS,
            vec![0x20, 0x1E, 0x8A, 0x2F, 0xE4, 0x9E, 0x66, 0xBC],
        ),
    ];
    let mut sensor = sensor(&expectations);

    assert!(sensor.store_baseline(&path));
    assert_eq!(
        baseline::load(&path),
        Some(Baseline {
            co2eq: 0x8A2F,
            tvoc: 0x9E66,
        })
    );
    assert!(sensor.restore_baseline(&path));

    sensor.release().done();
}

#[test]
fn store_with_bad_crc_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sgp30_baseline.txt");

    let expectations = [
        Transaction::write(DEFAULT_ADDRESS, vec![0x20, 0x15]),
        // Second group's CRC byte corrupted.
        Transaction::read(
            DEFAULT_ADDRESS,
            vec![0x8A, 0x2F, 0xE4, 0x9E, 0x66, 0x00],
        ),
    ];
    let mut sensor = sensor(&expectations);

    assert!(!sensor.store_baseline(&path));
    assert!(!path.exists());

    sensor.release().done();
}

#[test]
fn restore_from_missing_file_leaves_the_sensor_untouched() {
    let dir = tempfile::tempdir().unwrap();

    // No bus expectations: a cold start must not reach the device.
    let mut sensor = sensor(&[]);

    assert!(!sensor.restore_baseline(dir.path().join("never-written.txt")));

    sensor.release().done();
}

#[test]
fn restore_from_corrupt_file_leaves_the_sensor_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sgp30_baseline.txt");
    fs::write(&path, "[1, 2, 3]").unwrap();

    let mut sensor = sensor(&[]);

    assert!(!sensor.restore_baseline(&path));

    sensor.release().done();
}

#[test]
fn restore_pushes_the_stored_words_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sgp30_baseline.txt");
    assert!(baseline::save(
        &Baseline {
            co2eq: 0x8A2F,
            tvoc: 0x9E66,
        },
        &path
    ));

    let expectations = [Transaction::write(
        DEFAULT_ADDRESS,
        vec![0x20, 0x1E, 0x8A, 0x2F, 0xE4, 0x9E, 0x66, 0xBC],
    )];
    let mut sensor = sensor(&expectations);

    assert!(sensor.restore_baseline(&path));

    sensor.release().done();
}
