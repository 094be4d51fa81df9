#![cfg_attr(not(feature = "std"), no_std)]

/// The CRC-8 checksum covering every 16-bit word on the SGP30 wire.
pub mod crc8;
/// The SGP30 command set and its wire-level descriptors.
pub mod command;
/// Driver for the Sensirion SGP30 air quality sensor.
///
/// Refer to [the datasheet](https://sensirion.com/media/documents/984E0DD5/61644B8B/Sensirion_Gas_Sensors_Datasheet_SGP30.pdf)
/// for more information about this device.
pub mod sgp30;
/// File persistence for the sensor's calibration baseline.
#[cfg(feature = "baseline-file")]
pub mod baseline;
