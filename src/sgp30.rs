use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use crate::command::{Command, MAX_REPLY_LEN};
use crate::crc8;

/// The SGP30's fixed bus address.
pub const DEFAULT_ADDRESS: u8 = 0x58;

/// The word a healthy sensor returns from the on-chip self test.
pub const SELF_TEST_OK: u16 = 0xD400;

/// Feature set from which the tVOC inceptive baseline commands exist.
const FEATURE_SET_TVOC_BASELINE: u16 = 0x0022;

#[derive(Debug, PartialEq)]
pub enum Error<TIoError> {
    /// Wrapped error from the bus driver.
    Wrapped(TIoError),
    /// A reply word failed its CRC check. The whole reply is discarded;
    /// no partially valid result is ever returned.
    InvalidCrc,
}

impl<TIoError> From<TIoError> for Error<TIoError> {
    fn from(error: TIoError) -> Error<TIoError> {
        Error::Wrapped(error)
    }
}

/// A single indoor-air-quality measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Measurement {
    /// Equivalent CO2 in ppm. The device reports 400-60000.
    pub co2eq_ppm: u16,
    /// Total VOC in ppb. The device reports 0-60000.
    pub tvoc_ppb: u16,
}

/// Raw sensor signals, mostly useful for device verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSignals {
    pub h2: u16,
    pub ethanol: u16,
}

/// The IAQ algorithm's compensation state.
///
/// The driver only transports this value between the sensor, the caller and
/// (optionally) a file; it never caches or interprets it. Read it with
/// [`Sgp30::baseline`] once the sensor has run for a while, and hand it back
/// with [`Sgp30::set_baseline`] after the next power cycle to skip the
/// sensor's early operation phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Baseline {
    pub co2eq: u16,
    pub tvoc: u16,
}

/// An SGP30 sensor on the bus `TI2c`.
///
/// The driver exclusively owns the bus handle for its lifetime; operations
/// are strict write-then-wait-then-read sequences with no overlap and no
/// built-in retries. Callers wanting resilience loop at their own layer.
#[derive(Debug)]
pub struct Sgp30<TI2c, TDelay> {
    i2c: TI2c,
    address: u8,
    delay: TDelay,
}

impl<TI2c, TDelay, TIoError> Sgp30<TI2c, TDelay>
where
    TI2c: I2c<Error = TIoError>,
    TDelay: DelayNs,
{
    /// Constructs a driver for the sensor at `address` (normally
    /// [`DEFAULT_ADDRESS`]). Does not touch the bus.
    pub fn new(i2c: TI2c, address: u8, delay: TDelay) -> Sgp30<TI2c, TDelay> {
        Sgp30 {
            i2c,
            address,
            delay,
        }
    }

    /// Starts the on-chip IAQ algorithm.
    ///
    /// Must be called once after power-up, before the first [`measure`].
    /// On parts with feature set 0x22 or later this also carries the tVOC
    /// inceptive baseline over into the tVOC baseline register, which keeps
    /// the tVOC output stable across restarts.
    ///
    /// [`measure`]: Sgp30::measure
    pub fn init(&mut self) -> Result<(), Error<TIoError>> {
        self.execute(Command::InitAirQuality, &[], &mut [])?;

        if self.feature_set()? >= FEATURE_SET_TVOC_BASELINE {
            let inceptive = self.tvoc_inceptive_baseline()?;
            self.set_tvoc_baseline(inceptive)?;
        }
        Ok(())
    }

    /// Measures eCO2 and tVOC.
    ///
    /// The sensor expects this to be polled once per second while the IAQ
    /// algorithm runs; during the first ~15 s after [`init`] it returns the
    /// fixed values 400 ppm / 0 ppb.
    ///
    /// [`init`]: Sgp30::init
    pub fn measure(&mut self) -> Result<Measurement, Error<TIoError>> {
        let mut words = [0u16; 2];
        self.execute(Command::MeasureAirQuality, &[], &mut words)?;
        Ok(Measurement {
            co2eq_ppm: words[0],
            tvoc_ppb: words[1],
        })
    }

    /// Measures the raw H2 and ethanol signals.
    pub fn measure_raw(&mut self) -> Result<RawSignals, Error<TIoError>> {
        let mut words = [0u16; 2];
        self.execute(Command::MeasureRaw, &[], &mut words)?;
        Ok(RawSignals {
            h2: words[0],
            ethanol: words[1],
        })
    }

    /// Reads the IAQ algorithm's compensation baseline.
    pub fn baseline(&mut self) -> Result<Baseline, Error<TIoError>> {
        let mut words = [0u16; 2];
        self.execute(Command::GetBaseline, &[], &mut words)?;
        Ok(Baseline {
            co2eq: words[0],
            tvoc: words[1],
        })
    }

    /// Restores a compensation baseline previously read with
    /// [`baseline`](Sgp30::baseline).
    pub fn set_baseline(&mut self, baseline: Baseline) -> Result<(), Error<TIoError>> {
        self.execute(Command::SetBaseline, &[baseline.co2eq, baseline.tvoc], &mut [])
    }

    /// Sets the absolute humidity used for on-chip compensation, as an 8.8
    /// fixed-point value in g/m³. Zero disables compensation.
    ///
    /// See [`absolute_humidity`] for converting a temperature/relative
    /// humidity pair into this format.
    pub fn set_absolute_humidity(&mut self, humidity: u16) -> Result<(), Error<TIoError>> {
        self.execute(Command::SetAbsoluteHumidity, &[humidity], &mut [])
    }

    /// Runs the on-chip self test and returns the raw result word, which is
    /// [`SELF_TEST_OK`] on a healthy sensor. Takes over half a second.
    pub fn self_test(&mut self) -> Result<u16, Error<TIoError>> {
        let mut words = [0u16; 1];
        self.execute(Command::MeasureTest, &[], &mut words)?;
        Ok(words[0])
    }

    /// Reads the feature set version word.
    pub fn feature_set(&mut self) -> Result<u16, Error<TIoError>> {
        let mut words = [0u16; 1];
        self.execute(Command::GetFeatureSet, &[], &mut words)?;
        Ok(words[0])
    }

    /// Reads the tVOC inceptive baseline. Only present on parts with
    /// feature set 0x22 or later.
    pub fn tvoc_inceptive_baseline(&mut self) -> Result<u16, Error<TIoError>> {
        let mut words = [0u16; 1];
        self.execute(Command::GetTvocInceptiveBaseline, &[], &mut words)?;
        Ok(words[0])
    }

    /// Sets the tVOC baseline word.
    pub fn set_tvoc_baseline(&mut self, baseline: u16) -> Result<(), Error<TIoError>> {
        self.execute(Command::SetTvocBaseline, &[baseline], &mut [])
    }

    /// Reads the device's 48-bit serial id.
    pub fn serial_id(&mut self) -> Result<u64, Error<TIoError>> {
        let mut words = [0u16; 3];
        self.execute(Command::GetSerialId, &[], &mut words)?;
        Ok(((words[0] as u64) << 32) | ((words[1] as u64) << 16) | words[2] as u64)
    }

    /// Destroys this driver and releases the bus handle.
    pub fn release(self) -> TI2c {
        self.i2c
    }

    /// Executes one command: write the opcode (plus CRC-framed payload),
    /// sleep the command's settle time, read and decode the reply.
    ///
    /// `reply` must be exactly as long as the command's reply word count.
    /// If any reply group fails its CRC check the whole transaction fails;
    /// `reply` is only written once every group has been validated.
    fn execute(
        &mut self,
        command: Command,
        payload: &[u16],
        reply: &mut [u16],
    ) -> Result<(), Error<TIoError>> {
        let descriptor = command.descriptor();
        debug_assert_eq!(reply.len(), descriptor.reply_words);

        let (frame, len) = command.encode(payload);
        debug!("sgp30 write: {:02X?}", &frame[..len]);
        self.i2c.write(self.address, &frame[..len])?;

        if descriptor.reply_words == 0 {
            return Ok(());
        }

        self.delay.delay_ms(descriptor.wait_ms);

        let mut raw = [0u8; MAX_REPLY_LEN];
        let raw = &mut raw[..descriptor.reply_words * 3];
        self.i2c.read(self.address, raw)?;
        debug!("sgp30 read: {:02X?}", raw);

        for group in raw.chunks_exact(3) {
            if crc8::hash(&group[..2]) != group[2] {
                return Err(Error::InvalidCrc);
            }
        }
        for (word, group) in reply.iter_mut().zip(raw.chunks_exact(3)) {
            *word = u16::from_be_bytes([group[0], group[1]]);
        }
        Ok(())
    }
}

#[cfg(feature = "baseline-file")]
impl<TI2c, TDelay, TIoError> Sgp30<TI2c, TDelay>
where
    TI2c: I2c<Error = TIoError>,
    TDelay: DelayNs,
    TIoError: core::fmt::Debug,
{
    /// Reads the current baseline from the sensor and saves it to `path`.
    ///
    /// Returns `false` when the sensor reply failed (bus error or CRC
    /// mismatch) or the file could not be written; nothing is persisted in
    /// either case, so a garbage baseline never reaches the file.
    pub fn store_baseline<P: AsRef<std::path::Path>>(&mut self, path: P) -> bool {
        match self.baseline() {
            Ok(baseline) => crate::baseline::save(&baseline, path),
            Err(error) => {
                log::warn!("not persisting baseline, read failed: {:?}", error);
                false
            }
        }
    }

    /// Restores a baseline previously written by
    /// [`store_baseline`](Sgp30::store_baseline).
    ///
    /// A missing or corrupt file is an expected cold-start condition:
    /// the sensor is left untouched and `false` is returned. Bus failures
    /// while pushing the baseline also report `false`.
    pub fn restore_baseline<P: AsRef<std::path::Path>>(&mut self, path: P) -> bool {
        match crate::baseline::load(path) {
            Some(baseline) => self.set_baseline(baseline).is_ok(),
            None => false,
        }
    }
}

/// Converts an air temperature (°C) and relative humidity (%) into the 8.8
/// fixed-point absolute humidity word (g/m³) that
/// [`Sgp30::set_absolute_humidity`] expects.
///
/// Values above the largest representable humidity (just under 256 g/m³,
/// far beyond anything breathable air reaches) saturate.
#[cfg(feature = "std")]
pub fn absolute_humidity(temperature: f32, relative_humidity: f32) -> u16 {
    let grams_per_m3 = (6.112
        * ((17.67 * temperature) / (temperature + 243.5)).exp()
        * relative_humidity
        * 18.01534)
        / ((273.15 + temperature) * 8.31447215);

    // Float-to-int casts saturate, covering both bounds.
    (grams_per_m3 * 256.0) as u16
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn absolute_humidity_at_room_conditions() {
        // ~21.8 °C and 45 %RH is roughly 8.7 g/m³.
        let fixed = absolute_humidity(21.8, 45.0);
        let grams = fixed as f32 / 256.0;
        assert!(grams > 8.5 && grams < 9.0, "got {} g/m³", grams);
    }

    #[test]
    fn absolute_humidity_never_goes_negative() {
        assert_eq!(absolute_humidity(-40.0, 0.0), 0);
    }
}
