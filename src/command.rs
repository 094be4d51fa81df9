use crate::crc8;

/// The largest frame written to the bus: a 2-byte opcode plus two CRC-framed
/// payload words.
pub const MAX_WRITE_LEN: usize = 8;
/// The largest reply read from the bus: three CRC-framed words (GetSerialId).
pub const MAX_REPLY_LEN: usize = 9;

/// Wire-level description of one SGP30 command.
///
/// Defined once per command and never mutated. `wait_ms` is the settle time
/// the sensor needs between the opcode write and the reply read; reading
/// earlier returns stale or partial data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Descriptor {
    /// The two opcode bytes that select this operation.
    pub opcode: [u8; 2],
    /// Number of 16-bit words in the reply. Zero means write-only.
    pub reply_words: usize,
    /// Minimum wait in milliseconds before the reply may be read.
    pub wait_ms: u32,
}

/// The SGP30 command set (datasheet feature set 0x22).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Starts the on-chip IAQ algorithm. Must be sent once after power-up
    /// before any measurement.
    InitAirQuality,
    /// Measures eCO2 (ppm) and tVOC (ppb).
    MeasureAirQuality,
    /// Reads the IAQ algorithm's compensation baseline.
    GetBaseline,
    /// Restores a previously read compensation baseline.
    SetBaseline,
    /// Sets the absolute humidity word used for on-chip compensation.
    SetAbsoluteHumidity,
    /// Runs the on-chip self test.
    MeasureTest,
    /// Reads the feature set version word.
    GetFeatureSet,
    /// Measures the raw H2 and ethanol signals.
    MeasureRaw,
    /// Reads the tVOC inceptive baseline.
    GetTvocInceptiveBaseline,
    /// Sets the tVOC baseline word.
    SetTvocBaseline,
    /// Reads the 48-bit serial id.
    GetSerialId,
}

impl Command {
    /// Returns the wire descriptor for this command.
    ///
    /// Where the datasheet gives revision-dependent timings (GetBaseline,
    /// MeasureTest) the worst-case figure is used, so a read never races the
    /// sensor's internal measurement cycle.
    pub fn descriptor(self) -> Descriptor {
        let (opcode, reply_words, wait_ms) = match self {
            Command::InitAirQuality => ([0x20, 0x03], 0, 10),
            Command::MeasureAirQuality => ([0x20, 0x08], 2, 12),
            Command::GetBaseline => ([0x20, 0x15], 2, 120),
            Command::SetBaseline => ([0x20, 0x1E], 0, 10),
            Command::SetAbsoluteHumidity => ([0x20, 0x61], 0, 10),
            Command::MeasureTest => ([0x20, 0x32], 1, 520),
            Command::GetFeatureSet => ([0x20, 0x2F], 1, 10),
            Command::MeasureRaw => ([0x20, 0x50], 2, 25),
            Command::GetTvocInceptiveBaseline => ([0x20, 0xB3], 1, 10),
            Command::SetTvocBaseline => ([0x20, 0x77], 0, 10),
            Command::GetSerialId => ([0x36, 0x82], 3, 10),
        };
        Descriptor {
            opcode,
            reply_words,
            wait_ms,
        }
    }

    /// Builds the full write frame for this command: the opcode followed by
    /// each payload word as `[MSB, LSB, CRC8(MSB, LSB)]`.
    ///
    /// Returns the frame buffer and the number of valid bytes in it. At most
    /// two payload words fit in a frame (SetBaseline).
    pub fn encode(self, payload: &[u16]) -> ([u8; MAX_WRITE_LEN], usize) {
        debug_assert!(payload.len() <= 2);

        let mut frame = [0u8; MAX_WRITE_LEN];
        frame[..2].copy_from_slice(&self.descriptor().opcode);
        let mut len = 2;
        for word in payload {
            let bytes = word.to_be_bytes();
            frame[len] = bytes[0];
            frame[len + 1] = bytes[1];
            frame[len + 2] = crc8::hash(&bytes);
            len += 3;
        }
        (frame, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_only_commands_expect_no_reply() {
        for command in [
            Command::InitAirQuality,
            Command::SetBaseline,
            Command::SetAbsoluteHumidity,
            Command::SetTvocBaseline,
        ] {
            assert_eq!(command.descriptor().reply_words, 0);
        }
    }

    #[test]
    fn serial_id_is_three_words() {
        let descriptor = Command::GetSerialId.descriptor();
        assert_eq!(descriptor.opcode, [0x36, 0x82]);
        assert_eq!(descriptor.reply_words, 3);
    }

    #[test]
    fn conservative_wait_times() {
        assert_eq!(Command::GetBaseline.descriptor().wait_ms, 120);
        assert_eq!(Command::MeasureTest.descriptor().wait_ms, 520);
        assert_eq!(Command::MeasureAirQuality.descriptor().wait_ms, 12);
    }

    #[test]
    fn encode_without_payload_is_just_the_opcode() {
        let (frame, len) = Command::MeasureAirQuality.encode(&[]);
        assert_eq!(&frame[..len], &[0x20, 0x08]);
    }

    #[test]
    fn encode_appends_crc_per_word() {
        let (frame, len) = Command::SetBaseline.encode(&[0x8A2F, 0x9E66]);
        assert_eq!(
            &frame[..len],
            &[0x20, 0x1E, 0x8A, 0x2F, 0xE4, 0x9E, 0x66, 0xBC]
        );
    }

    #[test]
    fn encode_round_trips_through_the_word_splitter() {
        let words = [0xABCD, 0x1234];
        let (frame, len) = Command::SetBaseline.encode(&words);
        for (chunk, word) in frame[2..len].chunks_exact(3).zip(words) {
            assert_eq!(crc8::hash(&chunk[..2]), chunk[2]);
            assert_eq!(u16::from_be_bytes([chunk[0], chunk[1]]), word);
        }
    }
}
