//! # Record Framing
//!
//! Serialization and CRC framing of the fixed-layout telemetry record: the
//! first stage of the transmit pipeline and the last stage of the receive
//! pipeline.

pub mod crc;
pub mod record;

pub use crc::{crc16, seal_frame, verify_frame};
pub use record::{FlightMode, SystemStatus, TelemetryRecord};

use crate::error::TmLinkError;

/// Serialize `record` into `out` and seal the CRC trailer.
///
/// `out` must be exactly [`TelemetryRecord::WIRE_SIZE`] bytes. Returns the
/// CRC written, which the caller may mirror back into the record.
pub fn assemble_record(record: &TelemetryRecord, out: &mut [u8]) -> u16 {
    record.pack(out);
    seal_frame(out)
}

/// Verify the CRC trailer of `bytes` and parse the telemetry record back.
pub fn recover_record(bytes: &[u8]) -> Result<TelemetryRecord, TmLinkError> {
    verify_frame(bytes)?;
    TelemetryRecord::parse(bytes)
}
