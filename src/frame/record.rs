//! # Telemetry Record
//!
//! Fixed-layout record produced by the sensor collection stages and carried
//! in the systematic region of every codeword. The byte layout is packed
//! little-endian with no padding; [`TelemetryRecord::WIRE_SIZE`] is summed
//! from the schema below rather than hard-coded, so a channel-count change
//! shows up as a wire-size change at compile time.
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬──────────────┐
//! │ frame_counter│ timestamp_us │ accel[3]     │ gyro[3]      │
//! │ u32          │ u64          │ 3 x f32      │ 3 x f32      │
//! ├──────────────┼──────────────┼──────────────┼──────────────┤
//! │ pressure[4]  │ temp[8]      │ guidance[16] │ actuator[16] │
//! │ 4 x f32      │ 8 x f32      │ 16 x f32     │ 16 x f32     │
//! ├──────────────┼──────────────┼──────────────┼──────────────┤
//! │ flight_mode  │ lat, lon     │ altitude     │ battery      │
//! │ u8           │ 2 x f64      │ f32          │ f32          │
//! ├──────────────┼──────────────┴──────────────┴──────────────┤
//! │ status u16   │ crc16 u16 (trailer, see frame::crc)        │
//! └──────────────┴─────────────────────────────────────────────┘
//! ```

use bitflags::bitflags;
use bytes::BufMut;
use nom::number::complete::{le_f32, le_f64, le_u16, le_u32, le_u64, le_u8};
use nom::IResult;
use serde::{Deserialize, Serialize};
use std::mem::size_of;

use crate::constants::{NUM_GUIDANCE_CHANNELS, NUM_PRESSURE_CHANNELS, NUM_TEMP_CHANNELS};
use crate::error::TmLinkError;

/// Flight phase reported in the record's mode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FlightMode {
    Preflight = 0,
    Armed = 1,
    Boost = 2,
    Midcourse = 3,
    Terminal = 4,
    Abort = 5,
}

impl FlightMode {
    /// Decode the wire byte; unknown values are reported as `None`.
    pub fn from_byte(byte: u8) -> Option<FlightMode> {
        match byte {
            0 => Some(FlightMode::Preflight),
            1 => Some(FlightMode::Armed),
            2 => Some(FlightMode::Boost),
            3 => Some(FlightMode::Midcourse),
            4 => Some(FlightMode::Terminal),
            5 => Some(FlightMode::Abort),
            _ => None,
        }
    }
}

bitflags! {
    /// System status word carried in every record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SystemStatus: u16 {
        const ARMED            = 1 << 0;
        const LAUNCH_DETECTED  = 1 << 1;
        const TELEMETRY_ACTIVE = 1 << 2;
        const BATTERY_LOW      = 1 << 3;
        const OVERTEMP         = 1 << 4;
        const DECODER_DEGRADED = 1 << 5;
        const GPS_VALID        = 1 << 6;
        const CAMERA_ACTIVE    = 1 << 7;
    }
}

/// One telemetry frame's worth of sensor and guidance data.
///
/// `flight_mode` and `system_status` are kept as raw wire values so a
/// record with bits this build does not know about still round-trips;
/// [`TelemetryRecord::mode`] and [`TelemetryRecord::status`] give the typed
/// views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub frame_counter: u32,
    pub timestamp_us: u64,
    /// Accelerometer x/y/z in g
    pub accel_g: [f32; 3],
    /// Gyroscope x/y/z in degrees per second
    pub gyro_dps: [f32; 3],
    pub pressure_psi: [f32; NUM_PRESSURE_CHANNELS],
    pub temperature_c: [f32; NUM_TEMP_CHANNELS],
    pub guidance_cmd: [f32; NUM_GUIDANCE_CHANNELS],
    pub actuator_pos: [f32; NUM_GUIDANCE_CHANNELS],
    pub flight_mode: u8,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f32,
    pub battery_voltage: f32,
    pub system_status: u16,
    /// CRC trailer; written by the assembler, verified on recovery
    pub crc16: u16,
}

impl Default for TelemetryRecord {
    fn default() -> Self {
        Self {
            frame_counter: 0,
            timestamp_us: 0,
            accel_g: [0.0; 3],
            gyro_dps: [0.0; 3],
            pressure_psi: [0.0; NUM_PRESSURE_CHANNELS],
            temperature_c: [0.0; NUM_TEMP_CHANNELS],
            guidance_cmd: [0.0; NUM_GUIDANCE_CHANNELS],
            actuator_pos: [0.0; NUM_GUIDANCE_CHANNELS],
            flight_mode: FlightMode::Preflight as u8,
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            altitude_m: 0.0,
            battery_voltage: 0.0,
            system_status: 0,
            crc16: 0,
        }
    }
}

fn le_f32_array<const N: usize>(input: &[u8]) -> IResult<&[u8], [f32; N]> {
    let mut out = [0.0f32; N];
    let mut rest = input;
    for slot in out.iter_mut() {
        let (r, v) = le_f32(rest)?;
        *slot = v;
        rest = r;
    }
    Ok((rest, out))
}

impl TelemetryRecord {
    /// Serialized size in bytes, summed from the field schema.
    pub const WIRE_SIZE: usize = size_of::<u32>()          // frame_counter
        + size_of::<u64>()                                 // timestamp_us
        + 3 * size_of::<f32>()                             // accel
        + 3 * size_of::<f32>()                             // gyro
        + NUM_PRESSURE_CHANNELS * size_of::<f32>()
        + NUM_TEMP_CHANNELS * size_of::<f32>()
        + NUM_GUIDANCE_CHANNELS * size_of::<f32>()         // guidance_cmd
        + NUM_GUIDANCE_CHANNELS * size_of::<f32>()         // actuator_pos
        + size_of::<u8>()                                  // flight_mode
        + 2 * size_of::<f64>()                             // lat, lon
        + size_of::<f32>()                                 // altitude
        + size_of::<f32>()                                 // battery
        + size_of::<u16>()                                 // system_status
        + size_of::<u16>(); // crc16

    /// Typed view of the mode byte.
    pub fn mode(&self) -> Option<FlightMode> {
        FlightMode::from_byte(self.flight_mode)
    }

    /// Typed view of the status word; unknown bits are retained.
    pub fn status(&self) -> SystemStatus {
        SystemStatus::from_bits_retain(self.system_status)
    }

    /// Serialize into `out`, which must be exactly [`Self::WIRE_SIZE`]
    /// bytes. The `crc16` field is written as-is; sealing is the
    /// assembler's job (see [`crate::frame::assemble_record`]).
    pub fn pack(&self, mut out: &mut [u8]) {
        assert_eq!(out.len(), Self::WIRE_SIZE, "record buffer size mismatch");
        out.put_u32_le(self.frame_counter);
        out.put_u64_le(self.timestamp_us);
        for v in self.accel_g {
            out.put_f32_le(v);
        }
        for v in self.gyro_dps {
            out.put_f32_le(v);
        }
        for v in self.pressure_psi {
            out.put_f32_le(v);
        }
        for v in self.temperature_c {
            out.put_f32_le(v);
        }
        for v in self.guidance_cmd {
            out.put_f32_le(v);
        }
        for v in self.actuator_pos {
            out.put_f32_le(v);
        }
        out.put_u8(self.flight_mode);
        out.put_f64_le(self.latitude_deg);
        out.put_f64_le(self.longitude_deg);
        out.put_f32_le(self.altitude_m);
        out.put_f32_le(self.battery_voltage);
        out.put_u16_le(self.system_status);
        out.put_u16_le(self.crc16);
    }

    /// Serialize into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::WIRE_SIZE];
        self.pack(&mut out);
        out
    }

    /// Parse a record from exactly [`Self::WIRE_SIZE`] bytes.
    ///
    /// CRC is not checked here; see [`crate::frame::recover_record`].
    pub fn parse(bytes: &[u8]) -> Result<TelemetryRecord, TmLinkError> {
        if bytes.len() != Self::WIRE_SIZE {
            return Err(TmLinkError::RecordParse(format!(
                "expected {} bytes, got {}",
                Self::WIRE_SIZE,
                bytes.len()
            )));
        }
        match Self::parse_fields(bytes) {
            Ok((_, record)) => Ok(record),
            Err(e) => Err(TmLinkError::RecordParse(e.to_string())),
        }
    }

    fn parse_fields(input: &[u8]) -> IResult<&[u8], TelemetryRecord> {
        let (input, frame_counter) = le_u32(input)?;
        let (input, timestamp_us) = le_u64(input)?;
        let (input, accel_g) = le_f32_array::<3>(input)?;
        let (input, gyro_dps) = le_f32_array::<3>(input)?;
        let (input, pressure_psi) = le_f32_array::<NUM_PRESSURE_CHANNELS>(input)?;
        let (input, temperature_c) = le_f32_array::<NUM_TEMP_CHANNELS>(input)?;
        let (input, guidance_cmd) = le_f32_array::<NUM_GUIDANCE_CHANNELS>(input)?;
        let (input, actuator_pos) = le_f32_array::<NUM_GUIDANCE_CHANNELS>(input)?;
        let (input, flight_mode) = le_u8(input)?;
        let (input, latitude_deg) = le_f64(input)?;
        let (input, longitude_deg) = le_f64(input)?;
        let (input, altitude_m) = le_f32(input)?;
        let (input, battery_voltage) = le_f32(input)?;
        let (input, system_status) = le_u16(input)?;
        let (input, crc16) = le_u16(input)?;
        Ok((
            input,
            TelemetryRecord {
                frame_counter,
                timestamp_us,
                accel_g,
                gyro_dps,
                pressure_psi,
                temperature_c,
                guidance_cmd,
                actuator_pos,
                flight_mode,
                latitude_deg,
                longitude_deg,
                altitude_m,
                battery_voltage,
                system_status,
                crc16,
            },
        ))
    }
}
