//! # tmlink-rs - A Rust Crate for the IRIG 106-23 Telemetry Downlink
//!
//! The tmlink-rs crate implements the airborne side of an IRIG 106-23
//! telemetry downlink: SOQPSK-TG modulation per Appendix M and LDPC
//! forward-error correction with frame synchronization per Appendix R. It
//! turns fixed-layout telemetry records into complex baseband samples for
//! a radio front-end, and recovers records from received samples.
//!
//! ## Features
//!
//! - Fixed-layout telemetry record with packed little-endian wire format
//!   and CCITT CRC-16 framing
//! - Systematic quasi-cyclic LDPC codes (N = 8192) at rates 1/2, 2/3, 4/5
//!   with sum-product belief-propagation decoding and syndrome-based early
//!   termination
//! - Per-codeword LFSR randomizer and 64-bit attached sync marker
//! - SOQPSK-TG continuous-phase modulator with streaming phase continuity,
//!   and the matching demodulator (carrier PLL, symbol-timing recovery,
//!   trellis detection, soft output)
//! - Transmit/receive orchestrators owning all buffers, with per-frame
//!   error counters; steady-state operation is allocation-free
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! ```rust
//! use tmlink_rs::{PipelineConfig, RxPipeline, TelemetryRecord, TxPipeline};
//! use tmlink_rs::soqpsk::IqSample;
//!
//! let config = PipelineConfig {
//!     carrier_freq_hz: 1_000_000.0,
//!     sample_rate_hz: 8_000_000.0,
//!     ..Default::default()
//! };
//! let mut tx = TxPipeline::new(config.clone()).unwrap();
//! let mut rx = RxPipeline::new(config).unwrap();
//!
//! let record = TelemetryRecord {
//!     frame_counter: 1,
//!     ..Default::default()
//! };
//!
//! let mut air: Vec<IqSample> = Vec::new();
//! tx.transmit_frame(&record, &mut air);
//! tx.flush(&mut air);
//!
//! let mut decoded: Vec<TelemetryRecord> = Vec::new();
//! rx.receive_samples(&air, &mut decoded);
//! assert_eq!(decoded[0].frame_counter, 1);
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod fec;
pub mod frame;
pub mod logging;
pub mod pipeline;
pub mod soqpsk;
pub mod sync;
pub mod util;

pub use crate::error::TmLinkError;
pub use crate::logging::{init_logger, log_info};

// Core pipeline types
pub use config::{CodeRate, PipelineConfig};
pub use frame::{FlightMode, SystemStatus, TelemetryRecord};
pub use pipeline::{
    FrameSource, LinkCounters, RecordSink, RxPipeline, SampleSink, SampleSource, TxPipeline,
    FRAME_BITS,
};

// Stage-level building blocks
pub use fec::{DecodeOutcome, DecoderState, LdpcDecoder, LdpcEncoder, Randomizer};
pub use soqpsk::{Demodulator, IqSample, Modulator};
