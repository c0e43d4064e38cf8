//! # Pipeline Orchestrator
//!
//! Owns every stage instance and all long-lived buffers; stages only ever
//! see borrowed slices. Data flows one way:
//!
//! ```text
//! TX:  record -> CRC seal -> LDPC encode -> randomize -> ASM -> modulate -> sink
//! RX:  samples -> demodulate -> ASM search -> derandomize -> LDPC decode
//!             -> CRC verify -> record sink
//! ```
//!
//! Per-frame errors are logged, counted and dropped here; nothing short of
//! a construction failure ever propagates out of the receive loop. Every
//! scratch buffer is allocated at construction and reused, so steady-state
//! operation is allocation-free. One pipeline instance per direction; a
//! TX/RX pair shares nothing mutable, so the two directions can live on
//! separate threads.

use log::{debug, warn};

use crate::config::PipelineConfig;
use crate::logging::log_frame_hex;
use crate::constants::{ASM_LENGTH_BITS, ASM_LOCK_THRESHOLD, ASM_SEARCH_WINDOW_BITS, LDPC_N};
use crate::error::TmLinkError;
use crate::fec::{LdpcDecoder, LdpcEncoder, Randomizer};
use crate::frame::{assemble_record, recover_record, TelemetryRecord};
use crate::soqpsk::{Demodulator, IqSample, Modulator};
use crate::sync;
use crate::util::bits::{bits_to_bytes_lsb, bytes_to_bits_lsb};
use crate::util::softbuf::SoftBitBuffer;

/// Upstream sensor aggregator supplying records to encode.
pub trait FrameSource {
    fn next_record(&mut self) -> Option<TelemetryRecord>;
}

/// RF driver consuming modulated samples.
pub trait SampleSink {
    fn write(&mut self, samples: &[IqSample]);
}

/// RF driver supplying received samples.
pub trait SampleSource {
    fn read(&mut self, buf: &mut [IqSample]) -> usize;
}

/// Downstream consumer of decoded records.
pub trait RecordSink {
    fn deliver(&mut self, record: TelemetryRecord);
}

impl SampleSink for Vec<IqSample> {
    fn write(&mut self, samples: &[IqSample]) {
        self.extend_from_slice(samples);
    }
}

impl RecordSink for Vec<TelemetryRecord> {
    fn deliver(&mut self, record: TelemetryRecord) {
        self.push(record);
    }
}

/// Per-direction observability counters, one per error kind plus the two
/// frame tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCounters {
    pub frames_encoded: u64,
    pub frames_decoded: u64,
    pub sync_losses: u64,
    pub uncorrectable: u64,
    pub crc_failures: u64,
    pub truncated: u64,
}

/// Bits in one on-air frame (marker plus codeword).
pub const FRAME_BITS: usize = ASM_LENGTH_BITS + LDPC_N;

const RECORD_BITS: usize = TelemetryRecord::WIRE_SIZE * 8;

/// Transmit-side orchestrator (components A through E).
pub struct TxPipeline {
    config: PipelineConfig,
    encoder: LdpcEncoder,
    randomizer: Randomizer,
    modulator: Modulator,
    counters: LinkCounters,

    record_bytes: Vec<u8>,
    info_bits: Vec<u8>,
    codeword: Vec<u8>,
    scrambled: Vec<u8>,
    framed: Vec<u8>,
    samples: Vec<IqSample>,
    flush_samples: Vec<IqSample>,
}

impl TxPipeline {
    /// Construct all TX stages; any invalid parameter fails here and
    /// nowhere later.
    pub fn new(config: PipelineConfig) -> Result<Self, TmLinkError> {
        config.validate()?;
        let encoder = LdpcEncoder::new(config.code_rate)?;
        if RECORD_BITS > encoder.k() {
            return Err(TmLinkError::Config(format!(
                "record needs {} bits but rate {} carries only {}",
                RECORD_BITS,
                config.code_rate.as_str(),
                encoder.k()
            )));
        }
        let randomizer = Randomizer::new(config.lfsr_seed)?;
        let modulator = Modulator::new(
            config.carrier_freq_hz,
            config.sample_rate_hz,
            config.samples_per_symbol,
        );
        let sps = config.samples_per_symbol;
        let flush_len = modulator.flush_len();
        Ok(Self {
            encoder,
            randomizer,
            modulator,
            counters: LinkCounters::default(),
            record_bytes: vec![0; TelemetryRecord::WIRE_SIZE],
            info_bits: vec![0; config.code_rate.k()],
            codeword: vec![0; LDPC_N],
            scrambled: vec![0; LDPC_N],
            framed: vec![0; FRAME_BITS],
            samples: vec![IqSample::default(); FRAME_BITS * sps],
            flush_samples: vec![IqSample::default(); flush_len],
            config,
        })
    }

    /// Samples emitted per frame.
    pub fn samples_per_frame(&self) -> usize {
        FRAME_BITS * self.config.samples_per_symbol
    }

    /// Run one record through the whole TX chain and hand the samples to
    /// `sink`. Consecutive calls are phase-continuous on the air.
    pub fn transmit_frame(&mut self, record: &TelemetryRecord, sink: &mut dyn SampleSink) {
        assemble_record(record, &mut self.record_bytes);
        log_frame_hex("tx record", &self.record_bytes);

        // little-endian bit expansion, zero-padded up to K
        self.info_bits.iter_mut().for_each(|b| *b = 0);
        bytes_to_bits_lsb(&self.record_bytes, &mut self.info_bits[..RECORD_BITS]);

        self.encoder.encode(&self.info_bits, &mut self.codeword);
        self.randomizer.scramble(&self.codeword, &mut self.scrambled);
        sync::frame_with_asm(&self.scrambled, &mut self.framed);
        self.modulator.modulate(&self.framed, &mut self.samples);

        sink.write(&self.samples);
        self.counters.frames_encoded += 1;
        debug!(
            "tx frame {}: {} samples",
            record.frame_counter,
            self.samples.len()
        );
    }

    /// Drain the last frame's shaping tail at end-of-stream. Not needed
    /// between back-to-back frames.
    pub fn flush(&mut self, sink: &mut dyn SampleSink) {
        self.modulator.flush(&mut self.flush_samples);
        sink.write(&self.flush_samples);
    }

    /// Encode everything the source has to offer; returns the frame count.
    pub fn run(&mut self, source: &mut dyn FrameSource, sink: &mut dyn SampleSink) -> usize {
        let mut frames = 0;
        while let Some(record) = source.next_record() {
            self.transmit_frame(&record, sink);
            frames += 1;
        }
        frames
    }

    /// Explicitly restart the modulator phase. Breaks the phase-continuity
    /// guarantee, which is why only the caller may ask for it.
    pub fn reset_phase(&mut self) {
        self.modulator.reset();
    }

    pub fn counters(&self) -> LinkCounters {
        self.counters
    }
}

/// Receive-side orchestrator (components F through I).
pub struct RxPipeline {
    config: PipelineConfig,
    demodulator: Demodulator,
    randomizer: Randomizer,
    decoder: LdpcDecoder,
    counters: LinkCounters,

    /// Soft bits recovered so far, pending frame alignment
    buffer: SoftBitBuffer,
    demod_llrs: Vec<f32>,
    frame_llrs: Vec<f32>,
    record_bytes: Vec<u8>,
}

impl RxPipeline {
    /// Construct all RX stages; any invalid parameter fails here.
    pub fn new(config: PipelineConfig) -> Result<Self, TmLinkError> {
        config.validate()?;
        let decoder = LdpcDecoder::new(
            config.code_rate,
            config.ldpc_max_iter,
            config.ldpc_early_term,
            config.ldpc_msg_scale,
        )?;
        let randomizer = Randomizer::new(config.lfsr_seed)?;
        let demodulator = Demodulator::new(
            config.carrier_freq_hz,
            config.sample_rate_hz,
            config.samples_per_symbol,
            config.pll_bandwidth_scale as f64,
            config.pll_damping as f64,
        );
        Ok(Self {
            demodulator,
            randomizer,
            decoder,
            counters: LinkCounters::default(),
            buffer: SoftBitBuffer::with_capacity(ASM_SEARCH_WINDOW_BITS + FRAME_BITS),
            demod_llrs: Vec::new(),
            frame_llrs: vec![0.0; LDPC_N],
            record_bytes: vec![0; TelemetryRecord::WIRE_SIZE],
            config,
        })
    }

    /// Feed received samples; decoded records are delivered through
    /// `sink`, at most once each (ASM lock plus CRC pass).
    pub fn receive_samples(&mut self, samples: &[IqSample], sink: &mut dyn RecordSink) {
        self.demod_llrs.clear();
        self.demodulator.demodulate(samples, &mut self.demod_llrs);
        self.buffer.push(&self.demod_llrs);
        self.drain_buffer(sink);
    }

    /// Feed soft bits directly, bypassing the demodulator. This is the
    /// entry point for bit-true receiver tests and for front ends that do
    /// their own demodulation.
    pub fn push_soft_bits(&mut self, llrs: &[f32], sink: &mut dyn RecordSink) {
        self.buffer.push(llrs);
        self.drain_buffer(sink);
    }

    /// Pull one batch of samples from the RF driver into `scratch` and
    /// process it; returns the number of samples read (zero at end of
    /// stream).
    pub fn pump(
        &mut self,
        source: &mut dyn SampleSource,
        scratch: &mut [IqSample],
        sink: &mut dyn RecordSink,
    ) -> usize {
        let n = source.read(scratch);
        if n > 0 {
            self.receive_samples(&scratch[..n], sink);
        }
        n
    }

    /// One-shot convenience: demodulate `samples` and decode the first
    /// frame they contain, surfacing the per-frame error instead of only
    /// counting it.
    pub fn process_frame(&mut self, samples: &[IqSample]) -> Result<TelemetryRecord, TmLinkError> {
        let needed = FRAME_BITS * self.config.samples_per_symbol;
        if samples.len() < needed {
            self.counters.truncated += 1;
            return Err(TmLinkError::TruncatedInput {
                needed,
                got: samples.len(),
            });
        }
        self.demod_llrs.clear();
        self.demodulator.demodulate(samples, &mut self.demod_llrs);
        self.buffer.push(&self.demod_llrs);

        if self.buffer.len() < FRAME_BITS {
            self.counters.truncated += 1;
            return Err(TmLinkError::TruncatedInput {
                needed: FRAME_BITS,
                got: self.buffer.len(),
            });
        }

        let result = match self.find_marker() {
            Some((offset, _)) if self.buffer.len() >= offset + FRAME_BITS => {
                let decoded = self.decode_at(offset);
                self.buffer.consume(offset + FRAME_BITS);
                decoded
            }
            _ => {
                let searched = self.buffer.len();
                self.buffer.clear();
                Err(TmLinkError::FrameSyncLost { searched })
            }
        };
        match &result {
            Ok(_) => self.counters.frames_decoded += 1,
            Err(e) => self.count_error(e),
        }
        result
    }

    pub fn counters(&self) -> LinkCounters {
        self.counters
    }

    /// Bits buffered awaiting frame sync.
    pub fn pending_bits(&self) -> usize {
        self.buffer.len()
    }

    /// Decode every aligned frame currently in the buffer, per the drop
    /// policy: log, count, skip to the next marker.
    fn drain_buffer(&mut self, sink: &mut dyn RecordSink) {
        loop {
            if self.buffer.len() < FRAME_BITS {
                return;
            }
            match self.find_marker() {
                Some((offset, distance)) => {
                    if self.buffer.len() < offset + FRAME_BITS {
                        // marker found but codeword still arriving
                        return;
                    }
                    debug!("asm lock at bit {offset} (distance {distance})");
                    match self.decode_at(offset) {
                        Ok(record) => {
                            self.counters.frames_decoded += 1;
                            sink.deliver(record);
                        }
                        Err(e) => {
                            self.count_error(&e);
                            warn!("frame dropped: {e}");
                        }
                    }
                    self.buffer.consume(offset + FRAME_BITS);
                }
                None => {
                    if self.buffer.len() > ASM_SEARCH_WINDOW_BITS {
                        let searched = self.buffer.len();
                        self.counters.sync_losses += 1;
                        warn!("frame sync lost after {searched} bits");
                        // keep one marker's worth of tail for a straddler
                        self.buffer.consume(searched - (ASM_LENGTH_BITS - 1));
                    }
                    return;
                }
            }
        }
    }

    fn find_marker(&self) -> Option<(usize, u32)> {
        sync::correlate(
            |i| self.buffer.hard_bit(i),
            self.buffer.len(),
            ASM_LOCK_THRESHOLD,
        )
    }

    /// Derandomize, decode and CRC-check the codeword that starts after
    /// the marker at `offset`.
    fn decode_at(&mut self, offset: usize) -> Result<TelemetryRecord, TmLinkError> {
        let cw_start = offset + ASM_LENGTH_BITS;
        self.buffer.copy_llrs(cw_start, &mut self.frame_llrs);
        self.randomizer.derandomize_llrs(&mut self.frame_llrs);

        self.decoder.decode(&self.frame_llrs).into_result()?;

        let info = &self.decoder.hard_bits()[..RECORD_BITS];
        bits_to_bytes_lsb(info, &mut self.record_bytes);
        recover_record(&self.record_bytes)
    }

    fn count_error(&mut self, e: &TmLinkError) {
        match e {
            TmLinkError::FrameSyncLost { .. } => self.counters.sync_losses += 1,
            TmLinkError::DecodeUncorrectable { .. } => self.counters.uncorrectable += 1,
            TmLinkError::CrcMismatch { .. } => self.counters.crc_failures += 1,
            TmLinkError::TruncatedInput { .. } => self.counters.truncated += 1,
            _ => {}
        }
    }
}
