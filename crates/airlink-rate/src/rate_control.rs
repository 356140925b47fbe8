use std::{fmt::Debug, time::Instant};

use airlink_core::{catalog::RateIndex, error::Result};

/// Rate-adaptation algorithm.
///
/// An implementation holds only immutable configuration; everything that
/// changes per peer lives in [`RateControl::Station`], which the host owns
/// and passes back on every call. Each call runs synchronously and never
/// blocks.
pub trait RateControl: Debug {
    /// Per-station adaptation state.
    type Station: Debug;

    /// Checks that the configuration fits a catalog of `supported` rates.
    fn validate(&self, supported: usize) -> Result<()> {
        let _ = supported;
        Ok(())
    }

    /// Creates fresh state for a station whose catalog holds `supported` rates.
    fn create_station(&self, supported: usize, time: Instant) -> Self::Station;

    /// A data frame was not acknowledged and will be retried.
    fn on_data_failed(&self, station: &mut Self::Station, time: Instant);

    /// A data frame was acknowledged.
    fn on_data_succeeded(&self, station: &mut Self::Station, ack_snr: f64, time: Instant);

    /// An RTS was not answered by a CTS and will be retried.
    fn on_rts_failed(&self, station: &mut Self::Station, time: Instant) {
        let _ = (station, time);
    }

    /// An RTS was answered by a CTS.
    fn on_rts_succeeded(&self, station: &mut Self::Station, cts_snr: f64, time: Instant) {
        let _ = (station, cts_snr, time);
    }

    /// A data frame ran out of retries.
    fn on_final_data_failed(&self, station: &mut Self::Station, time: Instant) {
        let _ = (station, time);
    }

    /// An RTS ran out of retries.
    fn on_final_rts_failed(&self, station: &mut Self::Station, time: Instant) {
        let _ = (station, time);
    }

    /// Rate index for the next data frame of `frame_size` bytes.
    fn data_mode(&self, station: &mut Self::Station, frame_size: u32, time: Instant) -> RateIndex;

    /// Rate index for the next control frame.
    fn rts_mode(&self, station: &mut Self::Station, time: Instant) -> RateIndex {
        let _ = (station, time);
        0
    }

    /// Returns whether the next data frame should be protected by RTS/CTS.
    fn needs_rts(&self, station: &mut Self::Station, frame_size: u32, normally_required: bool) -> bool {
        let _ = (station, frame_size);
        normally_required
    }

    /// Base rate the state machine currently sits at.
    fn current_rate(&self, station: &Self::Station) -> RateIndex;

    /// Next instant at which [`RateControl::on_timer`] has work to do.
    fn next_deadline(&self, station: &Self::Station) -> Option<Instant> {
        let _ = station;
        None
    }

    /// Runs timer-driven work that is due at `time`.
    fn on_timer(&self, station: &mut Self::Station, time: Instant) {
        let _ = (station, time);
    }
}
