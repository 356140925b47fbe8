use std::{
    collections::{hash_map::Entry, HashMap},
    fmt::Debug,
    hash::Hash,
    time::Instant,
};

use airlink_core::{
    catalog::{RateCatalog, RateIndex},
    config::Config,
    constants::{DEFAULT_BLOCK_ACK_WINDOW, SEQUENCE_SPACE},
    error::{ErrorKind, InvalidArgumentKind, Result},
};
use airlink_protocol::{BlockAckAgreement, BlockAckBitmap, BlockAckWindow, SequenceNumber};
use airlink_rate::{AnyRateControl, RateControl};
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, error, warn};

use crate::event_types::StationEvent;

// ============================================================================
// Event Sink (Internal)
// ============================================================================

/// Minimal event sink abstraction to decouple from a concrete channel.
trait EventSink<E> {
    fn send(&mut self, event: E);
}

/// Channel-backed event sink using crossbeam `Sender`.
#[derive(Debug)]
struct ChannelSink<E>(Sender<E>);

impl<E: Debug> EventSink<E> for ChannelSink<E> {
    fn send(&mut self, event: E) {
        if let Err(err) = self.0.send(event) {
            error!("Dropped station event, receiver is gone: {:?}", err.into_inner());
        }
    }
}

/// Recipient-side block-ack state for one (peer, TID) pair.
#[derive(Debug)]
struct RecipientAgreement<P> {
    agreement: BlockAckAgreement<P>,
    window: BlockAckWindow,
}

/// Owns the adaptation state of every station and every block-ack agreement.
///
/// Station state is created on first contact: any report or query for an
/// unknown peer creates it. Timers live inside the state they drive and
/// only fire from [`StationManager::poll`], so removing a station or an
/// agreement also retires its timers.
#[derive(Debug)]
pub struct StationManager<P, C, R = AnyRateControl>
where
    P: Eq + Hash + Clone + Debug,
    C: RateCatalog<P>,
    R: RateControl,
{
    config: Config,
    catalog: C,
    rate_control: R,
    stations: HashMap<P, R::Station>,
    agreements: HashMap<(P, u8), RecipientAgreement<P>>,
    event_sink: ChannelSink<StationEvent<P>>,
    event_receiver: Receiver<StationEvent<P>>,
}

impl<P, C> StationManager<P, C, AnyRateControl>
where
    P: Eq + Hash + Clone + Debug,
    C: RateCatalog<P>,
{
    /// Creates a manager running the algorithm `config` selects.
    pub fn new(config: Config, catalog: C) -> Self {
        let rate_control = AnyRateControl::from_config(&config);
        Self::with_rate_control(config, catalog, rate_control)
    }
}

impl<P, C, R> StationManager<P, C, R>
where
    P: Eq + Hash + Clone + Debug,
    C: RateCatalog<P>,
    R: RateControl,
{
    /// Creates a manager running `rate_control`.
    pub fn with_rate_control(config: Config, catalog: C, rate_control: R) -> Self {
        let (event_sender, event_receiver) = unbounded();
        Self {
            config,
            catalog,
            rate_control,
            stations: HashMap::new(),
            agreements: HashMap::new(),
            event_sink: ChannelSink(event_sender),
            event_receiver,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the rate-adaptation algorithm.
    pub fn rate_control(&self) -> &R {
        &self.rate_control
    }

    /// Returns the rate catalog.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Returns the rate catalog for updates, e.g. after a peer (re)associates.
    ///
    /// Existing station state keeps the catalog size it was created with;
    /// remove the station to pick up a changed size.
    pub fn catalog_mut(&mut self) -> &mut C {
        &mut self.catalog
    }

    /// Returns the event receiver for station events.
    pub fn event_receiver(&self) -> &Receiver<StationEvent<P>> {
        &self.event_receiver
    }

    /// Returns the number of stations with adaptation state.
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Returns whether `peer` has adaptation state.
    pub fn has_station(&self, peer: &P) -> bool {
        self.stations.contains_key(peer)
    }

    /// Returns the base rate of `peer`, if it has state.
    pub fn current_rate(&self, peer: &P) -> Option<RateIndex> {
        self.stations.get(peer).map(|station| self.rate_control.current_rate(station))
    }

    /// Creates state for `peer`, e.g. on association.
    ///
    /// Fails if the peer's catalog is empty or the algorithm's configuration
    /// does not fit it. Does nothing if the state already exists.
    pub fn add_station(&mut self, peer: P, time: Instant) -> Result<()> {
        let Self { stations, catalog, rate_control, event_sink, .. } = self;
        Self::station_entry(stations, catalog, rate_control, event_sink, &peer, time).map(|_| ())
    }

    /// Forgets `peer`: its adaptation state, its timers and every agreement it holds.
    ///
    /// Returns whether the peer had state.
    pub fn remove_station(&mut self, peer: &P) -> bool {
        self.agreements.retain(|(owner, _), _| owner != peer);
        let removed = self.stations.remove(peer).is_some();
        if removed {
            debug!("Removed station {:?}", peer);
            self.event_sink.send(StationEvent::Removed(peer.clone()));
        }
        removed
    }

    /// Forgets every station and agreement.
    pub fn reset(&mut self) {
        debug!("Resetting {} stations and {} agreements", self.stations.len(), self.agreements.len());
        self.stations.clear();
        self.agreements.clear();
    }

    /// A data frame to `peer` was not acknowledged and will be retried.
    pub fn report_data_failed(&mut self, peer: &P, time: Instant) -> Result<()> {
        self.with_station(peer, time, |rc, station| rc.on_data_failed(station, time))
    }

    /// A data frame to `peer` was acknowledged.
    pub fn report_data_ok(&mut self, peer: &P, ack_snr: f64, time: Instant) -> Result<()> {
        self.with_station(peer, time, |rc, station| rc.on_data_succeeded(station, ack_snr, time))
    }

    /// An RTS to `peer` was not answered and will be retried.
    pub fn report_rts_failed(&mut self, peer: &P, time: Instant) -> Result<()> {
        self.with_station(peer, time, |rc, station| rc.on_rts_failed(station, time))
    }

    /// An RTS to `peer` was answered by a CTS.
    pub fn report_rts_ok(&mut self, peer: &P, cts_snr: f64, time: Instant) -> Result<()> {
        self.with_station(peer, time, |rc, station| rc.on_rts_succeeded(station, cts_snr, time))
    }

    /// A data frame to `peer` ran out of retries.
    pub fn report_final_data_failed(&mut self, peer: &P, time: Instant) -> Result<()> {
        self.with_station(peer, time, |rc, station| rc.on_final_data_failed(station, time))
    }

    /// An RTS to `peer` ran out of retries.
    pub fn report_final_rts_failed(&mut self, peer: &P, time: Instant) -> Result<()> {
        self.with_station(peer, time, |rc, station| rc.on_final_rts_failed(station, time))
    }

    /// Mode for the next data frame of `frame_size` bytes to `peer`.
    pub fn data_mode(&mut self, peer: &P, frame_size: u32, time: Instant) -> Result<C::Mode> {
        let index = self.with_station(peer, time, |rc, station| rc.data_mode(station, frame_size, time))?;
        self.mode(peer, index)
    }

    /// Mode for the next control frame to `peer`.
    pub fn rts_mode(&mut self, peer: &P, time: Instant) -> Result<C::Mode> {
        let index = self.with_station(peer, time, |rc, station| rc.rts_mode(station, time))?;
        self.mode(peer, index)
    }

    /// Returns whether the next data frame of `frame_size` bytes to `peer` should be protected by RTS/CTS.
    pub fn needs_rts(&mut self, peer: &P, frame_size: u32, time: Instant) -> Result<bool> {
        let normally_required = frame_size > self.config.rts_cts_threshold;
        self.with_station(peer, time, |rc, station| rc.needs_rts(station, frame_size, normally_required))
    }

    /// Installs a recipient-side block-ack agreement and starts its inactivity timer.
    ///
    /// An existing agreement for the same peer and TID is replaced. A buffer
    /// size of 0 tracks a window of [`DEFAULT_BLOCK_ACK_WINDOW`].
    pub fn create_agreement(&mut self, mut agreement: BlockAckAgreement<P>, time: Instant) {
        let window_size = match agreement.buffer_size() {
            0 => DEFAULT_BLOCK_ACK_WINDOW,
            size => size,
        };
        let window = BlockAckWindow::new(agreement.starting_sequence(), window_size);
        agreement.restart_inactivity_timer(time);

        let key = (agreement.peer().clone(), agreement.tid());
        debug!(
            "Block-ack agreement with {:?} tid {}: start {} window {} timeout {} TU",
            key.0,
            key.1,
            agreement.starting_sequence(),
            window_size,
            agreement.timeout()
        );
        if self.agreements.insert(key, RecipientAgreement { agreement, window }).is_some() {
            debug!("Replaced an existing block-ack agreement");
        }
    }

    /// Tears down the agreement with `peer` for `tid`.
    pub fn destroy_agreement(&mut self, peer: &P, tid: u8) -> Result<BlockAckAgreement<P>> {
        let removed = self.agreements.remove(&(peer.clone(), tid)).ok_or(ErrorKind::UnknownAgreement)?;
        debug!("Destroyed block-ack agreement with {:?} tid {}", peer, tid);
        Ok(removed.agreement)
    }

    /// Returns the agreement with `peer` for `tid`.
    pub fn agreement(&self, peer: &P, tid: u8) -> Option<&BlockAckAgreement<P>> {
        self.agreements.get(&(peer.clone(), tid)).map(|entry| &entry.agreement)
    }

    /// Returns the delivery window of the agreement with `peer` for `tid`.
    pub fn block_ack_window(&self, peer: &P, tid: u8) -> Option<&BlockAckWindow> {
        self.agreements.get(&(peer.clone(), tid)).map(|entry| &entry.window)
    }

    /// Returns the number of live agreements.
    pub fn agreement_count(&self) -> usize {
        self.agreements.len()
    }

    /// Records that an MPDU with sequence number `seq` arrived under an agreement.
    pub fn notify_mpdu_received(&mut self, peer: &P, tid: u8, seq: SequenceNumber, time: Instant) -> Result<()> {
        if seq >= SEQUENCE_SPACE {
            return Err(InvalidArgumentKind::SequenceNumber(seq).into());
        }
        let entry = self.recipient_mut(peer, tid)?;
        entry.agreement.restart_inactivity_timer(time);
        entry.window.record_delivery(seq);
        Ok(())
    }

    /// Moves the window of an agreement as a block-ack request from `peer` asks.
    pub fn notify_block_ack_request(
        &mut self,
        peer: &P,
        tid: u8,
        starting_sequence: SequenceNumber,
        time: Instant,
    ) -> Result<()> {
        if starting_sequence >= SEQUENCE_SPACE {
            return Err(InvalidArgumentKind::StartingSequence(starting_sequence).into());
        }
        let entry = self.recipient_mut(peer, tid)?;
        entry.agreement.restart_inactivity_timer(time);
        entry.window.record_block_ack_request(starting_sequence);
        Ok(())
    }

    /// Writes the delivery state of an agreement's window into `bitmap`.
    pub fn fill_block_ack(&self, peer: &P, tid: u8, bitmap: &mut BlockAckBitmap) -> Result<()> {
        let entry = self.agreements.get(&(peer.clone(), tid)).ok_or(ErrorKind::UnknownAgreement)?;
        entry.window.render_bitmap(bitmap);
        Ok(())
    }

    /// Earliest instant at which [`StationManager::poll`] has timer work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let stations = self.stations.values().filter_map(|station| self.rate_control.next_deadline(station));
        let agreements = self.agreements.values().filter_map(|entry| entry.agreement.inactivity_deadline());
        stations.chain(agreements).min()
    }

    /// Fires every timer due at `time`.
    ///
    /// Runs periodic rate updates and tears down agreements whose inactivity
    /// timer ran out.
    pub fn poll(&mut self, time: Instant) {
        let Self { stations, rate_control, event_sink, agreements, .. } = self;

        for (peer, station) in stations.iter_mut() {
            if matches!(rate_control.next_deadline(station), Some(deadline) if deadline <= time) {
                let from = rate_control.current_rate(station);
                rate_control.on_timer(station, time);
                Self::notify_rate_change(event_sink, peer, from, rate_control.current_rate(station));
            }
        }

        let expired: Vec<(P, u8)> =
            agreements.iter().filter(|(_, entry)| entry.agreement.is_expired(time)).map(|(key, _)| key.clone()).collect();
        for (peer, tid) in expired {
            agreements.remove(&(peer.clone(), tid));
            warn!("Block-ack agreement with {:?} tid {} timed out", peer, tid);
            event_sink.send(StationEvent::AgreementTimedOut { peer, tid });
        }
    }

    fn recipient_mut(&mut self, peer: &P, tid: u8) -> Result<&mut RecipientAgreement<P>> {
        self.agreements.get_mut(&(peer.clone(), tid)).ok_or(ErrorKind::UnknownAgreement)
    }

    fn mode(&self, peer: &P, index: RateIndex) -> Result<C::Mode> {
        self.catalog.supported_mode(peer, index).ok_or_else(|| {
            InvalidArgumentKind::RateIndex { index, supported: self.catalog.supported_count(peer) }.into()
        })
    }

    /// Runs `f` on the state of `peer`, creating it on first contact, and reports a moved rate.
    fn with_station<T>(&mut self, peer: &P, time: Instant, f: impl FnOnce(&R, &mut R::Station) -> T) -> Result<T> {
        let Self { stations, catalog, rate_control, event_sink, .. } = self;
        let station = Self::station_entry(stations, catalog, rate_control, event_sink, peer, time)?;
        let from = rate_control.current_rate(station);
        let result = f(rate_control, &mut *station);
        Self::notify_rate_change(event_sink, peer, from, rate_control.current_rate(station));
        Ok(result)
    }

    fn station_entry<'a>(
        stations: &'a mut HashMap<P, R::Station>,
        catalog: &C,
        rate_control: &R,
        event_sink: &mut ChannelSink<StationEvent<P>>,
        peer: &P,
        time: Instant,
    ) -> Result<&'a mut R::Station> {
        match stations.entry(peer.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let supported = catalog.supported_count(peer);
                if supported == 0 {
                    warn!("Station {:?} has an empty rate catalog", peer);
                    return Err(InvalidArgumentKind::EmptyCatalog.into());
                }
                if let Err(err) = rate_control.validate(supported) {
                    warn!("Rejected station {:?}: {}", peer, err);
                    return Err(err);
                }
                debug!("Added station {:?} with {} rates", peer, supported);
                event_sink.send(StationEvent::Added(peer.clone()));
                Ok(entry.insert(rate_control.create_station(supported, time)))
            }
        }
    }

    fn notify_rate_change(event_sink: &mut ChannelSink<StationEvent<P>>, peer: &P, from: RateIndex, to: RateIndex) {
        if from != to {
            debug!("Station {:?} rate {} -> {}", peer, from, to);
            event_sink.send(StationEvent::RateChanged { peer: peer.clone(), from, to });
        }
    }
}
