//! Rate catalog contract.
//!
//! A catalog is the ordered list of transmission modes a station supports,
//! lowest (most robust, slowest) first. The rate-adaptation engine never
//! builds or mutates a catalog; it only picks an index into it.

use std::{collections::HashMap, fmt::Debug, hash::Hash};

/// Index into a station's rate catalog. `0` is the most robust rate.
pub type RateIndex = usize;

/// Returns the next higher rate, saturating at the top of a catalog of
/// `supported` rates.
#[inline]
pub fn increase(rate: RateIndex, supported: usize) -> RateIndex {
    if rate + 1 < supported {
        rate + 1
    } else {
        rate
    }
}

/// Returns the next lower rate, saturating at `0`.
#[inline]
pub fn decrease(rate: RateIndex) -> RateIndex {
    rate.saturating_sub(1)
}

/// Returns the rate `steps` below `rate`, saturating at `0`.
#[inline]
pub fn decrease_by(rate: RateIndex, steps: usize) -> RateIndex {
    rate.saturating_sub(steps)
}

/// Source of the per-station ordered mode list.
///
/// This trait lets the host plug in whatever learned the peer's capabilities
/// (association, probing, static provisioning) without coupling the engine
/// to it.
pub trait RateCatalog<P> {
    /// Mode type handed back to the MAC layer.
    type Mode: Clone + Debug;

    /// Returns the number of modes `peer` supports.
    fn supported_count(&self, peer: &P) -> usize;

    /// Returns the mode at `index` for `peer`, or `None` if out of range.
    fn supported_mode(&self, peer: &P, index: RateIndex) -> Option<Self::Mode>;
}

/// A transmission mode: a named modulation/coding pair and its data rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WifiMode {
    /// Human-readable name, e.g. `"OfdmRate6Mbps"`.
    pub name: &'static str,
    /// Data rate in bits per second.
    pub data_rate: u64,
}

impl WifiMode {
    /// Creates a new mode.
    pub const fn new(name: &'static str, data_rate: u64) -> Self {
        Self { name, data_rate }
    }
}

/// The eight mandatory and optional OFDM rates of the 5 GHz PHY, ascending.
pub const OFDM_RATES: [WifiMode; 8] = [
    WifiMode::new("OfdmRate6Mbps", 6_000_000),
    WifiMode::new("OfdmRate9Mbps", 9_000_000),
    WifiMode::new("OfdmRate12Mbps", 12_000_000),
    WifiMode::new("OfdmRate18Mbps", 18_000_000),
    WifiMode::new("OfdmRate24Mbps", 24_000_000),
    WifiMode::new("OfdmRate36Mbps", 36_000_000),
    WifiMode::new("OfdmRate48Mbps", 48_000_000),
    WifiMode::new("OfdmRate54Mbps", 54_000_000),
];

/// Map-backed catalog with a fallback mode list for peers never provisioned.
#[derive(Debug, Clone)]
pub struct StaticRateCatalog<P: Eq + Hash, M> {
    default_modes: Vec<M>,
    stations: HashMap<P, Vec<M>>,
}

impl<P: Eq + Hash, M: Clone + Debug> StaticRateCatalog<P, M> {
    /// Creates a catalog where every unknown peer supports `default_modes`.
    pub fn new(default_modes: Vec<M>) -> Self {
        Self { default_modes, stations: HashMap::new() }
    }

    /// Records the modes `peer` advertised.
    pub fn set_supported(&mut self, peer: P, modes: Vec<M>) {
        self.stations.insert(peer, modes);
    }

    /// Forgets the modes recorded for `peer`.
    pub fn remove(&mut self, peer: &P) -> Option<Vec<M>> {
        self.stations.remove(peer)
    }

    fn modes(&self, peer: &P) -> &[M] {
        self.stations.get(peer).map(Vec::as_slice).unwrap_or(&self.default_modes)
    }
}

impl<P: Eq + Hash> StaticRateCatalog<P, WifiMode> {
    /// Catalog defaulting to [`OFDM_RATES`].
    pub fn ofdm() -> Self {
        Self::new(OFDM_RATES.to_vec())
    }
}

impl<P: Eq + Hash, M: Clone + Debug> RateCatalog<P> for StaticRateCatalog<P, M> {
    type Mode = M;

    fn supported_count(&self, peer: &P) -> usize {
        self.modes(peer).len()
    }

    fn supported_mode(&self, peer: &P, index: RateIndex) -> Option<M> {
        self.modes(peer).get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increase_saturates_at_top() {
        assert_eq!(increase(0, 8), 1);
        assert_eq!(increase(6, 8), 7);
        assert_eq!(increase(7, 8), 7);
        assert_eq!(increase(0, 1), 0);
    }

    #[test]
    fn test_decrease_saturates_at_zero() {
        assert_eq!(decrease(3), 2);
        assert_eq!(decrease(0), 0);
        assert_eq!(decrease_by(5, 3), 2);
        assert_eq!(decrease_by(1, 3), 0);
    }

    #[test]
    fn test_static_catalog_fallback_and_override() {
        let mut catalog: StaticRateCatalog<u32, WifiMode> = StaticRateCatalog::ofdm();
        assert_eq!(catalog.supported_count(&1), 8);
        assert_eq!(catalog.supported_mode(&1, 0), Some(OFDM_RATES[0]));
        assert_eq!(catalog.supported_mode(&1, 8), None);

        catalog.set_supported(2, OFDM_RATES[..3].to_vec());
        assert_eq!(catalog.supported_count(&2), 3);
        assert_eq!(catalog.supported_mode(&2, 2).map(|m| m.data_rate), Some(12_000_000));

        catalog.remove(&2);
        assert_eq!(catalog.supported_count(&2), 8);
    }
}
