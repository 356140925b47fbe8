//! Drives a station manager over a simulated lossy link and prints rate changes.
//!
//! - cargo run -p airlink --example simulate
//! - cargo run -p airlink --example simulate -- rraa 20 0.3
//!   (RRAA, 20 simulated seconds, 30% loss above 24 Mbps)

use std::{
    env,
    time::{Duration, Instant},
};

use airlink::{Config, MacAddress, RateAlgorithm, StaticRateCatalog, StationEvent, StationManager, OFDM_RATES};
use rand::Rng;

const MAX_ATTEMPTS: u32 = 7;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Args: [algorithm] [seconds] [loss]
    let mut args = env::args().skip(1);
    let algorithm: RateAlgorithm = args.next().unwrap_or_else(|| "aarf".into()).parse()?;
    let seconds: u64 = args.next().unwrap_or_else(|| "10".into()).parse().unwrap_or(10);
    let loss: f64 = args.next().unwrap_or_else(|| "0.5".into()).parse().unwrap_or(0.5);

    let peer = MacAddress::new([0x02, 0, 0, 0, 0, 1]);
    let mut manager = StationManager::new(Config::with_algorithm(algorithm), StaticRateCatalog::ofdm());
    let mut rng = rand::rng();
    println!("airlink simulate: algorithm={} seconds={} loss={}", algorithm, seconds, loss);

    let start = Instant::now();
    let end = start + Duration::from_secs(seconds);
    let mut time = start;
    let (mut delivered, mut dropped) = (0u64, 0u64);

    while time < end {
        let mut sent = false;
        for attempt in 1..=MAX_ATTEMPTS {
            let mode = manager.data_mode(&peer, 1500, time)?;
            let lossy = mode.data_rate > 24_000_000;
            if !lossy || !rng.random_bool(loss) {
                manager.report_data_ok(&peer, 20.0, time)?;
                sent = true;
                break;
            }
            if attempt == MAX_ATTEMPTS {
                manager.report_final_data_failed(&peer, time)?;
            } else {
                manager.report_data_failed(&peer, time)?;
            }
        }
        if sent {
            delivered += 1;
        } else {
            dropped += 1;
        }

        time += Duration::from_millis(1);
        manager.poll(time);

        while let Ok(event) = manager.event_receiver().try_recv() {
            match event {
                StationEvent::Added(addr) => println!("[added] {}", addr),
                StationEvent::RateChanged { peer, from, to } => {
                    println!(
                        "[rate] t={:?} {} {} -> {}",
                        time - start,
                        peer,
                        OFDM_RATES[from].name,
                        OFDM_RATES[to].name
                    );
                }
                StationEvent::Removed(addr) => println!("[removed] {}", addr),
                StationEvent::AgreementTimedOut { peer, tid } => println!("[timeout] {} tid={}", peer, tid),
            }
        }
    }

    println!("delivered={} dropped={}", delivered, dropped);
    Ok(())
}
