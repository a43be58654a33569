// Drives a sender through a synthetic bottleneck link and prints the window
// every round trip.
//
// cargo run --example simulate -- --algorithm reno --rounds 100

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use clap::{Parser, ValueEnum};
use cubic_sender::{
    Clock, CongestionControlType, ConnectionState, PacketNumber, RttProvider, SenderOpts,
};
use parking_lot::Mutex;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    Cubic,
    Reno,
}

#[derive(Parser)]
struct Args {
    #[arg(long, value_enum, default_value_t = Algorithm::Cubic)]
    algorithm: Algorithm,

    /// Packets the link holds in flight without queueing.
    #[arg(long, default_value_t = 50)]
    bdp_packets: u64,

    /// Bottleneck queue size. Anything beyond bdp + queue is dropped.
    #[arg(long, default_value_t = 20)]
    queue_packets: u64,

    #[arg(long, default_value_t = 200)]
    rounds: usize,

    #[arg(long, default_value_t = 50)]
    rtt_ms: u64,

    #[arg(long, default_value_t = 1)]
    emulated_connections: u32,

    /// Enable slow start large reduction.
    #[arg(long)]
    sslr: bool,
}

#[derive(Clone)]
struct SimClock(Arc<Mutex<Instant>>);

impl Clock for SimClock {
    fn now(&self) -> Instant {
        *self.0.lock()
    }
}

struct Link {
    min_rtt: Duration,
    largest_sent: Option<PacketNumber>,
    in_recovery: bool,
}

impl RttProvider for Link {
    fn min_rtt(&self) -> Duration {
        self.min_rtt
    }
}

impl ConnectionState for Link {
    fn in_recovery(&self) -> bool {
        self.in_recovery
    }

    fn largest_sent_packet(&self) -> Option<PacketNumber> {
        self.largest_sent
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let clock = SimClock(Arc::new(Mutex::new(Instant::now())));
    let opts = SenderOpts {
        kind: match args.algorithm {
            Algorithm::Cubic => CongestionControlType::Cubic,
            Algorithm::Reno => CongestionControlType::Reno,
        },
        num_emulated_connections: Some(args.emulated_connections),
        max_window_packets: Some(1000),
        slow_start_large_reduction: args.sslr,
        ..Default::default()
    };
    let mss = opts.validate()?.max_segment_size;
    let mut sender = opts.create_sender(clock.clone())?;

    let rtt = Duration::from_millis(args.rtt_ms);
    let capacity = args.bdp_packets + args.queue_packets;
    let mut link = Link {
        min_rtt: rtt,
        largest_sent: None,
        in_recovery: false,
    };
    let mut next_pn = 1u64;
    let mut total_lost = 0;

    for round in 0..args.rounds {
        let window = sender.window_packets();
        let first = next_pn;
        next_pn += window;
        link.largest_sent = Some(PacketNumber(next_pn - 1));

        let delivered = window.min(capacity);
        for i in 0..delivered {
            let pn = PacketNumber(first + i);
            link.in_recovery = Some(pn) <= sender.largest_sent_at_last_cutback();
            if link.in_recovery {
                continue;
            }
            sender.on_packet_acked(pn, (window - i) * mss, &link);
        }
        for i in delivered..window {
            total_lost += 1;
            sender.on_packet_lost(PacketNumber(first + i), mss, (window - i) * mss, &link);
        }

        *clock.0.lock() += rtt;
        info!(
            round,
            window = sender.window_packets(),
            ssthresh = sender.slow_start_threshold_packets(),
            lost = window - delivered,
            "round trip"
        );
    }

    info!(
        total_lost,
        loss_events = sender.stats().loss_events,
        final_window = sender.window_packets(),
        "done"
    );
    Ok(())
}
