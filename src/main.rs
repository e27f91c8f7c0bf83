use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use track_delay::adapters::{UdpReceiver, UdpSender};
use track_delay::codec::{self, WireFormat};
use track_delay::ports::DataSender;
use track_delay::track::{Clock, SystemClock, TrackData, Vector3, DEFAULT_TICKS_PER_SECOND};
use track_delay::{CalculatorService, Config, ProcessTrackUseCase, TrackCalculations};

#[derive(Parser)]
#[command(name = "track-delay")]
#[command(about = "Delay-compensate track reports and republish them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file
    Validate {
        #[arg(short, long)]
        config: String,
    },
    /// Receive, compensate and republish tracks until interrupted
    Run {
        #[arg(short, long)]
        config: String,
    },
    /// Publish synthetic tracks to a UDP target
    Publish {
        #[arg(short, long)]
        target: SocketAddr,
        #[arg(short = 'n', long, default_value_t = 10)]
        count: u64,
        #[arg(short, long, default_value = "1s", value_parser = humantime::parse_duration)]
        interval: Duration,
        #[arg(short, long, value_enum, default_value_t = WireFormat::Binary)]
        format: WireFormat,
        #[arg(long, default_value = "SIM-1")]
        track_id: String,
        #[arg(long, default_value_t = DEFAULT_TICKS_PER_SECOND)]
        ticks_per_second: i64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Run { config } => run(&config).await,
        Commands::Publish {
            target,
            count,
            interval,
            format,
            track_id,
            ticks_per_second,
        } => {
            publish(target, count, interval, format, &track_id, ticks_per_second).await
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Config is valid");
    match config.multicast() {
        Some((group, interface)) => println!(
            "  receiver: {} ({}, multicast {} on {})",
            config.receiver.bind, config.receiver.format, group, interface
        ),
        None => println!(
            "  receiver: {} ({})",
            config.receiver.bind, config.receiver.format
        ),
    }
    println!(
        "  sender:   {} -> {} ({}, ttl {})",
        config.sender.bind, config.sender.target, config.sender.format, config.sender.multicast_ttl
    );
    println!(
        "  ticks:    {} per second, max timestamp {}",
        config.calculation.ticks_per_second, config.calculation.max_timestamp
    );
    ExitCode::SUCCESS
}

async fn run(path: &str) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut service = match build_service(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to set up service: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = service.start().await {
        eprintln!("Failed to start: {}", e);
        return ExitCode::FAILURE;
    }

    let result = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => log::info!("Interrupted, stopping"),
                Err(e) => log::error!("Failed to listen for Ctrl-C: {}", e),
            }
            service.stop().await
        }
        ended = service.wait() => ended,
    };

    match serde_json::to_string_pretty(&service.status()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("Failed to serialize final status: {}", e),
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Service error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_service(config: &Config) -> Result<CalculatorService, Box<dyn std::error::Error>> {
    let receiver = UdpReceiver::bind(config.receiver_addr()?, config.multicast())?;
    let sender = UdpSender::connect(
        config.sender_bind_addr()?,
        config.sender_target_addr()?,
        config.sender.multicast_ttl,
    )?;

    let use_case = ProcessTrackUseCase::new(
        Box::new(receiver),
        Box::new(sender),
        TrackCalculations::new(config.calculation)?,
    )
    .with_formats(config.receiver.format, config.sender.format)
    .with_receive_timeout(config.receiver.timeout);

    Ok(CalculatorService::new(use_case, config.service.options()))
}

async fn publish(
    target: SocketAddr,
    count: u64,
    interval: Duration,
    format: WireFormat,
    track_id: &str,
    ticks_per_second: i64,
) -> ExitCode {
    if ticks_per_second <= 0 {
        eprintln!("--ticks-per-second must be positive");
        return ExitCode::FAILURE;
    }

    let bind: SocketAddr = if target.is_ipv6() {
        (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
    } else {
        (std::net::Ipv4Addr::UNSPECIFIED, 0).into()
    };
    let mut sender = match UdpSender::connect(bind, target, 1) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open socket: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // straight line along x at 250 m/s
    let velocity = Vector3::new(250.0, 0.0, 0.0);
    let clock = SystemClock::new(ticks_per_second);
    let mut ticker = tokio::time::interval(interval);

    for sequence in 0..count {
        ticker.tick().await;
        let now = clock.now();
        let elapsed = interval.as_secs_f64() * sequence as f64;
        let track = TrackData::new(track_id, velocity * elapsed, now)
            .with_velocity(velocity)
            .with_sent_at(now)
            .with_source("track-delay publish")
            .with_sequence(sequence);

        let payload = match codec::encode_track(format, &track) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Encode error: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = sender.send(payload) {
            eprintln!("Send error: {}", e);
            return ExitCode::FAILURE;
        }
        log::info!("Published {} #{} to {}", track_id, sequence, target);
    }

    ExitCode::SUCCESS
}
