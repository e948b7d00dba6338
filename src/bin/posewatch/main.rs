//! PoseWatch entrypoint: runs the pose producer and prints one JSON document per output.
//!
//! Payloads go to stdout so they can be piped into other tools; status changes,
//! the pose-rate summary and errors go to stderr.

mod signals;

use anyhow::Result;
use std::io;
use std::panic;
use std::sync::OnceLock;

use posewatch::config::{load_output_config, save_output_config, AppConfig, OutputConfig};
use posewatch::producer::ChildProducer;
use posewatch::session::format_rate_summary;
use posewatch::telemetry::init_tracing;
use posewatch::viewer::{JsonLinesSink, LoopExit, Viewer};
use posewatch::{init_logging, log_debug, log_debug_content, log_file_path, log_panic};

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            log_panic(info);
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            log_debug(&format!("panic at {location}"));
            log_debug_content(&format!("panic: {info}"));
            previous(info);
        }));
    });
}

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    init_tracing(&config);
    install_panic_hook();
    log_debug("=== PoseWatch Started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let output_config = match &config.output_config {
        Some(path) => load_output_config(path)?,
        None => OutputConfig::default(),
    };
    if let Some(path) = &config.save_output_config {
        let written = save_output_config(&output_config, path)?;
        eprintln!("saved output config to {}", written.display());
    }

    signals::install_shutdown_handlers()?;

    let (program, args) = config.producer_command()?;
    log_debug(&format!("producer command: {program} {}", args.join(" ")));
    let producer = ChildProducer::new(program, args).with_working_dir(config.producer_dir.clone());
    let mut viewer = Viewer::new(producer, output_config, config.watchdog_config())
        .with_poll_hz(config.poll_hz);

    viewer.start(&config.start_config())?;
    eprintln!(
        "waiting for peer over {} (Ctrl-C to stop)",
        config.connection.label()
    );

    let mut sink =
        JsonLinesSink::new(io::stdout(), io::stderr()).with_stop_flag(signals::shutdown_flag());
    let exit = viewer.run_until_exit(&mut sink);
    let stopped = viewer.stop();

    match &exit {
        Ok(LoopExit::ProducerExited(Some(code))) if *code != 0 => {
            eprintln!("producer exited with code {code}");
        }
        Ok(LoopExit::ProducerExited(_)) => eprintln!("producer exited"),
        Ok(LoopExit::Shutdown) if signals::shutdown_requested() => eprintln!("interrupted"),
        Ok(LoopExit::Shutdown) => {}
        Err(_) => {}
    }
    match viewer.machine().rate().summary() {
        Some(summary) => eprintln!("{}", format_rate_summary(&summary)),
        None => eprintln!("poses={}", viewer.machine().rate().poses()),
    }

    log_debug("=== PoseWatch Exiting ===");
    exit?;
    stopped
}
