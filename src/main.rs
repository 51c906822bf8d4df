mod cli;

use clipforge::{
    config,
    session::{RunMode, Session},
    terminal::StdConsole,
};
use clipforge_av::{
    check_tools, compute_budget, decompose, probe::probe_with_ffprobe, probe_encoders, Operation,
    PlanState,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "clipforge=debug,clipforge_av=debug".to_string()
        } else {
            "clipforge=warn,clipforge_av=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = dispatch(cli) {
        eprintln!("Error: {:#}", err);
        let code = match err.downcast_ref::<clipforge_av::Error>() {
            Some(e) if e.is_fatal() => 3,
            Some(clipforge_av::Error::ExternalProcessFailed { .. }) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Probe { file, json } => probe_file(&file, cli.config.as_deref(), json),
        Commands::Encoders { no_verify, json } => {
            show_encoders(cli.config.as_deref(), no_verify, json)
        }
        Commands::CheckTools => check_external_tools(cli.config.as_deref()),
        Commands::SpeedPlan { factor } => speed_plan(factor),
        Commands::Budget {
            size_mb,
            duration,
            audio_kbps,
        } => budget(size_mb, duration, audio_kbps),
        Commands::Run {
            input,
            output,
            yes,
            dry_run,
            operation,
        } => run_operation(
            &input,
            output.as_deref(),
            operation.into(),
            cli.config.as_deref(),
            RunMode {
                dry_run,
                assume_yes: yes,
            },
        ),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("clipforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_operation(
    input: &Path,
    output: Option<&Path>,
    operation: Operation,
    config_path: Option<&Path>,
    mode: RunMode,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let mut session = Session::new(config);
    let mut console = StdConsole::new();

    let report = session
        .run(input, &operation, output, &mut console, mode)
        .with_context(|| format!("{} failed for {}", operation, input.display()))?;

    match report {
        None => println!("\n[DRY RUN] Nothing was executed"),
        Some(report) if report.state == PlanState::Declined => println!("Cancelled"),
        Some(report) => {
            println!("\nDone.");
            if let Some(mb) = report.output_size_mb() {
                println!("Output size: {:.2} MB", mb);
            }
        }
    }

    Ok(())
}

fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let session = Session::new(config);
    let media = probe_with_ffprobe(session.ffprobe(), file, session.config().probe.classification)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&media)?);
        return Ok(());
    }

    println!("File: {}", media.path.display());
    println!("Kind: {}", media.kind);
    println!("Size: {} bytes", media.file_size);
    if let Some(duration) = media.duration_display() {
        println!("Duration: {}", duration);
    }
    if let Some(ref codec) = media.video_codec {
        match media.resolution {
            Some(res) => println!("Video: {} {}", codec, res),
            None => println!("Video: {}", codec),
        }
    }
    if let Some(ref codec) = media.audio_codec {
        println!("Audio: {}", codec);
    }
    for warning in &media.warnings {
        println!("Warning: {}", warning);
    }

    Ok(())
}

fn show_encoders(config_path: Option<&Path>, no_verify: bool, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let session = Session::new(config);
    let mut options = session.config().encoder_probe_options();
    if no_verify {
        options.verify = false;
    }

    let capability = probe_encoders(session.ffmpeg(), &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&capability)?);
    } else if capability.available {
        println!("Hardware encoder: {}", capability.display_name);
        println!("  H.264: {}", capability.encoder_id);
        println!("  HEVC:  {}", capability.hevc_encoder_id);
    } else {
        println!("No hardware encoder available; software encoding only");
    }

    Ok(())
}

fn check_external_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let session = Session::new(config);

    println!("Checking external tools...\n");

    let tools = check_tools(session.ffmpeg(), session.ffprobe());
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to use clipforge.");
    }

    Ok(())
}

fn speed_plan(factor: f64) -> Result<()> {
    let plan = decompose(factor)?;
    let stages: Vec<String> = plan.stages().iter().map(|s| s.to_string()).collect();
    println!("Stages: {}", stages.join(" x "));
    println!("Audio:  {}", plan.atempo_chain());
    println!("Video:  {}", plan.setpts_filter());
    Ok(())
}

fn budget(size_mb: u64, duration: std::time::Duration, audio_kbps: u32) -> Result<()> {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    let budget = compute_budget(size_mb, secs, audio_kbps)?;
    println!("Total: {} kbps", budget.total_bitrate_kbps);
    println!("Audio: {} kbps", budget.audio_bitrate_kbps);
    println!("Video: {} kbps", budget.video_bitrate_kbps);
    println!("(estimate; container overhead is not included)");
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_config(&config::Config::default());
        }
    }

    Ok(())
}

fn print_config(config: &config::Config) {
    println!("  Audio bitrate: {} kbps", config.encoding.audio_bitrate_kbps);
    println!("  CRF: {} ({})", config.encoding.default_crf, config.encoding.preset);
    println!("  Hardware encoding: {}", config.hardware.enabled);
    println!("  Classification: {:?}", config.probe.classification);
}
