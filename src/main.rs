mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ProjectArgs};
use std::path::Path;

use slidereel::project::{ResetTarget, Snapshot};
use slidereel::{config, BuildCoordinator, BuildOptions, RawConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "slidereel=debug,slidereel_av=debug".to_string()
        } else {
            "slidereel=info,slidereel_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build { project, jobs } => build(project, jobs, cli.config.as_deref()),
        Commands::Status { output_dir } => status(&output_dir),
        Commands::ForceReset {
            output_dir,
            segment,
            frame,
            text,
            clear,
        } => {
            let target = match (frame, text) {
                (true, false) => ResetTarget::Frame,
                (false, true) => ResetTarget::Text,
                _ => ResetTarget::Both,
            };
            force_reset(&output_dir, segment, target, !clear)
        }
        Commands::Backends => list_backends(),
        Commands::CheckTools => check_tools(),
        Commands::Version => {
            println!("slidereel {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn build(args: ProjectArgs, jobs: Option<usize>, config_path: Option<&Path>) -> Result<()> {
    let file = config::load_config_or_default(config_path)?;
    let project = config::resolve(file, RawConfig::from(args))?;

    tracing::info!(
        "Building {:?} + {:?} into {:?} with '{}'",
        project.slides,
        project.script,
        project.output_dir,
        project.model
    );

    let coordinator = BuildCoordinator::with_defaults();
    let report = coordinator
        .build(&project, &BuildOptions { jobs })
        .with_context(|| format!("Build of {:?} failed", project.output_dir))?;

    println!("Segments: {}", report.segments);
    println!("Sync: {}", report.sync);
    println!(
        "Rebuilt: {} clip(s), {} synthesized",
        report.rebuilt, report.synthesized
    );
    match report.output {
        Some(ref output) => println!("Output: {}", output.display()),
        None => println!("Everything cached, output unchanged"),
    }

    Ok(())
}

fn status(output_dir: &Path) -> Result<()> {
    let snapshot = Snapshot::load_from_dir(output_dir)?;

    println!("Project: {}", snapshot.name);
    println!("Backend: {}", snapshot.config.model);
    println!("Segments: {}", snapshot.segment_count());
    println!();

    let flag = |cached: bool, force_reset: bool| match (cached, force_reset) {
        (_, true) => "forced",
        (true, false) => "cached",
        (false, false) => "built",
    };

    for (i, (frame, text)) in snapshot
        .frame_items
        .iter()
        .zip(&snapshot.text_items)
        .enumerate()
    {
        print!(
            "  [{:>3}] frame {:<6} text {:<6} {}",
            i + 1,
            flag(frame.cached, frame.force_reset),
            flag(text.cached, text.force_reset),
            frame.content_hash.short()
        );
        if let Some(delay) = text.delay_override() {
            print!("  delay {delay}s");
        }
        println!();
    }

    Ok(())
}

fn force_reset(output_dir: &Path, segment: usize, target: ResetTarget, value: bool) -> Result<()> {
    let mut snapshot = Snapshot::load_from_dir(output_dir)?;
    snapshot.set_force_reset(segment, target, value)?;
    snapshot.save(&output_dir.join(slidereel_common::paths::SNAPSHOT_FILE))?;

    println!(
        "{} force-reset on segment {} ({:?})",
        if value { "Set" } else { "Cleared" },
        segment,
        target
    );
    Ok(())
}

fn list_backends() -> Result<()> {
    let coordinator = BuildCoordinator::with_defaults();
    for name in coordinator.registry().names() {
        println!("{}", name);
    }
    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = slidereel_av::check_tools();
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
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}
