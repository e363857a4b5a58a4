//! Cardbleed CLI - control-image driven pixel reconstruction
//!
//! Processes a single image from command line flags, or a whole batch from a
//! TOML pipeline file. Set `RUST_LOG=debug` for per-stage logging.

use anyhow::{bail, Context, Result};
use cardbleed::prelude::*;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        return;
    }

    let result = match args[1].as_str() {
        "list" => {
            list_stages();
            Ok(())
        }
        "info" => match args.get(2) {
            Some(id) => stage_info(id),
            None => Err(anyhow::anyhow!("Please specify a stage ID")),
        },
        "process" => {
            if args.len() < 4 {
                eprintln!(
                    "Usage: {} process <input> <output> [--sides <control>] [--corners <control>] [--bleed <px>]",
                    args[0]
                );
                std::process::exit(2);
            }
            process_image(&args[2..])
        }
        "run" => match args.get(2) {
            Some(path) => run_config(Path::new(path)),
            None => Err(anyhow::anyhow!("Please specify a pipeline file")),
        },
        "help" | "--help" | "-h" => {
            print_usage(&args[0]);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage(&args[0]);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("❌ {:#}", e);
        let fix = e
            .downcast_ref::<BleedError>()
            .and_then(|err| err.suggested_fix())
            .or_else(|| match e.downcast_ref::<BatchError>() {
                Some(BatchError::ItemFailed { error, .. }) => error.suggested_fix(),
                _ => None,
            });
        if let Some(fix) = fix {
            eprintln!("   hint: {}", fix);
        }
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    println!("Cardbleed v{}", cardbleed::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  list                          List all available stages");
    println!("  info <stage>                  Show detailed info about a stage");
    println!("  process <in> <out> [options]  Process one image");
    println!("  run <pipeline.toml>           Process every job in a pipeline file");
    println!("  help                          Show this help message");
    println!();
    println!("Process options (applied in this order):");
    println!("  --sides <control>    Extend sides as marked in the control image");
    println!("  --corners <control>  Rebuild corners as marked in the control image");
    println!("  --bleed <px>         Add mirrored bleed");
    println!("  --solid <px>         Add solid bleed instead of mirrored");
    println!("  --color <hex>        Solid bleed color (default: #000000)");
}

fn list_stages() {
    let registry = StageRegistry::with_builtins();
    println!("Available stages ({} total):", registry.len());
    println!();

    for (category, stages) in registry.grouped_by_category() {
        println!("  📁 {}", category);
        for metadata in stages {
            println!("      • {} - {}", metadata.id, metadata.description);
        }
        println!();
    }
}

fn stage_info(id: &str) -> Result<()> {
    let registry = StageRegistry::with_builtins();
    let metadata = registry
        .get_metadata(id)
        .ok_or_else(|| ConfigError::UnknownStage(id.to_string()))
        .context("Use 'list' to see available stages")?;

    println!("Stage: {}", metadata.name);
    println!("ID: {}", metadata.id);
    println!("Category: {}", metadata.category);
    println!();
    println!("Description:");
    println!("  {}", metadata.description);
    println!();

    if !metadata.parameters.is_empty() {
        println!("Parameters:");
        for param in &metadata.parameters {
            match &param.default_value {
                Some(default) => println!("  • {} = {}", param.name, default),
                None => println!("  • {} (required)", param.name),
            }
            println!("    {}", param.description);
        }
    }
    Ok(())
}

fn process_image(args: &[String]) -> Result<()> {
    let input_path = PathBuf::from(&args[0]);
    let output_path = PathBuf::from(&args[1]);

    let mut sides: Option<PathBuf> = None;
    let mut corners: Option<PathBuf> = None;
    let mut bleed: Option<u32> = None;
    let mut solid: Option<u32> = None;
    let mut color = Color::BLACK;

    let mut i = 2;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--sides", Some(v)) => sides = Some(PathBuf::from(v)),
            ("--corners", Some(v)) => corners = Some(PathBuf::from(v)),
            ("--bleed", Some(v)) => {
                bleed = Some(v.parse().with_context(|| format!("Invalid padding: {}", v))?)
            }
            ("--solid", Some(v)) => {
                solid = Some(v.parse().with_context(|| format!("Invalid padding: {}", v))?)
            }
            ("--color", Some(v)) => {
                color = Color::from_hex(v).map_err(|e| anyhow::anyhow!("Invalid color {}: {}", v, e))?
            }
            (flag, _) => bail!("Unknown or incomplete option: {}", flag),
        }
        i += 2;
    }
    if bleed.is_some() && solid.is_some() {
        bail!("--bleed and --solid cannot be combined");
    }

    let mut cache = ControlCache::new();
    let mut pipeline = Pipeline::new();
    if let Some(path) = sides {
        pipeline.push(Box::new(ExtendSides::new(cache.get_or_load(&path)?)));
    }
    if let Some(path) = corners {
        pipeline.push(Box::new(ExtendCorners::new(cache.get_or_load(&path)?)));
    }
    if let Some(padding) = bleed {
        pipeline.push(Box::new(MirrorBleed::new(padding)));
    }
    if let Some(padding) = solid {
        pipeline.push(Box::new(SolidBleed::new(padding, color)));
    }
    if pipeline.is_empty() {
        bail!("Nothing to do: give at least one of --sides, --corners, --bleed or --solid");
    }

    println!(
        "⚙️  Processing {} -> {} ({})",
        input_path.display(),
        output_path.display(),
        pipeline.stage_ids().join(", ")
    );
    let runner = BatchRunner::new(pipeline).with_parallel(false);
    let stats = runner.process(&BatchJob::new(&input_path, &output_path))?;
    println!(
        "✅ {}x{} -> {}x{} in {}ms",
        stats.input_size.0,
        stats.input_size.1,
        stats.output_size.0,
        stats.output_size.1,
        stats.duration_ms
    );
    Ok(())
}

fn run_config(path: &Path) -> Result<()> {
    let config = PipelineConfig::load(path)?;
    let jobs = BatchJob::from_config(&config)?;
    let runner = BatchRunner::from_config(&config)?;

    println!(
        "⚙️  {} images through {}",
        jobs.len(),
        runner.pipeline().stage_ids().join(" -> ")
    );

    let progress = |update: ProgressUpdate| match update {
        ProgressUpdate::ImageCompleted {
            path, index, total, ..
        } => println!("   • [{}/{}] {}", index, total, path.display()),
        ProgressUpdate::ImageFailed { path, message } => {
            eprintln!("   ⚠️  {}: {}", path.display(), message)
        }
        _ => {}
    };
    let tracker = ProgressTracker::new(jobs.len()).with_callback(Box::new(progress));

    let report = runner.run_with_progress(&jobs, &tracker)?;
    println!(
        "✅ {} written, {} failed in {}ms",
        report.succeeded.len(),
        report.failed.len(),
        report.duration_ms
    );
    report.into_result()?;
    Ok(())
}
