use crate::{
    backend::{GoogleBackend, OpenAiBackend},
    batch_plan::BatchPlan,
    config::Config,
    extract,
    pipeline::{NoProgress, Outcome, Pipeline},
    render,
    util::{ensure_dir, now_display, output_filename, today_ymd},
};
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "dualtrans.toml";

#[derive(Parser, Debug)]
#[command(name = "dualtrans")]
#[command(about = "Translate a DOCX/PDF/web page with two backends and compare side by side")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./dualtrans.toml if present, else defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Paragraphs per prompt for the batch backend.
    #[arg(long, global = true)]
    pub batch_size: Option<usize>,

    /// Concurrent per-paragraph requests.
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Attempts per paragraph before giving up.
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Print the effective config as TOML before running.
    #[arg(long, global = true)]
    pub dump_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print extracted paragraphs as JSON.
    Extract {
        #[arg(long)]
        input: String,
    },
    /// Print how the paragraphs would be split into prompt batches.
    Plan {
        #[arg(long)]
        input: String,
    },
    /// Extract, translate with both backends, write the comparison document.
    Run {
        #[arg(long)]
        input: String,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Write the default config file.
    InitConfig {
        #[arg(long, default_value = DEFAULT_CONFIG)]
        path: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    if let Command::InitConfig { path, force } = &args.cmd {
        return init_config(path, *force);
    }

    let cfg = load_config(&args)?;
    if args.dump_config {
        println!("{}", cfg.to_toml());
    }

    match &args.cmd {
        Command::Extract { input } => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            extract_cmd(&cfg, input)
        }
        Command::Plan { input } => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            plan(&cfg, input)
        }
        Command::Run { input, out_dir } => run(&args, &cfg, input, out_dir.as_deref()),
        Command::InitConfig { .. } => Ok(()),
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    if let Some(n) = args.batch_size {
        cfg.translation.batch_size = n;
    }
    if let Some(n) = args.concurrency {
        cfg.translation.concurrency = n;
    }
    if let Some(n) = args.max_attempts {
        cfg.translation.max_attempts = n;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from(DEFAULT_CONFIG);
    default.exists().then_some(default)
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    std::fs::write(path, Config::default().to_toml())
        .with_context(|| format!("write config: {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn extract_cmd(cfg: &Config, input: &str) -> Result<()> {
    let paragraphs = extract::extract_paragraphs(&cfg.extract, input)?;
    println!("{}", serde_json::to_string_pretty(&paragraphs)?);
    Ok(())
}

fn plan(cfg: &Config, input: &str) -> Result<()> {
    let paragraphs = extract::extract(&cfg.extract, input)?;
    let plan = BatchPlan::new(paragraphs.len(), cfg.translation.batch_size);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn run(args: &Args, cfg: &Config, input: &str, out_override: Option<&Path>) -> Result<()> {
    let out_dir = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.output.out_dir));
    ensure_dir(&out_dir)?;

    let log_path = resolve_log_path(cfg, Some(&out_dir));
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    let google = GoogleBackend::new(cfg)?;
    let openai = OpenAiBackend::new(cfg)?;
    let pipeline = Pipeline::new(cfg, google, openai);

    let mut output = match pipeline.run_job(input, &NoProgress)? {
        Outcome::Empty => {
            warn!("no text could be extracted from {input}; nothing to translate");
            if cfg.output.print_summary {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "source": input,
                        "status": "empty",
                    }))?
                );
            }
            return Ok(());
        }
        Outcome::Done(output) => output,
    };

    if cfg.output.write_docx {
        let name = output_filename(input, &today_ymd());
        let path = out_dir.join(&name);
        render::write_docx(&path, &output.table, &now_display())?;
        info!("wrote {}", path.display());
        output.report.output_file = Some(name);
    }

    if cfg.output.write_report_json {
        std::fs::write(
            out_dir.join(&cfg.output.report_filename),
            serde_json::to_string_pretty(&output.report)?,
        )?;
    }

    if cfg.output.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "source": input,
                "out_dir": out_dir,
                "output_file": output.report.output_file,
                "paragraphs": output.report.paragraph_count,
                "failed_units": output.report.unit.failed_units,
                "failed_batch_cells": output.report.batch.failed_cells,
                "status": "ok"
            }))?
        );
    }

    Ok(())
}

fn resolve_log_path(cfg: &Config, out_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    let dir = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&cfg.output.out_dir));
    Some(dir.join("dualtrans.log"))
}
