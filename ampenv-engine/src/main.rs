use ampenv_engine::{
    Engine, EngineConfig, RunStatus, SearchStrategy, SimulationParameters, TerminationMode,
};
use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Safe-operating-envelope simulator for power-switching devices
#[derive(Parser)]
#[command(name = "ampenv", version)]
struct Cli {
    /// Simulation parameters file (TOML, or JSON with a .json extension)
    params: PathBuf,

    /// Override the search strategy (linear | bisection)
    #[arg(long)]
    strategy: Option<String>,

    /// Override the termination mode (first-to-fail | temperature | budget)
    #[arg(long)]
    mode: Option<String>,

    /// Override the linear sweep step count
    #[arg(long)]
    steps: Option<u32>,

    /// Engine tuning configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print each delivered sample while the run streams
    #[arg(long)]
    watch: bool,

    /// Emit the final result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let mut params = load_params(&cli.params)?;
    apply_cli_overrides(&mut params, &cli)?;

    // Poll at the render rate, but never slower than the delivery tick; the
    // drainer enforces the actual delivery cadence.
    let frame_period = Duration::from_secs_f64(1.0 / f64::from(config.render_rate_hz.max(1)));
    let poll_period = frame_period.min(config.delivery_tick());

    let mut engine = Engine::new(config);
    let mut handle = engine.start(params).await?;

    let mut poll_interval = tokio::time::interval(poll_period);
    let mut result = None;

    loop {
        poll_interval.tick().await;

        if let Some(point) = handle.poll(Instant::now()) {
            if cli.watch {
                println!(
                    "{:>9.3} A  {:>8.2} °C  {:>8.3} W  {:>6.1} %",
                    point.current_a, point.temperature_c, point.total_loss_w, point.progress
                );
            }
        }

        if result.is_none() {
            if let Some(completed) = handle.try_complete() {
                result = Some(completed?);
            }
        }

        // Let the stream drain before printing the summary
        if result.is_some() && handle.backlog() == 0 {
            break;
        }
    }

    let result = result.expect("loop exits only after completion");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let verdict = match result.status {
            RunStatus::Success => "OK",
            RunStatus::Failure => "NO SAFE OPERATING POINT",
        };
        println!("{}: {}", verdict, result.detail);
        println!(
            "  max safe current: {:.2} A   junction: {:.1} °C   loss: {:.2} W \
             (conduction {:.2} W, switching {:.2} W)",
            result.max_safe_current_a,
            result.final_temperature_c,
            result.total_loss_w,
            result.conduction_loss_w,
            result.switching_loss_w,
        );
        if let Some(reason) = result.failure_reason {
            println!("  binding limit: {}", reason);
        }
        if !result.converged {
            println!("  note: iteration budget exhausted before tolerance; best bound reported");
        }
    }

    Ok(())
}

fn load_params(path: &PathBuf) -> anyhow::Result<SimulationParameters> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading parameters from {}", path.display()))?;

    let params = if path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&text)
            .with_context(|| format!("parsing JSON parameters from {}", path.display()))?
    } else {
        toml::from_str(&text)
            .with_context(|| format!("parsing TOML parameters from {}", path.display()))?
    };

    Ok(params)
}

fn apply_cli_overrides(params: &mut SimulationParameters, cli: &Cli) -> anyhow::Result<()> {
    if let Some(s) = &cli.strategy {
        params.strategy = match SearchStrategy::from_str(s) {
            Some(strategy) => strategy,
            None => bail!("unknown strategy '{}' (expected linear | bisection)", s),
        };
    }
    if let Some(m) = &cli.mode {
        params.termination = match TerminationMode::from_str(m) {
            Some(mode) => mode,
            None => bail!(
                "unknown termination mode '{}' (expected first-to-fail | temperature | budget)",
                m
            ),
        };
    }
    if let Some(steps) = cli.steps {
        params.sweep_steps = steps;
    }
    Ok(())
}
