use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use log::{error, info, warn};
use pity_sim::config::{validate_cost_per_pull, AppConfig, GachaSystemConfig, SimParams};
use pity_sim::distribution::build_distribution;
use pity_sim::engine::{MonteCarloEngine, SimulationBatch};
use pity_sim::error::Result;
use pity_sim::i18n::{I18n, Language};
use pity_sim::presets::{find_preset, GAME_PRESETS};
use pity_sim::report::{self, JsonReport, RunInfo};
use pity_sim::rng::Rng;
use pity_sim::stats::{compute_summary, SummaryStats};
use pity_sim::worker::TrialWorker;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "data/config.json")]
    config: PathBuf,

    /// Random seed (optional, random when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Built-in preset by name prefix or 1-based index
    #[arg(short, long)]
    preset: Option<String>,

    #[command(flatten)]
    banner: BannerOverrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(ClapArgs, Default)]
struct BannerOverrides {
    /// Success probability at pull 1 (e.g. 0.008)
    #[arg(long)]
    base_rate: Option<f64>,
    /// Pity count after which the rate escalates
    #[arg(long)]
    soft_pity_start: Option<u32>,
    /// Probability added per pull past soft pity
    #[arg(long)]
    soft_pity_increment: Option<f64>,
    /// Pity count that forces a success
    #[arg(long)]
    hard_pity: Option<u32>,
    /// Cumulative pulls that force the featured outcome
    #[arg(long)]
    featured_guarantee: Option<u32>,
    /// Enable or disable the 50/50 gate
    #[arg(long)]
    fifty_fifty: Option<bool>,
}

impl BannerOverrides {
    fn is_empty(&self) -> bool {
        self.base_rate.is_none()
            && self.soft_pity_start.is_none()
            && self.soft_pity_increment.is_none()
            && self.hard_pity.is_none()
            && self.featured_guarantee.is_none()
            && self.fifty_fifty.is_none()
    }

    fn apply(&self, mut config: GachaSystemConfig) -> GachaSystemConfig {
        if let Some(v) = self.base_rate {
            config.base_rate = v;
        }
        if let Some(v) = self.soft_pity_start {
            config.soft_pity_start = v;
        }
        if let Some(v) = self.soft_pity_increment {
            config.soft_pity_increment = v;
        }
        if let Some(v) = self.hard_pity {
            config.hard_pity = v;
        }
        if let Some(v) = self.featured_guarantee {
            config.featured_guarantee = v;
        }
        if let Some(v) = self.fifty_fifty {
            config.has_fifty_fifty = v;
        }
        config
    }
}

#[derive(ClapArgs, Clone, Default)]
struct RunArgs {
    /// Number of independent trials
    #[arg(short = 'n', long)]
    count: Option<usize>,
    /// Pulls currently saved up
    #[arg(long)]
    stash: Option<u32>,
    /// Cost of a single pull
    #[arg(long)]
    cost: Option<f64>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Run a batch and print the report (default)
    Simulate(RunArgs),
    /// Run a batch, then adjust stash and cost without re-simulating
    Interactive(RunArgs),
    /// List the built-in presets
    Presets,
}

struct Session {
    lang: Language,
    banner_name: Option<&'static str>,
    params: SimParams,
    seed: u64,
    stash: u32,
    cost_per_pull: f64,
    format: OutputFormat,
}

fn resolve_banner(args: &Args, config: &AppConfig) -> Result<(GachaSystemConfig, Option<&'static str>)> {
    let (base, name) = match &args.preset {
        Some(query) => {
            let preset = find_preset(query)?;
            (preset.config.clone(), Some(preset.name))
        }
        None => {
            let name = GAME_PRESETS
                .iter()
                .find(|p| p.config == config.banner)
                .map(|p| p.name);
            (config.banner.clone(), name)
        }
    };
    if args.banner.is_empty() {
        Ok((base, name))
    } else {
        Ok((args.banner.apply(base), None))
    }
}

fn run_batch(session: &Session, engine: &MonteCarloEngine) -> Result<SimulationBatch> {
    for issue in session.params.config.ordering_issues() {
        warn!("Banner rules look inverted: {}", issue);
    }
    let start = Instant::now();
    let batch = engine.run(&session.params, session.seed)?;
    let elapsed = start.elapsed();
    info!("Simulated {} trials in {:.2?}", batch.len(), elapsed);

    let dist = build_distribution(&batch.pulls());
    let stats = compute_summary(&batch, session.stash, session.cost_per_pull);

    match session.format {
        OutputFormat::Json => {
            let report = JsonReport {
                banner: session.banner_name,
                config: &session.params.config,
                sim_count: session.params.sim_count,
                seed: session.seed,
                stash: session.stash,
                cost_per_pull: session.cost_per_pull,
                summary: stats.as_ref(),
                pdf: &dist.pdf,
                cdf: &dist.cdf,
            };
            println!("{}", report.to_json()?);
        }
        OutputFormat::Text => {
            let run = RunInfo {
                banner_name: session.banner_name,
                params: &session.params,
                seed: session.seed,
                threads: engine.thread_count(),
                elapsed,
            };
            println!("{}", report::render_header(session.lang, &run));
            println!("{}", report::render_summary(session.lang, stats.as_ref(), session.stash));
            println!("{}", report::render_distribution(session.lang, &dist, session.stash));
        }
    }
    Ok(batch)
}

enum Prompted<T> {
    Keep,
    Value(T),
    Quit,
}

fn prompt<T: FromStr>(lang: Language, key: &str) -> Result<Prompted<T>> {
    print!("{}", I18n::get(lang, key));
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(Prompted::Quit);
    }
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Ok(Prompted::Quit);
    }
    if input.is_empty() {
        return Ok(Prompted::Keep);
    }
    match input.parse::<T>() {
        Ok(v) => Ok(Prompted::Value(v)),
        Err(_) => {
            println!("{}", I18n::get(lang, "invalid_input"));
            Ok(Prompted::Keep)
        }
    }
}

fn run_interactive(mut session: Session, batch: &SimulationBatch) -> Result<()> {
    let Some(mut stats) = compute_summary(batch, session.stash, session.cost_per_pull) else {
        return Ok(());
    };
    loop {
        match prompt::<u32>(session.lang, "prompt_stash")? {
            Prompted::Quit => break,
            Prompted::Value(v) => session.stash = v,
            Prompted::Keep => {}
        }
        match prompt::<f64>(session.lang, "prompt_cost")? {
            Prompted::Quit => break,
            Prompted::Value(v) => match validate_cost_per_pull(v) {
                Ok(cost) => session.cost_per_pull = cost,
                Err(_) => println!("{}", I18n::get(session.lang, "invalid_input")),
            },
            Prompted::Keep => {}
        }
        stats = stats.with_budget(batch, session.stash, session.cost_per_pull);
        println!("{}", render_budget(&session, &stats));
    }
    println!("{}", I18n::get(session.lang, "exit_msg"));
    Ok(())
}

fn render_budget(session: &Session, stats: &SummaryStats) -> String {
    report::render_summary(session.lang, Some(stats), session.stash)
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(&args.config)?;
    let lang = Language::from_config(&config);

    let command = args
        .command
        .clone()
        .unwrap_or_else(|| Commands::Simulate(RunArgs::default()));
    let (run_args, interactive) = match command {
        Commands::Presets => {
            println!("{}", report::render_presets(lang));
            return Ok(());
        }
        Commands::Simulate(run_args) => (run_args, false),
        Commands::Interactive(run_args) => (run_args, true),
    };

    let (banner, banner_name) = resolve_banner(&args, &config)?;
    let params = SimParams::new(banner, run_args.count.unwrap_or(config.sim_count));
    params.validate()?;

    let cost_per_pull = validate_cost_per_pull(run_args.cost.unwrap_or(config.cost_per_pull))?;

    let seed = args.seed.unwrap_or_else(|| Rng::from_entropy().next_u64());
    let session = Session {
        lang,
        banner_name,
        params,
        seed,
        stash: run_args.stash.unwrap_or(config.stash),
        cost_per_pull,
        format: if interactive { OutputFormat::Text } else { run_args.format },
    };

    let engine = MonteCarloEngine::new(TrialWorker::new_with_config(&config)?);
    let batch = run_batch(&session, &engine)?;

    if interactive {
        run_interactive(session, &batch)?;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["pity-sim"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn default_banner_is_recognised_as_preset() {
        let (banner, name) = resolve_banner(&args(&[]), &AppConfig::default()).unwrap();
        assert_eq!(banner, GAME_PRESETS[0].config);
        assert_eq!(name, Some("Arknights: Endfield"));
    }

    #[test]
    fn overrides_make_banner_custom() {
        let (banner, name) =
            resolve_banner(&args(&["--preset", "2", "--hard-pity", "85"]), &AppConfig::default()).unwrap();
        assert_eq!(banner.hard_pity, 85);
        assert_eq!(banner.soft_pity_start, 74);
        assert_eq!(name, None);
    }

    #[test]
    fn every_override_reaches_the_banner() {
        let parsed = args(&[
            "--base-rate",
            "0.02",
            "--soft-pity-start",
            "50",
            "--soft-pity-increment",
            "0.1",
            "--hard-pity",
            "70",
            "--featured-guarantee",
            "140",
            "--fifty-fifty",
            "false",
        ]);
        let banner = parsed.banner.apply(GachaSystemConfig::default());
        assert_eq!(
            banner,
            GachaSystemConfig {
                base_rate: 0.02,
                soft_pity_start: 50,
                soft_pity_increment: 0.1,
                hard_pity: 70,
                featured_guarantee: 140,
                has_fifty_fifty: false,
            }
        );
        let untouched = args(&[]).banner.apply(GachaSystemConfig::default());
        assert_eq!(untouched, GachaSystemConfig::default());
    }

    #[test]
    fn negative_cost_flag_is_rejected() {
        let parsed = args(&["simulate", "--cost=-2.5"]);
        let cost = match parsed.command {
            Some(Commands::Simulate(run)) => run.cost,
            _ => None,
        };
        assert_eq!(cost, Some(-2.5));
        assert!(validate_cost_per_pull(-2.5).is_err());
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert!(resolve_banner(&args(&["--preset", "nope"]), &AppConfig::default()).is_err());
    }

    #[test]
    fn subcommand_run_args_parse() {
        let parsed = args(&["--seed", "7", "simulate", "-n", "500", "--stash", "90", "--format", "json"]);
        assert_eq!(parsed.seed, Some(7));
        match parsed.command {
            Some(Commands::Simulate(run)) => {
                assert_eq!(run.count, Some(500));
                assert_eq!(run.stash, Some(90));
                assert!(run.format == OutputFormat::Json);
            }
            _ => panic!("expected simulate subcommand"),
        }
    }
}
