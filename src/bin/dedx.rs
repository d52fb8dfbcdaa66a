use std::fs::File;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

use dedx::{batch, BoxedModel, Mode, ModelConfig, SetupConfig, StoppingPower};

type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Dedx(#[from] dedx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),
}

/// Stopping power, energy loss and range calculator.
#[derive(Parser, Debug)]
#[command(name = "dedx", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// No log output.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Also write the log to this file.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// Model description (TOML).
    #[arg(value_name = "MODEL.toml")]
    model: PathBuf,

    /// Use areal density (mg/cm2) instead of length (um).
    #[arg(long)]
    areal: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stopping power at one or more energies.
    Dedx {
        #[command(flatten)]
        model: ModelArgs,
        /// MeV
        #[arg(required = true)]
        energies: Vec<f64>,
    },
    /// Exit energy after a thickness.
    Eout {
        #[command(flatten)]
        model: ModelArgs,
        energy: f64,
        thickness: f64,
    },
    /// Entrance energy needed to leave a thickness with a given energy.
    Ein {
        #[command(flatten)]
        model: ModelArgs,
        energy: f64,
        thickness: f64,
    },
    /// Thickness that slows the particle between two energies.
    Thickness {
        #[command(flatten)]
        model: ModelArgs,
        ein: f64,
        eout: f64,
    },
    /// Range of a particle.
    Range {
        #[command(flatten)]
        model: ModelArgs,
        energy: f64,
    },
    /// Table of stopping power and range over an energy interval.
    Sweep {
        #[command(flatten)]
        model: ModelArgs,
        emin: f64,
        emax: f64,
        #[arg(default_value_t = 50)]
        points: usize,
    },
    /// Push a particle through the layers of a setup file.
    Setup {
        #[arg(value_name = "SETUP.toml")]
        setup: PathBuf,
    },
}

fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let level_filter = if quiet {
        LevelFilter::OFF
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(level_filter)
        .with(stderr_layer);

    if let Some(path) = log_file {
        let file = File::create(&path)?;
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true);
        subscriber.with(file_layer).init();
    } else {
        subscriber.init();
    }
    Ok(())
}

fn load(args: &ModelArgs) -> Result<BoxedModel> {
    let cfg = ModelConfig::from_file(&args.model)?;
    let base = args
        .model
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    let mut model = cfg.build_in(&base)?;
    if args.areal {
        model.set_mode(Mode::ArealDensity);
    }
    info!(
        model = model.model_type(),
        emin = model.emin(),
        emax = model.emax(),
        mode = %model.mode(),
        "loaded model"
    );
    Ok(model)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Dedx { model, energies } => {
            let model = load(&model)?;
            let unit = model.mode().rate_unit();
            for (e, rate) in energies.iter().zip(batch::dedx_many(&model, &energies)) {
                println!("{:.6} MeV  {:.6e} {}", e, rate?, unit);
            }
        }
        Commands::Eout {
            model,
            energy,
            thickness,
        } => {
            let model = load(&model)?;
            let transit = model.eout(energy, thickness)?;
            if transit.ranged_out {
                println!("{:.6} MeV (ranged out)", transit.energy);
            } else {
                println!("{:.6} MeV", transit.energy);
            }
        }
        Commands::Ein {
            model,
            energy,
            thickness,
        } => {
            let model = load(&model)?;
            println!("{:.6} MeV", model.ein(energy, thickness)?);
        }
        Commands::Thickness { model, ein, eout } => {
            let model = load(&model)?;
            let unit = model.mode().thickness_unit();
            println!("{:.6e} {}", model.thickness(ein, eout)?, unit);
        }
        Commands::Range { model, energy } => {
            let model = load(&model)?;
            let unit = model.mode().thickness_unit();
            println!("{:.6e} {}", model.range(energy)?, unit);
        }
        Commands::Sweep {
            model,
            emin,
            emax,
            points,
        } => {
            if points < 2 || !(emax > emin) {
                return Err(CliError::Argument(format!(
                    "need at least 2 points and EMAX > EMIN, got {} points on [{}, {}]",
                    points, emin, emax
                )));
            }
            let model = load(&model)?;
            let energies: Vec<f64> = (0..points)
                .map(|i| emin + (emax - emin) * i as f64 / (points - 1) as f64)
                .collect();
            debug!(points, emin, emax, "sweep");
            let rates = batch::dedx_many(&model, &energies);
            let ranges = batch::range_many(&model, &energies);
            println!(
                "# E (MeV)  dE/dx ({})  range ({})",
                model.mode().rate_unit(),
                model.mode().thickness_unit()
            );
            for ((e, rate), range) in energies.iter().zip(rates).zip(ranges) {
                println!("{:.6} {:.6e} {:.6e}", e, rate?, range?);
            }
        }
        Commands::Setup { setup } => {
            let setup = SetupConfig::from_file(&setup)?;
            println!("entrance: {:.6} MeV", setup.energy);
            for exit in setup.run()? {
                let note = if exit.ranged_out { " (ranged out)" } else { "" };
                println!(
                    "{}: {:.6} MeV{} [{}]",
                    exit.name, exit.energy, note, exit.model_type
                );
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = setup_logging(cli.verbose, cli.quiet, cli.log_file.clone()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
    debug!("arguments: {:?}", &cli);
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
