use clap::{Arg, Command};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use liboptics_grouper::config::Config;
use liboptics_grouper::process::process;

// Progress, per-row warnings, and errors all go to stdout
const TERMINAL_MODE: simplelog::TerminalMode = simplelog::TerminalMode::Stdout;

fn make_template_config(path: &Path) -> ExitCode {
    log::info!("Making a template config at {}...", path.to_string_lossy());
    match Config::default().write_config_file(path) {
        Ok(()) => {
            log::info!("Done.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    // Create a cli
    let matches = Command::new("optics_grouper_cli")
        .about("Assign RELION optics groups from EPU GridSquare and AFIS filenames")
        .arg_required_else_help(true)
        .subcommand_negates_reqs(true)
        .subcommand(
            Command::new("new")
                .about("Make a template configuration yaml file")
                .arg(
                    Arg::new("path")
                        .short('p')
                        .long("path")
                        .required(true)
                        .help("Path to the config file to create"),
                ),
        )
        .arg(
            Arg::new("input")
                .required(true)
                .help("Path to the input STAR file"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a configuration yaml file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Path to write the output STAR file to"),
        )
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        TERMINAL_MODE,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    if LogWrapper::new(pb_manager.clone(), logger)
        .try_init()
        .is_err()
    {
        eprintln!("Could not create logging/progress!");
        return ExitCode::FAILURE;
    }

    if let Some(("new", sub_matches)) = matches.subcommand() {
        let path = sub_matches
            .get_one::<String>("path")
            .map(PathBuf::from)
            .unwrap_or_default();
        return make_template_config(&path);
    }

    // Load our config
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => {
            let config_path = PathBuf::from(path);
            log::info!("Loading config from {}...", config_path.to_string_lossy());
            match Config::read_config_file(&config_path) {
                Ok(c) => {
                    log::info!("Config successfully loaded.");
                    c
                }
                Err(e) => {
                    log::error!("{e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => Config::default(),
    };
    if let Some(output) = matches.get_one::<String>("output") {
        config.output_path = Some(PathBuf::from(output));
    }
    log::info!("GridSquare pattern: {}", config.gridsquare_pattern);
    log::info!("AFIS pattern: {}", config.afis_pattern);

    let input_path = match matches.get_one::<String>("input") {
        Some(input) => PathBuf::from(input),
        None => {
            log::error!("No input STAR file was given");
            return ExitCode::FAILURE;
        }
    };

    // Setup the progress bar
    let pb = pb_manager.add(ProgressBar::new(100));
    let result = process(&config, &input_path, |fraction| {
        pb.set_position((fraction * 100.0) as u64)
    });
    pb.finish();

    match result {
        Ok(summary) => {
            log::info!(
                "Successfully grouped {} rows into {} optics groups!",
                summary.n_rows,
                summary.n_groups
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Grouping failed with error: {e}");
            ExitCode::FAILURE
        }
    }
}
