use std::path::Path;
use std::process::ExitCode;

use chrono::Local;
use oneka_engine::Gaussian;
use oneka_model::{OnekaInput, OnekaOutput};

fn usage() {
    eprintln!("usage:");
    eprintln!("  oneka-cli fit [--seed <u64>] <input.json> [output.json]");
    eprintln!("  oneka-cli --help");
    eprintln!("  oneka-cli --version");
    eprintln!();
    eprintln!("examples:");
    eprintln!("  oneka-cli fit aquifer.json");
    eprintln!("  oneka-cli fit --seed 42 aquifer.json posterior.json");
}

fn print_summary(output: &OnekaOutput) {
    println!("version: {}", output.version);
    println!("run_stamp: {}", output.run_stamp);
    println!("n_sims: {}", output.n_sims);
    for (i, name) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
        println!(
            "{name}: mean {:.6e}, std {:.6e}",
            output.mu[i],
            output.cov[i][i].sqrt()
        );
    }
}

fn load_input(path: &Path) -> Result<OnekaInput, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| format!("{}: {}", path.display(), err))?;
    let input: OnekaInput =
        serde_json::from_str(&text).map_err(|err| format!("{}: {}", path.display(), err))?;
    input
        .validate()
        .map_err(|err| format!("{}: {}", path.display(), err))?;
    Ok(input)
}

fn cmd_fit(seed: Option<u64>, input_path: &Path, output_path: Option<&Path>) -> Result<(), String> {
    let input = load_input(input_path)?;

    eprintln!(
        "started: {} ({} wells, {} piezometers)",
        Local::now().to_rfc3339(),
        input.n_wells(),
        input.n_piezometers()
    );

    let mut sampler = match seed {
        Some(seed) => Gaussian::with_seed(seed),
        None => Gaussian::from_clock(),
    };
    let output = oneka_engine::run(&input, &mut sampler).map_err(|err| err.to_string())?;

    let json = serde_json::to_string_pretty(&output)
        .map_err(|err| format!("serializing output: {}", err))?;
    match output_path {
        Some(path) => {
            std::fs::write(path, json).map_err(|err| format!("{}: {}", path.display(), err))?;
            print_summary(&output);
            println!("written: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run(args: &[String]) -> Result<(), String> {
    match args {
        [] => {
            usage();
            Err("missing command".to_string())
        }
        [flag] if flag == "--help" || flag == "-h" => {
            usage();
            Ok(())
        }
        [flag] if flag == "--version" => {
            println!("oneka-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        [command, rest @ ..] if command == "fit" => {
            let (seed, rest) = match rest {
                [flag, value, tail @ ..] if flag == "--seed" => {
                    let seed = value
                        .parse::<u64>()
                        .map_err(|_| format!("--seed expects an unsigned integer, got {value}"))?;
                    (Some(seed), tail)
                }
                _ => (None, rest),
            };
            match rest {
                [input] => cmd_fit(seed, Path::new(input), None),
                [input, output] => cmd_fit(seed, Path::new(input), Some(Path::new(output))),
                _ => {
                    usage();
                    Err("fit expects an input path and an optional output path".to_string())
                }
            }
        }
        [command, ..] => {
            usage();
            Err(format!("unknown command: {command}"))
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> OnekaInput {
        OnekaInput {
            conductivity: 1.0,
            thickness: 50.0,
            base: 0.0,
            well_x: vec![0.0],
            well_y: vec![0.0],
            well_q: vec![30.0],
            piez_x: vec![100.0, -100.0, 0.0, 0.0, 100.0, -100.0, 100.0, -100.0],
            piez_y: vec![0.0, 0.0, 100.0, -100.0, 100.0, -100.0, -100.0, 100.0],
            piez_head: vec![44.0, 44.2, 45.1, 44.9, 43.5, 43.6, 43.4, 43.7],
            piez_std: vec![1.0; 8],
            origin_x: 0.0,
            origin_y: 0.0,
            n_sims: 5,
        }
    }

    #[test]
    fn fit_round_trips_through_the_filesystem() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input_path = dir.path().join("input.json");
        let output_path = dir.path().join("output.json");
        std::fs::write(
            &input_path,
            serde_json::to_string(&sample_input()).expect("serialize"),
        )
        .expect("write input");

        cmd_fit(Some(7), &input_path, Some(&output_path)).expect("fit should succeed");

        let text = std::fs::read_to_string(&output_path).expect("read output");
        let output: OnekaOutput = serde_json::from_str(&text).expect("parse output");
        assert_eq!(output.mu.len(), 6);
        assert_eq!(output.cov.len(), 6);
        assert_eq!(output.realizations.len(), 5);
    }

    #[test]
    fn rejects_invalid_bundle_before_running() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input_path = dir.path().join("input.json");
        let mut input = sample_input();
        input.piez_std[2] = 0.0;
        std::fs::write(
            &input_path,
            serde_json::to_string(&input).expect("serialize"),
        )
        .expect("write input");

        let err = cmd_fit(None, &input_path, None).unwrap_err();
        assert!(err.contains("standard deviation"));
    }

    #[test]
    fn unknown_command_fails() {
        assert!(run(&["frobnicate".to_string()]).is_err());
    }
}
