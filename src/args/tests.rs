use clap::Parser;

use super::*;

fn parse(args: &[&str]) -> Result<SweepArgs, String> {
    let mut argv = vec!["kvsweep"];
    argv.extend_from_slice(args);
    SweepArgs::try_parse_from(argv).map_err(|err| format!("parse failed: {}", err))
}

fn run_args(args: &[&str]) -> Result<RunArgs, String> {
    match parse(args)?.command {
        Command::Run(run) => Ok(run),
        Command::Analyze(_) => Err("Expected run subcommand".to_owned()),
    }
}

const BASE_RUN: [&str; 9] = [
    "run",
    "--tikv_nodes",
    "10.10.1.2, 10.10.1.3,10.10.1.4",
    "--pd_node",
    "10.10.1.1",
    "--client_nodes",
    "10.10.1.5",
    "--experimenttype",
    "writescalability",
];

#[test]
fn run_defaults_match_documented_values() -> Result<(), String> {
    let run = run_args(&BASE_RUN)?;
    if run.tikv_nodes.hosts() != ["10.10.1.2", "10.10.1.3", "10.10.1.4"] {
        return Err(format!("Unexpected tikv nodes: {:?}", run.tikv_nodes));
    }
    if run.value_size.get() != 1024 {
        return Err(format!("Unexpected vsize: {}", run.value_size.get()));
    }
    if run.db_size.get() != 10 * 1024 * 1024 * 1024 {
        return Err(format!("Unexpected db size: {}", run.db_size.get()));
    }
    if run.ops.get() != 5_000_000 || run.threads.get() != 64 {
        return Err("Unexpected ops/threads defaults".to_owned());
    }
    if run.threads_min.is_some() || run.workloads.is_some() || run.dry_run {
        return Err("Unexpected optional defaults".to_owned());
    }
    if run.experiment_type != ExperimentType::WriteScalability {
        return Err(format!("Unexpected type: {:?}", run.experiment_type));
    }
    Ok(())
}

#[test]
fn run_accepts_sweep_bounds_and_workloads() -> Result<(), String> {
    let mut args = BASE_RUN.to_vec();
    args.extend_from_slice(&["--threadsmin", "16", "-r", "128", "--workloads", "a, b,f"]);
    let run = run_args(&args)?;
    if run.threads_min.map(PositiveU64::get) != Some(16) || run.threads.get() != 128 {
        return Err("Unexpected thread bounds".to_owned());
    }
    let letters = run
        .workloads
        .as_ref()
        .map(|list| list.letters().to_vec())
        .unwrap_or_default();
    if letters != ['a', 'b', 'f'] {
        return Err(format!("Unexpected workloads: {:?}", letters));
    }
    Ok(())
}

#[test]
fn run_accepts_hyphenated_experiment_type() -> Result<(), String> {
    let mut args = BASE_RUN.to_vec();
    if let Some(last) = args.last_mut() {
        *last = "disk-measurement";
    }
    let run = run_args(&args)?;
    if run.experiment_type != ExperimentType::DiskMeasurement {
        return Err(format!("Unexpected type: {:?}", run.experiment_type));
    }
    Ok(())
}

#[test]
fn run_rejects_empty_node_entry() -> Result<(), String> {
    let args = [
        "run",
        "--tikv_nodes",
        "10.0.0.1,,10.0.0.2",
        "--pd_node",
        "10.0.0.9",
        "--client_nodes",
        "10.0.0.5",
        "--experimenttype",
        "ycsb",
    ];
    if parse(&args).is_ok() {
        return Err("Expected empty node entry to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn run_rejects_zero_threads() -> Result<(), String> {
    let mut args = BASE_RUN.to_vec();
    args.extend_from_slice(&["--threads", "0"]);
    if parse(&args).is_ok() {
        return Err("Expected zero threads to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn workload_list_rejects_multi_letter_entries() -> Result<(), String> {
    if "a,bc".parse::<WorkloadList>().is_ok() {
        return Err("Expected 'bc' to be rejected".to_owned());
    }
    if "A".parse::<WorkloadList>().is_ok() {
        return Err("Expected upper-case workload to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn analyze_keeps_experiment_order() -> Result<(), String> {
    let parsed = parse(&[
        "analyze",
        "-e",
        "tikv=results/a/tikv.metrics",
        "--experiment",
        "xll = results/b/tikv.metrics",
        "--no-plot",
    ])?;
    let Command::Analyze(analyze) = parsed.command else {
        return Err("Expected analyze subcommand".to_owned());
    };
    let labels: Vec<&str> = analyze
        .experiments
        .iter()
        .map(|spec| spec.label.as_str())
        .collect();
    if labels != ["tikv", "xll"] {
        return Err(format!("Unexpected labels: {:?}", labels));
    }
    if !analyze.no_plot || analyze.png || analyze.out_dir != "." {
        return Err("Unexpected analyze flags".to_owned());
    }
    Ok(())
}

#[test]
fn experiment_spec_requires_label_and_path() -> Result<(), String> {
    for value in ["tikv", "=path", "tikv=", "a/b=path"] {
        if value.parse::<ExperimentSpec>().is_ok() {
            return Err(format!("Expected '{}' to be rejected", value));
        }
    }
    Ok(())
}
