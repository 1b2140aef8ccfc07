mod support_kvsweep;

use tempfile::tempdir;

use support_kvsweep::run_kvsweep;

#[test]
fn dry_run_write_scalability_collects_snapshots() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let output = run_kvsweep(
        [
            "run",
            "--dry-run",
            "--tikv_nodes",
            "10.0.0.2,10.0.0.3",
            "--pd_node",
            "10.0.0.1",
            "--client_nodes",
            "10.0.0.9",
            "--experimenttype",
            "writescalability",
            "--name",
            "e2e",
            "-s",
            "1073741824",
            "--threads",
            "24",
            "--threadsmin",
            "16",
            "--results-dir",
            "out",
        ],
        dir.path(),
    )?;
    if !output.status.success() {
        return Err(format!(
            "dry run failed: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    let experiment_dir = dir.path().join("out/e2e-1GB-1KB/writescalability");
    for node in ["0", "1"] {
        for threads in [16, 20, 24] {
            let snapshot = experiment_dir
                .join(node)
                .join(format!("tikv-{}.metrics", threads));
            if !snapshot.exists() {
                return Err(format!("Missing snapshot {}", snapshot.display()));
            }
        }
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.matches("threads").count() != 3 {
        return Err(format!("Expected three point lines:\n{}", stdout));
    }
    Ok(())
}

#[test]
fn run_rejects_inverted_thread_bounds() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let output = run_kvsweep(
        [
            "run",
            "--dry-run",
            "--tikv_nodes",
            "10.0.0.2",
            "--pd_node",
            "10.0.0.1",
            "--client_nodes",
            "10.0.0.9",
            "--experimenttype",
            "ycsb",
            "--threads",
            "16",
            "--threadsmin",
            "32",
        ],
        dir.path(),
    )?;
    if output.status.success() {
        return Err("Expected validation failure".to_owned());
    }
    if dir.path().join("results").exists() {
        return Err("Nothing should be written before validation passes".to_owned());
    }
    Ok(())
}
