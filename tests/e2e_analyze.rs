mod support_kvsweep;

use std::fs;

use tempfile::tempdir;

use support_kvsweep::{run_kvsweep, sample_metrics};

#[test]
fn analyze_writes_waterfall_cdf_and_scripts() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let tikv = dir.path().join("tikv.metrics");
    let xll = dir.path().join("xll.metrics");
    fs::write(&tikv, sample_metrics("4")).map_err(|err| format!("write failed: {}", err))?;
    fs::write(&xll, sample_metrics("2")).map_err(|err| format!("write failed: {}", err))?;
    let out = dir.path().join("analysis");

    let output = run_kvsweep(
        [
            "analyze".to_owned(),
            "-e".to_owned(),
            format!("tikv={}", tikv.display()),
            "-e".to_owned(),
            format!("xll={}", xll.display()),
            "--out-dir".to_owned(),
            out.display().to_string(),
            "--no-plot".to_owned(),
        ],
        dir.path(),
    )?;
    if !output.status.success() {
        return Err(format!(
            "analyze failed: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    let table = fs::read_to_string(out.join("raftcommit_metrics.dat"))
        .map_err(|err| format!("read table failed: {}", err))?;
    let rows: Vec<&str> = table.lines().collect();
    if rows.len() != 3 {
        return Err(format!("Expected header and two rows:\n{}", table));
    }
    let expected_tikv =
        "TIKV\t1.000000\t1.000000\t-2.000000\t0.000000\t0.000000\t0.000000\t0.000000\t8.000000\t0.000000";
    if rows.get(1) != Some(&expected_tikv) {
        return Err(format!("Unexpected TIKV row: {:?}", rows.get(1)));
    }
    if !rows.get(2).is_some_and(|row| row.starts_with("XLL\t")) {
        return Err(format!("Unexpected XLL row: {:?}", rows.get(2)));
    }

    let cdf = fs::read_to_string(out.join("xll-tikv_raftstore_apply_duration_secs.dat"))
        .map_err(|err| format!("read cdf failed: {}", err))?;
    if !cdf.contains("2.000000\t5\t0.250000") || !cdf.contains("16.000000\t20\t1.000000") {
        return Err(format!("Unexpected CDF:\n{}", cdf));
    }
    for script in ["Apply_cdf.gp", "request_coarse_phase_cdf.gp"] {
        if !out.join(script).exists() {
            return Err(format!("Missing {}", script));
        }
    }
    Ok(())
}

#[test]
fn analyze_rejects_malformed_experiment() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let output = run_kvsweep(["analyze", "-e", "no-separator"], dir.path())?;
    if output.status.success() {
        return Err("Expected a usage error".to_owned());
    }
    Ok(())
}

#[test]
fn analyze_fails_on_missing_metrics_file() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let output = run_kvsweep(
        ["analyze", "-e", "tikv=does-not-exist.metrics", "--no-plot"],
        dir.path(),
    )?;
    if output.status.success() {
        return Err("Expected a read failure".to_owned());
    }
    Ok(())
}
