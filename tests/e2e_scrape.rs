mod support_kvsweep;

use std::net::TcpListener;

use kvsweep::analysis::{MetricSample, median_time};
use kvsweep::error::RemoteError;
use kvsweep::experiment::{HttpScraper, MetricsScraper};

use support_kvsweep::{sample_metrics, spawn_status_server};

#[tokio::test(flavor = "current_thread")]
async fn http_scraper_reads_live_export() -> Result<(), String> {
    let (host, port, _server) = spawn_status_server(&sample_metrics("4"))?;
    let scraper = HttpScraper::new().map_err(|err| format!("client failed: {}", err))?;

    let body = scraper
        .scrape(&format!("http://{}:{}/metrics", host, port))
        .await
        .map_err(|err| format!("scrape failed: {}", err))?;

    let sample = MetricSample::parse(&body, "tikv_raftstore_apply_duration_secs");
    let median = median_time(&sample)
        .value()
        .ok_or_else(|| "Median missing from scraped body".to_owned())?;
    if format!("{:.3}", median) != "8.000" {
        return Err(format!("Expected 8 ms median, got {}", median));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn http_scraper_reports_unreachable_node() -> Result<(), String> {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0")
            .map_err(|err| format!("bind failed: {}", err))?;
        listener
            .local_addr()
            .map_err(|err| format!("addr failed: {}", err))?
            .port()
    };
    let scraper = HttpScraper::new().map_err(|err| format!("client failed: {}", err))?;

    match scraper
        .scrape(&format!("http://127.0.0.1:{}/metrics", port))
        .await
    {
        Err(RemoteError::Scrape { .. }) => Ok(()),
        other => Err(format!("Expected a scrape error, got {:?}", other)),
    }
}
