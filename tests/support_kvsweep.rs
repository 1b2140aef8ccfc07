use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a lightweight status server: `/metrics` answers with `metrics`,
/// every other path with `OK`.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_status_server(metrics: &str) -> Result<(String, u16, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let metrics: Arc<str> = Arc::from(metrics);

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let body = Arc::clone(&metrics);
                    thread::spawn(move || handle_client(stream, &body));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        addr.ip().to_string(),
        addr.port(),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

fn handle_client(mut stream: TcpStream, metrics: &str) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let mut buffer = [0u8; 1024];
    let Ok(read) = stream.read(&mut buffer) else {
        return;
    };
    let request = String::from_utf8_lossy(buffer.get(..read).unwrap_or_default());
    let body = if request.starts_with("GET /metrics") {
        metrics
    } else {
        "OK"
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// A small export holding one apply-duration histogram.
#[must_use]
pub fn sample_metrics(scale: &str) -> String {
    [
        "# HELP tikv_raftstore_apply_duration_secs Bucketed histogram of apply duration",
        "# TYPE tikv_raftstore_apply_duration_secs histogram",
        &format!("tikv_raftstore_apply_duration_secs_bucket{{le=\"0.00{}\"}} 5", scale),
        "tikv_raftstore_apply_duration_secs_bucket{le=\"0.008\"} 12",
        "tikv_raftstore_apply_duration_secs_bucket{le=\"0.016\"} 20",
        "tikv_raftstore_apply_duration_secs_bucket{le=\"+Inf\"} 20",
        "tikv_raftstore_apply_duration_secs_sum 0.1",
        "tikv_raftstore_apply_duration_secs_count 20",
        "tikv_raftstore_store_wf_batch_wait_duration_seconds_bucket{le=\"0.001\"} 10",
        "tikv_raftstore_store_wf_batch_wait_duration_seconds_bucket{le=\"+Inf\"} 10",
        "tikv_raftstore_store_wf_batch_wait_duration_seconds_count 10",
        "tikv_raftstore_store_wf_send_to_queue_duration_seconds_bucket{le=\"0.002\"} 10",
        "tikv_raftstore_store_wf_send_to_queue_duration_seconds_count 10",
    ]
    .join("\n")
}

/// Run the `kvsweep` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_kvsweep<I, S>(args: I, working_dir: &std::path::Path) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = kvsweep_bin()?;
    Command::new(bin)
        .args(args)
        .current_dir(working_dir)
        .env("KVSWEEP_LOG", "error")
        .output()
        .map_err(|err| format!("run kvsweep failed: {}", err))
}

fn kvsweep_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_kvsweep").map_or_else(
        || Err("CARGO_BIN_EXE_kvsweep missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
