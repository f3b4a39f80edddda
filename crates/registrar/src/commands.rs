//! CLI command implementations.

use std::path::PathBuf;

use color_eyre::eyre::Result;

use registrar_telemetry::EventLog;

/// Start the catalog web server.
pub async fn serve(
    host: String,
    port: u16,
    course_file: PathBuf,
    log_file: PathBuf,
) -> Result<()> {
    use registrar_server::{Server, ServerConfig};

    tracing::info!("Starting registrar server...");

    let addr = format!("{}:{}", host, port).parse()?;
    let config = ServerConfig::builder()
        .addr(addr)
        .course_file(course_file)
        .event_log_file(log_file)
        .build();

    let server = Server::new(config)?;
    server.run().await?;

    Ok(())
}

/// Print the most recent event log entries.
pub fn logs(log_file: PathBuf, tail: usize) -> Result<()> {
    let log = EventLog::open(&log_file)?;
    let entries = log.read_all()?;

    if entries.is_empty() {
        println!("No events recorded in {}", log_file.display());
        return Ok(());
    }

    let start = entries.len().saturating_sub(tail);
    for entry in &entries[start..] {
        println!(
            "{} {:<7} {} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.level,
            entry.event,
            serde_json::to_string(&entry.fields)?
        );
    }

    Ok(())
}

/// Print version and build info.
pub fn version() {
    println!("registrar {}", env!("CARGO_PKG_VERSION"));
    println!("Course catalog web service");
}
