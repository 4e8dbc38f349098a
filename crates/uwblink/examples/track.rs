//! Live tracking feed from a UWB module on a serial port.
//!
//! Run with:
//!
//! ```text
//! cargo run --example track -- /dev/ttyS2
//! RUST_LOG=uwblink=debug cargo run --example track -- /dev/ttyUSB0
//! ```
//!
//! Prints the survey once acquired, then one line per ranging cycle.
//! Ctrl-C stops the session cleanly (the module is told to stop ranging
//! before the port is closed).

use uwblink::{RddroneBuilder, UwbReport};

#[tokio::main]
async fn main() -> uwblink::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let device = std::env::args().nth(1).unwrap_or_else(|| "/dev/ttyS2".into());

    let (driver, mut reports) = RddroneBuilder::new(&device)
        .baud_rate(115_200)
        .max_plausible_cm(100_000.0)
        .start()
        .await?;

    println!("surveying grid on {device} (Ctrl-C to stop)...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            report = reports.recv() => match report {
                Ok(UwbReport::GridSurvey(survey)) => {
                    println!(
                        "grid {:02x?}: {} anchors, target at ({:.1}, {:.1}, {:.1}) cm",
                        survey.grid_uuid,
                        survey.anchor_count,
                        survey.target_position.x,
                        survey.target_position.y,
                        survey.target_position.z,
                    );
                }
                Ok(UwbReport::Distance(d)) => {
                    let heard: Vec<String> = d
                        .anchor_distances_cm
                        .iter()
                        .enumerate()
                        .filter(|(_, &cm)| cm != 0.0)
                        .map(|(i, cm)| format!("a{i}={cm:.0}cm"))
                        .collect();
                    println!("cycle {:>5}: {}", d.counter, heard.join(" "));
                }
                Err(_) => break,
            },
        }
    }

    let status = driver.status();
    println!(
        "stopping: {} records published, {} frames discarded",
        status.frames_published, status.frame_errors
    );
    driver.request_stop();
    driver.wait().await
}
