//! Basic example - launch or find a debuggable browser, print version

use browser::{launch_hidden_browser, BrowserController, ControllerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = ControllerConfig::default();

    // Best-effort: spawns a hidden browser when one is installed,
    // otherwise assumes one is already listening on the port.
    let process = launch_hidden_browser(config.port, &config.launch).await;
    if process.is_some() {
        println!("Launched a hidden browser on port {}", config.port);
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }

    let controller = BrowserController::new(config);

    let version = controller.version().await?;
    println!("Browser: {}", version.browser);
    println!("Protocol: {}", version.protocol_version);

    controller.ensure_connected().await?;
    println!("Connected");

    controller.close().await;
    if let Some(process) = process {
        process.shutdown().await;
    }
    println!("Disconnected");

    Ok(())
}
