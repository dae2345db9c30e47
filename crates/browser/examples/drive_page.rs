//! Drive a page: navigate, wait, extract readable content, smart click
//!
//! Needs a browser started with --remote-debugging-port=9222.

use browser::{BrowserController, ControllerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let controller = BrowserController::new(ControllerConfig::default());
    controller.ensure_connected().await?;

    controller.navigate("https://example.com/").await?;
    if controller.wait_for_element("h1", Some(5_000)).await? {
        println!("Page rendered");
    }

    let readable = controller.extract_readable().await?;
    println!("Title: {}", readable.title);
    println!(
        "Text: {} chars, {} links, {} images",
        readable.text.len(),
        readable.links.len(),
        readable.images.len()
    );

    let tables = controller.extract_tables().await?;
    println!("Tables on the page: {}", tables.len());

    if controller.smart_click("more information").await? {
        println!("Clicked the more-information link");
    }

    controller.close().await;
    Ok(())
}
