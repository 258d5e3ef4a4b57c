//! Greeting pipeline demo.
//!
//! Fetches a user name (slowly), turns it into a greeting, then runs nine
//! copies of the fetch in parallel to show submission-order reduction.
//! Run with:
//!
//! ```bash
//! RUST_LOG=tasklet=debug cargo run --example greeting
//! ```

use std::time::Duration;

use tasklet::prelude::*;
use tracing::info;

fn fetch_user_name() -> BasicTask<(), String> {
    BasicTask::from_async(|_: ()| async {
        // Stands in for a slow lookup against a remote user service.
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok("Fernando".to_string())
    })
}

fn make_greeting() -> BasicTask<String, String> {
    BasicTask::from_fn(|name: String| Ok(format!("Hello {name}!")))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("composing the greeting pipeline");
    let greet = fetch_user_name().then(make_greeting());
    match greet.perform_async(()).await {
        Ok(greeting) => println!("{greeting}"),
        Err(error) => println!("oops... {error}"),
    }

    info!("fanning out nine parallel name fetches");
    let copies: Vec<BasicTask<(), String>> = (0..9).map(|_| fetch_user_name()).collect();
    let all_names = parallel(copies, |names| names);
    match all_names.perform_async(()).await {
        Ok(names) => println!("fetched {} names: {names:?}", names.len()),
        Err(error) => println!("oops... {error}"),
    }
}
