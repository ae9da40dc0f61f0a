//! Hello World - render an inline template through the IPC service.
//!
//! This example demonstrates:
//! - Resolving settings from `/etc/neutral-ipc-cfg.json` (or defaults)
//! - Building a schema from a typed struct
//! - Rendering and mapping the status with `respond`
//!
//! # Running
//!
//! Start a Neutral IPC server on the configured port, then:
//!
//! ```sh
//! RUST_LOG=neutral_ipc_client=debug cargo run --example helloworld
//! ```

use std::sync::Arc;

use neutral_ipc_client::{respond, IpcConfig, RenderSession, Schema, TemplateRef};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Data the template reads.
#[derive(Serialize, Debug)]
struct HelloData {
    hello: String,
}

#[derive(Serialize, Debug)]
struct HelloSchema {
    data: HelloData,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Arc::new(IpcConfig::resolve());
    tracing::info!("Rendering via {}", config.addr());

    let schema = HelloSchema {
        data: HelloData {
            hello: "Hello World".to_string(),
        },
    };
    let mut session = RenderSession::new(
        config,
        TemplateRef::source("{:;hello:}"),
        Schema::json(&schema)?,
    );

    let response = respond(&mut session, &TemplateRef::source("Error {:;error->code:}")).await;

    println!("status: {}", response.status);
    match response.location {
        Some(location) => println!("redirect: {}", location),
        None => println!("{}", response.body),
    }

    Ok(())
}
