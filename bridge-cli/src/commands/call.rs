//! Invoke a single operation on the scripted host.

use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use webbridge_client::BridgeClient;
use webbridge_types::Operation;

use crate::config::Config;

/// What a call produced.
#[derive(Debug)]
pub struct CallOutcome {
    /// The call's own reply value
    pub value: Value,
    /// The `…Result` event, for operations that report through one
    pub result: Option<Value>,
}

/// Call `operation` with `input` (JSON text, `{}` when absent).
pub async fn invoke(config: &Config, operation: &str, input: Option<&str>) -> Result<CallOutcome> {
    let operation: Operation = operation.parse()?;
    let input: Value = match input {
        Some(text) => serde_json::from_str(text).context("Input is not valid JSON")?,
        None => Value::Object(Default::default()),
    };

    let client = BridgeClient::with_config(config.client_config(), config.host.mock_host());
    let value = client
        .call_raw(operation, input)
        .await
        .with_context(|| format!("{operation} failed"))?;

    let mut result = None;
    if let Some(event) = operation.result_event() {
        let sink = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&sink);
        let subscription = client.subscribe(event, move |payload| {
            if let Ok(mut slot) = slot.lock() {
                *slot = Some(payload.clone());
            }
        });
        client.dispatch_next().await?;
        subscription.unsubscribe();
        result = sink.lock().ok().and_then(|mut slot| slot.take());
    }

    Ok(CallOutcome { value, result })
}

/// Run the call command.
pub async fn run(config: &Config, operation: &str, input: Option<&str>) -> Result<()> {
    let outcome = invoke(config, operation, input).await?;

    println!("{}", serde_json::to_string_pretty(&outcome.value)?);
    if let Some(result) = outcome.result {
        println!();
        println!("Result event:");
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}
