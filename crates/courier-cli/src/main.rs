use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde_json::{Value, json};
use tracing::{info, warn};

use courier_core::impls::{InMemoryResultBackend, InMemoryTransport};
use courier_core::{Envelope, Kwargs, ProducerBuilder, ProducerConfig, TaskId};

/// consumer 役：transport から envelope を取り出し、検証・デコードして結果を書く
///
/// 本物の consumer は別プロセス（別言語）で動く想定。ここでは受信側の検証をデモするだけ。
async fn consumer_loop(
    transport: Arc<InMemoryTransport>,
    backend: Arc<InMemoryResultBackend>,
    routing_key: String,
) {
    loop {
        // 1) envelope を 1 件取る
        let Some(raw) = transport.pop(&routing_key, Duration::from_secs(30)).await else {
            continue;
        };

        // 2) JSON → Envelope → 受信側検証 → TaskBody
        let envelope = match Envelope::from_json(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "dropping unreadable envelope");
                continue;
            }
        };
        let task_id = TaskId::from(envelope.headers.id.clone());
        let body = match envelope.task_body() {
            Ok(body) => body,
            Err(e) => {
                backend.store_failure(&task_id, e.to_string()).await;
                continue;
            }
        };
        info!(%task_id, task = %envelope.headers.task, argsrepr = %envelope.headers.argsrepr, "received");

        // 3) 実行して結果を書く
        match envelope.headers.task.as_str() {
            "tasks.add" => {
                let sum: i64 = body.args.iter().filter_map(Value::as_i64).sum();
                backend.store_success(&task_id, json!(sum)).await;
            }
            "tasks.greet" => {
                let name = body
                    .kwargs
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("world");
                backend
                    .store_success(&task_id, json!(format!("Hello, {name}!")))
                    .await;
            }
            other => {
                backend
                    .store_failure(&task_id, format!("unknown task {other}"))
                    .await;
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // (A) 設定と collaborator を用意
    let config = ProducerConfig::from_env().context("invalid COURIER_* environment")?;
    let transport = Arc::new(InMemoryTransport::new());
    let backend = Arc::new(InMemoryResultBackend::new());

    let producer = ProducerBuilder::new()
        .transport(transport.clone())
        .result_backend(backend.clone())
        .config(config.clone())
        .build()?;

    // (B) consumer を起動（今回は 1 本）
    let consumer = tokio::spawn(consumer_loop(
        transport.clone(),
        backend.clone(),
        config.default_routing_key.clone(),
    ));

    // (C) タスク投入
    let add = producer
        .delay("tasks.add", &[json!(2), json!(3)], None)
        .await?;
    println!("submitted tasks.add: {}", add.task_id());

    let mut kwargs = Kwargs::new();
    kwargs.insert("name".to_string(), json!("courier"));
    let greet = producer
        .delay("tasks.greet", &[], Some(&kwargs))
        .await?;
    println!("submitted tasks.greet: {}", greet.task_id());

    // (D) 結果をポーリングで待つ
    for result in [&add, &greet] {
        let value = result
            .get(Duration::from_secs(5), Duration::from_millis(50))
            .await
            .with_context(|| format!("task {} did not finish", result.task_id()))?;
        println!("result {}: {}", result.task_id(), value);
    }

    // (E) サンプルなので consumer を止める
    consumer.abort();
    Ok(())
}
