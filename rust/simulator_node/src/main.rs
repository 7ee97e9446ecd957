use log::{error, info};
use lorasim::config::SimulatorConfig;
use lorasim::device::Catalog;
use lorasim::init_logger;
use lorasim::payload::{Envelope, PayloadAssembler};
use lorasim::sensor::SensorEncoder;
use lorasim::simulator::SimulatorNode;
use lorasim::transport::{self, MemoryTransport, MqttTransport, Transport};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> lorasim::Result<()> {
    let config_path = env::var("SIM_CONFIG")
        .ok()
        .or_else(|| env::args().nth(1))
        .map(PathBuf::from);
    let config = SimulatorConfig::load(config_path.as_deref())?;
    init_logger(config.log_level_filter()?);

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_yaml_file(path)?,
        None => Catalog::builtin(),
    };
    let client_id = transport::client_id(&config.client_id_prefix)?;
    info!("Starting simulator node with client id {}", client_id);

    let transport: Arc<dyn Transport> = if config.dry_run {
        info!("Dry run: uplinks are logged, not published");
        let (transport, rx) = MemoryTransport::new();
        tokio::spawn(async move {
            while let Ok(message) = rx.recv_async().await {
                info!(
                    "{} {}",
                    message.topic,
                    String::from_utf8_lossy(&message.payload)
                );
            }
        });
        Arc::new(transport)
    } else {
        let address = config.broker_address()?;
        let mqtt = MqttTransport::connect(&address, &client_id, config.connect_options()).await?;
        Arc::new(mqtt)
    };

    let assembler = PayloadAssembler::new(
        catalog,
        Envelope::default(),
        SensorEncoder::from_entropy(),
    );
    let mut node = SimulatorNode::new(
        client_id,
        assembler,
        transport,
        config.publish_settings(),
    )?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, shutting down...");
                cancel.cancel();
            }
        }
    });

    match node.run(cancel).await {
        Ok(summary) => {
            info!(
                "Done! {} ticks, {} published, {} dropped, {} failed",
                summary.ticks, summary.published, summary.dropped, summary.publish_failures
            );
            Ok(())
        }
        Err(e) => {
            error!("Simulator node error: {}", e);
            Err(e)
        }
    }
}
