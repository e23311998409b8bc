//! wiki-rewards - contribution scoring and reward distribution for the wiki

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wiki_rewards::{
    config::Args,
    db::MongoClient,
    server::{self, AppState, StorageBackend},
    store::{ActivityStore, AirdropStore, MemoryStore, MongoStore},
    treasury::{GatewayTreasury, StaticTreasury, TreasuryOracle},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("wiki_rewards={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  wiki-rewards");
    info!("  contribution scoring & rewards");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB database: {}", args.mongodb_db);
    info!("Leaderboard TTL: {}s", args.leaderboard_ttl_secs);
    info!(
        "Admin wallet: {}",
        args.admin_wallet().unwrap_or("(none - admin endpoints disabled)")
    );
    info!("======================================");

    // MongoDB is optional in dev mode
    let (store, airdrops, storage): (Arc<dyn ActivityStore>, Arc<dyn AirdropStore>, StorageBackend) =
        match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => {
                let mongo = Arc::new(MongoStore::new(&client).await?);
                (mongo.clone() as Arc<dyn ActivityStore>, mongo as Arc<dyn AirdropStore>, StorageBackend::Mongo)
            }
            Err(e) if args.dev_mode => {
                warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                let memory = Arc::new(MemoryStore::new());
                (memory.clone() as Arc<dyn ActivityStore>, memory as Arc<dyn AirdropStore>, StorageBackend::Memory)
            }
            Err(e) => {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        };

    let treasury: Arc<dyn TreasuryOracle> = match args.treasury.gateway() {
        Some((url, address, resource)) => {
            info!("Treasury: {} via {}", address, url);
            Arc::new(GatewayTreasury::new(url, address, resource, args.request_timeout())?)
        }
        None => {
            let address = args
                .treasury
                .treasury_address
                .clone()
                .unwrap_or_else(|| "dev-treasury".to_string());
            let balance = args.treasury.treasury_static_balance;
            warn!("No treasury gateway configured, using static balance {}", balance);
            Arc::new(StaticTreasury::new(address, balance))
        }
    };

    let state = Arc::new(AppState::new(args, store, airdrops, treasury, storage)?);

    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
