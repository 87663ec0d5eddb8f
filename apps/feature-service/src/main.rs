//! # Feature Service サーバー
//!
//! Feature の CRUD API を提供する。
//!
//! ## 起動方法
//!
//! ```bash
//! # インメモリ（DATABASE_URL 未設定）
//! cargo run -p crudkit-feature-service
//!
//! # PostgreSQL
//! DATABASE_URL=postgres://... cargo run -p crudkit-feature-service --release
//! ```
//!
//! 環境変数の一覧は [`config`](crudkit_feature_service::config) を参照。

use std::sync::Arc;

use anyhow::Context as _;
use crudkit_domain::clock::{Clock, SystemClock};
use crudkit_feature_service::{app_builder::build_app, config::AppConfig};
use crudkit_infra::{
    db,
    repository::{FeatureRepository, InMemoryFeatureRepository, PostgresFeatureRepository},
};
use crudkit_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

const SERVICE_NAME: &str = "feature-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(&TracingConfig::from_env(SERVICE_NAME));
    let _service_span = tracing::info_span!("app", service = SERVICE_NAME).entered();

    let config = AppConfig::from_env().context("設定の読み込みに失敗しました")?;

    let repository: Arc<dyn FeatureRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = db::create_pool(database_url, config.database_max_connections)
                .await
                .context("データベース接続に失敗しました")?;
            db::run_migrations(&pool)
                .await
                .context("マイグレーションの適用に失敗しました")?;
            tracing::info!("PostgreSQL に接続しました");
            Arc::new(PostgresFeatureRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL が未設定のため、インメモリリポジトリを使用します");
            Arc::new(InMemoryFeatureRepository::new())
        }
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let app = build_app(repository, clock);

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("{} へのバインドに失敗しました", config.bind_address()))?;
    tracing::info!(address = %config.bind_address(), "Feature Service サーバーが起動しました");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Feature Service サーバーを停止しました");
    Ok(())
}

/// Ctrl+C で停止する
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "シグナルハンドラの登録に失敗しました");
    }
}
