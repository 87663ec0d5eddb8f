//! # crudkit インフラ層
//!
//! 永続化を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理とマイグレーション
//! - **リポジトリ実装**: Feature の永続化（PostgreSQL / インメモリ）
//! - **エラー分類**: ストレージ由来の失敗を [`InfraErrorKind`] に正規化する
//!
//! ## 依存関係
//!
//! ```text
//! feature-service → infra → domain
//! ```
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use crudkit_infra::{db, repository::PostgresFeatureRepository};
//!
//! async fn setup() -> anyhow::Result<PostgresFeatureRepository> {
//!     let pool = db::create_pool("postgres://localhost/crudkit", 10).await?;
//!     db::run_migrations(&pool).await?;
//!     Ok(PostgresFeatureRepository::new(pool))
//! }
//! ```

pub mod db;
pub mod error;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
