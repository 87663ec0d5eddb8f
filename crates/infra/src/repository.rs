//! # リポジトリ実装
//!
//! - **PostgreSQL**: 本番用。`features` テーブルに永続化する
//! - **インメモリ**: `DATABASE_URL` 未設定時とテスト用
//!
//! どちらも同じ [`FeatureRepository`] トレイトを実装し、同じ失敗を同じ
//! [`InfraErrorKind`](crate::InfraErrorKind) で返す。

pub mod feature_repository;
pub mod in_memory_feature_repository;

pub use feature_repository::{FeatureRepository, PostgresFeatureRepository};
pub use in_memory_feature_repository::InMemoryFeatureRepository;
