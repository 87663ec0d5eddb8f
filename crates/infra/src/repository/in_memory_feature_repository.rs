//! # InMemoryFeatureRepository
//!
//! プロセス内メモリに Feature を保持する実装。
//! `DATABASE_URL` 未設定時の起動とテストで使用する。
//!
//! PostgreSQL 実装と同じ失敗を同じ種別で返す:
//!
//! | 状況 | エラー |
//! |------|--------|
//! | key 重複の insert | `UniqueViolation { constraint: "features_key_key", field: "key" }` |
//! | version 不一致の update | `Conflict { entity: "Feature", id }` |
//! | 存在しない id の delete | `RecordNotFound` |

use async_trait::async_trait;
use crudkit_domain::feature::{Feature, FeatureId, FeatureKey, Version};
use tokio::sync::RwLock;

use super::feature_repository::FeatureRepository;
use crate::error::InfraError;

const KEY_CONSTRAINT: &str = "features_key_key";

#[derive(Debug, Default)]
pub struct InMemoryFeatureRepository {
    features: RwLock<Vec<Feature>>,
}

impl InMemoryFeatureRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeatureRepository for InMemoryFeatureRepository {
    async fn find_all(&self) -> Result<Vec<Feature>, InfraError> {
        let mut features = self.features.read().await.clone();
        features.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });
        Ok(features)
    }

    async fn find_by_id(&self, id: &FeatureId) -> Result<Option<Feature>, InfraError> {
        Ok(self
            .features
            .read()
            .await
            .iter()
            .find(|f| f.id() == id)
            .cloned())
    }

    async fn find_by_key(&self, key: &FeatureKey) -> Result<Option<Feature>, InfraError> {
        Ok(self
            .features
            .read()
            .await
            .iter()
            .find(|f| f.key() == key)
            .cloned())
    }

    async fn insert(&self, feature: &Feature) -> Result<(), InfraError> {
        let mut features = self.features.write().await;
        if features.iter().any(|f| f.key() == feature.key()) {
            return Err(InfraError::unique_violation(
                Some(KEY_CONSTRAINT),
                Some("key"),
            ));
        }
        if features.iter().any(|f| f.id() == feature.id()) {
            return Err(InfraError::unique_violation(Some("features_pkey"), None));
        }
        features.push(feature.clone());
        Ok(())
    }

    async fn update(&self, feature: &Feature, expected_version: Version) -> Result<(), InfraError> {
        let mut features = self.features.write().await;
        let slot = features
            .iter_mut()
            .find(|f| f.id() == feature.id() && f.version() == expected_version)
            .ok_or_else(|| InfraError::conflict("Feature", feature.id().as_str()))?;
        *slot = feature.clone();
        Ok(())
    }

    async fn delete(&self, id: &FeatureId) -> Result<(), InfraError> {
        let mut features = self.features.write().await;
        let before = features.len();
        features.retain(|f| f.id() != id);
        if features.len() == before {
            return Err(InfraError::record_not_found());
        }
        Ok(())
    }
}
