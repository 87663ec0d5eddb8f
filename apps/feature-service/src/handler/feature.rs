//! # Feature ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/v1/features` - Feature 一覧
//! - `POST /api/v1/features` - Feature 作成
//! - `GET /api/v1/features/{id}` - Feature 取得
//! - `PATCH /api/v1/features/{id}` - Feature 部分更新（楽観的ロック）
//! - `DELETE /api/v1/features/{id}` - Feature 削除

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use crudkit_domain::feature::{Feature, FeatureId, FeaturePatch};
use crudkit_shared::ApiResponse;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::ApiError,
    extract::{JsonBody, PathParam},
    usecase::{CreateFeatureInput, FeatureUseCaseImpl, UpdateFeatureInput},
};

/// Feature API の共有状態
pub struct FeatureState {
    pub usecase: FeatureUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// Feature 作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateFeatureRequest {
    pub key:         String,
    pub name:        String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Feature 更新リクエスト
///
/// `description` はキー省略で変更なし、`null` で削除。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeatureRequest {
    pub expected_version: u32,
    #[serde(default)]
    pub name:             Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description:      Option<Option<String>>,
    #[serde(default)]
    pub enabled:          Option<bool>,
    #[serde(default)]
    pub archived:         Option<bool>,
}

/// キーが存在すれば（値が `null` でも）`Some` にする
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Feature DTO
///
/// 日時はエラーレスポンスの `timestamp` と同じ RFC 3339（UTC は `Z`）で出力する。
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDto {
    pub id:          String,
    pub key:         String,
    pub name:        String,
    pub description: Option<String>,
    pub enabled:     bool,
    pub archived:    bool,
    pub version:     u32,
    pub created_at:  DateTime<Utc>,
    pub updated_at:  DateTime<Utc>,
}

impl From<&Feature> for FeatureDto {
    fn from(feature: &Feature) -> Self {
        Self {
            id:          feature.id().to_string(),
            key:         feature.key().to_string(),
            name:        feature.name().to_string(),
            description: feature.description().map(|d| d.as_str().to_string()),
            enabled:     feature.enabled(),
            archived:    feature.archived(),
            version:     feature.version().as_u32(),
            created_at:  feature.created_at(),
            updated_at:  feature.updated_at(),
        }
    }
}

// --- ハンドラ ---

/// GET /api/v1/features
#[tracing::instrument(skip_all)]
pub async fn list_features(
    State(state): State<Arc<FeatureState>>,
) -> Result<impl IntoResponse, ApiError> {
    let features = state.usecase.list_features().await?;

    let items: Vec<FeatureDto> = features.iter().map(FeatureDto::from).collect();
    Ok((StatusCode::OK, Json(ApiResponse::new(items))))
}

/// POST /api/v1/features
///
/// ## レスポンス
///
/// - `201 Created`: 作成された Feature
/// - `400 Bad Request`: バリデーションエラー
/// - `409 Conflict`: key 重複
#[tracing::instrument(skip_all)]
pub async fn create_feature(
    State(state): State<Arc<FeatureState>>,
    JsonBody(req): JsonBody<CreateFeatureRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = CreateFeatureInput {
        key:         req.key,
        name:        req.name,
        description: req.description,
    };

    let feature = state.usecase.create_feature(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FeatureDto::from(&feature))),
    ))
}

/// GET /api/v1/features/{id}
#[tracing::instrument(skip_all)]
pub async fn get_feature(
    State(state): State<Arc<FeatureState>>,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ApiError> {
    let feature = state
        .usecase
        .get_feature(&FeatureId::from_string(id))
        .await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(FeatureDto::from(&feature)))))
}

/// PATCH /api/v1/features/{id}
///
/// ## レスポンス
///
/// - `200 OK`: 更新後の Feature
/// - `400 Bad Request`: バリデーションエラー、空の更新
/// - `404 Not Found`: Feature が見つからない
/// - `409 Conflict`: バージョン不一致
/// - `422 Unprocessable Entity`: アーカイブ済み Feature の有効化
#[tracing::instrument(skip_all)]
pub async fn update_feature(
    State(state): State<Arc<FeatureState>>,
    PathParam(id): PathParam<String>,
    JsonBody(req): JsonBody<UpdateFeatureRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = UpdateFeatureInput {
        feature_id:       FeatureId::from_string(id),
        expected_version: req.expected_version,
        patch:            FeaturePatch {
            name:        req.name,
            description: req.description,
            enabled:     req.enabled,
            archived:    req.archived,
        },
    };

    let feature = state.usecase.update_feature(input).await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(FeatureDto::from(&feature)))))
}

/// DELETE /api/v1/features/{id}
#[tracing::instrument(skip_all)]
pub async fn delete_feature(
    State(state): State<Arc<FeatureState>>,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .usecase
        .delete_feature(&FeatureId::from_string(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
