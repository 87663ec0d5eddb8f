//! # アプリケーション構築
//!
//! DI（ユースケース・State）の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::{any::Any, sync::Arc};

use anyhow::anyhow;
use axum::{
    Router,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::get,
};
use crudkit_domain::clock::Clock;
use crudkit_infra::repository::FeatureRepository;
use crudkit_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    boundary::{BoundaryState, translate_failures},
    error::ApiError,
    handler::{
        FeatureState,
        create_feature,
        delete_feature,
        get_feature,
        health_check,
        list_features,
        method_not_allowed,
        route_not_found,
        update_feature,
    },
    usecase::FeatureUseCaseImpl,
};

/// ルーターを構築する
///
/// 同じ `clock` をユースケースのタイムスタンプとエラーレスポンスの
/// `timestamp` の両方に使う。
pub fn build_app(repository: Arc<dyn FeatureRepository>, clock: Arc<dyn Clock>) -> Router {
    let feature_state = Arc::new(FeatureState {
        usecase: FeatureUseCaseImpl::new(repository, clock.clone()),
    });
    let boundary_state = BoundaryState { clock };

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/features", get(list_features).post(create_feature))
        .route(
            "/api/v1/features/{id}",
            get(get_feature)
                .patch(update_feature)
                .delete(delete_feature),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(feature_state)
        // レイヤー順序（下に書いたものが外側）
        // 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: request_id を含むスパン
        // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        // 4. translate_failures: PendingFailure の付いたレスポンスを正規化
        // 5. CatchPanicLayer（最内）: panic を PendingFailure 付きレスポンスにする
        .layer(CatchPanicLayer::custom(panic_to_failure))
        .layer(from_fn_with_state(boundary_state, translate_failures))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

/// panic を想定外のエラーとして境界変換器に渡す
fn panic_to_failure(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    ApiError::Unexpected(anyhow!("handler panicked: {detail}")).into_response()
}
