//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置し、ここで re-export する
//! - ハンドラは薄く保ち、ビジネスロジックはユースケースに委譲
//! - 失敗は `Result<_, ApiError>` で返すだけで、エラーボディは組み立てない

pub mod feature;
pub mod health;
pub mod not_found;

pub use feature::{
    FeatureState,
    create_feature,
    delete_feature,
    get_feature,
    list_features,
    update_feature,
};
pub use health::health_check;
pub use not_found::{method_not_allowed, route_not_found};
