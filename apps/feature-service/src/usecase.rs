//! # ユースケース層
//!
//! Feature Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリと時刻を `Arc<dyn Trait>` で外部から注入
//! - **失敗は戻り値で返す**: 予期された失敗は `Err(ApiError::Domain(..))`、
//!   永続化層の失敗は `?` でそのまま `ApiError::Persistence` として上げる

pub mod feature;

pub use feature::{CreateFeatureInput, FeatureUseCaseImpl, UpdateFeatureInput};
