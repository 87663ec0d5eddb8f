//! # crudkit 共有ユーティリティ
//!
//! ワークスペース全体で使用される共通の型とヘルパーを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, feature-service）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - HTTP フレームワークへの依存は持たない（observability feature の `http` 型のみ）

pub mod api_response;
pub mod error_response;
pub mod health;
pub mod observability;

pub use api_response::ApiResponse;
pub use error_response::{ErrorDetails, ErrorResponse};
pub use health::HealthResponse;
