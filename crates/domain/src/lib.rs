//! # crudkit ドメイン層
//!
//! ビジネスロジックの中核を担うドメインモデルと、予期された失敗の表現を定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! feature-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、HTTP）に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメインエラーの分類（kind / HTTP ステータス / metadata）
//! - [`result`] - 失敗を戻り値で伝えるための合成操作
//! - [`clock`] - 時刻プロバイダ
//! - [`feature`] - Feature エンティティと値オブジェクト

pub mod clock;
pub mod error;
pub mod feature;
pub mod result;

pub use error::{DomainError, DomainErrorPayload, ErrorMetadata};
pub use result::DomainResult;
