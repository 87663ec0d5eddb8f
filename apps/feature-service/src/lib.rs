//! # Feature Service ライブラリ
//!
//! Feature の CRUD API と、失敗をひとつの形式の HTTP レスポンスに揃える
//! 境界変換器を提供する。
//!
//! ## 失敗の流れ
//!
//! ```text
//! usecase ──Result<T, ApiError>──▶ handler ──?──▶ ApiError::into_response
//!                                                     │（PendingFailure を付与）
//!                                                     ▼
//!                                     boundary::translate_failures（Router に 1 回登録）
//!                                                     │
//!                                                     ▼
//!                                       { code, message, details?, timestamp, path }
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - サービス境界のエラー型 [`ApiError`](error::ApiError)
//! - [`boundary`] - 失敗の分類とレスポンス生成
//! - [`extract`] - rejection を [`ApiError`](error::ApiError) に揃える抽出器
//! - [`usecase`] - ビジネスロジック
//! - [`handler`] - HTTP ハンドラ
//! - [`app_builder`] - ルーターとミドルウェアの組み立て
//! - [`config`] - 環境変数からの設定読み込み

pub mod app_builder;
pub mod boundary;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod usecase;
