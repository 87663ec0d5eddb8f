//! # Feature Service 設定
//!
//! 環境変数から Feature Service の設定を読み込む。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `APP_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `APP_PORT` | No | ポート番号（デフォルト: `3000`） |
//! | `DATABASE_URL` | No | PostgreSQL 接続 URL（未設定ならインメモリ） |
//! | `DATABASE_MAX_CONNECTIONS` | No | 接続プールの上限（デフォルト: `10`） |
//! | `LOG_FORMAT` | No | `json` / `pretty`（[`TracingConfig`](crudkit_shared::observability::TracingConfig) が読む） |

use std::env;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} の値が不正です: {value:?}（{expected}）")]
    InvalidValue {
        name:     &'static str,
        value:    String,
        expected: &'static str,
    },
}

/// Feature Service サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// データベース接続 URL
    pub database_url: Option<String>,
    /// 接続プールの上限
    pub database_max_connections: u32,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("APP_PORT", lookup("APP_PORT"), DEFAULT_PORT, "0〜65535 の整数")?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let database_max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            lookup("DATABASE_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
            "1 以上の整数",
        )?;
        if database_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name:     "DATABASE_MAX_CONNECTIONS",
                value:    "0".to_string(),
                expected: "1 以上の整数",
            });
        }

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
        })
    }

    /// `host:port` 形式のバインドアドレス
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name,
                value,
                expected,
            }),
    }
}
