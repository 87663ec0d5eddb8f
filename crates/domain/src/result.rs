//! # Result コンテナ
//!
//! ユースケースが予期された失敗を「戻り値」として伝えるための操作群。
//!
//! 実体は標準の [`Result`] であり、ここでは合成規則を名前付きの関数として提供する:
//!
//! - [`ok`] / [`err`]: 成功 / 失敗の生成
//! - [`map`]: 成功値の変換（失敗はそのまま通す）
//! - [`chain`]: 失敗しうる変換の連結（最初の失敗で短絡し、以降は評価しない）
//! - [`is_ok`] / [`is_err`]: 分岐用の述語
//! - [`ensure`]: 条件が偽なら失敗を返すガード
//!
//! 呼び出し側が渡したクロージャの panic は捕捉しない。
//! このコンテナが扱うのは予期された失敗だけである。
//!
//! ```rust
//! use crudkit_domain::{
//!     DomainError,
//!     result::{DomainResult, chain, ensure, map, ok},
//! };
//!
//! fn parse_limit(raw: &str) -> DomainResult<u32> {
//!     let parsed = raw
//!         .parse::<u32>()
//!         .map_err(|_| DomainError::invalid_field("limit", "limit must be a number"));
//!     chain(parsed, |n| {
//!         map(
//!             ensure(n <= 100, || DomainError::invalid_field("limit", "limit must be <= 100")),
//!             |()| n,
//!         )
//!     })
//! }
//!
//! assert_eq!(parse_limit("20"), ok(20));
//! assert!(parse_limit("500").is_err());
//! ```

use crate::DomainError;

/// ドメインエラーを失敗側に持つ Result
pub type DomainResult<T> = Result<T, DomainError>;

/// 成功を生成する
pub fn ok<T, E>(value: T) -> Result<T, E> {
    Ok(value)
}

/// 失敗を生成する
pub fn err<T, E>(error: E) -> Result<T, E> {
    Err(error)
}

/// 成功値に `f` を適用する。失敗は変更せずに返す
pub fn map<T, U, E, F>(result: Result<T, E>, f: F) -> Result<U, E>
where
    F: FnOnce(T) -> U,
{
    result.map(f)
}

/// 成功値に失敗しうる `f` を適用する
///
/// 入力が失敗なら `f` は呼ばれず、最初の失敗がそのまま返る（左優先、エラーの蓄積はしない）。
pub fn chain<T, U, E, F>(result: Result<T, E>, f: F) -> Result<U, E>
where
    F: FnOnce(T) -> Result<U, E>,
{
    result.and_then(f)
}

pub fn is_ok<T, E>(result: &Result<T, E>) -> bool {
    result.is_ok()
}

pub fn is_err<T, E>(result: &Result<T, E>) -> bool {
    result.is_err()
}

/// `condition` が偽のとき `error()` の失敗を返す
pub fn ensure<E, F>(condition: bool, error: F) -> Result<(), E>
where
    F: FnOnce() -> E,
{
    if condition { Ok(()) } else { Err(error()) }
}
