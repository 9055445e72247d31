// ==========================================
// 酒庄酒窖管理系统 - 存储层日期/时间工具
// ==========================================
// 约定:
// - 日期列存 "%Y-%m-%d"
// - 时间戳列存 RFC3339 (UTC)
// ==========================================

use crate::repository::error::{StoreError, StoreResult};
use chrono::{DateTime, NaiveDate, Utc};

/// 日期 → 数据库字符串
pub fn fmt_date(date: &Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// 数据库字符串 → 日期
pub fn parse_date(raw: Option<String>, field: &str) -> StoreResult<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| StoreError::FieldValueError {
                field: field.to_string(),
                message: format!("日期解析失败: {} ({})", s, e),
            }),
    }
}

/// 时间戳 → 数据库字符串
pub fn fmt_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// 数据库字符串 → 时间戳
pub fn parse_timestamp(raw: &str, field: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::FieldValueError {
            field: field.to_string(),
            message: format!("时间戳解析失败: {} ({})", raw, e),
        })
}
