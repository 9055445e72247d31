// ==========================================
// 酒庄酒窖管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换存储层错误为用户友好的错误消息
// 红线: 所有错误信息必须包含显式原因 (可解释性)
// ==========================================

use crate::repository::error::StoreError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 分桶业务错误
    // ==========================================
    /// 可用容量不足 (规划余量 > 0,整批拒绝,未发生任何写入)
    #[error("可用容量不足: 还差 {shortfall_gal} 加仑")]
    InsufficientCapacity { shortfall_gal: f64 },

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据存储错误: {0}")]
    StoreFailure(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 StoreError 转换
// 目的: 将存储层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            StoreError::ValidationError(msg) => ApiError::ValidationError(msg),
            StoreError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            StoreError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            StoreError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            StoreError::DatabaseConnectionError(msg)
            | StoreError::LockError(msg)
            | StoreError::DatabaseQueryError(msg) => ApiError::StoreFailure(msg),
            StoreError::InternalError(msg) => ApiError::InternalError(msg),
            StoreError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_conversion() {
        // NotFound错误转换
        let store_err = StoreError::NotFound {
            entity: "Lot".to_string(),
            id: "L001".to_string(),
        };
        let api_err: ApiError = store_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Lot"));
                assert!(msg.contains("L001"));
            }
            _ => panic!("Expected NotFound"),
        }

        // 查询错误归入 StoreFailure
        let store_err = StoreError::DatabaseQueryError("disk I/O error".to_string());
        let api_err: ApiError = store_err.into();
        assert!(matches!(api_err, ApiError::StoreFailure(_)));
    }

    #[test]
    fn test_insufficient_capacity_message_names_shortfall() {
        let err = ApiError::InsufficientCapacity { shortfall_gal: 5.0 };
        let msg = err.to_string();
        assert!(msg.contains("5"));
        assert!(msg.contains("加仑"));
    }
}
