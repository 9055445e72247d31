// ==========================================
// 酒庄酒窖管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 分桶与批次追溯核心 (人工最终控制权)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 存储层 - 数据访问与远端存储边界
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ContainerStatus, ContainerType, LotStatus, ToppingSeverity};

// 领域实体
pub use domain::{
    AllocationPlan, AllocationRecord, ChemistrySnapshot, Container, ContainerDraft,
    ContainerPatch, Lot, LotDraft, LotFilter, LotPatch, OperatorSession, PlannedFill,
};

// 引擎
pub use engine::{
    cellar_ordered, is_fully_allocated, remaining_volume, AllocationPlanner, LotSplitExecutor,
    RenamePlan, ReplacementAdvice, SplitOutcome, ToppingAlert,
};

// 存储
pub use repository::{ProductionStore, SqliteProductionStore, StoreError, StoreResult};

// API
pub use api::{
    AllocationApi, AllocationPreview, ApiError, ApiResult, CellarSummary, ContainerApi,
    DashboardApi, LotApi, LotDetail, SplitReport,
};

// 配置
pub use config::{ConfigManager, MaintenanceThresholds};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "酒庄酒窖管理系统";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
