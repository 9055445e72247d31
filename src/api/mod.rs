// ==========================================
// 酒庄酒窖管理系统 - API 层
// ==========================================
// 职责: 业务接口编排 (存储 + 引擎 + 校验 + 审计)
// 红线: 写入前置校验失败关闭,执行期单项失败聚合上报
// ==========================================

pub mod allocation_api;
pub mod container_api;
pub mod dashboard_api;
pub mod error;
pub mod lot_api;
pub mod validator;

// 重导出核心类型
pub use allocation_api::{AllocationApi, AllocationPreview, SplitReport};
pub use container_api::ContainerApi;
pub use dashboard_api::{CellarSummary, DashboardApi};
pub use error::{ApiError, ApiResult};
pub use lot_api::{LotApi, LotDetail};
pub use validator::CommitValidator;
