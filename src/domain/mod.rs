// ==========================================
// 酒庄酒窖管理系统 - 领域层
// ==========================================
// 职责: 实体与类型定义,不含持久化与业务编排
// ==========================================

pub mod allocation;
pub mod container;
pub mod lot;
pub mod session;
pub mod types;

// 重导出核心实体
pub use allocation::{AllocationPlan, AllocationRecord, PlannedFill, VOLUME_EPSILON_GAL};
pub use container::{Container, ContainerDraft, ContainerPatch};
pub use lot::{ChemistrySnapshot, Lot, LotDraft, LotFilter, LotPatch};
pub use session::OperatorSession;
pub use types::{ContainerStatus, ContainerType, LotStatus, ToppingSeverity};
