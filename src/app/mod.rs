// ==========================================
// 酒庄酒窖管理系统 - 应用层
// ==========================================
// 职责: 应用状态组装与入口支持
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState};
