// ==========================================
// 酒庄酒窖管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};

use crate::api::{AllocationApi, ContainerApi, DashboardApi, LotApi};
use crate::config::ConfigManager;
use crate::db::{initialize_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::repository::{ProductionStore, SqliteProductionStore};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 批次API
    pub lot_api: Arc<LotApi>,

    /// 容器API
    pub container_api: Arc<ContainerApi>,

    /// 分桶API
    pub allocation_api: Arc<AllocationApi>,

    /// 总览API
    pub dashboard_api: Arc<DashboardApi>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,
}

impl AppState {
    /// 初始化应用状态
    ///
    /// 步骤: 打开连接 (统一 PRAGMA) → 初始化 schema → 组装存储与API
    pub fn new(db_path: String) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(&db_path)?;
        initialize_schema(&conn)?;

        if let Some(version) = read_schema_version(&conn)? {
            if version != CURRENT_SCHEMA_VERSION {
                tracing::warn!(
                    found = version,
                    expected = CURRENT_SCHEMA_VERSION,
                    "数据库 schema 版本与当前代码不一致"
                );
            }
        }

        let conn = Arc::new(Mutex::new(conn));
        let store: Arc<dyn ProductionStore> = Arc::new(SqliteProductionStore::new(conn.clone()));
        let config = Arc::new(ConfigManager::from_connection(conn)?);

        Ok(Self {
            db_path,
            lot_api: Arc::new(LotApi::new(store.clone())),
            container_api: Arc::new(ContainerApi::new(store.clone(), config.clone())),
            allocation_api: Arc::new(AllocationApi::new(store.clone())),
            dashboard_api: Arc::new(DashboardApi::new(store, config.clone())),
            config,
        })
    }
}

/// 默认数据库路径
///
/// 放在系统数据目录下;目录不存在时退回当前目录
pub fn get_default_db_path() -> String {
    let base = dirs::data_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    let dir = base.join("winery-cellar-ops");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(error = %e, "创建数据目录失败,使用当前目录");
        return "cellar.db".to_string();
    }
    dir.join("cellar.db").to_string_lossy().to_string()
}
