// ==========================================
// 酒庄酒窖管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 内嵌 schema 初始化，保证测试库与运行库建表一致
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等）
///
/// 建表顺序: container → lot → lot_assignment（外键依赖）
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS container (
            container_id       TEXT PRIMARY KEY,
            winery_id          TEXT NOT NULL,
            name               TEXT NOT NULL,
            container_type     TEXT NOT NULL,
            capacity_gal       REAL NOT NULL,
            status             TEXT NOT NULL,
            total_fills        INTEGER NOT NULL DEFAULT 0,
            last_topping_date  TEXT,
            purchase_date      TEXT,
            created_at         TEXT NOT NULL,
            updated_at         TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS lot (
            lot_id        TEXT PRIMARY KEY,
            winery_id     TEXT NOT NULL,
            name          TEXT NOT NULL,
            status        TEXT NOT NULL,
            volume_gal    REAL NOT NULL,
            vintage_year  INTEGER NOT NULL,
            varietal      TEXT NOT NULL,
            appellation   TEXT,
            block_id      TEXT,
            harvest_date  TEXT,
            press_date    TEXT,
            yeast_strain  TEXT,
            ph            REAL,
            ta_g_l        REAL,
            va_g_l        REAL,
            free_so2_ppm  REAL,
            alcohol_pct   REAL,
            parent_lot_id TEXT REFERENCES lot(lot_id),
            container_id  TEXT REFERENCES container(container_id),
            notes         TEXT,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS lot_assignment (
            assignment_id TEXT PRIMARY KEY,
            container_id  TEXT NOT NULL REFERENCES container(container_id),
            lot_id        TEXT NOT NULL REFERENCES lot(lot_id),
            volume_gal    REAL NOT NULL,
            assigned_at   TEXT NOT NULL,
            actor         TEXT NOT NULL,
            detail_json   TEXT
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key      TEXT NOT NULL,
            value    TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );

        CREATE INDEX IF NOT EXISTS idx_lot_winery_status ON lot(winery_id, status);
        CREATE INDEX IF NOT EXISTS idx_lot_parent ON lot(parent_lot_id);
        CREATE INDEX IF NOT EXISTS idx_container_winery ON container(winery_id);
        CREATE INDEX IF NOT EXISTS idx_assignment_container ON lot_assignment(container_id);
        CREATE INDEX IF NOT EXISTS idx_assignment_lot ON lot_assignment(lot_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
