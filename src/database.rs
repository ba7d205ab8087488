//! SQLite-backed store for courses, contests and settings.
//!
//! One connection per process, shared behind an async mutex. Course rows are
//! the event catalog the reminder scheduler reads each tick; time slots are
//! returned exactly as stored and validated by the scheduler.

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use sqlite::{Connection, ConnectionWithFullMutex, State};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::features::contests::{default_contests, Contest};
use crate::features::reminders::{EventCatalog, RecurringEvent, SettingsStore};

/// A stored course row
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: i64,
    pub course_name: String,
    pub teacher: Option<String>,
    pub location: Option<String>,
    pub time_slot: String,
    pub day_of_week: i64,
    pub created_at: String,
}

impl Course {
    pub fn to_event(&self) -> RecurringEvent {
        RecurringEvent {
            name: self.course_name.clone(),
            teacher: self.teacher.clone(),
            location: self.location.clone(),
            time_slot: self.time_slot.clone(),
            day_of_week: self.day_of_week,
        }
    }
}

#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<ConnectionWithFullMutex>>,
}

impl Database {
    pub async fn new(db_path: &str) -> Result<Self> {
        let connection = Connection::open_with_full_mutex(db_path)?;
        let database = Database {
            connection: Arc::new(Mutex::new(connection)),
        };
        database.init_tables().await?;
        info!("Database initialized at {}", db_path);
        Ok(database)
    }

    async fn init_tables(&self) -> Result<()> {
        let conn = self.connection.lock().await;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS courses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_name TEXT NOT NULL,
                teacher TEXT,
                location TEXT,
                time_slot TEXT NOT NULL,
                day_of_week INTEGER NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS contests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                url TEXT,
                deadline TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT
            )",
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_courses_day ON courses(day_of_week, time_slot)",
        )?;

        Ok(())
    }

    /// Rows affected by the last INSERT/UPDATE/DELETE on this connection
    fn changes(conn: &Connection) -> Result<usize> {
        let mut statement = conn.prepare("SELECT changes()")?;
        let mut count = 0;
        if let State::Row = statement.next()? {
            count = statement.read::<i64, _>(0usize)?;
        }
        Ok(count.max(0) as usize)
    }

    fn last_insert_id(conn: &Connection) -> Result<i64> {
        let mut statement = conn.prepare("SELECT last_insert_rowid()")?;
        let mut id = 0;
        if let State::Row = statement.next()? {
            id = statement.read::<i64, _>(0usize)?;
        }
        Ok(id)
    }

    // ========================================================================
    // Courses
    // ========================================================================

    pub async fn add_course(
        &self,
        course_name: &str,
        teacher: Option<&str>,
        location: Option<&str>,
        time_slot: &str,
        day_of_week: i64,
    ) -> Result<i64> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "INSERT INTO courses (course_name, teacher, location, time_slot, day_of_week)
             VALUES (?, ?, ?, ?, ?)",
        )?;
        statement.bind((1, course_name))?;
        statement.bind((2, teacher))?;
        statement.bind((3, location))?;
        statement.bind((4, time_slot))?;
        statement.bind((5, day_of_week))?;
        statement.next()?;
        drop(statement);

        let id = Self::last_insert_id(&conn)?;
        debug!("Added course '{}' (id {})", course_name, id);
        Ok(id)
    }

    fn read_courses(statement: &mut sqlite::Statement) -> Result<Vec<Course>> {
        let mut courses = Vec::new();
        while let State::Row = statement.next()? {
            courses.push(Course {
                id: statement.read::<i64, _>("id")?,
                course_name: statement.read::<String, _>("course_name")?,
                teacher: statement.read::<Option<String>, _>("teacher")?,
                location: statement.read::<Option<String>, _>("location")?,
                time_slot: statement.read::<String, _>("time_slot")?,
                day_of_week: statement.read::<i64, _>("day_of_week")?,
                created_at: statement
                    .read::<Option<String>, _>("created_at")?
                    .unwrap_or_default(),
            });
        }
        Ok(courses)
    }

    /// All courses ordered by day then time
    pub async fn get_all_courses(&self) -> Result<Vec<Course>> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "SELECT id, course_name, teacher, location, time_slot, day_of_week, created_at
             FROM courses ORDER BY day_of_week, time_slot",
        )?;
        Self::read_courses(&mut statement)
    }

    pub async fn get_courses_by_day(&self, day_of_week: i64) -> Result<Vec<Course>> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "SELECT id, course_name, teacher, location, time_slot, day_of_week, created_at
             FROM courses WHERE day_of_week = ? ORDER BY time_slot",
        )?;
        statement.bind((1, day_of_week))?;
        Self::read_courses(&mut statement)
    }

    /// Delete every course with this name. Returns the number removed.
    pub async fn delete_course(&self, course_name: &str) -> Result<usize> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare("DELETE FROM courses WHERE course_name = ?")?;
        statement.bind((1, course_name))?;
        statement.next()?;
        drop(statement);
        Self::changes(&conn)
    }

    // ========================================================================
    // Contests
    // ========================================================================

    pub async fn add_contest(&self, contest: &Contest) -> Result<i64> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "INSERT INTO contests (name, description, url, deadline) VALUES (?, ?, ?, ?)",
        )?;
        statement.bind((1, contest.name.as_str()))?;
        statement.bind((2, contest.description.as_str()))?;
        statement.bind((3, contest.url.as_str()))?;
        statement.bind((4, contest.deadline.as_str()))?;
        statement.next()?;
        drop(statement);
        Self::last_insert_id(&conn)
    }

    /// All contests ordered by deadline
    pub async fn get_all_contests(&self) -> Result<Vec<Contest>> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "SELECT id, name, description, url, deadline FROM contests ORDER BY deadline",
        )?;

        let mut contests = Vec::new();
        while let State::Row = statement.next()? {
            contests.push(Contest {
                id: Some(statement.read::<i64, _>("id")?),
                name: statement.read::<String, _>("name")?,
                description: statement
                    .read::<Option<String>, _>("description")?
                    .unwrap_or_default(),
                url: statement.read::<Option<String>, _>("url")?.unwrap_or_default(),
                deadline: statement
                    .read::<Option<String>, _>("deadline")?
                    .unwrap_or_default(),
            });
        }
        Ok(contests)
    }

    pub async fn delete_contest(&self, contest_id: i64) -> Result<bool> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare("DELETE FROM contests WHERE id = ?")?;
        statement.bind((1, contest_id))?;
        statement.next()?;
        drop(statement);
        Ok(Self::changes(&conn)? > 0)
    }

    /// Insert the built-in contests when the table is empty.
    /// Returns the number inserted.
    pub async fn seed_default_contests(&self) -> Result<usize> {
        if !self.get_all_contests().await?.is_empty() {
            return Ok(0);
        }

        let defaults = default_contests();
        for contest in &defaults {
            self.add_contest(contest).await?;
        }
        info!("Seeded {} default contests", defaults.len());
        Ok(defaults.len())
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub async fn save_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connection.lock().await;
        let mut statement =
            conn.prepare("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")?;
        statement.bind((1, key))?;
        statement.bind((2, value))?;
        statement.next()?;
        Ok(())
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare("SELECT value FROM settings WHERE key = ?")?;
        statement.bind((1, key))?;

        if let State::Row = statement.next()? {
            Ok(statement.read::<Option<String>, _>("value")?)
        } else {
            Ok(None)
        }
    }

    pub async fn delete_setting(&self, key: &str) -> Result<()> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare("DELETE FROM settings WHERE key = ?")?;
        statement.bind((1, key))?;
        statement.next()?;
        Ok(())
    }
}

#[async_trait]
impl EventCatalog for Database {
    async fn list_events(&self) -> Result<Vec<RecurringEvent>> {
        Ok(self
            .get_all_courses()
            .await?
            .iter()
            .map(Course::to_event)
            .collect())
    }
}

#[async_trait]
impl SettingsStore for Database {
    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Database::get_setting(self, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_db() -> Database {
        Database::new(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_courses_ordered_by_day_then_time() {
        let db = memory_db().await;
        db.add_course("数据结构", Some("李老师"), Some("教学楼B"), "10:00", 2)
            .await
            .unwrap();
        db.add_course("Python程序设计", Some("王老师"), Some("教学楼A"), "08:00", 1)
            .await
            .unwrap();
        db.add_course("高等数学", None, None, "14:00", 1).await.unwrap();

        let courses = db.get_all_courses().await.unwrap();
        let names: Vec<_> = courses.iter().map(|c| c.course_name.as_str()).collect();
        assert_eq!(names, vec!["Python程序设计", "高等数学", "数据结构"]);
        assert_eq!(courses[1].teacher, None);
        assert!(!courses[0].created_at.is_empty());

        let monday = db.get_courses_by_day(1).await.unwrap();
        assert_eq!(monday.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_course() {
        let db = memory_db().await;
        db.add_course("高等数学", None, None, "08:00", 1).await.unwrap();
        db.add_course("高等数学", None, None, "08:00", 3).await.unwrap();

        assert_eq!(db.delete_course("高等数学").await.unwrap(), 2);
        assert_eq!(db.delete_course("高等数学").await.unwrap(), 0);
        assert!(db.get_all_courses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_returns_raw_time_slots() {
        let db = memory_db().await;
        db.add_course("坏记录", None, None, "25:99", 9).await.unwrap();
        db.add_course("Python程序设计", None, Some("教学楼A"), "08:00", 1)
            .await
            .unwrap();

        let events = db.list_events().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "Python程序设计");
        assert_eq!(events[1].time_slot, "25:99");
        assert!(events[1].time_of_day().is_err());
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let db = memory_db().await;
        assert_eq!(db.get_setting("notification_enabled").await.unwrap(), None);

        db.save_setting("notification_enabled", "False").await.unwrap();
        db.save_setting("notification_enabled", "True").await.unwrap();
        assert_eq!(
            SettingsStore::get_setting(&db, "notification_enabled")
                .await
                .unwrap()
                .as_deref(),
            Some("True")
        );

        db.delete_setting("notification_enabled").await.unwrap();
        assert_eq!(db.get_setting("notification_enabled").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_contests_seeded_once_and_sorted() {
        let db = memory_db().await;
        assert_eq!(db.seed_default_contests().await.unwrap(), 5);
        assert_eq!(db.seed_default_contests().await.unwrap(), 0);

        let contests = db.get_all_contests().await.unwrap();
        assert_eq!(contests.len(), 5);
        assert_eq!(contests[0].name, "全国大学生英语竞赛");
        assert!(contests.windows(2).all(|w| w[0].deadline <= w[1].deadline));

        let id = contests[0].id.unwrap();
        assert!(db.delete_contest(id).await.unwrap());
        assert!(!db.delete_contest(id).await.unwrap());
        assert_eq!(db.get_all_contests().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_locked_catalog_read_is_an_error() {
        let path = std::env::temp_dir().join(format!("campus-locked-{}.db", uuid::Uuid::new_v4()));
        let path_str = path.to_string_lossy().to_string();

        let db = Database::new(&path_str).await.unwrap();
        db.add_course("Python程序设计", None, Some("教学楼A"), "08:00", 1)
            .await
            .unwrap();
        assert_eq!(db.list_events().await.unwrap().len(), 1);

        // Another process holds the write lock
        let locker = sqlite::open(&path).unwrap();
        locker
            .execute("BEGIN EXCLUSIVE; UPDATE courses SET teacher = '王老师';")
            .unwrap();
        assert!(db.list_events().await.is_err());

        locker.execute("ROLLBACK;").unwrap();
        assert_eq!(db.list_events().await.unwrap().len(), 1);

        drop(locker);
        drop(db);
        let _ = std::fs::remove_file(&path);
    }
}
