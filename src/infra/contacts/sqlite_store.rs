use crate::core::contact::{ContactStore, NewContact, StoreError, StoredContact};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

/// Durable contact store backed by SQLite.
pub struct SqliteContactStore {
    pool: Pool<Sqlite>,
}

impl SqliteContactStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        let in_memory = conn_str.contains(":memory:");
        let options = SqliteConnectOptions::from_str(&conn_str)?.create_if_missing(true);

        // SQLite creates the file but not the directories leading to it.
        if !in_memory {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        // Every connection to `:memory:` is its own database, so stick to one.
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                company TEXT NOT NULL,
                revenue_bracket TEXT NOT NULL,
                message TEXT NOT NULL,
                submitted_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn insert(&self, contact: NewContact) -> Result<StoredContact, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO contacts
                (name, email, phone, company, revenue_bracket, message, submitted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.company)
        .bind(&contact.revenue_bracket)
        .bind(&contact.message)
        .bind(contact.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(StoredContact {
            id: result.last_insert_rowid(),
            contact,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use sqlx::Row;

    fn new_contact(name: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            email: "a@b.com".to_string(),
            phone: "11999999999".to_string(),
            company: "Acme".to_string(),
            revenue_bracket: "100k-500k".to_string(),
            message: "Olá".to_string(),
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = SqliteContactStore::new("sqlite::memory:").await.unwrap();

        let first = store.insert(new_contact("Ana")).await.unwrap();
        let second = store.insert(new_contact("Bia")).await.unwrap();

        assert!(first.id > 0);
        assert!(second.id > first.id);
        assert_eq!(second.contact.name, "Bia");
    }

    #[tokio::test]
    async fn inserted_row_matches_contact() {
        let store = SqliteContactStore::new("sqlite::memory:").await.unwrap();
        let stored = store.insert(new_contact("Ana")).await.unwrap();

        let row = sqlx::query("SELECT * FROM contacts WHERE id = ?")
            .bind(stored.id)
            .fetch_one(&store.pool)
            .await
            .unwrap();

        assert_eq!(row.get::<String, _>("name"), "Ana");
        assert_eq!(row.get::<String, _>("message"), "Olá");
        assert_eq!(
            row.get::<DateTime<Utc>, _>("submitted_at"),
            stored.contact.submitted_at
        );
    }

    #[tokio::test]
    async fn closed_pool_reports_storage_errors() {
        let store = SqliteContactStore::new("sqlite::memory:").await.unwrap();
        assert!(store.ping().await.is_ok());

        store.pool.close().await;

        assert!(matches!(
            store.insert(new_contact("Ana")).await,
            Err(StoreError::Storage(_))
        ));
        assert!(store.ping().await.is_err());
    }

    #[tokio::test]
    async fn relative_sqlite_url_creates_the_database_where_it_points() {
        let dir = tempfile::Builder::new()
            .prefix("contacts-store-")
            .tempdir_in(".")
            .unwrap();
        let dir_name = dir.path().file_name().unwrap().to_str().unwrap();
        let url = format!("sqlite:{}/nested/contacts.db", dir_name);

        let store = SqliteContactStore::new(&url).await.unwrap();
        store.insert(new_contact("Ana")).await.unwrap();

        assert!(dir.path().join("nested").join("contacts.db").is_file());
        assert!(!std::path::Path::new(&format!("sqlite:{}", dir_name)).exists());
    }

    #[tokio::test]
    async fn url_prefixes_point_at_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.db");
        let path = path.to_str().unwrap();

        let plain = SqliteContactStore::new(path).await.unwrap();
        let first = plain.insert(new_contact("Ana")).await.unwrap();
        plain.pool.close().await;

        let prefixed = SqliteContactStore::new(&format!("sqlite://{}", path))
            .await
            .unwrap();
        let second = prefixed.insert(new_contact("Bia")).await.unwrap();
        assert_eq!(second.id, first.id + 1);
    }

    #[tokio::test]
    async fn contacts_survive_reopening_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("contacts.db");
        let path = path.to_str().unwrap();

        let store = SqliteContactStore::new(path).await.unwrap();
        let stored = store.insert(new_contact("Ana")).await.unwrap();
        store.pool.close().await;

        let reopened = SqliteContactStore::new(path).await.unwrap();
        let next = reopened.insert(new_contact("Bia")).await.unwrap();
        assert!(next.id > stored.id);
    }
}
