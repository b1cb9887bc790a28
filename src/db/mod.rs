pub mod queries;
pub mod transfer;

use std::str::FromStr;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Error;

pub use queries::categories::Category;
pub use queries::questions::{NewQuestion, Question};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens a pool for the given `sqlite:` url, creating the database file when it is missing.
pub async fn establish_connection(url: &str) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    SqlitePool::connect_with(options).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Error> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_utils {
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    use super::{queries, Category, NewQuestion, MIGRATOR};

    /// Single-connection in-memory database, every connection to `sqlite::memory:` is a new database.
    pub async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    pub fn categories() -> Vec<Category> {
        ["Science", "Art", "Geography", "History", "Entertainment", "Sports"]
            .into_iter()
            .enumerate()
            .map(|(n, kind)| Category {
                id: n as i64 + 1,
                kind: kind.to_owned(),
            })
            .collect()
    }

    /// Six categories and `count` questions spread over categories 1..=3.
    pub async fn seeded_pool(count: usize) -> SqlitePool {
        let pool = memory_pool().await;
        queries::categories::import_categories(&pool, categories())
            .await
            .unwrap();
        for n in 0..count {
            let question = NewQuestion {
                question: format!("What is question number {n}?"),
                answer: format!("Answer {n}"),
                category: (n % 3) as i64 + 1,
                difficulty: (n % 5) as i64 + 1,
            };
            queries::questions::create_question(&pool, &question)
                .await
                .unwrap();
        }
        pool
    }
}
