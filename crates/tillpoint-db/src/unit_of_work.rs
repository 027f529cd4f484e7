//! # Unit of Work
//!
//! An atomic scope over the store. Every write the sale engine makes
//! happens inside one of these; either all of it commits or none of it does.
//!
//! ```text
//! begin ──► statement ──► statement ──► ... ──┬──► commit    (all visible)
//!                                             └──► rollback  (nothing visible)
//! ```
//!
//! Dropping a unit of work without committing rolls it back.
//!
//! ## Write Ordering
//! Units of work begin deferred. Each one the engine opens starts with a
//! write statement, so it takes the SQLite write lock before reading
//! anything and competing units queue on the busy timeout.

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{trace, warn};

use crate::error::{DbError, DbResult};

/// An open database transaction.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        trace!("Unit of work opened");
        Ok(UnitOfWork { tx })
    }

    /// The connection all statements in this unit must run on.
    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Makes every change in this unit visible.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        trace!("Unit of work committed");
        Ok(())
    }

    /// Discards every change in this unit.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        trace!("Unit of work rolled back");
        Ok(())
    }

    /// Commits on `Ok`, rolls back on `Err`.
    ///
    /// A failed commit is returned as the outcome. A failed rollback is
    /// logged and the original error is returned; SQLite discards the
    /// transaction when the connection drops it.
    pub async fn finish<T, E>(self, outcome: Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        match outcome {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn count_members(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn insert_member(uow: &mut UnitOfWork, id: i64) {
        sqlx::query("INSERT INTO members (id, name) VALUES (?, 'Test')")
            .bind(id)
            .execute(uow.conn())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_finish_commits_on_ok() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        insert_member(&mut uow, 1).await;
        let out: Result<(), DbError> = uow.finish(Ok(())).await;
        assert!(out.is_ok());

        assert_eq!(count_members(&db).await, 1);
    }

    #[tokio::test]
    async fn test_finish_rolls_back_on_err() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        insert_member(&mut uow, 1).await;
        insert_member(&mut uow, 2).await;
        let out: Result<(), DbError> = uow.finish(Err(DbError::Internal("boom".into()))).await;
        assert!(matches!(out, Err(DbError::Internal(_))));

        assert_eq!(count_members(&db).await, 0);
    }

    #[tokio::test]
    async fn test_drop_discards_changes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        {
            let mut uow = db.begin().await.unwrap();
            insert_member(&mut uow, 7).await;
        }

        assert_eq!(count_members(&db).await, 0);
    }
}
