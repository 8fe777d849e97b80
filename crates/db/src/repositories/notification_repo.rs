//! Repository for the `notifications` table (inbox rows and chat messages).

use mdrrmo_core::notification::SENDER_CHAT;
use mdrrmo_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::notification::{CreateNotification, Notification};

const COLUMNS: &str = "id, account_type, account_id, sender_type, sender_id, \
                       sender_account_type, sender_name, recipient_name, message, is_read, \
                       created_at";

pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        Self::insert(pool, input).await
    }

    /// Insert through any executor so callers can enlist the write in a
    /// transaction.
    pub(crate) async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications
                (account_type, account_id, sender_type, sender_id, sender_account_type,
                 sender_name, recipient_name, message)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(&input.account_type)
            .bind(input.account_id)
            .bind(&input.sender_type)
            .bind(input.sender_id)
            .bind(&input.sender_account_type)
            .bind(&input.sender_name)
            .bind(&input.recipient_name)
            .bind(&input.message)
            .fetch_one(executor)
            .await
    }

    /// Send the same system message to every admin and co-admin.
    ///
    /// Returns the number of notifications created.
    pub async fn notify_all_admins(
        pool: &PgPool,
        sender_type: &str,
        message: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO notifications
                (account_type, account_id, sender_type, recipient_name, message)
             SELECT 'admin', id, $1, name, $2 FROM admins",
        )
        .bind(sender_type)
        .bind(message)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// One page of an account's inbox, newest first.
    pub async fn list_for_account(
        pool: &PgPool,
        account_type: &str,
        account_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE account_type = $1 AND account_id = $2
               AND (NOT $3 OR NOT is_read)
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(account_type)
            .bind(account_id)
            .bind(unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// `false` when the id does not exist or belongs to someone else. A row
    /// that was already read still counts as found.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        account_type: &str,
        account_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE
             WHERE id = $1 AND account_type = $2 AND account_id = $3",
        )
        .bind(notification_id)
        .bind(account_type)
        .bind(account_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns how many rows flipped from unread to read.
    pub async fn mark_all_read(
        pool: &PgPool,
        account_type: &str,
        account_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE
             WHERE account_type = $1 AND account_id = $2 AND NOT is_read",
        )
        .bind(account_type)
        .bind(account_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn unread_count(
        pool: &PgPool,
        account_type: &str,
        account_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications
             WHERE account_type = $1 AND account_id = $2 AND NOT is_read",
        )
        .bind(account_type)
        .bind(account_id)
        .fetch_one(pool)
        .await
    }

    /// The latest `limit` chat messages between two accounts, in reading
    /// order.
    pub async fn chat_thread(
        pool: &PgPool,
        (a_type, a_id): (&str, DbId),
        (b_type, b_id): (&str, DbId),
        limit: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM (
                SELECT {COLUMNS} FROM notifications
                WHERE sender_type = $5
                  AND ((account_type = $1 AND account_id = $2
                        AND sender_account_type = $3 AND sender_id = $4)
                    OR (account_type = $3 AND account_id = $4
                        AND sender_account_type = $1 AND sender_id = $2))
                ORDER BY created_at DESC, id DESC
                LIMIT $6
             ) thread
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(a_type)
            .bind(a_id)
            .bind(b_type)
            .bind(b_id)
            .bind(SENDER_CHAT)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
