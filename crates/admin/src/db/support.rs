//! Support ticket repository.

use sqlx::PgPool;
use tracing::instrument;

use giftmart_core::{ActorRole, Priority, TicketId, TicketStatus};

use super::RepositoryError;
use crate::models::support::{NewTicket, SupportTicket, TicketReply, TicketUpdate};

const TICKET_COLUMNS: &str = "id, subject, description, requester_name, requester_email, \
     priority, category, status, assigned_to, resolved_at, created_at, updated_at";

/// Repository for the support desk.
pub struct TicketRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TicketRepository<'a> {
    /// Create a new ticket repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Tickets, newest first, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        status: Option<TicketStatus>,
        priority: Option<Priority>,
        category: Option<&str>,
    ) -> Result<Vec<SupportTicket>, RepositoryError> {
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM market.support_ticket
             WHERE ($1::market.ticket_status IS NULL OR status = $1)
               AND ($2::market.priority IS NULL OR priority = $2)
               AND ($3::text IS NULL OR category = $3)
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, SupportTicket>(&sql)
            .bind(status)
            .bind(priority)
            .bind(category)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Get one ticket.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TicketId) -> Result<Option<SupportTicket>, RepositoryError> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM market.support_ticket WHERE id = $1");
        let row = sqlx::query_as::<_, SupportTicket>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Replies on a ticket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn replies(&self, id: TicketId) -> Result<Vec<TicketReply>, RepositoryError> {
        let rows = sqlx::query_as::<_, TicketReply>(
            r"SELECT id, ticket_id, author_role, author_name, message, created_at
              FROM market.ticket_reply
              WHERE ticket_id = $1
              ORDER BY created_at, id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Open a ticket.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, ticket), fields(subject = %ticket.subject))]
    pub async fn create(&self, ticket: &NewTicket) -> Result<SupportTicket, RepositoryError> {
        let sql = format!(
            "INSERT INTO market.support_ticket
                 (subject, description, requester_name, requester_email, priority, category)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {TICKET_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SupportTicket>(&sql)
            .bind(&ticket.subject)
            .bind(&ticket.description)
            .bind(&ticket.requester_name)
            .bind(ticket.requester_email.as_str())
            .bind(ticket.priority)
            .bind(&ticket.category)
            .fetch_one(self.pool)
            .await?;
        Ok(row)
    }

    /// Apply a partial update. Moving to `resolved` stamps `resolved_at`;
    /// reopening clears it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ticket does not exist.
    #[instrument(skip(self, update), fields(ticket_id = %id))]
    pub async fn update(
        &self,
        id: TicketId,
        update: &TicketUpdate,
    ) -> Result<SupportTicket, RepositoryError> {
        let sql = format!(
            "UPDATE market.support_ticket
             SET status = COALESCE($2, status),
                 priority = COALESCE($3, priority),
                 assigned_to = COALESCE($4, assigned_to),
                 resolved_at = CASE
                     WHEN $2::market.ticket_status = 'resolved' THEN COALESCE(resolved_at, NOW())
                     WHEN $2::market.ticket_status IN ('open', 'in_progress') THEN NULL
                     ELSE resolved_at
                 END,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {TICKET_COLUMNS}"
        );
        sqlx::query_as::<_, SupportTicket>(&sql)
            .bind(id)
            .bind(update.status)
            .bind(update.priority)
            .bind(update.assigned_to.as_deref())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Append an admin reply. An `open` ticket moves to `in_progress`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ticket does not exist.
    #[instrument(skip(self, message), fields(ticket_id = %id))]
    pub async fn reply(
        &self,
        id: TicketId,
        author_name: &str,
        message: &str,
    ) -> Result<TicketReply, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let status: Option<TicketStatus> = sqlx::query_scalar(
            "SELECT status FROM market.support_ticket WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let status = status.ok_or(RepositoryError::NotFound)?;

        let reply = sqlx::query_as::<_, TicketReply>(
            r"INSERT INTO market.ticket_reply (ticket_id, author_role, author_name, message)
              VALUES ($1, $2, $3, $4)
              RETURNING id, ticket_id, author_role, author_name, message, created_at",
        )
        .bind(id)
        .bind(ActorRole::Admin)
        .bind(author_name)
        .bind(message)
        .fetch_one(&mut *tx)
        .await?;

        let next = if status == TicketStatus::Open {
            TicketStatus::InProgress
        } else {
            status
        };
        sqlx::query("UPDATE market.support_ticket SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(next)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(reply)
    }
}
