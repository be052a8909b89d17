//! # Session Manager
//!
//! Open and close operations for register sessions.
//!
//! ## Close Transaction Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    close_session Transaction                            │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   1. UPDATE status open→closed WHERE status='open'                     │
//! │      └── claims the write lock AND settles the race: of two            │
//! │          concurrent closes exactly one proceeds past here              │
//! │   2. SUM completed sales per payment method                            │
//! │      └── runs after the flip, so a sale committing concurrently        │
//! │          either landed before the flip (counted) or failed its         │
//! │          own open-session check (not counted); never half-way          │
//! │   3. reconcile_drawer(opening, cash_total, counted)                    │
//! │   4. UPDATE closing figures                                            │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{info, instrument, warn};

use farmapos_core::money::reconcile_drawer;
use farmapos_core::validation::{
    validate_declared_amount, validate_notes, validate_operator_id, validate_register_name,
};
use farmapos_core::{CashSession, CoreError, Money, SessionStatus, SessionSummary};
use farmapos_db::repository::session::generate_session_id;
use farmapos_db::{Database, DbError, SessionRepository};

use crate::error::{PosError, PosResult};
use crate::requests::{CloseSessionRequest, OpenSessionRequest};

/// Orchestrates the register-session lifecycle.
#[derive(Debug, Clone)]
pub struct SessionManager {
    db: Database,
}

impl SessionManager {
    pub fn new(db: Database) -> Self {
        SessionManager { db }
    }

    /// Opens a new register session with a declared cash float.
    ///
    /// The one-open-session-per-register rule is enforced by the database
    /// (partial unique index on open names), so two concurrent opens for
    /// the same register cannot both succeed.
    #[instrument(skip(self, request), fields(register = %request.register_name))]
    pub async fn open_session(&self, request: OpenSessionRequest) -> PosResult<CashSession> {
        validate_register_name(&request.register_name)?;
        validate_operator_id(&request.operator_id)?;
        validate_declared_amount("openingAmount", request.opening_amount_cents)?;

        let session = CashSession {
            id: generate_session_id(),
            name: request.register_name.trim().to_string(),
            status: SessionStatus::Open,
            operator_id: request.operator_id.trim().to_string(),
            opening_amount_cents: request.opening_amount_cents,
            closing_amount_cents: None,
            expected_amount_cents: None,
            variance_cents: None,
            notes: None,
            opened_at: Utc::now(),
            closed_at: None,
        };

        match self.db.sessions().insert(&session).await {
            Ok(()) => {
                info!(session_id = %session.id, "Register session opened");
                Ok(session)
            }
            Err(DbError::UniqueViolation { .. }) => {
                warn!(register = %session.name, "Register already open");
                Err(PosError::Business(CoreError::SessionAlreadyOpen {
                    name: session.name,
                }))
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Closes a session, reconciling the declared count against the
    /// expected drawer amount.
    ///
    /// Closing is terminal and idempotence is rejected loudly: a second
    /// close gets `SessionAlreadyClosed` rather than silently recomputing
    /// figures.
    #[instrument(skip(self, request), fields(session_id = %request.session_id))]
    pub async fn close_session(&self, request: CloseSessionRequest) -> PosResult<SessionSummary> {
        validate_declared_amount("countedAmount", request.counted_amount_cents)?;
        validate_notes(request.notes.as_deref())?;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let closed_at = Utc::now();
        let won = SessionRepository::mark_closed(&mut tx, &request.session_id, closed_at).await?;

        if !won {
            // Zero rows: either the id is unknown or the session is already
            // closed. One read settles which.
            let existing = SessionRepository::fetch_in_tx(&mut tx, &request.session_id).await?;
            return match existing {
                None => Err(PosError::Business(CoreError::SessionNotFound(
                    request.session_id,
                ))),
                Some(_) => Err(PosError::Business(CoreError::SessionAlreadyClosed(
                    request.session_id,
                ))),
            };
        }

        let session = SessionRepository::fetch_in_tx(&mut tx, &request.session_id)
            .await?
            .ok_or_else(|| DbError::not_found("Session", &request.session_id))
            .map_err(PosError::from)?;

        let totals = SessionRepository::payment_totals_in_tx(&mut tx, &request.session_id).await?;

        let reconciliation = reconcile_drawer(
            session.opening_amount(),
            totals.cash(),
            Money::from_cents(request.counted_amount_cents),
        );

        SessionRepository::store_close_figures(
            &mut tx,
            &request.session_id,
            request.counted_amount_cents,
            reconciliation.expected.cents(),
            reconciliation.variance.cents(),
            request.notes.as_deref().map(str::trim),
        )
        .await?;

        tx.commit().await.map_err(DbError::from)?;

        let closed = CashSession {
            status: SessionStatus::Closed,
            closing_amount_cents: Some(request.counted_amount_cents),
            expected_amount_cents: Some(reconciliation.expected.cents()),
            variance_cents: Some(reconciliation.variance.cents()),
            notes: request.notes.map(|n| n.trim().to_string()),
            closed_at: Some(closed_at),
            ..session
        };

        info!(
            session_id = %closed.id,
            expected = %reconciliation.expected,
            variance = %reconciliation.variance,
            "Register session closed"
        );

        Ok(SessionSummary::from_parts(&closed, &totals))
    }
}
