//! # Session Manager
//!
//! Login and logout, and the registry of ACTIVE sessions.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  login(username, password, computer)                                   │
//! │    ├── account guard ─────────────────────────────┐                    │
//! │    ├── load + check credentials      (Auth)       │                    │
//! │    ├── reject online username        (AlreadyOnline)                   │
//! │    ├── claim computer                (Occupancy)  │                    │
//! │    ├── register AccountCell                       │                    │
//! │    └── persist session + computer ◄───────────────┘  rollback on error │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │               ┌─────────┐   add_order / top_up mutate the shared cell  │
//! │               │ ACTIVE  │                                               │
//! │               └────┬────┘                                               │
//! │                    │ logout                                             │
//! │                    ▼                                                    │
//! │               ┌─────────┐   invoice ─► close ─► free computer ─►       │
//! │               │ CLOSED  │   persist session + invoice ─► write back     │
//! │               └─────────┘   balance ─► remove from AccountContext      │
//! │                    │                                                    │
//! │                    ▼  any write fails                                   │
//! │               pending logout: same invoice, finished by a retried      │
//! │               logout or write_back                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use netcafe_core::{Computer, CoreError, Invoice, InvoiceBuilder, Session};
use netcafe_store::Stores;

use crate::account_context::{AccountContext, SharedAccount};
use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};

// =============================================================================
// Session Handle
// =============================================================================

/// A live session. Orders lock `state`, then the account cell.
#[derive(Debug)]
pub struct SessionHandle {
    id: String,
    username: String,
    computer_id: String,
    account: SharedAccount,
    state: Mutex<Session>,
}

impl SessionHandle {
    fn new(session: Session, account: SharedAccount) -> Self {
        SessionHandle {
            id: session.id.clone(),
            username: session.username.clone(),
            computer_id: session.computer_id.clone(),
            account,
            state: Mutex::new(session),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn computer_id(&self) -> &str {
        &self.computer_id
    }

    /// The shared account cell of the session owner.
    pub fn account(&self) -> &SharedAccount {
        &self.account
    }

    /// Copy of the session, orders included.
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_active()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A CLOSED session with its invoice, waiting for the logout writes.
#[derive(Debug)]
struct PendingLogout {
    session: Session,
    invoice: Invoice,
    account: SharedAccount,
}

// =============================================================================
// Session Manager
// =============================================================================

/// Owns the login/logout state machine.
#[derive(Debug)]
pub struct SessionManager {
    context: Arc<AccountContext>,
    stores: Stores,
    clock: Arc<dyn Clock>,
    invoices: InvoiceBuilder,

    /// computer id → session id of the ACTIVE session on it.
    occupied: Mutex<HashMap<String, String>>,

    /// session id → handle, ACTIVE sessions only.
    active: Mutex<HashMap<String, Arc<SessionHandle>>>,

    /// session id → closed session whose logout has not been persisted.
    pending: Mutex<HashMap<String, PendingLogout>>,
}

impl SessionManager {
    pub fn new(
        context: Arc<AccountContext>,
        stores: Stores,
        clock: Arc<dyn Clock>,
        invoices: InvoiceBuilder,
    ) -> Self {
        SessionManager {
            context,
            stores,
            clock,
            invoices,
            occupied: Mutex::new(HashMap::new()),
            active: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn occupied(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.occupied.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn active(&self) -> MutexGuard<'_, HashMap<String, Arc<SessionHandle>>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<String, PendingLogout>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Opens a session for `username` on `computer_id`.
    ///
    /// ## Errors
    /// - `Auth`: unknown username, wrong password or inactive account
    /// - `AlreadyOnline`: the username already has an ACTIVE session
    /// - `ComputerNotFound`: no such computer
    /// - `Occupancy`: the computer already hosts an ACTIVE session
    /// - `Store`: persistence failed; every in-memory claim is rolled back
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        computer_id: &str,
    ) -> EngineResult<Arc<SessionHandle>> {
        let _guard = self.context.account_guard(username).await;

        let account = self
            .stores
            .accounts
            .find_by_username(username)
            .await?
            .filter(|a| a.is_active && a.credentials_match(password))
            .ok_or_else(|| {
                warn!(username = %username, "Login rejected: bad credentials or inactive");
                CoreError::Auth {
                    username: username.to_string(),
                }
            })?;

        if self.context.is_online(username) {
            warn!(username = %username, "Login rejected: already online");
            return Err(CoreError::AlreadyOnline(username.to_string()).into());
        }

        let mut computer = self
            .stores
            .computers
            .find_by_id(computer_id)
            .await?
            .ok_or_else(|| CoreError::ComputerNotFound(computer_id.to_string()))?;

        let session = Session::open(&account, &computer, self.clock.now());
        self.claim_computer(&computer, &session.id)?;

        let cell = match self.context.try_register(account) {
            Ok(cell) => cell,
            Err(err) => {
                self.release_computer(&computer.id, &session.id);
                return Err(err.into());
            }
        };

        let snapshot = session.clone();
        let handle = Arc::new(SessionHandle::new(session, cell));

        computer.is_occupied = true;
        if let Err(err) = self.persist_login(&snapshot, &computer).await {
            warn!(username = %username, error = %err, "Login rolled back: store failure");
            self.release_computer(&computer.id, &snapshot.id);
            self.context.remove_cell(handle.account());
            return Err(err);
        }

        self.active().insert(handle.id.clone(), handle.clone());

        info!(
            username = %username,
            session_id = %handle.id,
            computer = %computer.name,
            "Session started"
        );
        Ok(handle)
    }

    async fn persist_login(&self, session: &Session, computer: &Computer) -> EngineResult<()> {
        self.stores.sessions.save(session).await?;
        self.stores.computers.save(computer).await?;
        Ok(())
    }

    fn claim_computer(&self, computer: &Computer, session_id: &str) -> EngineResult<()> {
        let mut occupied = self.occupied();
        if occupied.contains_key(&computer.id) {
            warn!(computer = %computer.name, "Login rejected: computer in use");
            return Err(CoreError::Occupancy {
                computer: computer.name.clone(),
            }
            .into());
        }
        occupied.insert(computer.id.clone(), session_id.to_string());
        Ok(())
    }

    fn release_computer(&self, computer_id: &str, session_id: &str) {
        let mut occupied = self.occupied();
        if occupied.get(computer_id).map(String::as_str) == Some(session_id) {
            occupied.remove(computer_id);
        }
    }

    // =========================================================================
    // Logout
    // =========================================================================

    /// Closes `handle`, bills it and writes the account back.
    ///
    /// The invoice is computed before the close is committed, so a session
    /// whose totals cannot be invoiced stays ACTIVE. Once closed, the
    /// session and its invoice are kept as a pending logout until every
    /// store write succeeds; calling `logout` again (or
    /// [`SessionManager::write_back`]) finishes it with the same invoice.
    ///
    /// ## Errors
    /// - `InvalidState`: the session is already CLOSED and fully persisted
    /// - `AmountOverflow`: the invoice totals do not fit (nothing changes)
    /// - `Store`: persistence failed after the close. The account stays
    ///   online with its balance intact until a retry succeeds.
    pub async fn logout(&self, handle: &SessionHandle) -> EngineResult<Invoice> {
        let retry = self.pending().remove(&handle.id);
        let pending = match retry {
            Some(pending) => {
                debug!(session_id = %handle.id, "Retrying pending logout");
                pending
            }
            None => self.close(handle)?,
        };
        self.finish_logout(pending).await
    }

    /// Commits the close in memory and frees the computer claim.
    fn close(&self, handle: &SessionHandle) -> EngineResult<PendingLogout> {
        let (session, invoice) = {
            let mut state = handle.lock();
            let mut closed = state.clone();
            closed.close(self.clock.now()).map_err(|err| {
                warn!(session_id = %handle.id, "Logout rejected: session not active");
                err
            })?;
            let invoice = self.invoices.build(&closed).map_err(|err| {
                warn!(session_id = %handle.id, error = %err, "Logout rejected: cannot invoice");
                err
            })?;
            *state = closed.clone();
            (closed, invoice)
        };

        self.active().remove(&handle.id);
        self.release_computer(&handle.computer_id, &handle.id);

        Ok(PendingLogout {
            session,
            invoice,
            account: handle.account.clone(),
        })
    }

    async fn finish_logout(&self, pending: PendingLogout) -> EngineResult<Invoice> {
        if let Err(err) = self.persist_logout(&pending).await {
            warn!(
                session_id = %pending.session.id,
                error = %err,
                "Logout not persisted, kept for retry"
            );
            self.pending().insert(pending.session.id.clone(), pending);
            return Err(err);
        }

        let PendingLogout { session, invoice, .. } = pending;
        info!(
            username = %session.username,
            session_id = %session.id,
            billed_minutes = invoice.billed_minutes,
            total = %invoice.total_amount,
            "Session closed"
        );
        Ok(invoice)
    }

    /// Every write is an upsert, so a retry may repeat any of them.
    async fn persist_logout(&self, pending: &PendingLogout) -> EngineResult<()> {
        let session = &pending.session;
        if let Some(mut computer) = self.stores.computers.find_by_id(&session.computer_id).await? {
            computer.is_occupied = false;
            self.stores.computers.save(&computer).await?;
        }
        self.stores.sessions.save(session).await?;
        self.stores.invoices.save(&pending.invoice).await?;

        self.release_account(&pending.account).await
    }

    /// Finishes a pending logout of `username`, then writes its online
    /// account back to storage and takes it offline.
    ///
    /// Used after a logout that failed to persist. Refused with
    /// `InvalidState` while the account still has an ACTIVE session.
    pub async fn write_back(&self, username: &str) -> EngineResult<()> {
        if self.active_session_for_user(username).is_some() {
            return Err(CoreError::InvalidState {
                entity: "account".to_string(),
                id: username.to_string(),
                reason: "account has an active session".to_string(),
            }
            .into());
        }

        if let Some(pending) = self.take_pending_for_user(username) {
            self.finish_logout(pending).await?;
        }

        match self.context.get(username) {
            Some(cell) => self.release_account(&cell).await,
            None => Ok(()),
        }
    }

    fn take_pending_for_user(&self, username: &str) -> Option<PendingLogout> {
        let mut pending = self.pending();
        let session_id = pending
            .values()
            .find(|p| p.session.username == username)
            .map(|p| p.session.id.clone())?;
        pending.remove(&session_id)
    }

    /// Detach, persist, unregister. Removal from the context is last.
    async fn release_account(&self, cell: &SharedAccount) -> EngineResult<()> {
        let _guard = self.context.account_guard(cell.username()).await;

        let final_state = cell.detach();
        if let Err(err) = self.stores.accounts.save(&final_state).await {
            cell.reattach();
            warn!(username = %cell.username(), error = %err, "Balance write-back failed");
            return Err(EngineError::Store(err));
        }

        self.context.remove_cell(cell);
        debug!(username = %cell.username(), balance = %final_state.balance, "Account written back");
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// ACTIVE sessions, oldest first.
    pub fn active_sessions(&self) -> Vec<Arc<SessionHandle>> {
        let mut sessions: Vec<Arc<SessionHandle>> = self.active().values().cloned().collect();
        sessions.sort_by_key(|h| h.lock().started_at);
        sessions
    }

    pub fn find_active(&self, session_id: &str) -> Option<Arc<SessionHandle>> {
        self.active().get(session_id).cloned()
    }

    pub fn active_session_for_computer(&self, computer_id: &str) -> Option<Arc<SessionHandle>> {
        let session_id = self.occupied().get(computer_id).cloned()?;
        self.find_active(&session_id)
    }

    pub fn active_session_for_user(&self, username: &str) -> Option<Arc<SessionHandle>> {
        self.active()
            .values()
            .find(|h| h.username == username)
            .cloned()
    }

    /// Whether `session_id` is closed but its logout is not yet persisted.
    pub fn has_pending_logout(&self, session_id: &str) -> bool {
        self.pending().contains_key(session_id)
    }
}
