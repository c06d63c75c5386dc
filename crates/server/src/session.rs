//! Cookie sessions and one-shot flash notices.
//!
//! A session is an opaque UUID cookie pointing at an entry in the in-memory
//! [`SessionStore`]. The middleware resolves the cookie on every request and
//! attaches a [`CurrentSession`] extension; handlers read the principal and
//! queue flashes through it. Sessions live only as long as the process.
//! Anonymous sessions, which exist only to carry a flash to the next page,
//! are dropped once they outlive [`ANONYMOUS_SESSION_TTL`].

use crate::error::PortalError;
use crate::state::AppState;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;
use portal_core::Principal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Severity of a flash notice, used as its CSS class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// A notice shown once on the next rendered page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// How long an anonymous session may wait for its flash to be read.
pub const ANONYMOUS_SESSION_TTL: Duration = Duration::from_secs(10 * 60);

/// Server-side state behind one session cookie.
#[derive(Clone, Debug)]
pub struct Session {
    pub principal: Principal,
    pub flashes: Vec<Flash>,
    pub created_at: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            principal: Principal::Anonymous,
            flashes: Vec::new(),
            created_at: Instant::now(),
        }
    }
}

/// Flash carried on a response for the middleware to queue.
///
/// Error responses are built without access to the session, so they attach
/// their notice here instead.
#[derive(Clone, Debug)]
pub struct PendingFlash(pub Flash);

/// All live sessions, keyed by cookie id.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<Uuid, Session>>,
    anonymous_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_anonymous_ttl(ANONYMOUS_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anonymous_ttl(anonymous_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            anonymous_ttl,
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.inner.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Principal of the session, anonymous when there is none.
    pub fn principal(&self, id: Uuid) -> Principal {
        self.inner
            .get(&id)
            .map(|session| session.principal.clone())
            .unwrap_or_default()
    }

    /// Replace everything held for `id` with a fresh session for `principal`.
    pub fn sign_in(&self, id: Uuid, principal: Principal) {
        self.inner.insert(
            id,
            Session {
                principal,
                ..Session::default()
            },
        );
    }

    /// Drop the session and any queued flashes.
    pub fn clear(&self, id: Uuid) {
        self.inner.remove(&id);
    }

    pub fn flash(&self, id: Uuid, flash: Flash) {
        self.inner.entry(id).or_default().flashes.push(flash);
    }

    /// Take the queued flashes. An anonymous session left with nothing queued
    /// is removed.
    pub fn take_flashes(&self, id: Uuid) -> Vec<Flash> {
        let flashes = match self.inner.get_mut(&id) {
            Some(mut session) => std::mem::take(&mut session.flashes),
            None => return Vec::new(),
        };
        self.inner
            .remove_if(&id, |_, session| !session.principal.is_authenticated());
        flashes
    }

    /// Drop anonymous sessions whose flash was never collected, as left
    /// behind by clients that do not return the cookie.
    pub fn prune_anonymous(&self) {
        let ttl = self.anonymous_ttl;
        self.inner.retain(|_, session| {
            session.principal.is_authenticated() || session.created_at.elapsed() < ttl
        });
    }
}

/// The caller's session, attached to every request by [`session_middleware`].
#[derive(Clone)]
pub struct CurrentSession {
    id: Uuid,
    store: SessionStore,
}

impl CurrentSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn principal(&self) -> Principal {
        self.store.principal(self.id)
    }

    /// Clear any previous state and sign `principal` in.
    pub fn login(&self, principal: Principal) {
        self.store.sign_in(self.id, principal);
    }

    pub fn logout(&self) {
        self.store.clear(self.id);
    }

    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        self.store.flash(self.id, Flash::new(level, message));
    }

    pub fn take_flashes(&self) -> Vec<Flash> {
        self.store.take_flashes(self.id)
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = PortalError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or_else(|| PortalError::Internal("session middleware not installed".to_string()))
    }
}

/// Resolve the session cookie, run the request inside a `request` span and
/// issue a cookie when a new session was created.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.server.session_cookie.as_str();
    let existing =
        session_cookie(req.headers(), cookie_name).filter(|id| state.sessions.contains(*id));
    if existing.is_none() {
        state.sessions.prune_anonymous();
    }
    let id = existing.unwrap_or_else(Uuid::new_v4);

    let session = CurrentSession {
        id,
        store: state.sessions.clone(),
    };
    req.extensions_mut().insert(session.clone());

    let request_id = Uuid::new_v4();
    let mut response = next
        .run(req)
        .instrument(tracing::info_span!("request", request_id = %request_id))
        .await;

    if let Some(PendingFlash(flash)) = response.extensions_mut().remove::<PendingFlash>() {
        state.sessions.flash(id, flash);
    }

    if existing.is_none() && state.sessions.contains(id) {
        let cookie = format!("{cookie_name}={id}; HttpOnly; SameSite=Lax; Path=/");
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "session cookie not representable"),
        }
    }

    response
}

/// Session id from the `Cookie` headers, if well formed.
fn session_cookie(headers: &HeaderMap, name: &str) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}
