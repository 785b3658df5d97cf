//! Per-connection LDAP session.
//!
//! A [`Session`] owns the bind state of one client connection and turns each decoded
//! request into response messages. Responses are queued on an unbounded channel that
//! the connection's writer drains, so searches can run on their own tasks while the
//! session keeps reading requests.

use crate::classify::classify;
use crate::gateway::Gateway;
use crate::mapper::SearchEvent;
use crate::translate::SearchRequest;
use crate::wire::{entry_to_ldap, search_request_from_ldap};
use ldap3_proto::proto::{LdapMsg, LdapOp, LdapResultCode};
use ldap3_proto::simple::{
    DisconnectionNotice, SearchRequest as LdapSearchRequest, ServerOps, SimpleBindRequest,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};

/// Bind state of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No successful bind yet, or the last bind failed.
    #[default]
    Anonymous,
    /// Bound as the configured identity.
    Bound {
        /// DN presented in the successful bind.
        dn: String,
    },
}

/// What the connection should do after a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading requests.
    Continue,
    /// Stop reading and close once queued responses are written.
    Close,
}

/// State and dispatch for one client connection.
pub struct Session {
    peer: SocketAddr,
    state: SessionState,
    gateway: Arc<Gateway>,
    responses: UnboundedSender<LdapMsg>,
}

impl Session {
    /// Start an anonymous session for `peer`.
    #[must_use]
    pub fn new(peer: SocketAddr, gateway: Arc<Gateway>, responses: UnboundedSender<LdapMsg>) -> Self {
        Self {
            peer,
            state: SessionState::Anonymous,
            gateway,
            responses,
        }
    }

    /// Current bind state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Handle one decoded request.
    ///
    /// Binds are answered inline. Searches are checked and then run on a spawned task,
    /// so the caller must be inside a tokio runtime.
    pub fn handle(&mut self, msg: LdapMsg) -> Flow {
        if let LdapOp::AbandonRequest(abandoned) = msg.op {
            debug!(peer = %self.peer, abandoned, "ignoring abandon");
            return Flow::Continue;
        }

        match ServerOps::try_from(msg) {
            Ok(ServerOps::SimpleBind(request)) => {
                self.bind(&request);
                Flow::Continue
            }
            Ok(ServerOps::Search(request)) => {
                self.search(request);
                Flow::Continue
            }
            Ok(ServerOps::Unbind(_)) => {
                debug!(peer = %self.peer, "unbind");
                Flow::Close
            }
            Ok(_) | Err(_) => {
                warn!(peer = %self.peer, "unsupported operation, disconnecting");
                self.send(DisconnectionNotice::gen(
                    LdapResultCode::UnwillingToPerform,
                    "operation not supported",
                ));
                Flow::Close
            }
        }
    }

    fn bind(&mut self, request: &SimpleBindRequest) {
        match self.gateway.bind(&request.dn, &request.pw) {
            Ok(()) => {
                debug!(peer = %self.peer, dn = %request.dn, "bind accepted");
                self.state = SessionState::Bound {
                    dn: request.dn.clone(),
                };
                self.send(request.gen_success());
            }
            Err(_) => {
                self.state = SessionState::Anonymous;
                self.send(request.gen_invalid_cred());
            }
        }
    }

    fn search(&self, request: LdapSearchRequest) {
        if self.state == SessionState::Anonymous {
            debug!(peer = %self.peer, base = %request.base, "search before bind");
            self.send(request.gen_error(
                LdapResultCode::InsufficentAccessRights,
                "bind required".to_string(),
            ));
            return;
        }

        let search = match search_request_from_ldap(&request) {
            Ok(search) => search,
            Err(rejection) => {
                debug!(peer = %self.peer, base = %request.base, reason = %rejection.message, "search rejected");
                self.send(request.gen_error(rejection.code, rejection.message));
                return;
            }
        };

        let gateway = Arc::clone(&self.gateway);
        let responses = self.responses.clone();
        tokio::spawn(async move {
            run_search(&gateway, &request, &search, &responses).await;
        });
    }

    fn send(&self, msg: LdapMsg) {
        if self.responses.send(msg).is_err() {
            debug!(peer = %self.peer, "connection writer gone, dropping response");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("peer", &self.peer)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Run one search against the backend and queue its responses: every entry in backend
/// order followed by a single done message.
async fn run_search(
    gateway: &Gateway,
    request: &LdapSearchRequest,
    search: &SearchRequest,
    responses: &UnboundedSender<LdapMsg>,
) {
    let stream = match gateway.search(search).await {
        Ok(stream) => stream,
        Err(err) => {
            let class = classify(&err);
            if err.should_log() {
                error!(base = %search.base(), error = %err, "backend request failed");
            } else {
                warn!(base = %search.base(), error = %err, "backend request failed");
            }
            let done = request.gen_error(class.result_code(), class.message().to_string());
            if responses.send(done).is_err() {
                debug!(base = %search.base(), "connection closed before search failure was sent");
            }
            return;
        }
    };

    for event in stream {
        let msg = match event {
            SearchEvent::Entry(entry) => {
                debug!(
                    entry = %serde_json::Value::Object(entry.attributes().clone()),
                    "entry"
                );
                request.gen_result_entry(entry_to_ldap(entry))
            }
            SearchEvent::Done => {
                debug!(base = %search.base(), "search complete");
                request.gen_success()
            }
        };
        if responses.send(msg).is_err() {
            debug!(base = %search.base(), "connection closed mid search");
            return;
        }
    }
}
