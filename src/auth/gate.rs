//! Per-auth-type synchronization point built on [`AsyncResult`] cells.
//!
//! Each [`AuthType`] owns one re-armable cell, created when the gate is built and kept for the
//! gate's lifetime. Calls tagged with a type wait on its cell until a token is delivered;
//! later deliveries replace the token without ever returning the type to the awaiting state.
//! The gate has no internal timeout. Callers that need one race the wait against
//! [`sync::timeout`](crate::sync::timeout).

// self
use crate::{
	_prelude::*,
	auth::{AuthToken, AuthType},
	obs,
	sync::AsyncResult,
};

/// Observable state of one auth type inside an [`AuthGate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
	/// No delivery happened yet; guarded calls block.
	Awaiting,
	/// At least one delivery happened; holds the latest delivered token.
	Armed(Option<AuthToken>),
}
impl AuthState {
	/// Whether guarded calls proceed without waiting.
	pub fn is_armed(&self) -> bool {
		matches!(self, Self::Armed(_))
	}
}

/// Token gate keyed by [`AuthType`].
///
/// Construct one gate per client (or share one through `Arc` across clients of the same
/// application). Tests should build a fresh gate each to keep deliveries isolated.
#[derive(Clone, Debug, Default)]
pub struct AuthGate {
	cells: [AsyncResult<AuthToken>; 3],
}
impl AuthGate {
	/// Creates a gate with every auth type awaiting its first token.
	pub fn new() -> Self {
		Self::default()
	}

	/// Waits until a token was delivered for `auth_type`; resolves immediately for
	/// [`AuthType::None`].
	///
	/// Only the ordering matters here: the delivery happens before the guarded operation
	/// proceeds. Use [`wait_for_token`](Self::wait_for_token) to read the token itself.
	pub async fn wait_for_auth_type(&self, auth_type: AuthType) {
		if !auth_type.requires_token() {
			return;
		}

		let _ = self.cell(auth_type).wait().await;
	}

	/// Waits for and returns the latest token for `auth_type`.
	///
	/// [`AuthType::None`] resolves immediately with `None`.
	pub async fn wait_for_token(&self, auth_type: AuthType) -> Option<AuthToken> {
		if !auth_type.requires_token() {
			return None;
		}

		self.cell(auth_type).wait().await
	}

	/// Strict variant of [`wait_for_token`](Self::wait_for_token) that fails with
	/// [`Error::AuthTokenUnavailable`] when the gate was armed with `None`.
	pub async fn require_token(&self, auth_type: AuthType) -> Result<AuthToken> {
		self.wait_for_token(auth_type).await.ok_or(Error::AuthTokenUnavailable { auth_type })
	}

	/// Delivers (or clears, with `None`) the token for `auth_type` and releases every call
	/// currently waiting on it.
	pub fn deliver_token(&self, auth_type: AuthType, token: Option<AuthToken>) {
		let cell = self.cell(auth_type);
		let present = token.is_some();

		cell.deliver(token);

		obs::trace_token_delivery(auth_type, present, cell.deliveries());
	}

	/// Current state for `auth_type`.
	pub fn state(&self, auth_type: AuthType) -> AuthState {
		match self.cell(auth_type).peek() {
			None => AuthState::Awaiting,
			Some(token) => AuthState::Armed(token),
		}
	}

	fn cell(&self, auth_type: AuthType) -> &AsyncResult<AuthToken> {
		&self.cells[auth_type.slot()]
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use futures::FutureExt;
	// self
	use super::*;

	#[tokio::test]
	async fn none_bypasses_the_gate() {
		let gate = AuthGate::new();

		assert_eq!(gate.wait_for_auth_type(AuthType::None).now_or_never(), Some(()));
		assert_eq!(gate.wait_for_token(AuthType::None).now_or_never(), Some(None));
	}

	#[tokio::test]
	async fn guarded_types_wait_for_their_own_delivery() {
		let gate = AuthGate::new();
		let mut user = Box::pin(gate.wait_for_auth_type(AuthType::User));
		let mut owner = Box::pin(gate.wait_for_auth_type(AuthType::Owner));

		assert!((&mut user).now_or_never().is_none());
		assert!((&mut owner).now_or_never().is_none());
		assert_eq!(gate.state(AuthType::User), AuthState::Awaiting);

		gate.deliver_token(AuthType::User, Some("user-token".into()));

		user.await;

		assert!((&mut owner).now_or_never().is_none());
		assert_eq!(gate.state(AuthType::User), AuthState::Armed(Some("user-token".into())));
		assert_eq!(gate.state(AuthType::Owner), AuthState::Awaiting);
	}

	#[tokio::test]
	async fn redelivery_rearms_without_awaiting() {
		let gate = AuthGate::new();

		gate.deliver_token(AuthType::Owner, Some("t1".into()));

		let first = gate.wait_for_token(AuthType::Owner).await;

		gate.deliver_token(AuthType::Owner, Some("t2".into()));

		assert_eq!(first.as_ref().map(AuthToken::expose), Some("t1"));
		assert_eq!(
			gate.wait_for_token(AuthType::Owner).await.as_ref().map(AuthToken::expose),
			Some("t2")
		);
		assert!(gate.state(AuthType::Owner).is_armed());
	}

	#[tokio::test]
	async fn strict_mode_rejects_cleared_tokens() {
		let gate = AuthGate::new();

		gate.deliver_token(AuthType::User, None);

		let err = gate
			.require_token(AuthType::User)
			.await
			.expect_err("Cleared token should be reported as unavailable.");

		assert!(matches!(err, Error::AuthTokenUnavailable { auth_type: AuthType::User }));
		assert_eq!(gate.state(AuthType::User), AuthState::Armed(None));
	}
}
