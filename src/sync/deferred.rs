//! Single-shot deferred value that can be resolved or rejected by its holder.

// std
use std::mem;
// crates.io
use futures::channel::oneshot;
// self
use crate::_prelude::*;

/// Observable lifecycle of a [`Deferred`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferredState {
	/// Not settled yet.
	Pending,
	/// Settled with a value.
	Resolved,
	/// Settled with an error.
	Rejected,
}
impl DeferredState {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			DeferredState::Pending => "pending",
			DeferredState::Resolved => "resolved",
			DeferredState::Rejected => "rejected",
		}
	}
}
impl Display for DeferredState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Lifecycle fault raised when settling a [`Deferred`] twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum SettleError {
	/// The deferred already settled; the original outcome is kept.
	#[error("Deferred value was already {state}.")]
	AlreadySettled {
		/// State the deferred settled into first.
		state: DeferredState,
	},
}

struct DeferredInner<T, E> {
	outcome: Option<Result<T, E>>,
	waiters: Vec<oneshot::Sender<Result<T, E>>>,
}

/// Promise-like value whose resolver lives outside of it.
///
/// Settles at most once. Waiters registered before settlement are resolved in registration
/// order; waiters registered afterwards observe the same outcome immediately.
pub struct Deferred<T, E>(Arc<Mutex<DeferredInner<T, E>>>);
impl<T, E> Deferred<T, E>
where
	T: Clone,
	E: Clone,
{
	/// Creates a pending deferred.
	pub fn new() -> Self {
		Self(Arc::new(Mutex::new(DeferredInner { outcome: None, waiters: Vec::new() })))
	}

	/// Settles with a value.
	pub fn resolve(&self, value: T) -> Result<(), SettleError> {
		self.settle(Ok(value))
	}

	/// Settles with an error.
	pub fn reject(&self, error: E) -> Result<(), SettleError> {
		self.settle(Err(error))
	}

	/// Current lifecycle state.
	pub fn state(&self) -> DeferredState {
		match &self.0.lock().outcome {
			None => DeferredState::Pending,
			Some(Ok(_)) => DeferredState::Resolved,
			Some(Err(_)) => DeferredState::Rejected,
		}
	}

	/// Waits for the outcome. Never completes if the deferred is never settled.
	pub async fn wait(&self) -> Result<T, E> {
		let receiver = {
			let mut inner = self.0.lock();

			if let Some(outcome) = &inner.outcome {
				return outcome.clone();
			}

			let (sender, receiver) = oneshot::channel();

			// Waits dropped before settlement (e.g. lost timeout races) leave closed senders.
			inner.waiters.retain(|waiter| !waiter.is_canceled());
			inner.waiters.push(sender);

			receiver
		};

		match receiver.await {
			Ok(outcome) => outcome,
			Err(_) => std::future::pending().await,
		}
	}

	fn settle(&self, outcome: Result<T, E>) -> Result<(), SettleError> {
		let waiters = {
			let mut inner = self.0.lock();

			if let Some(existing) = &inner.outcome {
				let state =
					if existing.is_ok() { DeferredState::Resolved } else { DeferredState::Rejected };

				return Err(SettleError::AlreadySettled { state });
			}

			inner.outcome = Some(outcome.clone());

			mem::take(&mut inner.waiters)
		};

		for waiter in waiters {
			let _ = waiter.send(outcome.clone());
		}

		Ok(())
	}
}
impl<T, E> Clone for Deferred<T, E> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}
impl<T, E> Default for Deferred<T, E>
where
	T: Clone,
	E: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<T, E> Debug for Deferred<T, E> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let inner = self.0.lock();
		let state = match &inner.outcome {
			None => DeferredState::Pending,
			Some(Ok(_)) => DeferredState::Resolved,
			Some(Err(_)) => DeferredState::Rejected,
		};

		f.debug_struct("Deferred")
			.field("state", &state)
			.field("waiters", &inner.waiters.len())
			.finish()
	}
}
