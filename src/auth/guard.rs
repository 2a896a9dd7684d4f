//! Explicit higher-order auth gating.
//!
//! [`AuthFunction`] is the hook the client awaits before a guarded call runs. [`guard`] runs one
//! operation behind it, and [`gated`] turns an operation into a new one that always waits first.

// self
use crate::{
	_prelude::*,
	auth::{AuthGate, AuthType},
};

/// Boxed future returned by [`AuthFunction::authorize`].
pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a + Send>>;

/// Boxed future returned by operations built with [`gated`].
pub type GatedFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// Hook awaited before an operation tagged with an [`AuthType`] proceeds.
pub trait AuthFunction
where
	Self: Send + Sync,
{
	/// Completes once the operation may proceed, or fails to abort it.
	fn authorize(&self, auth_type: AuthType) -> AuthFuture<'_>;
}
impl AuthFunction for AuthGate {
	fn authorize(&self, auth_type: AuthType) -> AuthFuture<'_> {
		Box::pin(async move {
			self.wait_for_auth_type(auth_type).await;

			Ok(())
		})
	}
}

/// Auth function that also fails when the gate was armed without a token.
#[derive(Clone, Debug, Default)]
pub struct StrictAuth(pub Arc<AuthGate>);
impl AuthFunction for StrictAuth {
	fn authorize(&self, auth_type: AuthType) -> AuthFuture<'_> {
		Box::pin(async move {
			if auth_type.requires_token() {
				self.0.require_token(auth_type).await?;
			}

			Ok(())
		})
	}
}

/// Adapter turning an async closure into an [`AuthFunction`].
#[derive(Clone)]
pub struct FnAuth<F>(F);
impl<F, Fut> AuthFunction for FnAuth<F>
where
	F: Send + Sync + Fn(AuthType) -> Fut,
	Fut: 'static + Send + Future<Output = Result<()>>,
{
	fn authorize(&self, auth_type: AuthType) -> AuthFuture<'_> {
		Box::pin((self.0)(auth_type))
	}
}
impl<F> Debug for FnAuth<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FnAuth(..)")
	}
}

/// Wraps an async closure as an [`AuthFunction`].
pub fn auth_fn<F, Fut>(f: F) -> FnAuth<F>
where
	F: Send + Sync + Fn(AuthType) -> Fut,
	Fut: 'static + Send + Future<Output = Result<()>>,
{
	FnAuth(f)
}

/// Awaits `auth` for `auth_type`, then runs `operation`.
///
/// The operation is not invoked at all when authorization fails.
pub async fn guard<A, F, Fut, T>(auth: &A, auth_type: AuthType, operation: F) -> Result<T>
where
	A: ?Sized + AuthFunction,
	F: FnOnce() -> Fut,
	Fut: Future<Output = Result<T>>,
{
	auth.authorize(auth_type).await?;

	operation().await
}

/// Returns a new operation with the same input and output as `operation` that first awaits
/// `auth` for `auth_type`.
pub fn gated<A, F, Args, Fut, T>(
	auth: Arc<A>,
	auth_type: AuthType,
	operation: F,
) -> impl Fn(Args) -> GatedFuture<T>
where
	A: 'static + ?Sized + AuthFunction,
	F: 'static + Send + Sync + Fn(Args) -> Fut,
	Args: 'static + Send,
	Fut: 'static + Send + Future<Output = Result<T>>,
	T: 'static,
{
	let operation = Arc::new(operation);

	move |args| {
		let auth = Arc::clone(&auth);
		let operation = Arc::clone(&operation);

		Box::pin(async move {
			auth.authorize(auth_type).await?;

			operation(args).await
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::AtomicUsize;
	// crates.io
	use futures::FutureExt;
	// self
	use super::*;

	#[tokio::test]
	async fn guard_runs_operation_after_delivery() {
		let gate = AuthGate::new();
		let calls = AtomicUsize::new(0);
		let mut guarded = Box::pin(guard(&gate, AuthType::User, || async {
			calls.fetch_add(1, Ordering::SeqCst);

			Ok::<_, Error>("done")
		}));

		assert!((&mut guarded).now_or_never().is_none());
		assert_eq!(calls.load(Ordering::SeqCst), 0);

		gate.deliver_token(AuthType::User, Some("token".into()));

		assert_eq!(guarded.await.expect("Guarded operation should succeed."), "done");
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn failing_auth_skips_the_operation() {
		let auth = auth_fn(|auth_type| async move {
			Err::<(), _>(Error::AuthTokenUnavailable { auth_type })
		});
		let calls = AtomicUsize::new(0);
		let err = guard(&auth, AuthType::Owner, || async {
			calls.fetch_add(1, Ordering::SeqCst);

			Ok::<_, Error>(())
		})
		.await
		.expect_err("Authorization failure should abort the operation.");

		assert!(matches!(err, Error::AuthTokenUnavailable { auth_type: AuthType::Owner }));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn gated_operation_keeps_its_shape() {
		let gate = Arc::new(AuthGate::new());
		let double = gated(Arc::clone(&gate), AuthType::Owner, |value: u32| async move {
			Ok::<_, Error>(value * 2)
		});

		gate.deliver_token(AuthType::Owner, Some("owner".into()));

		assert_eq!(double(21).await.expect("Gated operation should succeed."), 42);
		assert_eq!(double(5).await.expect("Gated operation should succeed."), 10);
	}

	#[tokio::test]
	async fn strict_auth_requires_a_present_token() {
		let gate = Arc::new(AuthGate::new());
		let strict = StrictAuth(Arc::clone(&gate));

		strict.authorize(AuthType::None).await.expect("None should always pass.");
		gate.deliver_token(AuthType::User, None);

		assert!(strict.authorize(AuthType::User).await.is_err());

		gate.deliver_token(AuthType::User, Some("fresh".into()));

		strict.authorize(AuthType::User).await.expect("Present token should pass.");
	}
}
