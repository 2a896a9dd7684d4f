//! Re-armable broadcast cell with a queue of pending waiters.

// std
use std::mem;
// crates.io
use futures::channel::oneshot;
// self
use crate::_prelude::*;

enum Slot<T> {
	Unset,
	Set(Option<T>),
}

struct CellState<T> {
	slot: Slot<T>,
	waiters: VecDeque<oneshot::Sender<Option<T>>>,
	deliveries: u64,
}

/// Single-slot cell whose value can be delivered from one place and awaited in another.
///
/// The cell starts unset. [`wait`](Self::wait) suspends until the first
/// [`deliver`](Self::deliver) and afterwards resolves immediately with the most recently
/// delivered value. Every delivery flushes the waiters queued at that moment with the value
/// being delivered; later deliveries never touch waits that already resolved. `None` is a
/// regular delivered value, so delivering `None` does not put the cell back into the unset
/// state.
///
/// Clones share the same slot and queue.
pub struct AsyncResult<T>(Arc<Mutex<CellState<T>>>);
impl<T> AsyncResult<T>
where
	T: Clone,
{
	/// Creates an unset cell.
	pub fn new() -> Self {
		Self(Arc::new(Mutex::new(CellState {
			slot: Slot::Unset,
			waiters: VecDeque::new(),
			deliveries: 0,
		})))
	}

	/// Waits for the current value, suspending until the first delivery when unset.
	pub async fn wait(&self) -> Option<T> {
		let receiver = {
			let mut state = self.0.lock();

			if let Slot::Set(value) = &state.slot {
				return value.clone();
			}

			let (sender, receiver) = oneshot::channel();

			// Abandoned waits (e.g. lost timeout races) leave closed senders behind.
			state.waiters.retain(|waiter| !waiter.is_canceled());
			state.waiters.push_back(sender);

			receiver
		};

		match receiver.await {
			Ok(value) => value,
			// Senders are only dropped after a send, so a closed channel means the cell is gone.
			Err(_) => std::future::pending().await,
		}
	}

	/// Stores `value` and resolves every queued waiter with it.
	pub fn deliver(&self, value: Option<T>) {
		let waiters = {
			let mut state = self.0.lock();

			state.slot = Slot::Set(value.clone());
			state.deliveries += 1;

			mem::take(&mut state.waiters)
		};

		for waiter in waiters {
			let _ = waiter.send(value.clone());
		}
	}

	/// Returns the delivered value without waiting; the outer `None` means nothing was delivered.
	pub fn peek(&self) -> Option<Option<T>> {
		match &self.0.lock().slot {
			Slot::Unset => None,
			Slot::Set(value) => Some(value.clone()),
		}
	}

	/// Whether at least one delivery happened.
	pub fn is_delivered(&self) -> bool {
		matches!(self.0.lock().slot, Slot::Set(_))
	}

	/// Number of deliveries since creation.
	pub fn deliveries(&self) -> u64 {
		self.0.lock().deliveries
	}

	/// Number of live waiters queued for the next delivery.
	pub fn pending_waiters(&self) -> usize {
		self.0.lock().waiters.iter().filter(|waiter| !waiter.is_canceled()).count()
	}

	/// Splits the cell into its wait and deliver halves.
	pub fn split(self) -> (WaitForResult<T>, DeliverResult<T>) {
		(WaitForResult(self.clone()), DeliverResult(self))
	}
}
impl<T> Clone for AsyncResult<T> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}
impl<T> Default for AsyncResult<T>
where
	T: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<T> Debug for AsyncResult<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.0.lock();

		f.debug_struct("AsyncResult")
			.field("delivered", &matches!(state.slot, Slot::Set(_)))
			.field("deliveries", &state.deliveries)
			.field("waiters", &state.waiters.len())
			.finish()
	}
}

/// Wait half of an [`AsyncResult`].
#[derive(Clone, Debug)]
pub struct WaitForResult<T>(AsyncResult<T>);
impl<T> WaitForResult<T>
where
	T: Clone,
{
	/// See [`AsyncResult::wait`].
	pub async fn wait(&self) -> Option<T> {
		self.0.wait().await
	}
}

/// Deliver half of an [`AsyncResult`].
#[derive(Clone, Debug)]
pub struct DeliverResult<T>(AsyncResult<T>);
impl<T> DeliverResult<T>
where
	T: Clone,
{
	/// See [`AsyncResult::deliver`].
	pub fn deliver(&self, value: Option<T>) {
		self.0.deliver(value);
	}
}

/// Creates a fresh cell and returns its wait and deliver halves.
pub fn async_result<T>() -> (WaitForResult<T>, DeliverResult<T>)
where
	T: Clone,
{
	AsyncResult::new().split()
}
