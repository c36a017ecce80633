//! Multi-session registry with optional time-based expiration.

use std::{
	cell::RefCell,
	collections::HashMap,
	fmt,
	panic::{self, AssertUnwindSafe},
	sync::Arc,
	thread::{self, JoinHandle},
};

use crossbeam_channel::{RecvTimeoutError, Sender};
use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, Result, session::IqrSession};

const MONITOR_THREAD_NAME: &str = "iqr-expiration";

/// Shared access to a registered session. Hold the mutex across an adjudicate, refine, read
/// sequence.
pub type SessionHandle = Arc<Mutex<IqrSession>>;

/// Invoked with each expired session just before it leaves the registry.
///
/// The callback runs on the monitor thread while the registry lock is held. Other threads block
/// on registry operations until it returns.
pub type ExpireCallback = Arc<dyn Fn(&SessionHandle) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerSettings {
	pub expire_enabled: bool,
	/// Interval between expiration sweeps.
	pub expire_check: Duration,
	/// Timeout applied by [`IqrController::add_session_with_default_timeout`]. Zero disables it.
	pub session_timeout: Duration,
}
impl Default for ControllerSettings {
	fn default() -> Self {
		Self {
			expire_enabled: false,
			expire_check: Duration::seconds(30),
			session_timeout: Duration::ZERO,
		}
	}
}
impl From<&iqr_config::Controller> for ControllerSettings {
	fn from(cfg: &iqr_config::Controller) -> Self {
		Self {
			expire_enabled: cfg.expire_enabled,
			expire_check: Duration::saturating_seconds_f64(cfg.expire_check_seconds),
			session_timeout: Duration::saturating_seconds_f64(cfg.session_timeout_seconds),
		}
	}
}

/// Holds the registry lock until dropped.
///
/// The owning thread may keep calling controller methods while the guard is alive; other threads
/// block on them.
#[must_use = "the registry is unlocked as soon as the guard is dropped"]
pub struct RegistryGuard<'a> {
	_guard: ReentrantMutexGuard<'a, RefCell<Registry>>,
}

pub struct IqrController {
	settings: ControllerSettings,
	shared: Arc<Shared>,
	monitor: Mutex<Option<Monitor>>,
}
impl IqrController {
	/// Creates a controller and starts the expiration monitor when expiration is enabled.
	pub fn new(settings: ControllerSettings) -> Result<Self> {
		Self::build(settings, None)
	}

	pub fn with_expire_callback(
		settings: ControllerSettings,
		callback: ExpireCallback,
	) -> Result<Self> {
		Self::build(settings, Some(callback))
	}

	fn build(settings: ControllerSettings, expire_callback: Option<ExpireCallback>) -> Result<Self> {
		let controller = Self {
			settings,
			shared: Arc::new(Shared {
				registry: ReentrantMutex::new(RefCell::new(Registry::default())),
				expire_callback,
			}),
			monitor: Mutex::new(None),
		};

		controller.start_expiration_monitor()?;

		Ok(controller)
	}

	pub fn settings(&self) -> &ControllerSettings {
		&self.settings
	}

	/// Locks the registry for a composite operation.
	pub fn lock(&self) -> RegistryGuard<'_> {
		RegistryGuard { _guard: self.shared.registry.lock() }
	}

	/// Registers `session`. A positive `timeout` makes it eligible for expiration once it has
	/// gone unaccessed for longer than `timeout`.
	pub fn add_session(&self, session: IqrSession, timeout: Duration) -> Result<Uuid> {
		let session_id = session.uid();
		let guard = self.shared.registry.lock();
		let mut registry = guard.borrow_mut();

		if registry.sessions.contains_key(&session_id) {
			return Err(Error::SessionExists { session_id });
		}

		registry.sessions.insert(session_id, Arc::new(Mutex::new(session)));

		if timeout > Duration::ZERO {
			registry.timeouts.insert(session_id, timeout);
			registry.last_access.insert(session_id, OffsetDateTime::now_utc());
		}

		tracing::debug!(%session_id, timeout_secs = timeout.as_seconds_f64(), "Session added.");

		Ok(session_id)
	}

	/// Registers `session` with the configured session timeout.
	pub fn add_session_with_default_timeout(&self, session: IqrSession) -> Result<Uuid> {
		self.add_session(session, self.settings.session_timeout)
	}

	/// Looks a session up and refreshes its last-access time.
	pub fn get_session(&self, session_id: &Uuid) -> Result<SessionHandle> {
		let guard = self.shared.registry.lock();
		let mut registry = guard.borrow_mut();
		let handle = registry
			.sessions
			.get(session_id)
			.cloned()
			.ok_or(Error::SessionNotFound { session_id: *session_id })?;

		if let Some(last_access) = registry.last_access.get_mut(session_id) {
			*last_access = OffsetDateTime::now_utc();
		}

		Ok(handle)
	}

	pub fn remove_session(&self, session_id: &Uuid) -> Result<SessionHandle> {
		self.shared.remove(session_id)
	}

	pub fn has_session_uuid(&self, session_id: &Uuid) -> bool {
		let guard = self.shared.registry.lock();

		guard.borrow().sessions.contains_key(session_id)
	}

	pub fn session_uuids(&self) -> Vec<Uuid> {
		let guard = self.shared.registry.lock();

		guard.borrow().sessions.keys().copied().collect()
	}

	pub fn session_count(&self) -> usize {
		let guard = self.shared.registry.lock();

		guard.borrow().sessions.len()
	}

	/// Runs one expiration pass immediately on the calling thread.
	pub fn expire_sessions(&self) -> usize {
		self.shared.sweep()
	}

	/// Starts the background sweep, replacing any running one. Does nothing when expiration is
	/// disabled. A non-positive check interval is rejected with [`Error::InvalidSettings`]. The
	/// same locking rule as [`Self::stop_expiration_monitor`] applies.
	pub fn start_expiration_monitor(&self) -> Result<()> {
		let mut monitor = self.monitor.lock();

		if let Some(previous) = monitor.take() {
			previous.stop();
		}
		if !self.settings.expire_enabled {
			return Ok(());
		}

		if !self.settings.expire_check.is_positive() {
			return Err(Error::InvalidSettings {
				message: format!(
					"Expiration check interval must be positive, got {}s.",
					self.settings.expire_check.as_seconds_f64()
				),
			});
		}

		let interval = std::time::Duration::try_from(self.settings.expire_check).map_err(|err| {
			Error::InvalidSettings { message: format!("Invalid expiration check interval: {err}.") }
		})?;
		let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
		let shared = Arc::clone(&self.shared);
		let handle = thread::Builder::new()
			.name(MONITOR_THREAD_NAME.to_string())
			.spawn(move || {
				loop {
					match stop_rx.recv_timeout(interval) {
						Err(RecvTimeoutError::Timeout) => {
							shared.sweep();
						},
						Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
					}
				}
			})
			.map_err(|source| Error::Monitor { source })?;

		*monitor = Some(Monitor { stop_tx, handle });

		tracing::debug!(interval_ms = interval.as_millis() as u64, "Expiration monitor started.");

		Ok(())
	}

	/// Stops the background sweep and waits for its thread to exit.
	///
	/// Must not be called while this thread holds a [`RegistryGuard`]: a sweep waiting on the
	/// registry lock would never observe the stop signal.
	pub fn stop_expiration_monitor(&self) {
		if let Some(monitor) = self.monitor.lock().take() {
			monitor.stop();

			tracing::debug!("Expiration monitor stopped.");
		}
	}

	pub fn is_expiration_monitor_running(&self) -> bool {
		self.monitor.lock().is_some()
	}
}
impl Drop for IqrController {
	fn drop(&mut self) {
		self.stop_expiration_monitor();
	}
}
impl fmt::Debug for IqrController {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("IqrController")
			.field("settings", &self.settings)
			.field("sessions", &self.session_count())
			.field("monitor_running", &self.is_expiration_monitor_running())
			.finish()
	}
}

#[derive(Default)]
struct Registry {
	sessions: HashMap<Uuid, SessionHandle>,
	timeouts: HashMap<Uuid, Duration>,
	last_access: HashMap<Uuid, OffsetDateTime>,
}

struct Shared {
	registry: ReentrantMutex<RefCell<Registry>>,
	expire_callback: Option<ExpireCallback>,
}
impl Shared {
	fn remove(&self, session_id: &Uuid) -> Result<SessionHandle> {
		let guard = self.registry.lock();
		let mut registry = guard.borrow_mut();
		let handle = registry
			.sessions
			.remove(session_id)
			.ok_or(Error::SessionNotFound { session_id: *session_id })?;

		registry.timeouts.remove(session_id);
		registry.last_access.remove(session_id);

		tracing::debug!(%session_id, "Session removed.");

		Ok(handle)
	}

	/// Returns how many sessions were removed.
	fn sweep(&self) -> usize {
		let guard = self.registry.lock();
		let now = OffsetDateTime::now_utc();
		let candidates: Vec<Uuid> = guard.borrow().timeouts.keys().copied().collect();
		let mut removed = 0;

		for session_id in candidates {
			let expired = {
				let registry = guard.borrow();

				match (registry.timeouts.get(&session_id), registry.last_access.get(&session_id)) {
					(Some(timeout), Some(last_access)) if now - *last_access > *timeout =>
						registry.sessions.get(&session_id).cloned(),
					_ => None,
				}
			};
			let Some(handle) = expired else { continue };

			tracing::info!(%session_id, "Expiring session.");

			if let Some(callback) = &self.expire_callback
				&& panic::catch_unwind(AssertUnwindSafe(|| callback(&handle))).is_err()
			{
				tracing::error!(%session_id, "Session expiration callback panicked.");
			}

			match self.remove(&session_id) {
				Ok(_) => removed += 1,
				Err(err) => {
					tracing::warn!(%session_id, error = %err, "Failed to remove expired session.");
				},
			}
		}

		removed
	}
}

struct Monitor {
	stop_tx: Sender<()>,
	handle: JoinHandle<()>,
}
impl Monitor {
	fn stop(self) {
		let Self { stop_tx, handle } = self;

		// Dropping the sender also wakes the thread if the send lost a race with a full buffer.
		let _ = stop_tx.try_send(());

		drop(stop_tx);

		if handle.join().is_err() {
			tracing::error!("Expiration monitor thread panicked.");
		}
	}
}
