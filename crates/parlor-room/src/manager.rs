//! The room lifecycle state machine.
//!
//! One manager per room. The manager owns the room's lifecycle state and an
//! immutable contributor list; it drives every contributor through
//! attach/detach/release, classifies contributor failures by feature, and
//! broadcasts each transition to observers in a single global order.
//!
//! Serialization happens at two levels. Every state read and write goes
//! through one mutex whose critical sections never span an await (the
//! single-writer discipline). Whole lifecycle operations additionally queue
//! on an async operation lock, so the contributor I/O of two concurrently
//! issued operations never interleaves. Property reads take only the state
//! mutex and may observe the manager mid-transition.

use std::sync::Arc;

use parking_lot::Mutex;
use parlor_channel::ChannelState;

use crate::subscription::{self, Emitter};
use crate::{
    BufferingPolicy, Contributor, LifecycleConfig, RoomError, RoomLifecycle, RoomStatusChange,
    SimpleClock, Subscription,
};

/// State owned by the manager under single-writer discipline.
struct ManagerState {
    current: RoomLifecycle,
    error: Option<RoomError>,
    observers: Vec<Emitter<RoomStatusChange>>,
}

/// Coordinates the attach/detach/release lifecycle of a room's contributors.
///
/// Created once per room and lives for the room's lifetime. There is no
/// explicit destruction: [`RoomLifecycle::Released`] is terminal, and attach
/// or detach calls on a released room are rejected without any contributor
/// I/O.
pub struct RoomLifecycleManager {
    state: Mutex<ManagerState>,
    /// Queues whole lifecycle operations so their contributor I/O never
    /// interleaves. Fail-fast rejections happen before queueing.
    op_lock: tokio::sync::Mutex<()>,
    contributors: Vec<Contributor>,
    clock: Arc<dyn SimpleClock>,
    config: LifecycleConfig,
}

impl RoomLifecycleManager {
    /// Creates a manager in the `Initialized` state.
    pub fn new(
        contributors: Vec<Contributor>,
        clock: Arc<dyn SimpleClock>,
        config: LifecycleConfig,
    ) -> Self {
        Self::with_initial_status(RoomLifecycle::Initialized, contributors, clock, config)
    }

    /// Creates a manager that starts in `initial` instead of
    /// [`RoomLifecycle::Initialized`].
    ///
    /// Intended for tests that need to observe behavior from a specific
    /// starting state.
    pub fn with_initial_status(
        initial: RoomLifecycle,
        contributors: Vec<Contributor>,
        clock: Arc<dyn SimpleClock>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            state: Mutex::new(ManagerState {
                current: initial,
                error: None,
                observers: Vec::new(),
            }),
            op_lock: tokio::sync::Mutex::new(()),
            contributors,
            clock,
            config,
        }
    }

    /// The room's current lifecycle state.
    pub fn current(&self) -> RoomLifecycle {
        self.state.lock().current
    }

    /// The error associated with the most recent transition, if any.
    pub fn error(&self) -> Option<RoomError> {
        self.state.lock().error.clone()
    }

    /// Registers a new observer and returns its subscription.
    ///
    /// The observer receives every status change emitted after registration,
    /// in emission order, buffered per `policy`. History is not replayed.
    pub fn on_change(&self, policy: BufferingPolicy) -> Subscription<RoomStatusChange> {
        let (emitter, subscription) = subscription::channel(policy);
        self.state.lock().observers.push(emitter);
        subscription
    }

    /// Updates `current` and `error`, then emits the resulting status change
    /// to every registered observer inside the same critical section, so all
    /// observers see transitions in one global order.
    fn change_status(&self, new: RoomLifecycle, error: Option<RoomError>) {
        let mut state = self.state.lock();
        tracing::info!(from = %state.current, to = %new, error = ?error, "room status transition");

        let previous = state.current;
        state.current = new;
        state.error = error.clone();

        let change = RoomStatusChange {
            current: new,
            previous,
            error,
        };
        state.observers.retain(Emitter::is_connected);
        for observer in &state.observers {
            observer.emit(change.clone());
        }
    }

    /// Entry guard for the attach operation. `Some` short-circuits the
    /// operation with the given result; `None` means proceed.
    fn attach_gate(&self) -> Option<Result<(), RoomError>> {
        match self.current() {
            RoomLifecycle::Attached => Some(Ok(())),
            RoomLifecycle::Releasing => Some(Err(RoomError::RoomIsReleasing)),
            RoomLifecycle::Released => Some(Err(RoomError::RoomIsReleased)),
            _ => None,
        }
    }

    /// Attaches every contributor in list order.
    ///
    /// Succeeds without contributor I/O when the room is already attached;
    /// fails fast when it is releasing or released. On a contributor
    /// failure, the room moves to `Suspended` or `Failed` according to the
    /// contributor's post-failure state, and the error — classified by the
    /// contributor's feature, wrapping the attach error as its cause — is
    /// returned. A failure that lands a contributor in the failed state also
    /// detaches every other non-failed contributor before returning.
    pub async fn perform_attach(&self) -> Result<(), RoomError> {
        if let Some(result) = self.attach_gate() {
            return result;
        }

        let _op = self.op_lock.lock().await;
        // The world may have moved on while this operation was queued.
        if let Some(result) = self.attach_gate() {
            return result;
        }

        self.change_status(RoomLifecycle::Attaching, None);

        for contributor in &self.contributors {
            tracing::info!(feature = %contributor.feature, "attaching contributor");
            let Err(attach_error) = contributor.channel.attach().await else {
                continue;
            };

            let contributor_state = contributor.channel.state().await;
            tracing::info!(
                feature = %contributor.feature,
                state = %contributor_state,
                error = %attach_error,
                "contributor attach failed"
            );

            match contributor_state {
                ChannelState::Suspended => {
                    let error = RoomError::AttachmentFailed {
                        feature: contributor.feature,
                        cause: attach_error,
                    };
                    self.change_status(RoomLifecycle::Suspended, Some(error.clone()));
                    return Err(error);
                }
                ChannelState::Failed => {
                    let error = RoomError::AttachmentFailed {
                        feature: contributor.feature,
                        cause: attach_error,
                    };
                    self.change_status(RoomLifecycle::Failed, Some(error.clone()));

                    // Best-effort cleanup; its outcome never masks the
                    // attach error.
                    self.detach_non_failed_contributors().await;

                    return Err(error);
                }
                other => precondition_violation(format!(
                    "attach failure left the {} contributor in state {other}",
                    contributor.feature
                )),
            }
        }

        self.change_status(RoomLifecycle::Attached, None);
        Ok(())
    }

    /// Entry guard for the detach operation.
    fn detach_gate(&self) -> Option<Result<(), RoomError>> {
        match self.current() {
            RoomLifecycle::Detached => Some(Ok(())),
            RoomLifecycle::Releasing => Some(Err(RoomError::RoomIsReleasing)),
            RoomLifecycle::Released => Some(Err(RoomError::RoomIsReleased)),
            RoomLifecycle::Failed => Some(Err(RoomError::RoomInFailedState)),
            _ => None,
        }
    }

    /// Detaches every contributor in list order.
    ///
    /// Succeeds without contributor I/O when the room is already detached;
    /// fails fast when it is failed, releasing, or released. A contributor
    /// that fails into the failed state moves the room to `Failed` (once)
    /// and its classified error — with the contributor's recorded error
    /// reason as cause — is remembered; remaining contributors are still
    /// processed, and the first such error is returned at the end. A
    /// contributor that fails while remaining in any other state is retried
    /// until its detach succeeds, pausing between attempts.
    pub async fn perform_detach(&self) -> Result<(), RoomError> {
        if let Some(result) = self.detach_gate() {
            return result;
        }

        let _op = self.op_lock.lock().await;
        if let Some(result) = self.detach_gate() {
            return result;
        }

        self.change_status(RoomLifecycle::Detaching, None);

        let mut first_failure: Option<RoomError> = None;
        for contributor in &self.contributors {
            tracing::info!(feature = %contributor.feature, "detaching contributor");
            let Err(detach_error) = contributor.channel.detach().await else {
                continue;
            };

            let contributor_state = contributor.channel.state().await;
            tracing::info!(
                feature = %contributor.feature,
                state = %contributor_state,
                error = %detach_error,
                "contributor detach failed"
            );

            if contributor_state == ChannelState::Failed {
                let Some(cause) = contributor.channel.error_reason().await else {
                    precondition_violation(format!(
                        "the {} contributor entered the failed state without an error reason",
                        contributor.feature
                    ));
                };
                let error = RoomError::DetachmentFailed {
                    feature: contributor.feature,
                    cause,
                };

                if first_failure.is_none() {
                    first_failure = Some(error.clone());
                }
                // A second contributor failure in the same pass must not
                // re-emit a FAILED transition.
                if self.current() != RoomLifecycle::Failed {
                    self.change_status(RoomLifecycle::Failed, Some(error));
                }
            } else {
                // Transient failure: retry until the detach sticks, pausing
                // before each new attempt.
                loop {
                    tracing::info!(
                        feature = %contributor.feature,
                        pause = ?self.config.retry_pause,
                        "will retry contributor detach"
                    );
                    self.clock.sleep(self.config.retry_pause).await;

                    match contributor.channel.detach().await {
                        Ok(()) => break,
                        Err(error) => {
                            tracing::info!(
                                feature = %contributor.feature,
                                %error,
                                "contributor detach failed; will retry"
                            );
                        }
                    }
                }
            }
        }

        if let Some(error) = first_failure {
            return Err(error);
        }

        self.change_status(RoomLifecycle::Detached, None);
        Ok(())
    }

    /// Releases the room: detaches every non-failed contributor, retrying
    /// as long as it takes, then transitions to `Released`.
    ///
    /// Never fails from the caller's point of view. A room that is already
    /// released is left alone; a detached room is released immediately, with
    /// no contributor I/O. A release issued while another release is
    /// draining joins the queue behind it and finds the work already done.
    pub async fn perform_release(&self) {
        if self.current() == RoomLifecycle::Released {
            return;
        }

        let _op = self.op_lock.lock().await;
        match self.current() {
            RoomLifecycle::Released => return,
            RoomLifecycle::Detached => {
                // Nothing to detach; retire the room immediately.
                self.change_status(RoomLifecycle::Released, None);
                return;
            }
            _ => {}
        }

        self.change_status(RoomLifecycle::Releasing, None);

        for contributor in &self.contributors {
            self.detach_with_retry(contributor).await;
        }

        self.change_status(RoomLifecycle::Released, None);
    }

    /// Detaches every contributor that is not already failed, retrying each
    /// until it either detaches or fails. Used to tear the room down after
    /// an attach failure lands a contributor in the failed state.
    async fn detach_non_failed_contributors(&self) {
        for contributor in &self.contributors {
            self.detach_with_retry(contributor).await;
        }
    }

    /// Detaches one contributor, retrying forever with a pause between
    /// attempts.
    ///
    /// The contributor's state is re-read before every attempt: one observed
    /// in the failed state is skipped, including a contributor that fails
    /// partway through the retries.
    async fn detach_with_retry(&self, contributor: &Contributor) {
        loop {
            if contributor.channel.state().await == ChannelState::Failed {
                tracing::info!(
                    feature = %contributor.feature,
                    "contributor is failed; skipping detach"
                );
                break;
            }

            tracing::info!(feature = %contributor.feature, "detaching contributor");
            match contributor.channel.detach().await {
                Ok(()) => break,
                Err(error) => {
                    tracing::info!(
                        feature = %contributor.feature,
                        %error,
                        pause = ?self.config.retry_pause,
                        "contributor detach failed; will retry"
                    );
                    self.clock.sleep(self.config.retry_pause).await;
                }
            }
        }
    }
}

/// A collaborator broke the channel contract. Fatal by design: the manager's
/// view of the world is no longer trustworthy, so this logs and aborts
/// rather than continuing.
fn precondition_violation(message: String) -> ! {
    let error = RoomError::InconsistentPrecondition(message);
    tracing::error!(%error, "aborting");
    panic!("{error}");
}
