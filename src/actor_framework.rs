use std::collections::HashMap;
use std::hash::Hash;
use std::fmt::{Debug, Display};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, and Actions)
// =============================================================================

/// Errors raised by the generic actor layer itself, independent of any domain.
///
/// Every entity error type must be constructible from this so clients can
/// surface channel and storage failures in domain terms.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    Conflict(String),
    #[error("Persistence failure: {0}")]
    Persistence(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Error: std::error::Error + From<FrameworkError> + Clone + Send + Sync + 'static;

    /// Short name used in logs ("order", "product").
    const KIND: &'static str;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and creation parameters
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> { Ok(()) }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;

    // --- Action Handler ---

    /// Handle a custom domain-specific action.
    ///
    /// An `Err` leaves the entity exactly as it was before the call; the actor
    /// restores its snapshot regardless of what the handler touched.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Durable record of entity states.
///
/// The actor appends the full entity after every successful mutation and
/// before answering the caller. `load` replays the latest state per id.
pub trait Journal<T: Entity>: Send + 'static {
    fn load(&mut self) -> Result<Vec<T>, FrameworkError>;
    fn append(&mut self, item: &T) -> Result<(), FrameworkError>;
}

/// Journal that keeps nothing; the actor is purely in-memory.
pub struct NoJournal;

impl<T: Entity> Journal<T> for NoJournal {
    fn load(&mut self) -> Result<Vec<T>, FrameworkError> {
        Ok(Vec::new())
    }

    fn append(&mut self, _item: &T) -> Result<(), FrameworkError> {
        Ok(())
    }
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, E>>;

/// Predicate evaluated inside the actor against its current store.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
    /// Returns every item matching the filter from a single snapshot.
    Query {
        filter: Filter<T>,
        respond_to: Response<Vec<T>, T::Error>,
    },
    Shutdown,
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
    journal: Box<dyn Journal<T>>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
            journal: Box::new(NoJournal),
        };
        let client = ResourceClient { sender };
        (actor, client)
    }

    /// Like [`ResourceActor::new`], but replays `journal` into the store first
    /// and appends every later mutation to it.
    pub fn with_journal(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
        mut journal: impl Journal<T>,
    ) -> Result<(Self, ResourceClient<T>), FrameworkError> {
        let items = journal.load()?;
        let (mut actor, client) = Self::new(buffer_size, next_id_fn);
        info!(kind = T::KIND, restored = items.len(), "Journal replayed");
        actor.store = items.into_iter().map(|item| (item.id().clone(), item)).collect();
        actor.journal = Box::new(journal);
        Ok((actor, client))
    }

    pub async fn run(mut self) {
        info!(kind = T::KIND, "Resource actor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let result = self.mutate(&id, |item| {
                        item.on_update(patch)?;
                        Ok(item.clone())
                    });
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let result = self.mutate(&id, |item| item.handle_action(action));
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Query { filter, respond_to } => {
                    let items: Vec<T> = self.store.values().filter(|item| filter(*item)).cloned().collect();
                    debug!(kind = T::KIND, matched = items.len(), "Query served");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Shutdown => {
                    info!(kind = T::KIND, "Resource actor shutting down");
                    break;
                }
            }
        }

        info!(kind = T::KIND, "Resource actor stopped");
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T::Id, T::Error> {
        let id = (self.next_id_fn)();
        if self.store.contains_key(&id) {
            warn!(kind = T::KIND, id = %id, "Generated id already in use");
            return Err(FrameworkError::Conflict(id.to_string()).into());
        }

        let mut item = T::from_create_params(id.clone(), params)?;
        item.on_create()?;

        if let Err(e) = self.journal.append(&item) {
            error!(kind = T::KIND, id = %id, error = %e, "Journal append failed on create");
            return Err(e.into());
        }

        self.store.insert(id.clone(), item);
        Ok(id)
    }

    /// Runs `op` against the stored item. On a handler error or a journal
    /// failure the item is restored to its state before the call.
    fn mutate<R>(
        &mut self,
        id: &T::Id,
        op: impl FnOnce(&mut T) -> Result<R, T::Error>,
    ) -> Result<R, T::Error> {
        let Some(item) = self.store.get_mut(id) else {
            return Err(FrameworkError::NotFound(id.to_string()).into());
        };

        let snapshot = item.clone();
        let result = match op(item) {
            Ok(result) => result,
            Err(e) => {
                *item = snapshot;
                return Err(e);
            }
        };

        if let Err(e) = self.journal.append(item) {
            error!(kind = T::KIND, id = %id, error = %e, "Journal append failed, rolling back");
            *item = snapshot;
            return Err(e.into());
        }

        Ok(result)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: Entity> ResourceClient<T> {
    #[cfg(test)]
    pub(crate) fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(ResourceRequest::Create { params, respond_to })
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(ResourceRequest::Get { id, respond_to })
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(ResourceRequest::Update { id, patch, respond_to })
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(ResourceRequest::Action { id, action, respond_to })
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn query(&self, filter: impl Fn(&T) -> bool + Send + Sync + 'static) -> Result<Vec<T>, T::Error> {
        let (respond_to, response) = oneshot::channel();
        let filter: Filter<T> = Box::new(filter);
        self.sender.send(ResourceRequest::Query { filter, respond_to })
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn shutdown(&self) -> Result<(), T::Error> {
        self.sender.send(ResourceRequest::Shutdown)
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        Ok(())
    }
}

// =============================================================================
// 5. TESTS
// =============================================================================
