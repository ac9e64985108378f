//! In-process Event Bus
//!
//! Topic-based publish/subscribe with one tokio task per (event, subscriber)
//! pair. Delivery is at-most-once and unordered: nothing is persisted,
//! nothing is retried, and a failing subscriber never reaches the publisher.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::domain::OperationContext;
use crate::error::AppResult;

/// Immutable event envelope.
///
/// The bus never looks inside the payload; subscribers downcast it to the
/// type published under the topic.
#[derive(Clone)]
pub struct Event {
    name: String,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Event {
    pub fn new<T>(name: impl Into<String>, payload: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            name: name.into(),
            payload: Arc::new(payload),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Downcast the payload, `None` when it is not a `T`
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

type Handler =
    Arc<dyn Fn(OperationContext, Event) -> BoxFuture<'static, AppResult<()>> + Send + Sync>;

/// Topic -> subscriber registry
///
/// Cloning is cheap and every clone shares the same registry.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<RwLock<HashMap<String, Vec<Handler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a topic.
    ///
    /// Every handler of a topic receives every event published under it.
    /// There is no unsubscribe.
    pub fn subscribe<F, Fut>(&self, topic: impl Into<String>, handler: F)
    where
        F: Fn(OperationContext, Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let topic = topic.into();
        let handler: Handler = Arc::new(move |ctx: OperationContext, event: Event| {
            handler(ctx, event).boxed()
        });

        let mut registry = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        registry.entry(topic.clone()).or_default().push(handler);

        tracing::debug!(topic = %topic, "Subscriber registered");
    }

    /// Dispatch an event to every subscriber of its topic.
    ///
    /// Returns immediately; each subscriber runs on its own task with a
    /// clone of `ctx`. Must be called from within a tokio runtime.
    pub fn publish(&self, ctx: &OperationContext, event: Event) -> DispatchHandle {
        let handlers = {
            let registry = self
                .handlers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            match registry.get(event.name()) {
                Some(handlers) => handlers.clone(),
                None => Vec::new(),
            }
        };

        if handlers.is_empty() {
            tracing::debug!(topic = %event.name(), "No subscribers for topic");
            return DispatchHandle::default();
        }

        tracing::debug!(
            topic = %event.name(),
            subscribers = handlers.len(),
            correlation_id = ?ctx.correlation_id,
            "Publishing event"
        );

        let tasks = handlers
            .into_iter()
            .map(|handler| {
                let ctx = ctx.clone();
                let event = event.clone();
                tokio::spawn(dispatch(handler, ctx, event))
            })
            .collect();

        DispatchHandle { tasks }
    }

    /// Number of subscribers registered for a topic
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let topics: HashMap<&str, usize> = registry
            .iter()
            .map(|(topic, handlers)| (topic.as_str(), handlers.len()))
            .collect();
        f.debug_struct("EventBus").field("topics", &topics).finish()
    }
}

/// Run one subscriber, logging and swallowing its failure or panic.
async fn dispatch(handler: Handler, ctx: OperationContext, event: Event) {
    let topic = event.name().to_string();
    let correlation_id = ctx.correlation_id;

    let outcome = AssertUnwindSafe(async move { handler(ctx, event).await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::error!(
                topic = %topic,
                correlation_id = ?correlation_id,
                error = %e,
                "Event handler failed"
            );
        }
        Err(panic) => {
            tracing::error!(
                topic = %topic,
                correlation_id = ?correlation_id,
                panic = %panic_message(panic.as_ref()),
                "Event handler panicked"
            );
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Tasks spawned by one `publish` call.
///
/// Producers drop it; tests and shutdown code may await it.
#[derive(Debug, Default)]
pub struct DispatchHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl DispatchHandle {
    /// Number of subscriber tasks spawned
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every spawned subscriber to finish
    pub async fn join(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Dispatch task did not complete");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Ping(u32);

    async fn noop(_: OperationContext, _: Event) -> AppResult<()> {
        Ok(())
    }

    async fn fail(_: OperationContext, _: Event) -> AppResult<()> {
        Err(AppError::Internal("boom".to_string()))
    }

    async fn explode(_: OperationContext, _: Event) -> AppResult<()> {
        panic!("handler exploded")
    }

    #[test]
    fn test_event_payload_downcast() {
        let event = Event::new("test:ping", Ping(7));

        assert_eq!(event.name(), "test:ping");
        assert_eq!(event.payload::<Ping>(), Some(&Ping(7)));
        assert!(event.payload::<String>().is_none());
    }

    #[test]
    fn test_subscriber_count() {
        let bus = EventBus::new();
        bus.subscribe("a", noop);
        bus.subscribe("a", noop);
        bus.subscribe("b", noop);

        assert_eq!(bus.subscriber_count("a"), 2);
        assert_eq!(bus.subscriber_count("b"), 1);
        assert_eq!(bus.subscriber_count("c"), 0);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();

        let handle = bus.publish(&OperationContext::new(), Event::new("nobody:listens", Ping(1)));

        assert!(handle.is_empty());
        handle.join().await;
    }

    #[tokio::test]
    async fn test_clones_share_registry() {
        let bus = EventBus::new();
        let clone = bus.clone();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        clone.subscribe("test:ping", move |_, _| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), AppError>(())
            }
        });

        bus.publish(&OperationContext::new(), Event::new("test:ping", Ping(1)))
            .join()
            .await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_receives_context_clone() {
        let bus = EventBus::new();
        let usuario = uuid::Uuid::new_v4();
        let seen = Arc::new(std::sync::Mutex::new(None));

        let sink = seen.clone();
        bus.subscribe("test:ping", move |ctx: OperationContext, _| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() = ctx.usuario_id;
                Ok::<(), AppError>(())
            }
        });

        let ctx = OperationContext::new().with_usuario(usuario);
        bus.publish(&ctx, Event::new("test:ping", Ping(1))).join().await;

        assert_eq!(*seen.lock().unwrap(), Some(usuario));
    }

    #[tokio::test]
    async fn test_failing_and_panicking_handlers_are_contained() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        bus.subscribe("test:ping", fail);
        bus.subscribe("test:ping", explode);
        let counter = hits.clone();
        bus.subscribe("test:ping", move |_, _| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), AppError>(())
            }
        });

        let handle = bus.publish(&OperationContext::new(), Event::new("test:ping", Ping(1)));
        assert_eq!(handle.len(), 3);
        handle.join().await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");

        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
