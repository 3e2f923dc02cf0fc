//! # Event Dispatcher
//!
//! ドメインイベントを登録済みハンドラへ並行配信する
//!
//! ハンドラは `EventKind` ごとに登録され、1つのイベントに対して全ハンドラが
//! 並行に実行される。1つのハンドラが失敗しても他のハンドラは最後まで実行される。

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use log::{debug, error};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::events::{DomainEvent, Event, EventKind};

/// 特定のイベント型を処理するハンドラ
#[async_trait]
pub trait EventHandler<E: Event>: Send + Sync {
    /// イベントを処理
    ///
    /// # Errors
    ///
    /// 処理に失敗した場合はエラーを返す（他のハンドラの実行には影響しない）
    async fn handle(&self, event: &E, cancel: &CancellationToken) -> anyhow::Result<()>;

    /// ログ出力用のハンドラ名
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
trait ErasedHandler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &DomainEvent, cancel: &CancellationToken) -> anyhow::Result<()>;
}

struct TypedHandler<E, H> {
    inner: Arc<H>,
    _event: PhantomData<fn() -> E>,
}

#[async_trait]
impl<E, H> ErasedHandler for TypedHandler<E, H>
where
    E: Event,
    H: EventHandler<E> + 'static,
{
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn handle(&self, event: &DomainEvent, cancel: &CancellationToken) -> anyhow::Result<()> {
        match E::from_domain(event) {
            Some(typed) => self.inner.handle(typed, cancel).await,
            None => Err(anyhow!(
                "{} cannot handle {}",
                self.inner.name(),
                event.kind()
            )),
        }
    }
}

/// イベント種別からハンドラ一覧への対応表
///
/// 起動時に `HandlerRegistryBuilder` で構築し、以後は変更しない。
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<EventKind, Vec<Arc<dyn ErasedHandler>>>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    pub fn handler_names(&self, kind: EventKind) -> Vec<&'static str> {
        self.handlers
            .get(&kind)
            .map(|handlers| handlers.iter().map(|h| h.name()).collect())
            .unwrap_or_default()
    }

    fn handlers_for(&self, kind: EventKind) -> &[Arc<dyn ErasedHandler>] {
        self.handlers
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (kind, handlers) in &self.handlers {
            let names: Vec<_> = handlers.iter().map(|h| h.name()).collect();
            map.entry(kind, &names);
        }
        map.finish()
    }
}

#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: HashMap<EventKind, Vec<Arc<dyn ErasedHandler>>>,
}

impl HandlerRegistryBuilder {
    /// イベント型 `E` のハンドラを登録
    ///
    /// 同じハンドラを複数のイベント型に登録してもよい。
    pub fn register<E, H>(mut self, handler: Arc<H>) -> Self
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        let erased: Arc<dyn ErasedHandler> = Arc::new(TypedHandler::<E, H> {
            inner: handler,
            _event: PhantomData,
        });
        self.handlers.entry(E::KIND).or_default().push(erased);
        self
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}

/// 個々のハンドラの失敗
#[derive(Debug)]
pub struct HandlerFailure {
    pub handler: &'static str,
    pub error: anyhow::Error,
}

/// 1つ以上のハンドラが失敗した
#[derive(Debug)]
pub struct DispatchError {
    pub event_kind: EventKind,
    pub event_id: Uuid,
    pub failures: Vec<HandlerFailure>,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} handler(s) failed for {} ({}): ",
            self.failures.len(),
            self.event_kind,
            self.event_id
        )?;
        for (index, failure) in self.failures.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {:#}", failure.handler, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for DispatchError {}

/// イベントディスパッチャ
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    registry: Arc<HandlerRegistry>,
}

impl EventDispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// イベントを全ハンドラへ並行配信し、全ハンドラの完了を待つ
    ///
    /// # Errors
    ///
    /// 1つ以上のハンドラが失敗（またはパニック）した場合、全ての失敗をまとめて返す
    pub async fn dispatch(
        &self,
        event: DomainEvent,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        let kind = event.kind();
        let event_id = event.event_id();
        let handlers = self.registry.handlers_for(kind);

        if handlers.is_empty() {
            debug!("No handlers registered for {} ({})", kind, event_id);
            return Ok(());
        }

        debug!(
            "Dispatching {} ({}) to {} handler(s)",
            kind,
            event_id,
            handlers.len()
        );

        let event = Arc::new(event);
        let tasks: Vec<_> = handlers
            .iter()
            .map(|handler| {
                let handler = Arc::clone(handler);
                let event = Arc::clone(&event);
                let cancel = cancel.clone();
                let name = handler.name();
                let task = tokio::spawn(async move { handler.handle(&event, &cancel).await });
                (name, task)
            })
            .collect();

        let mut failures = Vec::new();
        for (name, task) in tasks {
            let error = match task.await {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => error,
                Err(join_error) if join_error.is_panic() => anyhow!("handler panicked"),
                Err(join_error) => anyhow!("handler task aborted: {}", join_error),
            };
            error!("Handler {} failed for {} ({}): {:#}", name, kind, event_id, error);
            failures.push(HandlerFailure {
                handler: name,
                error,
            });
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError {
                event_kind: kind,
                event_id,
                failures,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::{FileUploadFailedEvent, FileUploadedEvent};
    use crate::domain::value_objects::{BlobName, LogFilePath};
    use anyhow::bail;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct CountingHandler {
        calls: AtomicUsize,
        delay: Duration,
        fail_with: Option<&'static str>,
    }

    impl CountingHandler {
        fn ok(delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(delay_ms),
                fail_with: None,
            })
        }

        fn failing(message: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                fail_with: Some(message),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EventHandler<FileUploadFailedEvent> for CountingHandler {
        async fn handle(
            &self,
            _event: &FileUploadFailedEvent,
            _cancel: &CancellationToken,
        ) -> anyhow::Result<()> {
            tokio::time::sleep(self.delay).await;
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(message) => bail!(message),
                None => Ok(()),
            }
        }

        fn name(&self) -> &'static str {
            match self.fail_with {
                Some(_) => "failing",
                None => "counting",
            }
        }
    }

    #[async_trait]
    impl EventHandler<FileUploadedEvent> for CountingHandler {
        async fn handle(
            &self,
            _event: &FileUploadedEvent,
            _cancel: &CancellationToken,
        ) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl EventHandler<FileUploadFailedEvent> for PanickingHandler {
        async fn handle(
            &self,
            _event: &FileUploadFailedEvent,
            _cancel: &CancellationToken,
        ) -> anyhow::Result<()> {
            panic!("boom");
        }
    }

    struct CancelObserver {
        saw_cancelled: Mutex<Option<bool>>,
    }

    #[async_trait]
    impl EventHandler<FileUploadFailedEvent> for CancelObserver {
        async fn handle(
            &self,
            _event: &FileUploadFailedEvent,
            cancel: &CancellationToken,
        ) -> anyhow::Result<()> {
            *self.saw_cancelled.lock().unwrap() = Some(cancel.is_cancelled());
            Ok(())
        }
    }

    /// 登録された全ハンドラが同時に待ち合わせるまで進まないハンドラ
    struct RendezvousHandler {
        barrier: Arc<tokio::sync::Barrier>,
    }

    #[async_trait]
    impl EventHandler<FileUploadFailedEvent> for RendezvousHandler {
        async fn handle(
            &self,
            _event: &FileUploadFailedEvent,
            _cancel: &CancellationToken,
        ) -> anyhow::Result<()> {
            self.barrier.wait().await;
            Ok(())
        }
    }

    fn failed_event() -> DomainEvent {
        FileUploadFailedEvent::new(
            LogFilePath::new("/var/log/app/2024-12-25.log").unwrap(),
            "network timeout",
        )
        .into()
    }

    fn uploaded_event() -> DomainEvent {
        FileUploadedEvent::new(
            LogFilePath::new("/var/log/app/2024-12-25.log").unwrap(),
            BlobName::new("2024-12-25.log").unwrap(),
            "https://devstorage.blob.core.windows.net/uploads/device-01/2024-12-25.log",
        )
        .into()
    }

    #[tokio::test]
    async fn test_dispatch_without_handlers_succeeds() {
        let dispatcher = EventDispatcher::new(HandlerRegistry::default());
        let result = dispatcher
            .dispatch(failed_event(), &CancellationToken::new())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_dispatch_invokes_every_handler_once() {
        let a = CountingHandler::ok(5);
        let b = CountingHandler::ok(0);
        let registry = HandlerRegistry::builder()
            .register::<FileUploadFailedEvent, _>(a.clone())
            .register::<FileUploadFailedEvent, _>(b.clone())
            .build();
        let dispatcher = EventDispatcher::new(registry);

        dispatcher
            .dispatch(failed_event(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_routes_by_event_kind() {
        let handler = CountingHandler::ok(0);
        let registry = HandlerRegistry::builder()
            .register::<FileUploadedEvent, _>(handler.clone())
            .build();
        let dispatcher = EventDispatcher::new(registry);

        dispatcher
            .dispatch(failed_event(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(handler.calls(), 0);

        dispatcher
            .dispatch(uploaded_event(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_slower_handlers() {
        let failing = CountingHandler::failing("disk full");
        let slow = CountingHandler::ok(50);
        let registry = HandlerRegistry::builder()
            .register::<FileUploadFailedEvent, _>(failing.clone())
            .register::<FileUploadFailedEvent, _>(slow.clone())
            .build();
        let dispatcher = EventDispatcher::new(registry);

        let err = dispatcher
            .dispatch(failed_event(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(slow.calls(), 1);
        assert_eq!(failing.calls(), 1);
        assert_eq!(err.event_kind, EventKind::FileUploadFailed);
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].handler, "failing");
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn test_all_failures_are_collected() {
        let registry = HandlerRegistry::builder()
            .register::<FileUploadFailedEvent, _>(CountingHandler::failing("first"))
            .register::<FileUploadFailedEvent, _>(CountingHandler::failing("second"))
            .build();
        let dispatcher = EventDispatcher::new(registry);

        let err = dispatcher
            .dispatch(failed_event(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.failures.len(), 2);
        let message = err.to_string();
        assert!(message.contains("first"));
        assert!(message.contains("second"));
    }

    #[tokio::test]
    async fn test_panicking_handler_is_reported() {
        let survivor = CountingHandler::ok(10);
        let registry = HandlerRegistry::builder()
            .register::<FileUploadFailedEvent, _>(Arc::new(PanickingHandler))
            .register::<FileUploadFailedEvent, _>(survivor.clone())
            .build();
        let dispatcher = EventDispatcher::new(registry);

        let err = dispatcher
            .dispatch(failed_event(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(survivor.calls(), 1);
        assert_eq!(err.failures.len(), 1);
        assert!(err.failures[0].error.to_string().contains("panicked"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handlers_run_concurrently() {
        let a = CountingHandler::ok(100);
        let b = CountingHandler::ok(100);
        let registry = HandlerRegistry::builder()
            .register::<FileUploadFailedEvent, _>(a.clone())
            .register::<FileUploadFailedEvent, _>(b.clone())
            .build();
        let dispatcher = EventDispatcher::new(registry);

        let start = tokio::time::Instant::now();
        dispatcher
            .dispatch(failed_event(), &CancellationToken::new())
            .await
            .unwrap();
        let elapsed = start.elapsed();

        // 逐次実行なら 200ms かかる
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(150), "took {:?}", elapsed);
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn test_handlers_are_in_flight_together() {
        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let registry = HandlerRegistry::builder()
            .register::<FileUploadFailedEvent, _>(Arc::new(RendezvousHandler {
                barrier: barrier.clone(),
            }))
            .register::<FileUploadFailedEvent, _>(Arc::new(RendezvousHandler { barrier }))
            .build();
        let dispatcher = EventDispatcher::new(registry);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            dispatcher.dispatch(failed_event(), &CancellationToken::new()),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_cancel_token_is_forwarded() {
        let observer = Arc::new(CancelObserver {
            saw_cancelled: Mutex::new(None),
        });
        let registry = HandlerRegistry::builder()
            .register::<FileUploadFailedEvent, _>(observer.clone())
            .build();
        let dispatcher = EventDispatcher::new(registry);

        let cancel = CancellationToken::new();
        cancel.cancel();
        dispatcher.dispatch(failed_event(), &cancel).await.unwrap();

        assert_eq!(*observer.saw_cancelled.lock().unwrap(), Some(true));
    }

    #[test]
    fn test_registry_counts_and_names() {
        let handler = CountingHandler::ok(0);
        let registry = HandlerRegistry::builder()
            .register::<FileUploadFailedEvent, _>(handler.clone())
            .register::<FileUploadedEvent, _>(handler)
            .build();

        assert_eq!(registry.handler_count(EventKind::FileUploadFailed), 1);
        assert_eq!(registry.handler_count(EventKind::FileUploaded), 1);
        assert_eq!(registry.handler_count(EventKind::LogWrittenToFile), 0);
        assert_eq!(
            registry.handler_names(EventKind::FileUploadFailed),
            vec!["counting"]
        );
    }
}
