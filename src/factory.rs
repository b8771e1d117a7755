//! Client factory: resolves model kinds into cached chat models.
//!
//! Each model kind owns a [`OnceCell`] in the cache. The first caller for a
//! kind loads the configuration and constructs the client while concurrent
//! callers wait on the same cell, so at most one client is ever built per
//! kind. A failed construction leaves the cell empty and the next call
//! starts over.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::{type_name, ConfigBlock, ConfigSource, EnvSettings, ModelKind};
use crate::constants::{DEFAULT_MAX_RETRIES, KEY_MAX_RETRIES, KEY_TOKEN_LIMIT, KEY_VERIFY_SSL};
use crate::error::{Error, Result};
use crate::provider::{
    transform, ChatModel, Connector, PreparedBlock, ProviderConnector, ProviderRequest, Transport,
};

type Slot = Arc<OnceCell<Arc<ChatModel>>>;

/// Builds chat models on first use and hands out shared handles afterwards.
pub struct ClientFactory {
    source: Arc<dyn ConfigSource>,
    connector: Arc<dyn Connector>,
    env: EnvSettings,
    cache: Mutex<HashMap<ModelKind, Slot>>,
}

impl ClientFactory {
    /// Creates a factory reading configuration from `source`.
    pub fn new(source: impl ConfigSource + 'static, env: EnvSettings) -> Self {
        Self {
            source: Arc::new(source),
            connector: Arc::new(ProviderConnector),
            env,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the connector used to construct clients.
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Arc::new(connector);
        self
    }

    /// The environment snapshot used for provider selection and Azure fallbacks.
    pub fn env(&self) -> &EnvSettings {
        &self.env
    }

    /// Returns the chat model for `kind`, constructing it on first use.
    ///
    /// Loading and construction run on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the block for `kind` is missing or
    /// malformed and [`Error::ProviderConstruction`] when the provider rejects
    /// it. Failures are not cached.
    pub async fn get_client(&self, kind: ModelKind) -> Result<Arc<ChatModel>> {
        let slot = self.slot(kind);
        if let Some(model) = slot.get() {
            debug!(%kind, "client cache hit");
            return Ok(Arc::clone(model));
        }
        let model = slot
            .get_or_try_init(|| async { self.build(kind).await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(model))
    }

    /// Like [`get_client`](Self::get_client) but takes the kind by name.
    ///
    /// Unknown names fail with [`Error::UnsupportedType`].
    pub async fn get_client_by_name(&self, name: &str) -> Result<Arc<ChatModel>> {
        self.get_client(ModelKind::from_str(name)?).await
    }

    /// Reads `token_limit` for `kind` from a fresh copy of the configuration.
    pub fn token_limit(&self, kind: ModelKind) -> Result<Option<u64>> {
        self.source.load()?.token_limit(kind)
    }

    /// Loads, defaults and transforms the block for `kind` without constructing.
    pub fn resolve(&self, kind: ModelKind) -> Result<ProviderRequest> {
        resolve_request(self.source.as_ref(), kind, &self.env)
    }

    fn slot(&self, kind: ModelKind) -> Slot {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(kind).or_default())
    }

    async fn build(&self, kind: ModelKind) -> Result<ChatModel> {
        debug!(%kind, "client cache miss");
        let source = Arc::clone(&self.source);
        let connector = Arc::clone(&self.connector);
        let env = self.env.clone();
        tokio::task::spawn_blocking(move || {
            let request = resolve_request(source.as_ref(), kind, &env)?;
            connector.connect(request, &env)
        })
        .await
        .map_err(|e| Error::Configuration(format!("client construction for {kind} aborted: {e}")))?
    }
}

fn resolve_request(
    source: &dyn ConfigSource,
    kind: ModelKind,
    env: &EnvSettings,
) -> Result<ProviderRequest> {
    let document = source.load()?;
    let prepared = prepare(kind, document.block(kind)?)?;
    transform(kind, prepared, env)
}

/// Applies defaulting to a raw block.
///
/// Drops `token_limit`, rejects blocks left empty, defaults `max_retries` to 3
/// and replaces `verify_ssl: false` with a permissive transport. The
/// `verify_ssl` key never survives into the prepared block.
pub fn prepare(kind: ModelKind, raw: &ConfigBlock) -> Result<PreparedBlock> {
    let mut block = raw.clone();
    block.remove(KEY_TOKEN_LIMIT);
    if block.is_empty() {
        return Err(Error::Configuration(format!("no configuration for type {kind}")));
    }

    block
        .entry(KEY_MAX_RETRIES)
        .or_insert_with(|| Value::from(DEFAULT_MAX_RETRIES));

    let verify_ssl = match block.remove(KEY_VERIFY_SSL) {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => !matches!(
            s.trim().to_lowercase().as_str(),
            "false" | "no" | "off" | "0"
        ),
        Some(other) => {
            return Err(Error::Configuration(format!(
                "verify_ssl for {kind} must be a boolean, found {}",
                type_name(&other)
            )))
        }
    };

    let transport = if verify_ssl {
        Transport::Verified
    } else {
        warn!(%kind, "TLS certificate verification disabled");
        let timeout = block
            .get("timeout")
            .and_then(Value::as_f64)
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(Duration::from_secs_f64);
        Transport::permissive(timeout).map_err(|e| {
            Error::Configuration(format!("failed to build permissive transport: {e}"))
        })?
    };

    Ok(PreparedBlock { block, transport })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigDocument;
    use crate::provider::{connect, ProviderId};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn document(value: Value) -> ConfigDocument {
        ConfigDocument::from_value(value).unwrap()
    }

    fn sample() -> ConfigDocument {
        document(json!({
            "BASIC_MODEL": {"model": "gpt-4o-mini", "api_key": "sk-basic", "token_limit": 128000},
            "REASONING_MODEL": {
                "base_url": "https://dashscope.aliyuncs.com/compatible-mode/v1",
                "model": "qwen3-235b-a22b",
                "api_key": "sk-ds",
                "verify_ssl": false
            },
            "VISION_MODEL": "not a mapping",
            "CODE_MODEL": {"token_limit": 1000}
        }))
    }

    /// Counts how often the configuration is loaded.
    #[derive(Clone)]
    struct CountingSource {
        doc: ConfigDocument,
        loads: Arc<AtomicUsize>,
    }

    impl ConfigSource for CountingSource {
        fn load(&self) -> Result<ConfigDocument> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.doc.clone())
        }
    }

    /// Counts constructions and optionally fails the first `fail_first` of them.
    struct CountingConnector {
        calls: Arc<AtomicUsize>,
        fail_first: usize,
    }

    impl Connector for CountingConnector {
        fn connect(&self, request: ProviderRequest, env: &EnvSettings) -> Result<ChatModel> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            // Widen the race window for concurrent callers.
            std::thread::sleep(Duration::from_millis(20));
            if n < self.fail_first {
                return Err(Error::Configuration("transient failure".into()));
            }
            connect(request, env)
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_builds_on_current_thread_runtime() {
        let (factory, _, calls) = counting_factory(0);
        let model = factory.get_client(ModelKind::Reasoning).await.unwrap();
        assert_eq!(model.provider(), ProviderId::Dashscope);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn counting_factory(fail_first: usize) -> (ClientFactory, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            doc: sample(),
            loads: Arc::clone(&loads),
        };
        let factory = ClientFactory::new(source, EnvSettings::default()).with_connector(
            CountingConnector {
                calls: Arc::clone(&calls),
                fail_first,
            },
        );
        (factory, loads, calls)
    }

    #[tokio::test]
    async fn test_same_handle_and_single_load() {
        let (factory, loads, calls) = counting_factory(0);
        let first = factory.get_client(ModelKind::Basic).await.unwrap();
        let second = factory.get_client(ModelKind::Basic).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.provider(), ProviderId::OpenAi);
        assert_eq!(first.model(), "gpt-4o-mini");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_requests_construct_once() {
        let (factory, loads, calls) = counting_factory(0);
        let factory = Arc::new(factory);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let factory = Arc::clone(&factory);
                tokio::spawn(async move { factory.get_client(ModelKind::Reasoning).await })
            })
            .collect();
        let models: Vec<Arc<ChatModel>> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(models.len(), 16);
        assert!(models.iter().all(|m| Arc::ptr_eq(m, &models[0])));
        assert_eq!(models[0].provider(), ProviderId::Dashscope);
        assert!(models[0].permissive_tls());
    }

    #[tokio::test]
    async fn test_kinds_are_cached_independently() {
        let (factory, _, calls) = counting_factory(0);
        let basic = factory.get_client(ModelKind::Basic).await.unwrap();
        let reasoning = factory.get_client(ModelKind::Reasoning).await.unwrap();
        assert!(!Arc::ptr_eq(&basic, &reasoning));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_construction_is_retried() {
        let (factory, loads, calls) = counting_factory(1);
        assert!(factory.get_client(ModelKind::Basic).await.is_err());
        let model = factory.get_client(ModelKind::Basic).await.unwrap();
        assert_eq!(model.model(), "gpt-4o-mini");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_configuration_errors() {
        let (factory, _, calls) = counting_factory(0);
        let not_mapping = factory.get_client(ModelKind::Vision).await.unwrap_err();
        assert!(matches!(not_mapping, Error::Configuration(_)));
        let only_token_limit = factory.get_client(ModelKind::Code).await.unwrap_err();
        assert!(
            matches!(only_token_limit, Error::Configuration(ref m) if m.contains("no configuration"))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_type_name() {
        let (factory, _, _) = counting_factory(0);
        let err = factory.get_client_by_name("unknown_type").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));
        assert!(factory.get_client_by_name("basic").await.is_ok());
    }

    #[test]
    fn test_token_limit() {
        let (factory, _, _) = counting_factory(0);
        assert_eq!(factory.token_limit(ModelKind::Basic).unwrap(), Some(128000));
        assert_eq!(factory.token_limit(ModelKind::Reasoning).unwrap(), None);
    }

    #[test]
    fn test_prepare_defaults() {
        let raw = json!({"model": "m", "api_key": "k", "token_limit": 10});
        let prepared = prepare(ModelKind::Basic, raw.as_object().unwrap()).unwrap();
        assert_eq!(prepared.block["max_retries"], 3);
        assert!(!prepared.block.contains_key("token_limit"));
        assert!(!prepared.transport.is_permissive());
    }

    #[test]
    fn test_prepare_keeps_explicit_max_retries() {
        let raw = json!({"model": "m", "max_retries": 7, "verify_ssl": true});
        let prepared = prepare(ModelKind::Basic, raw.as_object().unwrap()).unwrap();
        assert_eq!(prepared.block["max_retries"], 7);
        assert!(!prepared.block.contains_key("verify_ssl"));
        assert!(!prepared.transport.is_permissive());
    }

    #[test]
    fn test_prepare_verify_ssl_false_injects_permissive_transport() {
        for flag in [json!(false), json!("false"), json!("no")] {
            let raw = json!({"model": "m", "verify_ssl": flag});
            let prepared = prepare(ModelKind::Basic, raw.as_object().unwrap()).unwrap();
            assert!(!prepared.block.contains_key("verify_ssl"));
            assert!(prepared.transport.is_permissive());
        }
    }

    #[test]
    fn test_prepare_rejects_bad_verify_ssl() {
        let raw = json!({"model": "m", "verify_ssl": [1]});
        assert!(prepare(ModelKind::Basic, raw.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_resolve_reports_provider_without_constructing() {
        let (factory, _, calls) = counting_factory(0);
        let request = factory.resolve(ModelKind::Reasoning).unwrap();
        assert_eq!(request.provider, ProviderId::Dashscope);
        assert_eq!(request.block["extra_body"]["enable_thinking"], true);
        assert!(request.transport.is_permissive());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
