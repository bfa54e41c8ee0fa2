//! Process-wide default parameters.
//!
//! # Responsibilities
//! - Provide the root store every `ParamStore::with_defaults()` defers to
//! - Allow the factory behind that root to be replaced at runtime
//!
//! # Design Decisions
//! - The active factory lives in an `ArcSwap`, so swapping it never blocks readers
//! - The stock factory builds its root once and hands out the same `Arc`

use std::sync::{Arc, LazyLock, OnceLock};

use arc_swap::ArcSwap;

use crate::http::HttpVersion;
use crate::params::names;
use crate::params::store::ParamStore;

/// Source of the default root parameter store.
pub trait ParamsFactory: Send + Sync {
    /// May be called many times; need not return the same store each time.
    fn default_params(&self) -> Arc<ParamStore>;
}

static PARAMS_FACTORY: LazyLock<ArcSwap<Box<dyn ParamsFactory>>> =
    LazyLock::new(|| {
        let factory: Box<dyn ParamsFactory> = Box::new(DefaultParamsFactory::new());
        ArcSwap::from_pointee(factory)
    });

/// The current default root store.
pub fn default_params() -> Arc<ParamStore> {
    PARAMS_FACTORY.load().default_params()
}

/// Replace the factory providing [`default_params`].
pub fn set_params_factory(factory: impl ParamsFactory + 'static) {
    let factory: Box<dyn ParamsFactory> = Box::new(factory);
    PARAMS_FACTORY.store(Arc::new(factory));
    tracing::debug!("Default parameter factory replaced");
}

/// Builds the stock root store on first use.
#[derive(Debug, Default)]
pub struct DefaultParamsFactory {
    params: OnceLock<Arc<ParamStore>>,
}

impl DefaultParamsFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn create_params() -> ParamStore {
        let params = ParamStore::new();
        params.set(names::PROTOCOL_VERSION, HttpVersion::HTTP_1_1);
        params.set(
            names::USER_AGENT,
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
        );
        params.set(names::HTTP_ELEMENT_CHARSET, "US-ASCII");
        params.set(names::HTTP_CONTENT_CHARSET, "ISO-8859-1");
        params.set(names::HTTP_URI_CHARSET, "UTF-8");
        params.set(names::CONNECTION_TIMEOUT, 0);
        params.set(names::SO_TIMEOUT, 0);
        params.set(names::TCP_NODELAY, true);
        params.set(names::STALE_CONNECTION_CHECK, true);
        params
    }
}

impl ParamsFactory for DefaultParamsFactory {
    fn default_params(&self) -> Arc<ParamStore> {
        self.params
            .get_or_init(|| Arc::new(Self::create_params()))
            .clone()
    }
}
