//! Swapping the process-wide default parameter factory.

use std::sync::Arc;

use http_transport::params::{
    default_params, names, set_params_factory, DefaultParamsFactory, ParamsFactory,
};
use http_transport::ParamStore;

/// Root store that overrides the user agent on top of the stock defaults.
struct BrandedFactory {
    root: Arc<ParamStore>,
}

impl BrandedFactory {
    fn new(agent: &str) -> Self {
        let root = ParamStore::with_parent(DefaultParamsFactory::new().default_params());
        root.set(names::USER_AGENT, agent);
        Self {
            root: Arc::new(root),
        }
    }
}

impl ParamsFactory for BrandedFactory {
    fn default_params(&self) -> Arc<ParamStore> {
        Arc::clone(&self.root)
    }
}

#[test]
fn replaced_factory_feeds_new_stores() {
    let before = ParamStore::with_defaults();

    set_params_factory(BrandedFactory::new("branded/2.0"));

    let after = ParamStore::with_defaults();
    assert_eq!(after.get_str(names::USER_AGENT, "").unwrap(), "branded/2.0");
    assert!(after.get_bool(names::TCP_NODELAY, false).unwrap());
    assert!(!after.is_set_locally(names::USER_AGENT));
    assert_eq!(
        default_params().get_str(names::USER_AGENT, "").unwrap(),
        "branded/2.0"
    );

    // stores built earlier keep the root they were given
    assert_ne!(before.get_str(names::USER_AGENT, "").unwrap(), "branded/2.0");

    set_params_factory(DefaultParamsFactory::new());
    assert_ne!(
        ParamStore::with_defaults()
            .get_str(names::USER_AGENT, "")
            .unwrap(),
        "branded/2.0"
    );
}
