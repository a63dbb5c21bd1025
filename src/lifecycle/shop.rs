use super::{ShopConfig, Store};
use crate::{order_service, product_service, user_service};
use service_framework::Service;
use std::sync::Arc;
use tracing::info;

/// All shop services, wired to one shared [`Store`].
///
/// Services are descriptors, so the fields can be cloned and handed to other
/// threads without copying any state.
pub struct Shop {
    pub create_user: Service,
    pub add_product: Service,
    pub place_order: Service,
    pub place_priority_order: Service,
    store: Arc<Store>,
    config: ShopConfig,
}

impl Shop {
    pub fn new() -> Self {
        Self::with_config(ShopConfig::default())
    }

    pub fn with_config(config: ShopConfig) -> Self {
        let store = Arc::new(Store::new());

        let create_user = user_service::new(store.clone());
        let add_product = product_service::new(store.clone());
        let place_order = order_service::new(store.clone(), &config);
        let place_priority_order =
            order_service::priority::new(&place_order, store.clone(), &config);

        info!(
            max_quantity = config.max_quantity,
            priority_discount = config.priority_discount,
            "Shop ready"
        );
        Self {
            create_user,
            add_product,
            place_order,
            place_priority_order,
            store,
            config,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }
}

impl Default for Shop {
    fn default() -> Self {
        Self::new()
    }
}
