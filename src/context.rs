use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{Clock, SystemClock, UiStateStore};
use crate::location::QueryLocation;

/// Handle given to every UI component: shared configuration plus the single
/// state store for the page. Cloning shares the same store.
pub struct UiContext<L: QueryLocation> {
    pub config: Arc<AppConfig>,
    pub state: Rc<RefCell<UiStateStore<L>>>,
}

impl<L: QueryLocation> UiContext<L> {
    pub fn new(config: AppConfig, location: L) -> Self {
        Self::with_clock(config, location, &SystemClock)
    }

    pub fn with_clock(config: AppConfig, location: L, clock: &dyn Clock) -> Self {
        let state = UiStateStore::with_defaults(location, clock, &config.defaults);
        Self {
            config: Arc::new(config),
            state: Rc::new(RefCell::new(state)),
        }
    }
}

impl<L: QueryLocation> Clone for UiContext<L> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            state: Rc::clone(&self.state),
        }
    }
}
