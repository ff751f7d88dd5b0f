pub mod clock;
pub mod models;
pub mod query;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use models::{ColumnDef, JobsParams, ParamDefaults, User};
pub use query::{QueryValue, SearchParams};
pub use store::UiStateStore;
