// Persistence adapters. Each store is a trait carried in `AppState` as
// `Arc<dyn ...>`; the Postgres implementations live next to their traits.

pub mod jobs;
pub mod profiles;

pub use jobs::{JobStore, PgJobStore};
pub use profiles::{PgProfileStore, ProfileStore};
