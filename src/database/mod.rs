pub mod pool;
pub mod postgres;
pub mod store;

pub use postgres::PgStore;
pub use store::Store;
