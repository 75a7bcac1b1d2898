pub mod argon;
pub mod file_kv;
pub mod pg_kv;

pub use argon::Argon2Hasher;
pub use file_kv::FileStore;
pub use pg_kv::PgKvAdapter;
