pub mod fs;
pub mod gcs;
pub mod memory;

pub use fs::FsStore;
pub use gcs::GcsStore;
pub use memory::MemoryStore;
