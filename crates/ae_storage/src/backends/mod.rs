pub mod fs;
pub mod memory;

pub use fs::FsChannel;
pub use memory::MemoryChannel;
