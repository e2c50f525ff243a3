pub mod host;
pub mod memory;
pub mod room;
