pub mod emitter;
pub mod leb128;
pub mod opcodes;

pub use emitter::emit;
