//! Named byte constants for the slice of the WASM binary format this
//! compiler emits. Values are fixed by the WASM spec, not by any
//! convention of ours — naming them keeps the emitter free of unexplained
//! hex literals.

pub const MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];
pub const VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

pub const SECTION_TYPE: u8 = 1;
pub const SECTION_FUNCTION: u8 = 3;
pub const SECTION_EXPORT: u8 = 7;
pub const SECTION_CODE: u8 = 10;

pub const FUNC_TYPE_TAG: u8 = 0x60;
pub const VAL_TYPE_I32: u8 = 0x7F;
pub const BLOCK_TYPE_VOID: u8 = 0x40;
pub const EXPORT_KIND_FUNC: u8 = 0x00;

pub const OP_BLOCK: u8 = 0x02;
pub const OP_LOOP: u8 = 0x03;
pub const OP_IF: u8 = 0x04;
pub const OP_ELSE: u8 = 0x05;
pub const OP_END: u8 = 0x0B;
pub const OP_BR: u8 = 0x0C;
pub const OP_BR_IF: u8 = 0x0D;
pub const OP_RETURN: u8 = 0x0F;
pub const OP_LOCAL_GET: u8 = 0x20;
pub const OP_LOCAL_SET: u8 = 0x21;
pub const OP_DROP: u8 = 0x1A;

pub const OP_I32_CONST: u8 = 0x41;
pub const OP_I32_EQZ: u8 = 0x45;
pub const OP_I32_EQ: u8 = 0x46;
pub const OP_I32_NE: u8 = 0x47;
pub const OP_I32_LT_S: u8 = 0x48;
pub const OP_I32_GT_S: u8 = 0x4A;
pub const OP_I32_LE_S: u8 = 0x4C;
pub const OP_I32_GE_S: u8 = 0x4E;
pub const OP_I32_ADD: u8 = 0x6A;
pub const OP_I32_SUB: u8 = 0x6B;
pub const OP_I32_MUL: u8 = 0x6C;
pub const OP_I32_DIV_S: u8 = 0x6D;
pub const OP_I32_REM_S: u8 = 0x6F;
pub const OP_I32_XOR: u8 = 0x73;
