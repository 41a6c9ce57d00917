//! Serializes the IR into a standalone WASM binary module.
//!
//! No wasm-module-assembly crate sits between the IR and the bytes —
//! getting this byte-level framing right by hand is the point. After the
//! bytes are assembled, [`emit`] runs them through an off-the-shelf
//! validator purely to catch emitter bugs before they reach disk; the
//! validator never contributes a single byte of output.

use std::path::PathBuf;
use std::rc::Rc;

use crate::codegen::leb128;
use crate::codegen::opcodes as op;
use crate::diagnostics::{CompilerError, Diagnostics, Level, SourceLocation, codes};
use crate::ir::{Instruction, LoweredFunction, Region, RegionId, RegionKind, StreamItem};

/// A structured frame currently open around the instruction being
/// emitted. Every `if`/`block`/`loop` pushes exactly one, regardless of
/// which branch of an `if` is being walked, because `then`/`else` share a
/// single WASM label.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Frame {
    If,
    LoopOuterBlock,
    LoopInner,
}

/// Builds the module and validates it, converting a validation failure
/// into a codegen diagnostic instead of panicking or writing bad bytes.
pub fn emit(lowered: &LoweredFunction, file: Rc<PathBuf>, diagnostics: &mut Diagnostics) -> Option<Vec<u8>> {
    let bytes = build_module(lowered);

    match wasmparser::Validator::new().validate_all(&bytes) {
        Ok(_) => Some(bytes),
        Err(err) => {
            let loc = SourceLocation::new(file, 1, 1, 0, 0);
            diagnostics.add(CompilerError::new(
                codes::UNSUPPORTED_OPERATION,
                Level::Codegen,
                loc,
                format!("internal error: emitted module failed validation: {err}"),
            ));
            None
        }
    }
}

fn build_module(lowered: &LoweredFunction) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&op::MAGIC);
    out.extend_from_slice(&op::VERSION);

    write_section(&mut out, op::SECTION_TYPE, type_section());
    write_section(&mut out, op::SECTION_FUNCTION, function_section());
    write_section(&mut out, op::SECTION_EXPORT, export_section());
    write_section(&mut out, op::SECTION_CODE, code_section(lowered));

    out
}

fn write_section(out: &mut Vec<u8>, id: u8, payload: Vec<u8>) {
    out.push(id);
    leb128::write_unsigned(out, payload.len() as u64);
    out.extend(payload);
}

/// One function type: `() -> i32`.
fn type_section() -> Vec<u8> {
    let mut payload = Vec::new();
    leb128::write_unsigned(&mut payload, 1); // one type
    payload.push(op::FUNC_TYPE_TAG);
    leb128::write_unsigned(&mut payload, 0); // zero params
    leb128::write_unsigned(&mut payload, 1); // one result
    payload.push(op::VAL_TYPE_I32);
    payload
}

fn function_section() -> Vec<u8> {
    let mut payload = Vec::new();
    leb128::write_unsigned(&mut payload, 1); // one function
    leb128::write_unsigned(&mut payload, 0); // type index 0
    payload
}

/// Always exports under the literal name `"main"`, regardless of the
/// source function's declared name — the source program emits `main`
/// unconditionally, and this preserves that rather than guessing.
fn export_section() -> Vec<u8> {
    let mut payload = Vec::new();
    leb128::write_unsigned(&mut payload, 1); // one export
    let name = b"main";
    leb128::write_unsigned(&mut payload, name.len() as u64);
    payload.extend_from_slice(name);
    payload.push(op::EXPORT_KIND_FUNC);
    leb128::write_unsigned(&mut payload, 0); // function index 0
    payload
}

fn code_section(lowered: &LoweredFunction) -> Vec<u8> {
    let mut payload = Vec::new();
    leb128::write_unsigned(&mut payload, 1); // one function body

    let mut body = Vec::new();
    if lowered.local_count > 0 {
        leb128::write_unsigned(&mut body, 1); // one local group
        leb128::write_unsigned(&mut body, lowered.local_count as u64);
        body.push(op::VAL_TYPE_I32);
    } else {
        leb128::write_unsigned(&mut body, 0);
    }

    let mut frames = Vec::new();
    emit_region(&lowered.regions, lowered.body, &mut frames, &mut body);

    // Implicit tail guard: satisfies the declared result type if control
    // falls off the end of the function without an explicit `return`.
    body.push(op::OP_I32_CONST);
    leb128::write_signed(&mut body, 0);
    body.push(op::OP_RETURN);
    body.push(op::OP_END);

    leb128::write_unsigned(&mut payload, body.len() as u64);
    payload.extend(body);
    payload
}

fn emit_region(regions: &crate::arena::Arena<Region>, id: RegionId, frames: &mut Vec<Frame>, out: &mut Vec<u8>) {
    let region = regions.get(id);
    match &region.kind {
        RegionKind::Block | RegionKind::Function => {
            emit_stream(regions, &region.stream, frames, out);
        }
        RegionKind::If {
            is_expression,
            then_region,
            else_region,
        } => {
            emit_stream(regions, &region.stream, frames, out); // condition evaluator
            out.push(op::OP_IF);
            out.push(if *is_expression { op::VAL_TYPE_I32 } else { op::BLOCK_TYPE_VOID });

            frames.push(Frame::If);
            emit_region(regions, *then_region, frames, out);
            frames.pop();

            if let Some(else_region) = else_region {
                out.push(op::OP_ELSE);
                frames.push(Frame::If);
                emit_region(regions, *else_region, frames, out);
                frames.pop();
            }
            out.push(op::OP_END);
        }
        RegionKind::Loop {
            is_do_while,
            condition,
            body,
        } => {
            out.push(op::OP_BLOCK);
            out.push(op::BLOCK_TYPE_VOID);
            frames.push(Frame::LoopOuterBlock);

            out.push(op::OP_LOOP);
            out.push(op::BLOCK_TYPE_VOID);
            frames.push(Frame::LoopInner);

            let emit_test = |frames: &mut Vec<Frame>, out: &mut Vec<u8>| {
                emit_region(regions, *condition, frames, out);
                out.push(op::OP_I32_EQZ);
                out.push(op::OP_BR_IF);
                leb128::write_unsigned(out, 1); // break out of the enclosing block
            };

            if *is_do_while {
                emit_region(regions, *body, frames, out);
                emit_test(frames, out);
            } else {
                emit_test(frames, out);
                emit_region(regions, *body, frames, out);
            }

            out.push(op::OP_BR);
            leb128::write_unsigned(out, 0); // continue: back to the top of the loop

            frames.pop(); // LoopInner
            out.push(op::OP_END); // end loop
            frames.pop(); // LoopOuterBlock
            out.push(op::OP_END); // end block
        }
    }
}

fn emit_stream(regions: &crate::arena::Arena<Region>, stream: &[StreamItem], frames: &mut Vec<Frame>, out: &mut Vec<u8>) {
    for item in stream {
        match item {
            StreamItem::Instruction(instr) => emit_instruction(*instr, frames, out),
            StreamItem::Embed(region_id) => emit_region(regions, *region_id, frames, out),
        }
    }
}

fn emit_instruction(instr: Instruction, frames: &[Frame], out: &mut Vec<u8>) {
    match instr {
        Instruction::ConstInt(value) => {
            out.push(op::OP_I32_CONST);
            leb128::write_signed(out, value as i64);
        }
        Instruction::LoadLocal(slot) => {
            out.push(op::OP_LOCAL_GET);
            leb128::write_unsigned(out, slot as u64);
        }
        Instruction::StoreLocal(slot) => {
            out.push(op::OP_LOCAL_SET);
            leb128::write_unsigned(out, slot as u64);
        }
        Instruction::Add => out.push(op::OP_I32_ADD),
        Instruction::Sub => out.push(op::OP_I32_SUB),
        Instruction::Mul => out.push(op::OP_I32_MUL),
        Instruction::Div => out.push(op::OP_I32_DIV_S),
        Instruction::Mod => out.push(op::OP_I32_REM_S),
        Instruction::Eq => out.push(op::OP_I32_EQ),
        Instruction::Ne => out.push(op::OP_I32_NE),
        Instruction::Lt => out.push(op::OP_I32_LT_S),
        Instruction::Le => out.push(op::OP_I32_LE_S),
        Instruction::Gt => out.push(op::OP_I32_GT_S),
        Instruction::Ge => out.push(op::OP_I32_GE_S),
        Instruction::Neg => {
            out.push(op::OP_I32_CONST);
            leb128::write_signed(out, -1);
            out.push(op::OP_I32_MUL);
        }
        Instruction::LogicalNot => out.push(op::OP_I32_EQZ),
        Instruction::BitwiseNot => {
            out.push(op::OP_I32_CONST);
            leb128::write_signed(out, -1);
            out.push(op::OP_I32_XOR);
        }
        Instruction::Pop => out.push(op::OP_DROP),
        Instruction::Return => out.push(op::OP_RETURN),
        Instruction::Break => {
            out.push(op::OP_BR);
            leb128::write_unsigned(out, depth_of(frames, Frame::LoopOuterBlock) as u64);
        }
        Instruction::Continue => {
            out.push(op::OP_BR);
            leb128::write_unsigned(out, depth_of(frames, Frame::LoopInner) as u64);
        }
    }
}

/// Static depth of the nearest enclosing frame of `target` kind, counted
/// from the innermost currently-open frame (depth 0). Semantic analysis
/// already rejected `break`/`continue` outside any loop, so a missing
/// frame here would be an internal bug, not user error.
fn depth_of(frames: &[Frame], target: Frame) -> u32 {
    frames
        .iter()
        .rev()
        .position(|&f| f == target)
        .expect("break/continue depth resolved against a validated loop nesting") as u32
}
