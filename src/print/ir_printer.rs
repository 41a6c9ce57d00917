//! Indented IR dump used by `--print-ir`.

use std::fmt::Write;

use crate::arena::Arena;
use crate::ir::{LoweredFunction, Region, RegionId, RegionKind, StreamItem};

pub fn print_function(lowered: &LoweredFunction) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "function {} (locals: {})", lowered.name, lowered.local_count);
    write_region(&lowered.regions, lowered.body, 1, &mut out);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_region(regions: &Arena<Region>, id: RegionId, depth: usize, out: &mut String) {
    let region = regions.get(id);
    match &region.kind {
        RegionKind::Function => {
            write_stream(regions, &region.stream, depth, out);
        }
        RegionKind::Block => {
            indent(out, depth);
            out.push_str("block\n");
            write_stream(regions, &region.stream, depth + 1, out);
        }
        RegionKind::If {
            is_expression,
            then_region,
            else_region,
        } => {
            indent(out, depth);
            let _ = writeln!(out, "if (expr={is_expression})");
            write_stream(regions, &region.stream, depth + 1, out);
            indent(out, depth);
            out.push_str("then\n");
            write_region(regions, *then_region, depth + 1, out);
            if let Some(else_region) = else_region {
                indent(out, depth);
                out.push_str("else\n");
                write_region(regions, *else_region, depth + 1, out);
            }
        }
        RegionKind::Loop {
            is_do_while,
            condition,
            body,
        } => {
            indent(out, depth);
            let _ = writeln!(out, "loop (do_while={is_do_while})");
            indent(out, depth + 1);
            out.push_str("condition\n");
            write_region(regions, *condition, depth + 2, out);
            indent(out, depth + 1);
            out.push_str("body\n");
            write_region(regions, *body, depth + 2, out);
        }
    }
}

fn write_stream(regions: &Arena<Region>, stream: &[StreamItem], depth: usize, out: &mut String) {
    for item in stream {
        match item {
            StreamItem::Instruction(instr) => {
                indent(out, depth);
                let _ = writeln!(out, "{instr:?}");
            }
            StreamItem::Embed(region_id) => write_region(regions, *region_id, depth, out),
        }
    }
}
