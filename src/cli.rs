//! Manual argv parsing. A handful of flags and one positional argument
//! don't earn a parsing crate — the whole surface is `wacc [--print-ast]
//! [--print-ir] [-o OUTPUT] INPUT`.

use std::path::PathBuf;

use crate::config::CompilerConfig;

pub fn parse_args(args: impl Iterator<Item = String>) -> Result<CompilerConfig, String> {
    let mut input = None;
    let mut output = None;
    let mut print_ast = false;
    let mut print_ir = false;

    let mut args = args;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--print-ast" => print_ast = true,
            "--print-ir" => print_ir = true,
            "-o" => {
                let path = args.next().ok_or_else(|| "expected a path after '-o'".to_string())?;
                output = Some(PathBuf::from(path));
            }
            _ if arg.starts_with('-') => return Err(format!("unrecognized option '{arg}'")),
            _ => {
                if input.is_some() {
                    return Err(format!("unexpected extra argument '{arg}'"));
                }
                input = Some(PathBuf::from(arg));
            }
        }
    }

    let input = input.ok_or_else(|| "expected an input file".to_string())?;
    let mut config = CompilerConfig::new(input);
    config.print_ast = print_ast;
    config.print_ir = print_ir;
    if let Some(output) = output {
        config.output_path = output;
    }
    Ok(config)
}
