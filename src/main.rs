mod arena;
mod cli;
mod codegen;
mod config;
mod diagnostics;
mod driver;
mod ir;
mod lexer;
mod parser;
mod print;
mod semantic;

fn main() {
    let mut args = std::env::args();
    args.next(); // program name

    let config = match cli::parse_args(args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("usage: wacc [--print-ast] [--print-ir] [-o OUTPUT] INPUT");
            std::process::exit(driver::EXIT_FAILURE);
        }
    };

    std::process::exit(driver::run(&config));
}
