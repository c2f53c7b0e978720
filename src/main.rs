use std::io::{BufRead, Write};

use demangler::msvc::{self, Options};
use demangler::TokenStream;

mod args;
mod logging;

use args::ARGS;

/// Symbols handed to each thread when demangling in bulk.
const CHUNK_SIZE: usize = 512;

/// Stack of a demangling thread, parsing recurses once per nesting level.
const STACK_SIZE: usize = 8 * 1024 * 1024;

fn demangle(symbol: &str, options: Options) -> demangler::Result<TokenStream> {
    if ARGS.types || symbol.starts_with('.') {
        msvc::demangle_type(symbol, options).map(|tipe| tipe.to_tokens())
    } else {
        msvc::demangle(symbol, options).map(|object| object.to_tokens())
    }
}

/// Renders a symbol, failed symbols are echoed back unchanged.
fn render(symbol: &str, options: Options) -> (String, bool) {
    match demangle(symbol, options) {
        Ok(tokens) if ARGS.color => {
            let line = tokens.tokens().iter().map(|t| t.ansi()).collect();
            (line, true)
        }
        Ok(tokens) => (tokens.to_string(), true),
        Err(err) => {
            log::warn!("failed to demangle '{symbol}': {err}");
            (symbol.to_string(), false)
        }
    }
}

fn render_chunk(chunk: &[String], options: Options) -> Vec<(String, bool)> {
    chunk
        .iter()
        .map(|symbol| match symbol.is_empty() {
            true => (String::new(), true),
            false => render(symbol, options),
        })
        .collect()
}

fn read_stdin() -> Vec<String> {
    let mut symbols = Vec::new();

    for line in std::io::stdin().lock().lines() {
        match line {
            Ok(line) => symbols.push(line.trim().to_string()),
            Err(err) => {
                log::error!("failed to read stdin: {err}");
                break;
            }
        }
    }

    symbols
}

fn main() {
    logging::init(ARGS.verbose);

    let options = ARGS.options();
    let symbols = match ARGS.symbols.is_empty() {
        true => read_stdin(),
        false => ARGS.symbols.clone(),
    };

    // every chunk writes into its own slot so the output keeps the input's order
    let mut rendered: Vec<Vec<(String, bool)>> = Vec::new();
    std::thread::scope(|s| {
        let handles: Vec<_> = symbols
            .chunks(CHUNK_SIZE)
            .map(|chunk| {
                let handle = std::thread::Builder::new()
                    .name("demangle".to_string())
                    .stack_size(STACK_SIZE)
                    .spawn_scoped(s, move || render_chunk(chunk, options));

                (chunk, handle)
            })
            .collect();

        for (chunk, handle) in handles {
            let lines = match handle {
                Ok(handle) => match handle.join() {
                    Ok(lines) => lines,
                    Err(..) => {
                        log::error!("a demangling thread panicked");
                        continue;
                    }
                },
                Err(err) => {
                    log::error!("failed to spawn a demangling thread: {err}");
                    render_chunk(chunk, options)
                }
            };

            rendered.push(lines);
        }
    });

    let mut stdout = std::io::stdout().lock();
    let mut failed = false;

    for (line, ok) in rendered.iter().flatten() {
        failed |= !ok;

        if writeln!(stdout, "{line}").is_err() {
            std::process::exit(1);
        }
    }

    if failed {
        std::process::exit(1);
    }
}
