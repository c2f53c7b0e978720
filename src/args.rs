use once_cell::sync::Lazy;

macro_rules! exit {
    ($code:expr => $($arg:tt)*) => {{
        eprintln!($($arg)*);
        std::process::exit($code);
    }};
}

const HELP: &str = "OVERVIEW: MSVC C++ symbol demangler

USAGE: undname [options] [SYMBOL]...

Symbols are read from stdin, one per line, when none are given.

OPTIONS:
  -H, --help          Print usage information
  -T, --type          Treat every input as a type encoding such as '.?AVfoo@@'
  -S, --strict        Reject symbols followed by unparsed input
  -C, --color         Print demangled names using terminal colors
  -V, --verbose       Log parser decisions to stderr";

const ABBRV: &[&str] = &["-H", "-T", "-S", "-C", "-V"];
const NAMES: &[&str] = &["--help", "--type", "--strict", "--color", "--verbose"];

pub static ARGS: Lazy<Cli> = Lazy::new(Cli::parse);

#[derive(Debug, Clone, Default)]
pub struct Cli {
    /// Parse every input as a standalone type.
    pub types: bool,

    /// Fail on trailing input.
    pub strict: bool,

    /// Emit ANSI escape sequences.
    pub color: bool,

    /// Log debug records.
    pub verbose: bool,

    /// Symbols given on the command line.
    pub symbols: Vec<String>,
}

impl Cli {
    pub fn parse() -> Self {
        Self::parse_from(std::env::args().skip(1))
    }

    fn parse_from(mut args: impl Iterator<Item = String>) -> Self {
        let mut cli = Cli::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-H" | "--help" => exit!(0 => "{HELP}"),
                "-T" | "--type" => cli.types = true,
                "-S" | "--strict" => cli.strict = true,
                "-C" | "--color" => cli.color = true,
                "-V" | "--verbose" => cli.verbose = true,
                // everything after '--' is a symbol, even when it looks like a flag
                "--" => cli.symbols.extend(args.by_ref()),
                unknown if unknown.starts_with('-') && unknown.len() > 1 => {
                    let mut distance = u32::MAX;
                    let mut best_guess = "";
                    for name in NAMES.iter().chain(ABBRV) {
                        let d = triple_accel::levenshtein_exp(unknown.as_bytes(), name.as_bytes());
                        if d < distance {
                            distance = d;
                            best_guess = name;
                        }
                    }

                    // A guess that's less than 3 `steps` away from a correct arg.
                    if distance < 3 {
                        exit!(1 => "Unknown cmd arg '{unknown}' did you mean '{best_guess}'?")
                    } else {
                        exit!(1 => "Unknown cmd arg '{unknown}' was entered.\n\n{HELP}");
                    }
                }
                symbol => cli.symbols.push(symbol.to_string()),
            }
        }

        cli
    }

    pub fn options(&self) -> demangler::msvc::Options {
        demangler::msvc::Options::new()
            .error_on_trailing_input(self.strict)
            .verbose_diagnostics(self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn flags_and_symbols() {
        let args = cli(&["-S", "?x@@3HA", "--color", "?y@@3HA"]);

        assert!(args.strict);
        assert!(args.color);
        assert!(!args.types);
        assert_eq!(args.symbols, ["?x@@3HA", "?y@@3HA"]);
    }

    #[test]
    fn symbols_after_separator() {
        let args = cli(&["--type", "--", "-T", ".?AVfoo@@"]);

        assert!(args.types);
        assert_eq!(args.symbols, ["-T", ".?AVfoo@@"]);
    }

    #[test]
    fn options_follow_flags() {
        let options = cli(&["--strict", "-V"]).options();

        assert!(options.error_on_trailing_input);
        assert!(options.verbose_diagnostics);
    }
}
