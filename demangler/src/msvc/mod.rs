//! Microsoft Visual Studio symbol demangler
//!
//! ```text
//! <mangled-name> = ? <path> <type-encoding>
//!
//! <path> = <unqualified-path> {<nested-path>}* @
//!
//! <type-encoding> = <function-class> <function-type>
//!                 | <storage-class> <type> <cvr-qualifier>
//!                 | <special-encoding>
//!
//! <function-type> = <this-cvr-qualifier> <calling-convention>
//!                   <return-type> <argument-list> <throw-spec>
//! ```
//!
//! Every call builds its own [`Cursor`](context::Cursor) and back-reference tables,
//! nothing is shared between calls so they can run on any number of threads.
//!
//! source [MicrosoftMangle.cpp](https://github.com/llvm-mirror/clang/blob/aa231e4be75ac4759c236b755c57876f76e3cf05/lib/AST/MicrosoftMangle.cpp#L1609)

mod context;
mod name;
mod render;
mod special;
mod symbol;
mod tests;
mod types;

use context::{Backrefs, Cursor};

pub use name::{NameComponent, Qualification, Template, TemplateArg};
pub use special::Operator;
pub use symbol::{
    FunctionSymbol, ObjectKind, ParsedObject, SpecialName, StorageClass, StorageScope, Thunk,
};
pub use types::{
    Array, BasicKind, CallingConv, ClassKind, EnumBase, FunctionType, Modifiers, Params, Pointer,
    Reference, TypeNode,
};

use crate::{Error, ErrorKind, Result, TokenStream};

/// Rule set used for the productions that compilers disagree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// Microsoft's own encoding.
    Primary,
    /// A single `?` inside of a scope may start an embedded symbol, as emitted by LLVM.
    Alternate,
}

/// Settings of a single demangling call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Fail with [`Error::TrailingInput`] when the symbol ends before the input does.
    pub error_on_trailing_input: bool,
    /// Log every top-level production and retry decision at debug level.
    pub verbose_diagnostics: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_on_trailing_input(mut self, enabled: bool) -> Self {
        self.error_on_trailing_input = enabled;
        self
    }

    pub fn verbose_diagnostics(mut self, enabled: bool) -> Self {
        self.verbose_diagnostics = enabled;
        self
    }
}

/// Parses node potentially modifying the context.
/// Output may depend on child nodes or the parent as they modify the context which will
/// later be used by parent nodes or other unparsed children.
trait Parse: Sized {
    fn parse(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self>;
}

/// Demangles a full symbol such as `?x@@YAXMH@Z`.
pub fn demangle(input: &str, options: Options) -> Result<ParsedObject> {
    let mut cursor = Cursor::new(input, Grammar::Primary, options.verbose_diagnostics);
    let mut backrefs = Backrefs::new();

    if options.verbose_diagnostics {
        log::debug!("demangling symbol '{input}'");
    }

    let object = ParsedObject::parse(&mut cursor, &mut backrefs)?;
    check_trailing(&cursor, options)?;
    Ok(object)
}

/// Demangles a type on its own, as found in RTTI type names such as `.?AVfoo@@`.
///
/// Encodings introduced by `.?A` that the Microsoft grammar rejects are parsed a
/// second time using [`Grammar::Alternate`]. The first success is returned.
pub fn demangle_type(input: &str, options: Options) -> Result<TypeNode> {
    let primary = match attempt_type(input, Grammar::Primary, options) {
        Ok(tipe) => return Ok(tipe),
        Err(err) => err,
    };

    let ambiguous = matches!(
        primary.kind(),
        ErrorKind::Syntax | ErrorKind::UnsupportedConstruct
    );

    if !ambiguous || !input.starts_with(".?A") {
        return Err(primary);
    }

    if options.verbose_diagnostics {
        log::debug!("retrying '{input}' with the alternate grammar after: {primary}");
    }

    match attempt_type(input, Grammar::Alternate, options) {
        Ok(tipe) => Ok(tipe),
        Err(alternate) => {
            if options.verbose_diagnostics {
                log::debug!("alternate grammar failed as well: {alternate}");
            }

            Err(Error::AmbiguousRetryExhausted {
                primary: Box::new(primary),
            })
        }
    }
}

/// A single attempt at parsing a type with fresh state.
fn attempt_type(input: &str, grammar: Grammar, options: Options) -> Result<TypeNode> {
    let mut cursor = Cursor::new(input, grammar, options.verbose_diagnostics);
    let mut backrefs = Backrefs::new();

    if options.verbose_diagnostics {
        log::debug!("demangling type '{input}' using the {grammar:?} grammar");
    }

    // llvm appears to generate a '.' prefix on some symbols
    cursor.eat(b'.');

    let tipe = TypeNode::parse(&mut cursor, &mut backrefs)?;
    check_trailing(&cursor, options)?;
    Ok(tipe)
}

fn check_trailing(cursor: &Cursor, options: Options) -> Result<()> {
    if cursor.is_empty() {
        return Ok(());
    }

    if options.verbose_diagnostics {
        log::debug!(
            "{} unparsed byte(s) after offset {}",
            cursor.rest().len(),
            cursor.offset
        );
    }

    match options.error_on_trailing_input {
        true => Err(Error::TrailingInput {
            offset: cursor.offset,
        }),
        false => Ok(()),
    }
}

/// Demangles either a symbol or, when prefixed by a '.', a type into colored tokens.
pub fn parse(s: &str) -> Result<TokenStream> {
    if s.starts_with('.') {
        return demangle_type(s, Options::default()).map(|tipe| tipe.to_tokens());
    }

    demangle(s, Options::default()).map(|object| object.to_tokens())
}
