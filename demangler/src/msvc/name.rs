//! Names, scopes and template instantiations.
//!
//! ```text
//! <path> = <unqualified-path> {<nested-path>}* @
//!
//! <unqualified-path> = <substitution>
//!                    | ?$ <template-name>
//!                    | ? <operator-code>
//!                    | <source-name>
//!
//! <nested-path> = <substitution>
//!               | ?$ <template-name>
//!               | ?A [<discriminator>] @   // anonymous namespace
//!               | ?? <symbol>              // function-local scope
//!               | ? <number> [? <symbol>]  // locally scoped ordinal
//!               | <source-name>
//!
//! <template-name> = <unqualified-path> {<template-arg>}* @
//! ```

use super::context::{Backrefs, Cursor};
use super::{Grammar, Operator, Parse, ParsedObject, TypeNode};
use crate::Result;

/// Single component of a qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameComponent {
    Identifier(String),
    Template(Box<Template>),
    Operator(Operator),
    /// Ordinal of a block scope inside a function, rendered as `` `n' ``.
    AnonymousScope(i64),
    /// `` `anonymous namespace' ``, with the compiler generated key if any.
    AnonymousNamespace(Option<String>),
    /// Function whose body encloses the rest of the name.
    Nested(Box<ParsedObject>),
    /// Hashed symbol that can't be demangled any further.
    Md5(String),
}

impl NameComponent {
    /// Name of a symbol or type, before its scope.
    pub(super) fn parse_unqualified(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self> {
        cursor.descent()?;
        let start = cursor.offset;

        let name = if let Some(digit) = cursor.base10() {
            backrefs.get_memorized_name(digit, start)?
        } else if cursor.eat_slice(b"?$") {
            Self::parse_template(cursor, backrefs)?
        } else if cursor.eat(b'?') {
            NameComponent::Operator(Operator::parse(cursor, backrefs)?)
        } else {
            let name = NameComponent::Identifier(cursor.ident()?);
            backrefs.memorize_name(&name);
            name
        };

        cursor.ascent();
        Ok(name)
    }

    /// One qualifier of a scope. Local scopes produce two components.
    fn parse_nested(
        cursor: &mut Cursor,
        backrefs: &mut Backrefs,
        out: &mut Vec<NameComponent>,
    ) -> Result<()> {
        cursor.descent()?;
        let start = cursor.offset;

        if let Some(digit) = cursor.base10() {
            out.push(backrefs.get_memorized_name(digit, start)?);
        } else if cursor.eat_slice(b"?$") {
            out.push(Self::parse_template(cursor, backrefs)?);
        } else if cursor.starts_with(b"??") {
            // the symbol starts at the second '?'
            cursor.offset += 1;
            out.push(Self::parse_function_scope(cursor, backrefs)?);
        } else if cursor.eat_slice(b"?A") {
            let key = match cursor.eat(b'@') {
                true => None,
                false => Some(cursor.ident()?),
            };

            let namespace = NameComponent::AnonymousNamespace(key);
            backrefs.memorize_name(&namespace);
            out.push(namespace);
        } else if cursor.peek() == Some(b'?') {
            Self::parse_local_scope(cursor, backrefs, out)?;
        } else {
            let name = NameComponent::Identifier(cursor.ident()?);
            backrefs.memorize_name(&name);
            out.push(name);
        }

        cursor.ascent();
        Ok(())
    }

    /// `?<number>` optionally followed by `?<symbol>`, with the cursor on the first '?'.
    fn parse_local_scope(
        cursor: &mut Cursor,
        backrefs: &mut Backrefs,
        out: &mut Vec<NameComponent>,
    ) -> Result<()> {
        let mut lookahead = cursor.clone();
        lookahead.offset += 1;

        match lookahead.number() {
            Ok(ordinal) => {
                cursor.offset = lookahead.offset;
                out.push(NameComponent::AnonymousScope(ordinal));

                if cursor.starts_with(b"??") {
                    cursor.offset += 1;
                    out.push(Self::parse_function_scope(cursor, backrefs)?);
                }

                Ok(())
            }
            // a lone '?' that isn't an ordinal is the start of a symbol
            Err(err) => match cursor.grammar {
                Grammar::Primary => Err(err),
                Grammar::Alternate => {
                    if cursor.verbose {
                        log::debug!("embedded symbol at offset {}", cursor.offset);
                    }

                    out.push(Self::parse_function_scope(cursor, backrefs)?);
                    Ok(())
                }
            },
        }
    }

    /// Template instantiation after its `?$` prefix. Operator templates
    /// aren't available to back-references.
    fn parse_template(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self> {
        let template = Template::parse(cursor, backrefs)?;
        let memorize = !matches!(template.name, NameComponent::Operator(_));

        let name = NameComponent::Template(Box::new(template));
        if memorize {
            backrefs.memorize_name(&name);
        }

        Ok(name)
    }

    /// Function whose body encloses the rest of the name, keeping its mangled form
    /// so it can be demangled on its own.
    fn parse_function_scope(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self> {
        let start = cursor.offset;
        let mut object = ParsedObject::parse_embedded(cursor, backrefs)?;
        object.retained_mangled = Some(cursor.slice(start, cursor.offset));
        Ok(NameComponent::Nested(Box::new(object)))
    }

    pub(super) fn is_cast(&self) -> bool {
        match self {
            NameComponent::Operator(Operator::Cast) => true,
            NameComponent::Template(template) => template.name.is_cast(),
            _ => false,
        }
    }
}

/// Parses a symbol name in the form of A@B@C@@ which represents C::B::A.
///
/// Components are stored innermost first, as they appear in the mangled form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Qualification(pub Vec<NameComponent>);

impl Qualification {
    /// Scope of an already parsed `name`, up to and including the terminating '@'.
    pub(super) fn parse_scope(
        cursor: &mut Cursor,
        backrefs: &mut Backrefs,
        name: NameComponent,
    ) -> Result<Self> {
        let mut components = vec![name];

        while !cursor.eat(b'@') {
            NameComponent::parse_nested(cursor, backrefs, &mut components)?;
        }

        Ok(Qualification(components))
    }

    /// Innermost component, the entity's own name.
    pub fn name(&self) -> Option<&NameComponent> {
        self.0.first()
    }

    /// Enclosing scopes, innermost first.
    pub fn scopes(&self) -> &[NameComponent] {
        self.0.get(1..).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Parse for Qualification {
    fn parse(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self> {
        let name = NameComponent::parse_unqualified(cursor, backrefs)?;
        Qualification::parse_scope(cursor, backrefs, name)
    }
}

/// ```text
/// <template-arg> = <type>
///                | $0 <number>          // integral constant
///                | $1 <symbol>          // address of a symbol
///                | $E <symbol>          // reference to a symbol
///                | $D <number>          // template parameter
///                | $S | $$V | $$$V | $$Z // empty parameter pack
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateArg {
    Type(TypeNode),
    Integer(i64),
    Address(Box<ParsedObject>),
    Reference(Box<ParsedObject>),
    Param(i64),
    EmptyPack,
}

impl Parse for TemplateArg {
    fn parse(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self> {
        let start = cursor.offset;

        if cursor.eat_slice(b"$$$V")
            || cursor.eat_slice(b"$$V")
            || cursor.eat_slice(b"$$Z")
            || cursor.eat_slice(b"$S")
        {
            return Ok(TemplateArg::EmptyPack);
        }

        if cursor.eat_slice(b"$0") {
            return cursor.number().map(TemplateArg::Integer);
        }

        if cursor.eat_slice(b"$D") {
            return cursor.number().map(TemplateArg::Param);
        }

        if cursor.eat_slice(b"$1") {
            let object = ParsedObject::parse_embedded(cursor, backrefs)?;
            return Ok(TemplateArg::Address(Box::new(object)));
        }

        if cursor.eat_slice(b"$E") {
            let object = ParsedObject::parse_embedded(cursor, backrefs)?;
            return Ok(TemplateArg::Reference(Box::new(object)));
        }

        // member pointers and other constant expressions
        if let Some(b'F' | b'G' | b'H' | b'I' | b'J' | b'Q' | b'R') = cursor.peek_nth(1) {
            if cursor.peek() == Some(b'$') {
                cursor.offset += 2;
                return Err(cursor.unsupported(start));
            }
        }

        if let Some(digit) = cursor.base10() {
            return backrefs.get_memorized_param(digit, start).map(TemplateArg::Type);
        }

        let tipe = TypeNode::parse(cursor, backrefs)?;

        // single-letter types are ignored for backref's because
        // memorizing them doesn't save anything.
        if cursor.offset - start > 1 {
            backrefs.memorize_param(&tipe);
        }

        Ok(TemplateArg::Type(tipe))
    }
}

/// ```text
/// <template-name> = <unqualified-path> <template-arg>* @
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: NameComponent,
    pub args: Vec<TemplateArg>,
}

impl Parse for Template {
    fn parse(cursor: &mut Cursor, _: &mut Backrefs) -> Result<Self> {
        cursor.descent()?;

        // instantiations have their own compression state
        let mut temp = Backrefs::new();
        let name = NameComponent::parse_unqualified(cursor, &mut temp)?;

        let mut args = Vec::new();
        while !cursor.eat(b'@') {
            args.push(TemplateArg::parse(cursor, &mut temp)?);
        }

        cursor.ascent();
        Ok(Template { name, args })
    }
}
