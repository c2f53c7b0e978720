//! Root of the AST.
//!
//! ```text
//! <symbol> = ??@ <md5> @
//!          | ?$TSS <digits> @ <scope> <type-encoding>
//!          | ? <path> [<type-encoding>]
//!
//! <type-encoding> = [$$J <digit> <skipped>] [$$F | $$H]
//!                   ( <storage-class> <type> <cvr-qualifier>
//!                   | 5 [<number>]                        // local static guard
//!                   | 6 <cvr-qualifier> {<path>}* @       // vftable
//!                   | 7 <cvr-qualifier> {<path>}* @       // vbtable
//!                   | 8                                   // rtti
//!                   | 9                                   // extern "C" name
//!                   | <member-function> [<number>] <function-type>
//!                   | <global-function> <function-type>
//!                   | $ <thunk> )
//! ```

use bitflags::bitflags;

use super::context::{Backrefs, Cursor};
use super::types::{Modifiers, Pointer, Reference};
use super::{CallingConv, FunctionType, NameComponent, Parse, Qualification, TypeNode};
use crate::{Error, Result};

/// Result of demangling a full symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedObject {
    /// Name and enclosing scopes, innermost first.
    pub qualification: Qualification,
    pub kind: ObjectKind,
    /// Function type of a function, type of a variable.
    pub ty: Option<TypeNode>,
    /// Declared as `extern "C"`.
    pub extern_c: bool,
    /// Mangled form of a symbol that was found inside another symbol's scope.
    pub retained_mangled: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Function(FunctionSymbol),
    Data(StorageClass),
    Special(SpecialName),
    /// A name without any type information.
    Untyped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSymbol {
    pub scope: StorageScope,
    pub thunk: Option<Thunk>,
}

/// Compiler generated entry points that adjust `this` before calling the real function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thunk {
    /// ```text
    /// `adjustor{<offset>}'
    /// ```
    Adjustor { offset: i64 },
    /// ```text
    /// `vtordisp{<vtordisp>, <offset>}'
    /// ```
    VtorDisp { vtordisp: i64, offset: i64 },
    /// ```text
    /// `vtordispex{<vbptr>, <vboffset>, <vtordisp>, <offset>}'
    /// ```
    VtorDispEx {
        vbptr: i64,
        vboffset: i64,
        vtordisp: i64,
        offset: i64,
    },
    /// ```text
    /// `vcall'{<offset>, {flat}}
    /// ```
    VCall {
        offset: i64,
        calling_convention: CallingConv,
    },
}

/// Symbols the compiler emits on behalf of a class or function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialName {
    /// Encoding `6`, virtual function tables and complete object locators.
    VFTable {
        cv: Modifiers,
        /// Base classes the table is for, most derived first.
        chain: Vec<Qualification>,
    },
    /// Encoding `7`, virtual base tables.
    VBTable {
        cv: Modifiers,
        chain: Vec<Qualification>,
    },
    /// Encoding `8`, the descriptor is the name itself.
    RttiDescriptor,
    LocalStaticGuard { index: Option<i64> },
}

/// ```text
/// <storage-class> = 0 // private static member
///                 | 1 // protected static member
///                 | 2 // public static member
///                 | 3 // global
///                 | 4 // static local
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StorageClass {
    PrivateStatic,
    ProtectedStatic,
    PublicStatic,
    Global,
    FunctionLocalStatic,
}

bitflags! {
    /// ```text
    /// <member-function> = A // private: near
    ///                   | B // private: far
    ///                   | C // private: static near
    ///                   | D // private: static far
    ///                   | E // private: virtual near
    ///                   | F // private: virtual far
    ///                   | G // private: virtual adjustor near
    ///                   | H // private: virtual adjustor far
    ///                   | I // protected: near
    ///                   | J // protected: far
    ///                   | K // protected: static near
    ///                   | L // protected: static far
    ///                   | M // protected: virtual near
    ///                   | N // protected: virtual far
    ///                   | O // protected: virtual adjustor near
    ///                   | P // protected: virtual adjustor far
    ///                   | Q // public: near
    ///                   | R // public: far
    ///                   | S // public: static near
    ///                   | T // public: static far
    ///                   | U // public: virtual near
    ///                   | V // public: virtual far
    ///                   | W // public: virtual adjustor near
    ///                   | X // public: virtual adjustor far
    ///
    /// <global-function> = Y // global near
    ///                   | Z // global far
    /// ```
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct StorageScope: u32 {
        const PUBLIC    = 1;
        const PRIVATE   = 1 << 1;
        const PROTECTED = 1 << 2;
        const GLOBAL    = 1 << 3;
        const STATIC    = 1 << 4;
        const VIRTUAL   = 1 << 5;
        const FAR       = 1 << 6;
        const ADJUST    = 1 << 7;
    }
}

impl StorageScope {
    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            b'A' => StorageScope::PRIVATE,
            b'B' => StorageScope::PRIVATE | StorageScope::FAR,
            b'C' => StorageScope::PRIVATE | StorageScope::STATIC,
            b'D' => StorageScope::PRIVATE | StorageScope::STATIC | StorageScope::FAR,
            b'E' => StorageScope::PRIVATE | StorageScope::VIRTUAL,
            b'F' => StorageScope::PRIVATE | StorageScope::VIRTUAL | StorageScope::FAR,
            b'G' => StorageScope::PRIVATE | StorageScope::VIRTUAL | StorageScope::ADJUST,
            b'H' => {
                StorageScope::PRIVATE
                    | StorageScope::VIRTUAL
                    | StorageScope::ADJUST
                    | StorageScope::FAR
            }
            b'I' => StorageScope::PROTECTED,
            b'J' => StorageScope::PROTECTED | StorageScope::FAR,
            b'K' => StorageScope::PROTECTED | StorageScope::STATIC,
            b'L' => StorageScope::PROTECTED | StorageScope::STATIC | StorageScope::FAR,
            b'M' => StorageScope::PROTECTED | StorageScope::VIRTUAL,
            b'N' => StorageScope::PROTECTED | StorageScope::VIRTUAL | StorageScope::FAR,
            b'O' => StorageScope::PROTECTED | StorageScope::VIRTUAL | StorageScope::ADJUST,
            b'P' => {
                StorageScope::PROTECTED
                    | StorageScope::VIRTUAL
                    | StorageScope::ADJUST
                    | StorageScope::FAR
            }
            b'Q' => StorageScope::PUBLIC,
            b'R' => StorageScope::PUBLIC | StorageScope::FAR,
            b'S' => StorageScope::PUBLIC | StorageScope::STATIC,
            b'T' => StorageScope::PUBLIC | StorageScope::STATIC | StorageScope::FAR,
            b'U' => StorageScope::PUBLIC | StorageScope::VIRTUAL,
            b'V' => StorageScope::PUBLIC | StorageScope::VIRTUAL | StorageScope::FAR,
            b'W' => StorageScope::PUBLIC | StorageScope::VIRTUAL | StorageScope::ADJUST,
            b'X' => {
                StorageScope::PUBLIC
                    | StorageScope::VIRTUAL
                    | StorageScope::ADJUST
                    | StorageScope::FAR
            }
            b'Y' => StorageScope::GLOBAL,
            b'Z' => StorageScope::GLOBAL | StorageScope::FAR,
            _ => return None,
        })
    }

    /// Access of the `$0`..`$5` vtordisp thunks.
    fn from_vtordisp_code(code: u8) -> Option<Self> {
        let access = match code {
            b'0' | b'1' => StorageScope::PRIVATE,
            b'2' | b'3' => StorageScope::PROTECTED,
            b'4' | b'5' => StorageScope::PUBLIC,
            _ => return None,
        };

        let far = match (code - b'0') % 2 {
            1 => StorageScope::FAR,
            _ => StorageScope::empty(),
        };

        Some(access | far | StorageScope::VIRTUAL)
    }
}

impl ParsedObject {
    fn untyped(qualification: Qualification) -> Self {
        Self {
            qualification,
            kind: ObjectKind::Untyped,
            ty: None,
            extern_c: false,
            retained_mangled: None,
        }
    }

    /// Symbol inside of another symbol. It keeps reading and extending the
    /// back-reference tables of the symbol it's embedded in.
    pub(super) fn parse_embedded(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self> {
        ParsedObject::parse(cursor, backrefs)
    }

    /// The entity's own name.
    pub fn name(&self) -> Option<&NameComponent> {
        self.qualification.name()
    }

    /// Enclosing scopes, innermost first.
    pub fn scope(&self) -> &[NameComponent] {
        self.qualification.scopes()
    }

    pub fn type_node(&self) -> Option<&TypeNode> {
        self.ty.as_ref()
    }

    /// Mangled form of the innermost function this symbol is local to.
    pub fn function_namespace(&self) -> Option<&str> {
        self.scope().iter().find_map(|component| match component {
            NameComponent::Nested(object) => object.retained_mangled.as_deref(),
            _ => None,
        })
    }

    /// Base classes of a vftable or vbtable.
    pub fn vtable_chain(&self) -> Option<&[Qualification]> {
        match &self.kind {
            ObjectKind::Special(SpecialName::VFTable { chain, .. })
            | ObjectKind::Special(SpecialName::VBTable { chain, .. }) => Some(chain),
            _ => None,
        }
    }

    /// ```text
    /// ??@ <32 hex digits> @
    /// ```
    fn parse_md5(cursor: &mut Cursor) -> Result<Self> {
        let start = cursor.offset;
        let hash = cursor.ident()?;

        if hash.len() != 32 || !hash.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(cursor.error_at(start, "md5 hash"));
        }

        Ok(ParsedObject::untyped(Qualification(vec![NameComponent::Md5(hash)])))
    }

    /// ```text
    /// ?$TSS <digits> @
    /// ```
    fn parse_thread_guard(cursor: &mut Cursor) -> Result<NameComponent> {
        let mut n = 0usize;

        while !cursor.eat(b'@') {
            let start = cursor.offset;
            let digit = cursor
                .base10()
                .ok_or_else(|| cursor.error_at(start, "decimal digit"))?;

            n = n
                .checked_mul(10)
                .and_then(|n| n.checked_add(digit))
                .ok_or_else(|| cursor.error_at(start, "guard index within 64 bits"))?;
        }

        Ok(NameComponent::Identifier(format!("$TSS{n}")))
    }

    /// Everything that follows the qualification.
    fn parse_encoding(&mut self, cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<()> {
        loop {
            if cursor.eat_slice(b"$$J") || cursor.eat_slice(b"$$N") || cursor.eat_slice(b"$$O") {
                let start = cursor.offset;
                let skip = cursor
                    .base10()
                    .ok_or_else(|| cursor.error_at(start, "extern \"C\" prefix length"))?;

                if cursor.rest().len() < skip {
                    return Err(Error::PrematureEnd {
                        offset: cursor.input().len(),
                    });
                }

                cursor.offset += skip;
                self.extern_c = true;
                continue;
            }

            // managed code markers don't change the rendered symbol
            if cursor.eat_slice(b"$$F") || cursor.eat_slice(b"$$H") {
                continue;
            }

            break;
        }

        let start = cursor.offset;
        let code = match cursor.peek() {
            Some(code) => code,
            None => return Ok(()),
        };

        match code {
            b'0'..=b'4' => {
                cursor.offset += 1;
                let storage = match code {
                    b'0' => StorageClass::PrivateStatic,
                    b'1' => StorageClass::ProtectedStatic,
                    b'2' => StorageClass::PublicStatic,
                    b'3' => StorageClass::Global,
                    _ => StorageClass::FunctionLocalStatic,
                };

                self.kind = ObjectKind::Data(storage);
                self.ty = Some(parse_variable(cursor, backrefs)?);
            }
            b'5' => {
                cursor.offset += 1;
                let index = match cursor.peek() {
                    Some(b'?' | b'0'..=b'9' | b'A'..=b'P') => Some(cursor.number()?),
                    _ => None,
                };

                self.kind = ObjectKind::Special(SpecialName::LocalStaticGuard { index });
            }
            b'6' | b'7' => {
                cursor.offset += 1;
                let (cv, _) = Modifiers::parse_cv(cursor)?;

                let mut chain = Vec::new();
                if !cursor.is_empty() {
                    while !cursor.eat(b'@') {
                        chain.push(Qualification::parse(cursor, backrefs)?);
                    }
                }

                self.kind = ObjectKind::Special(match code {
                    b'6' => SpecialName::VFTable { cv, chain },
                    _ => SpecialName::VBTable { cv, chain },
                });
            }
            b'8' => {
                cursor.offset += 1;
                self.kind = ObjectKind::Special(SpecialName::RttiDescriptor);
            }
            b'9' => {
                cursor.offset += 1;
                self.kind = ObjectKind::Untyped;
            }
            b'A'..=b'Z' => {
                cursor.offset += 1;
                let scope = StorageScope::from_code(code)
                    .ok_or_else(|| cursor.error_at(start, "function class"))?;

                let thunk = match scope.contains(StorageScope::ADJUST) {
                    true => Some(Thunk::Adjustor {
                        offset: cursor.number()?,
                    }),
                    false => None,
                };

                let has_this = !scope.intersects(StorageScope::STATIC | StorageScope::GLOBAL);
                let func = FunctionType::parse_with(cursor, backrefs, has_this)?;

                self.kind = ObjectKind::Function(FunctionSymbol { scope, thunk });
                self.ty = Some(TypeNode::Function(Box::new(func)));
            }
            b'$' => self.parse_thunk(cursor, backrefs)?,
            b'_' => {
                cursor.offset += 1;
                return Err(cursor.unsupported(start));
            }
            _ => return Err(cursor.error_at(start, "type encoding")),
        }

        Ok(())
    }

    /// ```text
    /// <thunk> = B <number> A <calling-convention>           // vcall
    ///         | R <0-5> <number>{4} <function-type>          // vtordispex
    ///         | <0-5> <number>{2} <function-type>            // vtordisp
    /// ```
    fn parse_thunk(&mut self, cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<()> {
        let start = cursor.offset;
        cursor.consume(b'$')?;

        if cursor.eat(b'B') {
            let offset = cursor.number()?;
            cursor.consume(b'A')?;
            let calling_convention = CallingConv::parse(cursor, backrefs)?;

            self.kind = ObjectKind::Function(FunctionSymbol {
                scope: StorageScope::empty(),
                thunk: Some(Thunk::VCall {
                    offset,
                    calling_convention,
                }),
            });

            return Ok(());
        }

        let extended = cursor.eat(b'R');
        let code = cursor.take()?;
        let scope = match StorageScope::from_vtordisp_code(code) {
            Some(scope) => scope,
            None => return Err(cursor.unsupported(start)),
        };

        let thunk = if extended {
            Thunk::VtorDispEx {
                vbptr: cursor.number()?,
                vboffset: cursor.number()?,
                vtordisp: cursor.number()?,
                offset: cursor.number()?,
            }
        } else {
            Thunk::VtorDisp {
                vtordisp: cursor.number()?,
                offset: cursor.number()?,
            }
        };

        let func = FunctionType::parse_with(cursor, backrefs, true)?;

        self.kind = ObjectKind::Function(FunctionSymbol {
            scope,
            thunk: Some(thunk),
        });
        self.ty = Some(TypeNode::Function(Box::new(func)));
        Ok(())
    }
}

/// Type of a variable followed by its trailing qualifiers.
///
/// For pointers and references the trailing qualifiers belong to what's pointed at,
/// the extended qualifiers to the pointer itself. A function can't be qualified,
/// so a pointer to one takes both.
fn parse_variable(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<TypeNode> {
    let tipe = TypeNode::parse(cursor, backrefs)?;

    let tipe = match tipe {
        TypeNode::Pointer(ptr) => {
            let Pointer { pointee, cv, class } = *ptr;
            let ext = Modifiers::parse_ext(cursor);
            let (quali, member) = Modifiers::parse_cv(cursor)?;

            // the class of a member pointer is repeated
            if member && class.is_some() {
                Qualification::parse(cursor, backrefs)?;
            }

            let (pointee, cv) = match pointee {
                TypeNode::Function(_) => (pointee, cv | ext | quali),
                pointee => (pointee.with_cv(quali), cv | ext),
            };

            TypeNode::Pointer(Box::new(Pointer { pointee, cv, class }))
        }
        TypeNode::Reference(reference) => {
            let Reference {
                referent,
                cv,
                rvalue,
            } = *reference;
            let ext = Modifiers::parse_ext(cursor);
            let (quali, _) = Modifiers::parse_cv(cursor)?;

            let (referent, cv) = match referent {
                TypeNode::Function(_) => (referent, cv | ext | quali),
                referent => (referent.with_cv(quali), cv | ext),
            };

            TypeNode::Reference(Box::new(Reference {
                referent,
                cv,
                rvalue,
            }))
        }
        tipe => tipe.with_cv(parse_trailing_cv(cursor)?),
    };

    Ok(tipe)
}

/// Trailing qualifiers of a variable that isn't a pointer or reference.
///
/// `E` and `F` are also far cv qualifiers, extended qualifiers are only
/// read when a cv qualifier follows them.
fn parse_trailing_cv(cursor: &mut Cursor) -> Result<Modifiers> {
    let mut lookahead = cursor.clone();
    let ext = Modifiers::parse_ext(&mut lookahead);

    if !ext.is_empty() {
        if let Ok((quali, _)) = Modifiers::parse_cv(&mut lookahead) {
            cursor.offset = lookahead.offset;
            return Ok(quali | ext);
        }
    }

    Ok(Modifiers::parse_cv(cursor)?.0)
}

impl Parse for ParsedObject {
    fn parse(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self> {
        cursor.descent()?;
        let start = cursor.offset;
        cursor.consume(b'?')?;

        // unparseable MD5 encoded symbol
        if cursor.eat_slice(b"?@") {
            let object = ParsedObject::parse_md5(cursor)?;
            cursor.ascent();
            return Ok(object);
        }

        // thread safe static guard
        let name = if cursor.eat_slice(b"$TSS") {
            ParsedObject::parse_thread_guard(cursor)?
        } else {
            NameComponent::parse_unqualified(cursor, backrefs)?
        };

        let qualification = Qualification::parse_scope(cursor, backrefs, name)?;
        if cursor.verbose {
            log::debug!(
                "qualified name ends at offset {}, {} component(s)",
                cursor.offset,
                qualification.0.len()
            );
        }

        let mut object = ParsedObject::untyped(qualification);
        object.parse_encoding(cursor, backrefs)?;

        if cursor.verbose {
            log::debug!(
                "parsed symbol '{}' ({:?})",
                cursor.slice(start, cursor.offset),
                object.kind
            );
        }

        cursor.ascent();
        Ok(object)
    }
}
