//! Type encodings.
//!
//! ```text
//! <type> = <basic-type>
//!        | <class-type> <path>
//!        | W <enum-base> <path>
//!        | <indirection> <pointee>
//!        | Y <number> {<number>}* <type>  // array
//!        | _O <cvr-qualifier> <element>   // array of unknown bound
//!        | ? <cvr-qualifier> <type>
//!        | $$A6 <function-type>
//!        | $$C <cvr-qualifier> <type>
//!        | $$T                            // std::nullptr_t
//!
//! <pointee> = 6 <function-type>
//!           | 8 <path> <this-qualifier> <function-type>
//!           | <pointer-ext-qualifier>* <cvr-qualifier> [<path>] <type>
//! ```

use bitflags::bitflags;

use super::context::{Backrefs, Cursor};
use super::{Parse, Qualification};
use crate::Result;

bitflags! {
    #[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
    pub struct Modifiers: u32 {
        const CONST     = 0b0000000000001;
        const VOLATILE  = 0b0000000000010;
        const FAR       = 0b0000000000100;
        const PTR64     = 0b0000000001000;
        const UNALIGNED = 0b0000000010000;
        const RESTRICT  = 0b0000000100000;
        const LVALUE    = 0b0000001000000;
        const RVALUE    = 0b0000010000000;
    }
}

impl Modifiers {
    /// ```text
    /// <cvr-qualifier> = A | Q // no qualifier
    ///                 | B | R // const
    ///                 | C | S // volatile
    ///                 | D | T // const volatile
    ///                 | E..=H // far variants of the above
    /// ```
    ///
    /// The second value is set for the `Q..=T` member pointer forms.
    pub(super) fn parse_cv(cursor: &mut Cursor) -> Result<(Self, bool)> {
        let start = cursor.offset;
        let quali = match cursor.take()? {
            b'A' => (Modifiers::empty(), false),
            b'B' => (Modifiers::CONST, false),
            b'C' => (Modifiers::VOLATILE, false),
            b'D' => (Modifiers::CONST | Modifiers::VOLATILE, false),
            b'E' => (Modifiers::FAR, false),
            b'F' => (Modifiers::FAR | Modifiers::CONST, false),
            b'G' => (Modifiers::FAR | Modifiers::VOLATILE, false),
            b'H' => (Modifiers::FAR | Modifiers::CONST | Modifiers::VOLATILE, false),
            b'Q' => (Modifiers::empty(), true),
            b'R' => (Modifiers::CONST, true),
            b'S' => (Modifiers::VOLATILE, true),
            b'T' => (Modifiers::CONST | Modifiers::VOLATILE, true),
            _ => return Err(cursor.error_at(start, "cv qualifier")),
        };

        Ok(quali)
    }

    /// ```text
    /// <pointer-ext-qualifier> = E // __ptr64
    ///                         | I // __restrict
    ///                         | F // __unaligned
    /// ```
    pub(super) fn parse_ext(cursor: &mut Cursor) -> Self {
        let mut quali = Modifiers::empty();

        loop {
            let addi = match cursor.peek() {
                Some(b'E') => Modifiers::PTR64,
                Some(b'I') => Modifiers::RESTRICT,
                Some(b'F') => Modifiers::UNALIGNED,
                _ => return quali,
            };

            quali |= addi;
            cursor.offset += 1;
        }
    }

    /// ```text
    /// <this-qualifier> = {<pointer-ext-qualifier> | G | H}* <cvr-qualifier>
    /// ```
    ///
    /// `G` and `H` are the `&` and `&&` ref-qualifiers of a member function.
    pub(super) fn parse_this(cursor: &mut Cursor) -> Result<Self> {
        let mut quali = Modifiers::empty();

        // there can be up to 4 pointer qualifiers
        for _ in 0..4 {
            let addi = match cursor.peek() {
                Some(b'E') => Modifiers::PTR64,
                Some(b'I') => Modifiers::RESTRICT,
                Some(b'F') => Modifiers::UNALIGNED,
                Some(b'G') => Modifiers::LVALUE,
                Some(b'H') => Modifiers::RVALUE,
                _ => break,
            };

            // a member cannot be qualified as both a lvalue and rvalue reference
            if (quali | addi).contains(Modifiers::LVALUE | Modifiers::RVALUE) {
                break;
            }

            quali |= addi;
            cursor.offset += 1;
        }

        Ok(quali | Modifiers::parse_cv(cursor)?.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Void,
    Bool,
    Char,
    SignedChar,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    Float,
    Double,
    LongDouble,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Int128,
    UInt128,
    WChar,
    Char8,
    Char16,
    Char32,
    Nullptr,
}

impl BasicKind {
    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            b'X' => BasicKind::Void,
            b'C' => BasicKind::SignedChar,
            b'D' => BasicKind::Char,
            b'E' => BasicKind::UnsignedChar,
            b'F' => BasicKind::Short,
            b'G' => BasicKind::UnsignedShort,
            b'H' => BasicKind::Int,
            b'I' => BasicKind::UnsignedInt,
            b'J' => BasicKind::Long,
            b'K' => BasicKind::UnsignedLong,
            b'M' => BasicKind::Float,
            b'N' => BasicKind::Double,
            b'O' => BasicKind::LongDouble,
            _ => return None,
        })
    }

    /// Types prefixed by an `_`.
    fn from_extended_code(code: u8) -> Option<Self> {
        Some(match code {
            b'D' => BasicKind::Int8,
            b'E' => BasicKind::UInt8,
            b'F' => BasicKind::Int16,
            b'G' => BasicKind::UInt16,
            b'H' => BasicKind::Int32,
            b'I' => BasicKind::UInt32,
            b'J' => BasicKind::Int64,
            b'K' => BasicKind::UInt64,
            b'L' => BasicKind::Int128,
            b'M' => BasicKind::UInt128,
            b'N' => BasicKind::Bool,
            b'Q' => BasicKind::Char8,
            b'S' => BasicKind::Char16,
            b'U' => BasicKind::Char32,
            b'W' => BasicKind::WChar,
            _ => return None,
        })
    }

    pub fn literal(self) -> &'static str {
        match self {
            BasicKind::Void => "void",
            BasicKind::Bool => "bool",
            BasicKind::Char => "char",
            BasicKind::SignedChar => "signed char",
            BasicKind::UnsignedChar => "unsigned char",
            BasicKind::Short => "short",
            BasicKind::UnsignedShort => "unsigned short",
            BasicKind::Int => "int",
            BasicKind::UnsignedInt => "unsigned int",
            BasicKind::Long => "long",
            BasicKind::UnsignedLong => "unsigned long",
            BasicKind::Float => "float",
            BasicKind::Double => "double",
            BasicKind::LongDouble => "long double",
            BasicKind::Int8 => "__int8",
            BasicKind::UInt8 => "unsigned __int8",
            BasicKind::Int16 => "__int16",
            BasicKind::UInt16 => "unsigned __int16",
            BasicKind::Int32 => "__int32",
            BasicKind::UInt32 => "unsigned __int32",
            BasicKind::Int64 => "__int64",
            BasicKind::UInt64 => "unsigned __int64",
            BasicKind::Int128 => "__int128",
            BasicKind::UInt128 => "unsigned __int128",
            BasicKind::WChar => "wchar_t",
            BasicKind::Char8 => "char8_t",
            BasicKind::Char16 => "char16_t",
            BasicKind::Char32 => "char32_t",
            BasicKind::Nullptr => "std::nullptr_t",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Struct,
    Union,
    Coclass,
    Cointerface,
}

/// Underlying type of an enum, `W0` to `W7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumBase {
    Char,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
}

impl EnumBase {
    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            b'0' => EnumBase::Char,
            b'1' => EnumBase::UnsignedChar,
            b'2' => EnumBase::Short,
            b'3' => EnumBase::UnsignedShort,
            b'4' => EnumBase::Int,
            b'5' => EnumBase::UnsignedInt,
            b'6' => EnumBase::Long,
            b'7' => EnumBase::UnsignedLong,
            _ => return None,
        })
    }
}

/// Calling conventions supported by MSVC
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum CallingConv {
    Cdecl,
    Pascal,
    Thiscall,
    Stdcall,
    Fastcall,
    Clrcall,
    Eabi,
    Vectorcall,
    Swift1,
    Swift2,
    Swift3,
    Regcall,
    Anonymous,
}

impl Parse for CallingConv {
    fn parse(cursor: &mut Cursor, _: &mut Backrefs) -> Result<Self> {
        let start = cursor.offset;
        let conv = match cursor.take()? {
            b'A' | b'B' => CallingConv::Cdecl,
            b'C' | b'D' => CallingConv::Pascal,
            b'E' | b'F' => CallingConv::Thiscall,
            b'G' | b'H' => CallingConv::Stdcall,
            b'I' | b'J' => CallingConv::Fastcall,
            b'M' | b'N' => CallingConv::Clrcall,
            b'O' | b'P' => CallingConv::Eabi,
            b'Q' => CallingConv::Vectorcall,
            b'S' => CallingConv::Swift1,
            b'U' => CallingConv::Swift2,
            b'W' => CallingConv::Swift3,
            b'w' => CallingConv::Regcall,
            b'K' => CallingConv::Anonymous,
            _ => return Err(cursor.error_at(start, "calling convention")),
        };

        Ok(conv)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    Basic {
        kind: BasicKind,
        cv: Modifiers,
    },
    Class {
        kind: ClassKind,
        name: Qualification,
        cv: Modifiers,
    },
    Enum {
        base: EnumBase,
        name: Qualification,
        cv: Modifiers,
    },
    Pointer(Box<Pointer>),
    Reference(Box<Reference>),
    /// ```text
    /// int[20][10][5][..]
    /// int[][2]
    /// ```
    Array(Box<Array>),
    Function(Box<FunctionType>),
    /// ```text
    /// `template-parameter-<idx>'
    /// ```
    TemplateParam(i64),
    W64(Box<TypeNode>),
}

/// Pointer, member pointer when `class` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    pub pointee: TypeNode,
    /// Qualifiers of the pointer itself.
    pub cv: Modifiers,
    pub class: Option<Qualification>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub referent: TypeNode,
    pub cv: Modifiers,
    pub rvalue: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Array {
    pub element: TypeNode,
    /// Length of each dimension, outermost first. `None` when unknown.
    pub dims: Vec<Option<i64>>,
}

/// ```text
/// <function-type> = [<this-qualifier>] <calling-convention>
///                   <return-type> <parameters> <throw-spec>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub calling_convention: CallingConv,
    /// `None` for constructors and destructors.
    pub return_type: Option<TypeNode>,
    pub params: Params,
    /// Qualifiers of the implicit `this`.
    pub this_cv: Modifiers,
    pub noexcept: bool,
}

/// ```text
/// <parameters> = X // void
///              | <type>+ @
///              | <type>* Z // variable args
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Params {
    pub types: Vec<TypeNode>,
    pub variadic: bool,
}

impl TypeNode {
    /// Applies `cv` to the outermost node that carries qualifiers.
    pub(super) fn with_cv(self, cv: Modifiers) -> Self {
        if cv.is_empty() {
            return self;
        }

        match self {
            TypeNode::Basic { kind, cv: quali } => TypeNode::Basic {
                kind,
                cv: quali | cv,
            },
            TypeNode::Class {
                kind,
                name,
                cv: quali,
            } => TypeNode::Class {
                kind,
                name,
                cv: quali | cv,
            },
            TypeNode::Enum {
                base,
                name,
                cv: quali,
            } => TypeNode::Enum {
                base,
                name,
                cv: quali | cv,
            },
            TypeNode::Pointer(mut ptr) => {
                ptr.cv |= cv;
                TypeNode::Pointer(ptr)
            }
            TypeNode::Reference(mut reference) => {
                reference.cv |= cv;
                TypeNode::Reference(reference)
            }
            TypeNode::Array(array) => {
                let Array { element, dims } = *array;
                TypeNode::Array(Box::new(Array {
                    element: element.with_cv(cv),
                    dims,
                }))
            }
            TypeNode::W64(inner) => TypeNode::W64(Box::new((*inner).with_cv(cv))),
            tipe @ (TypeNode::Function(_) | TypeNode::TemplateParam(_)) => tipe,
        }
    }

    /// Qualifiers of the outermost node.
    pub fn cv(&self) -> Modifiers {
        match self {
            TypeNode::Basic { cv, .. } | TypeNode::Class { cv, .. } | TypeNode::Enum { cv, .. } => {
                *cv
            }
            TypeNode::Pointer(ptr) => ptr.cv,
            TypeNode::Reference(reference) => reference.cv,
            TypeNode::Array(array) => array.element.cv(),
            TypeNode::W64(inner) => inner.cv(),
            TypeNode::Function(_) | TypeNode::TemplateParam(_) => Modifiers::empty(),
        }
    }

    /// The pointed to type of a pointer or reference.
    pub fn pointee(&self) -> Option<&TypeNode> {
        match self {
            TypeNode::Pointer(ptr) => Some(&ptr.pointee),
            TypeNode::Reference(reference) => Some(&reference.referent),
            _ => None,
        }
    }

    fn basic(kind: BasicKind) -> Self {
        TypeNode::Basic {
            kind,
            cv: Modifiers::empty(),
        }
    }

    fn pointer(cursor: &mut Cursor, backrefs: &mut Backrefs, cv: Modifiers) -> Result<Self> {
        let (pointee, ext, class) = Self::parse_pointee(cursor, backrefs)?;
        Ok(TypeNode::Pointer(Box::new(Pointer {
            pointee,
            cv: cv | ext,
            class,
        })))
    }

    fn reference(
        cursor: &mut Cursor,
        backrefs: &mut Backrefs,
        cv: Modifiers,
        rvalue: bool,
    ) -> Result<Self> {
        let (referent, ext, _) = Self::parse_pointee(cursor, backrefs)?;
        Ok(TypeNode::Reference(Box::new(Reference {
            referent,
            cv: cv | ext,
            rvalue,
        })))
    }

    /// Pointed to type, extended qualifiers of the pointer and class of a member pointer.
    fn parse_pointee(
        cursor: &mut Cursor,
        backrefs: &mut Backrefs,
    ) -> Result<(TypeNode, Modifiers, Option<Qualification>)> {
        if cursor.eat(b'6') {
            let func = FunctionType::parse_with(cursor, backrefs, false)?;
            return Ok((TypeNode::Function(Box::new(func)), Modifiers::empty(), None));
        }

        if cursor.eat(b'8') {
            let class = Qualification::parse(cursor, backrefs)?;
            let func = FunctionType::parse_with(cursor, backrefs, true)?;
            return Ok((TypeNode::Function(Box::new(func)), Modifiers::empty(), Some(class)));
        }

        let ext = Modifiers::parse_ext(cursor);
        let (cv, member) = Modifiers::parse_cv(cursor)?;
        let class = match member {
            true => Some(Qualification::parse(cursor, backrefs)?),
            false => None,
        };

        let pointee = TypeNode::parse(cursor, backrefs)?.with_cv(cv);
        Ok((pointee, ext, class))
    }

    fn array(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self> {
        let start = cursor.offset;
        let dimensions = cursor.number()?;
        if dimensions <= 0 {
            return Err(cursor.error_at(start, "array dimension count"));
        }

        let mut dims = Vec::with_capacity(1);
        for _ in 0..dimensions {
            dims.push(Some(cursor.number()?));
        }

        let element = TypeNode::parse(cursor, backrefs)?;
        Ok(TypeNode::Array(Box::new(Array { element, dims })))
    }

    /// `_O` followed by the qualifiers of the element.
    fn unbounded_array(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self> {
        let (cv, _) = Modifiers::parse_cv(cursor)?;

        let mut dims = vec![None];
        let element = Self::array_element(cursor, backrefs, &mut dims)?.with_cv(cv);
        Ok(TypeNode::Array(Box::new(Array { element, dims })))
    }

    /// Element of an array of unknown bound, written the way the array decays.
    ///
    /// A pointer to an array adds an unknown dimension, a pointer to anything
    /// else stands for the element itself and only lends it its qualifiers.
    fn array_element(
        cursor: &mut Cursor,
        backrefs: &mut Backrefs,
        dims: &mut Vec<Option<i64>>,
    ) -> Result<Self> {
        cursor.descent()?;
        let start = cursor.offset;

        let element = match cursor.peek() {
            Some(b'P' | b'Q') if !matches!(cursor.peek_nth(1), Some(b'6' | b'8')) => {
                cursor.offset += 1;

                // the extended qualifiers belong to the pointer that isn't rendered
                let _ = Modifiers::parse_ext(cursor);
                let (cv, _) = Modifiers::parse_cv(cursor)?;

                if cursor.peek() == Some(b'Y') {
                    dims.push(None);
                }

                Self::array_element(cursor, backrefs, dims)?.with_cv(cv)
            }
            Some(b'Y') => {
                cursor.offset += 1;
                let dimensions = cursor.number()?;
                if dimensions <= 0 {
                    return Err(cursor.error_at(start + 1, "array dimension count"));
                }

                for _ in 0..dimensions {
                    dims.push(Some(cursor.number()?));
                }

                Self::array_element(cursor, backrefs, dims)?
            }
            Some(b'_') if cursor.peek_nth(1) == Some(b'O') => {
                cursor.offset += 2;
                let (cv, _) = Modifiers::parse_cv(cursor)?;
                dims.push(None);
                Self::array_element(cursor, backrefs, dims)?.with_cv(cv)
            }
            _ => TypeNode::parse(cursor, backrefs)?,
        };

        cursor.ascent();
        Ok(element)
    }

    fn class(cursor: &mut Cursor, backrefs: &mut Backrefs, kind: ClassKind) -> Result<Self> {
        Ok(TypeNode::Class {
            kind,
            name: Qualification::parse(cursor, backrefs)?,
            cv: Modifiers::empty(),
        })
    }
}

impl Parse for TypeNode {
    fn parse(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self> {
        cursor.descent()?;
        let start = cursor.offset;

        if cursor.starts_with(b"$") {
            let tipe = if cursor.eat_slice(b"$$T") {
                TypeNode::basic(BasicKind::Nullptr)
            } else if cursor.eat_slice(b"$$Q") {
                TypeNode::reference(cursor, backrefs, Modifiers::empty(), true)?
            } else if cursor.eat_slice(b"$$R") {
                TypeNode::reference(cursor, backrefs, Modifiers::VOLATILE, true)?
            } else if cursor.eat_slice(b"$$A6") {
                let func = FunctionType::parse_with(cursor, backrefs, false)?;
                TypeNode::Function(Box::new(func))
            } else if cursor.eat_slice(b"$$A8@@") {
                let func = FunctionType::parse_with(cursor, backrefs, true)?;
                TypeNode::Function(Box::new(func))
            } else if cursor.eat_slice(b"$$BY") {
                TypeNode::array(cursor, backrefs)?
            } else if cursor.eat_slice(b"$$C") {
                let (cv, _) = Modifiers::parse_cv(cursor)?;
                TypeNode::parse(cursor, backrefs)?.with_cv(cv)
            } else {
                cursor.offset += if cursor.starts_with(b"$$") { 3 } else { 2 };
                return Err(cursor.unsupported(start));
            };

            cursor.ascent();
            return Ok(tipe);
        }

        if cursor.eat(b'?') {
            let tipe = match cursor.peek() {
                Some(b'0'..=b'9') => TypeNode::TemplateParam(cursor.number()?),
                _ => {
                    let (cv, _) = Modifiers::parse_cv(cursor)?;
                    TypeNode::parse(cursor, backrefs)?.with_cv(cv)
                }
            };

            cursor.ascent();
            return Ok(tipe);
        }

        let tipe = match cursor.take()? {
            b'T' => TypeNode::class(cursor, backrefs, ClassKind::Union)?,
            b'U' => TypeNode::class(cursor, backrefs, ClassKind::Struct)?,
            b'V' => TypeNode::class(cursor, backrefs, ClassKind::Class)?,
            b'W' => {
                let code = cursor.take()?;
                let base = EnumBase::from_code(code)
                    .ok_or_else(|| cursor.error_at(start + 1, "enum underlying type"))?;

                TypeNode::Enum {
                    base,
                    name: Qualification::parse(cursor, backrefs)?,
                    cv: Modifiers::empty(),
                }
            }
            b'A' => TypeNode::reference(cursor, backrefs, Modifiers::empty(), false)?,
            b'B' => TypeNode::reference(cursor, backrefs, Modifiers::VOLATILE, false)?,
            b'P' => TypeNode::pointer(cursor, backrefs, Modifiers::empty())?,
            b'Q' => TypeNode::pointer(cursor, backrefs, Modifiers::CONST)?,
            b'R' => TypeNode::pointer(cursor, backrefs, Modifiers::VOLATILE)?,
            b'S' => TypeNode::pointer(cursor, backrefs, Modifiers::CONST | Modifiers::VOLATILE)?,
            b'Y' => TypeNode::array(cursor, backrefs)?,
            b'_' => match cursor.take()? {
                b'$' => TypeNode::W64(Box::new(TypeNode::parse(cursor, backrefs)?)),
                b'O' => TypeNode::unbounded_array(cursor, backrefs)?,
                b'X' => TypeNode::class(cursor, backrefs, ClassKind::Coclass)?,
                b'Y' => TypeNode::class(cursor, backrefs, ClassKind::Cointerface)?,
                code => BasicKind::from_extended_code(code)
                    .map(TypeNode::basic)
                    .ok_or_else(|| cursor.error_at(start + 1, "extended type"))?,
            },
            code => BasicKind::from_code(code)
                .map(TypeNode::basic)
                .ok_or_else(|| cursor.error_at(start, "type"))?,
        };

        cursor.ascent();
        Ok(tipe)
    }
}

impl FunctionType {
    /// Parses a function type, reading the `this` qualifiers first for member functions.
    pub(super) fn parse_with(
        cursor: &mut Cursor,
        backrefs: &mut Backrefs,
        has_this: bool,
    ) -> Result<Self> {
        let this_cv = match has_this {
            true => Modifiers::parse_this(cursor)?,
            false => Modifiers::empty(),
        };

        let calling_convention = CallingConv::parse(cursor, backrefs)?;
        let return_type = match cursor.eat(b'@') {
            true => None,
            false => Some(TypeNode::parse(cursor, backrefs)?),
        };

        let params = Params::parse(cursor, backrefs)?;

        let start = cursor.offset;
        let noexcept = if cursor.eat_slice(b"_E") {
            true
        } else if cursor.eat(b'Z') {
            false
        } else {
            return Err(cursor.error_at(start, "throw specification"));
        };

        Ok(FunctionType {
            calling_convention,
            return_type,
            params,
            this_cv,
            noexcept,
        })
    }
}

impl Parse for Params {
    fn parse(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self> {
        if cursor.eat(b'X') {
            return Ok(Params::default());
        }

        let mut types = Vec::new();

        while !cursor.starts_with(b"@") && !cursor.starts_with(b"Z") {
            let start = cursor.offset;

            if let Some(digit) = cursor.base10() {
                types.push(backrefs.get_memorized_param(digit, start)?);
                continue;
            }

            let tipe = TypeNode::parse(cursor, backrefs)?;

            // single-letter types are ignored for backref's because
            // memorizing them doesn't save anything.
            if cursor.offset - start > 1 {
                backrefs.memorize_param(&tipe);
            }

            types.push(tipe);
        }

        // a list of types is terminated by '@', or by 'Z' when variadic
        let variadic = cursor.take()? == b'Z';
        Ok(Params { types, variadic })
    }
}
