//! Operator and compiler generated names, the codes following a `?` in name position.

use super::context::{Backrefs, Cursor};
use super::{NameComponent, Parse, ParsedObject, TypeNode};
use crate::Result;

/// Either a well known operator of a class or some C++ internal operator implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Ctor,
    Dtor,
    New,
    NewArray,
    Delete,
    DeleteArray,
    ShiftLeft,
    ShiftLeftEquals,
    ShiftRight,
    ShiftRightEquals,
    Cast,
    Subscript,
    Arrow,
    Dereference,
    MemberDereference,
    Increment,
    Decrement,
    TimesEquals,
    Minus,
    MinusEquals,
    Plus,
    PlusEquals,
    Divide,
    DivideEquals,
    Modulus,
    ModulusEquals,
    Xor,
    XorEquals,
    BitwiseAnd,
    AndEquals,
    BitwiseOr,
    OrEquals,
    BitwiseNot,
    LogicalAnd,
    LogicalOr,
    LogicalNot,
    Assign,
    Equals,
    NotEquals,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Comma,
    Call,
    Spaceship,
    CoAwait,
    VFTable,
    VBTable,
    VCall,
    TypeOf,
    LocalStaticGuard,
    LocalStaticThreadGuard,
    StringLiteral,
    VBaseDtor,
    VectorDeletingDtor,
    DefaultCtorClosure,
    ScalarDeletingDtor,
    VecCtorIter,
    VecDtorIter,
    VecVbaseCtorIter,
    VdispMap,
    EhVecCtorIter,
    EhVecDtorIter,
    EhVecVbaseCtorIter,
    CopyCtorClosure,
    LocalVFTable,
    LocalVFTableCtorClosure,
    PlacementDeleteClosure,
    PlacementDeleteArrayClosure,
    ManagedVecCtorIter,
    ManagedVecDtorIter,
    EhVecCopyCtorIter,
    EhVecVbaseCopyCtorIter,
    VecCopyCtorIter,
    VecVbaseCopyCtorIter,
    ManagedVecVbaseCopyCtorIter,
    /// Either an embedded symbol or a plain name.
    DynamicInitializer(Box<NameComponent>),
    DynamicAtexitDestructor(Box<NameComponent>),
    /// ```text
    /// operator "" <suffix>
    /// ```
    LiteralOperator(String),
    RttiTypeDescriptor(Box<TypeNode>),
    RttiBaseClassDescriptor {
        nv_offset: i64,
        ptr_offset: i64,
        vbtable_offset: i64,
        flags: i64,
    },
    RttiBaseClassArray,
    RttiClassHierarchyDescriptor,
    RttiCompleteObjectLocator,
}

impl Operator {
    /// Text of operators without a payload. Empty for the ones rendered from their payload
    /// or surroundings.
    pub fn literal(&self) -> &'static str {
        match self {
            Operator::Cast => "operator cast",
            Operator::New => "operator new",
            Operator::NewArray => "operator new[]",
            Operator::Delete => "operator delete",
            Operator::DeleteArray => "operator delete[]",
            Operator::Assign => "operator=",
            Operator::ShiftRight => "operator>>",
            Operator::ShiftRightEquals => "operator>>=",
            Operator::ShiftLeft => "operator<<",
            Operator::ShiftLeftEquals => "operator<<=",
            Operator::LogicalNot => "operator!",
            Operator::Equals => "operator==",
            Operator::NotEquals => "operator!=",
            Operator::Subscript => "operator[]",
            Operator::Arrow => "operator->",
            Operator::Dereference => "operator*",
            Operator::TimesEquals => "operator*=",
            Operator::MemberDereference => "operator->*",
            Operator::Increment => "operator++",
            Operator::Decrement => "operator--",
            Operator::Minus => "operator-",
            Operator::MinusEquals => "operator-=",
            Operator::Plus => "operator+",
            Operator::PlusEquals => "operator+=",
            Operator::BitwiseAnd => "operator&",
            Operator::AndEquals => "operator&=",
            Operator::LogicalAnd => "operator&&",
            Operator::BitwiseOr => "operator|",
            Operator::OrEquals => "operator|=",
            Operator::LogicalOr => "operator||",
            Operator::Divide => "operator/",
            Operator::DivideEquals => "operator/=",
            Operator::Modulus => "operator%",
            Operator::ModulusEquals => "operator%=",
            Operator::Less => "operator<",
            Operator::LessEqual => "operator<=",
            Operator::Greater => "operator>",
            Operator::GreaterEqual => "operator>=",
            Operator::Comma => "operator,",
            Operator::Call => "operator()",
            Operator::BitwiseNot => "operator~",
            Operator::Xor => "operator^",
            Operator::XorEquals => "operator^=",
            Operator::Spaceship => "operator<=>",
            Operator::CoAwait => "operator co_await",
            Operator::VFTable => "`vftable'",
            Operator::VBTable => "`vbtable'",
            Operator::LocalVFTable => "`local vftable'",
            Operator::VCall => "`vcall'",
            Operator::TypeOf => "`typeof'",
            Operator::LocalStaticGuard => "`local static guard'",
            Operator::LocalStaticThreadGuard => "`local static thread guard'",
            Operator::StringLiteral => "`string'",
            Operator::VBaseDtor => "`vbase destructor'",
            Operator::VectorDeletingDtor => "`vector deleting destructor'",
            Operator::DefaultCtorClosure => "`default constructor closure'",
            Operator::ScalarDeletingDtor => "`scalar deleting destructor'",
            Operator::VecCtorIter => "`vector constructor iterator'",
            Operator::VecDtorIter => "`vector destructor iterator'",
            Operator::VecVbaseCtorIter => "`vector vbase constructor iterator'",
            Operator::VdispMap => "`virtual displacement map'",
            Operator::EhVecCtorIter => "`eh vector constructor iterator'",
            Operator::EhVecDtorIter => "`eh vector destructor iterator'",
            Operator::EhVecVbaseCtorIter => "`eh vector vbase constructor iterator'",
            Operator::CopyCtorClosure => "`copy constructor closure'",
            Operator::LocalVFTableCtorClosure => "`local vftable constructor closure'",
            Operator::PlacementDeleteClosure => "`placement delete closure'",
            Operator::PlacementDeleteArrayClosure => "`placement delete[] closure'",
            Operator::ManagedVecCtorIter => "`managed vector constructor iterator'",
            Operator::ManagedVecDtorIter => "`managed vector destructor iterator'",
            Operator::EhVecCopyCtorIter => "`eh vector copy constructor iterator'",
            Operator::EhVecVbaseCopyCtorIter => "`eh vector vbase copy constructor iterator'",
            Operator::VecCopyCtorIter => "`vector copy constructor iterator'",
            Operator::VecVbaseCopyCtorIter => "`vector vbase copy constructor iterator'",
            Operator::ManagedVecVbaseCopyCtorIter => {
                "`managed vector vbase copy constructor iterator'"
            }
            Operator::RttiBaseClassArray => "`RTTI Base Class Array'",
            Operator::RttiClassHierarchyDescriptor => "`RTTI Class Hierarchy Descriptor'",
            Operator::RttiCompleteObjectLocator => "`RTTI Complete Object Locator'",
            Operator::Ctor
            | Operator::Dtor
            | Operator::DynamicInitializer(_)
            | Operator::DynamicAtexitDestructor(_)
            | Operator::LiteralOperator(_)
            | Operator::RttiTypeDescriptor(_)
            | Operator::RttiBaseClassDescriptor { .. } => "",
        }
    }

    /// Target of a dynamic initializer or atexit destructor.
    ///
    /// ```text
    /// <target> = <symbol> [@]
    ///          | <source-name>
    /// ```
    fn parse_target(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Box<NameComponent>> {
        if cursor.peek() == Some(b'?') {
            let object = ParsedObject::parse_embedded(cursor, backrefs)?;

            // consume optional suffix
            cursor.eat(b'@');
            return Ok(Box::new(NameComponent::Nested(Box::new(object))));
        }

        let name = NameComponent::Identifier(cursor.ident()?);
        backrefs.memorize_name(&name);
        Ok(Box::new(name))
    }
}

impl Parse for Operator {
    fn parse(cursor: &mut Cursor, backrefs: &mut Backrefs) -> Result<Self> {
        let start = cursor.offset;
        let op = match cursor.take()? {
            b'0' => Operator::Ctor,
            b'1' => Operator::Dtor,
            b'2' => Operator::New,
            b'3' => Operator::Delete,
            b'4' => Operator::Assign,
            b'5' => Operator::ShiftRight,
            b'6' => Operator::ShiftLeft,
            b'7' => Operator::LogicalNot,
            b'8' => Operator::Equals,
            b'9' => Operator::NotEquals,
            b'A' => Operator::Subscript,
            b'B' => Operator::Cast,
            b'C' => Operator::Arrow,
            b'D' => Operator::Dereference,
            b'E' => Operator::Increment,
            b'F' => Operator::Decrement,
            b'G' => Operator::Minus,
            b'H' => Operator::Plus,
            b'I' => Operator::BitwiseAnd,
            b'J' => Operator::MemberDereference,
            b'K' => Operator::Divide,
            b'L' => Operator::Modulus,
            b'M' => Operator::Less,
            b'N' => Operator::LessEqual,
            b'O' => Operator::Greater,
            b'P' => Operator::GreaterEqual,
            b'Q' => Operator::Comma,
            b'R' => Operator::Call,
            b'S' => Operator::BitwiseNot,
            b'T' => Operator::Xor,
            b'U' => Operator::BitwiseOr,
            b'V' => Operator::LogicalAnd,
            b'W' => Operator::LogicalOr,
            b'X' => Operator::TimesEquals,
            b'Y' => Operator::PlusEquals,
            b'Z' => Operator::MinusEquals,
            b'_' => match cursor.take()? {
                b'0' => Operator::DivideEquals,
                b'1' => Operator::ModulusEquals,
                b'2' => Operator::ShiftRightEquals,
                b'3' => Operator::ShiftLeftEquals,
                b'4' => Operator::AndEquals,
                b'5' => Operator::OrEquals,
                b'6' => Operator::XorEquals,
                b'7' => Operator::VFTable,
                b'8' => Operator::VBTable,
                b'9' => Operator::VCall,
                b'A' => Operator::TypeOf,
                b'B' => Operator::LocalStaticGuard,
                b'C' => Operator::StringLiteral,
                b'D' => Operator::VBaseDtor,
                b'E' => Operator::VectorDeletingDtor,
                b'F' => Operator::DefaultCtorClosure,
                b'G' => Operator::ScalarDeletingDtor,
                b'H' => Operator::VecCtorIter,
                b'I' => Operator::VecDtorIter,
                b'J' => Operator::VecVbaseCtorIter,
                b'K' => Operator::VdispMap,
                b'L' => Operator::EhVecCtorIter,
                b'M' => Operator::EhVecDtorIter,
                b'N' => Operator::EhVecVbaseCtorIter,
                b'O' => Operator::CopyCtorClosure,
                b'R' => match cursor.take()? {
                    b'0' => {
                        let tipe = TypeNode::parse(cursor, backrefs)?;
                        Operator::RttiTypeDescriptor(Box::new(tipe))
                    }
                    b'1' => Operator::RttiBaseClassDescriptor {
                        nv_offset: cursor.number()?,
                        ptr_offset: cursor.number()?,
                        vbtable_offset: cursor.number()?,
                        flags: cursor.number()?,
                    },
                    b'2' => Operator::RttiBaseClassArray,
                    b'3' => Operator::RttiClassHierarchyDescriptor,
                    b'4' => Operator::RttiCompleteObjectLocator,
                    _ => return Err(cursor.unsupported(start)),
                },
                b'S' => Operator::LocalVFTable,
                b'T' => Operator::LocalVFTableCtorClosure,
                b'U' => Operator::NewArray,
                b'V' => Operator::DeleteArray,
                b'X' => Operator::PlacementDeleteClosure,
                b'Y' => Operator::PlacementDeleteArrayClosure,
                b'_' => match cursor.take()? {
                    b'A' => Operator::ManagedVecCtorIter,
                    b'B' => Operator::ManagedVecDtorIter,
                    b'C' => Operator::EhVecCopyCtorIter,
                    b'D' => Operator::EhVecVbaseCopyCtorIter,
                    b'E' => {
                        Operator::DynamicInitializer(Operator::parse_target(cursor, backrefs)?)
                    }
                    b'F' => {
                        Operator::DynamicAtexitDestructor(Operator::parse_target(cursor, backrefs)?)
                    }
                    b'G' => Operator::VecCopyCtorIter,
                    b'H' => Operator::VecVbaseCopyCtorIter,
                    b'I' => Operator::ManagedVecVbaseCopyCtorIter,
                    b'J' => Operator::LocalStaticThreadGuard,
                    b'K' => Operator::LiteralOperator(cursor.ident()?),
                    b'L' => Operator::CoAwait,
                    b'M' => Operator::Spaceship,
                    _ => return Err(cursor.unsupported(start)),
                },
                _ => return Err(cursor.unsupported(start)),
            },
            _ => return Err(cursor.unsupported(start)),
        };

        Ok(op)
    }
}
