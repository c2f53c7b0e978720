use std::fmt;

use tokenizing::{Color, ColorScheme, Colors};

use super::symbol::{FunctionSymbol, ObjectKind, SpecialName, StorageClass, StorageScope, Thunk};
use super::types::{ClassKind, EnumBase, Modifiers, Params};
use super::{
    CallingConv, FunctionType, NameComponent, Operator, ParsedObject, Qualification, Template,
    TemplateArg, TypeNode,
};
use crate::TokenStream;

/// Converts an trivially printable node to a string.
pub(super) trait Demangle {
    fn demangle(&self, p: &mut Printer);
}

/// Converts an node to a string.
///
/// Converting an node representing a C++ type to a string is tricky due
/// to the bad grammar of the C++ declaration inherited from C. You have
/// to construct a string from inside to outside. For example, if a type
/// X is a pointer to a function returning int, the order you create a
/// string becomes something like this:
///
///   (1) X is a pointer: *X
///   (2) (1) is a function returning int: int (*X)()
///
/// So you cannot construct a result just by appending strings to a result.
///
/// To deal with this, we split the function into two. demangle_pre() writes
/// the "first half" of type declaration, and demangle_post() writes the
/// "second half". For example, demangle_pre() writes a return type for a
/// function and demangle_post() writes an parameter list.
pub(super) trait PositionalDemangle {
    fn demangle_pre(&self, p: &mut Printer);
    fn demangle_post(&self, p: &mut Printer);
}

/// Output of a single rendering pass.
#[derive(Default)]
pub(super) struct Printer {
    pub stream: TokenStream,
}

impl Printer {
    pub fn new() -> Self {
        Self {
            stream: TokenStream::new(),
        }
    }

    /// Separates the next word from the previous one, unless the previous
    /// character already binds to whatever comes next.
    pub fn space(&mut self) {
        match self.stream.last_char() {
            None | Some(' ' | '(' | '*' | '&' | '<') => {}
            Some(_) => self.stream.push(" ", Colors::spacing()),
        }
    }

    /// Separates the next word unless a word boundary was just written.
    pub fn separate(&mut self) {
        match self.stream.last_char() {
            None | Some(' ' | '(') => {}
            Some(_) => self.stream.push(" ", Colors::spacing()),
        }
    }

    #[inline]
    pub fn push(&mut self, text: &'static str, color: &'static Color) {
        self.stream.push(text, color)
    }

    #[inline]
    pub fn push_string(&mut self, text: String, color: &'static Color) {
        self.stream.push_string(text, color)
    }

    pub fn finish(self) -> TokenStream {
        self.stream
    }
}

/// Renders a node into a fresh token stream.
pub(super) fn tokens<T: Demangle + ?Sized>(node: &T) -> TokenStream {
    let mut p = Printer::new();
    node.demangle(&mut p);
    p.finish()
}

impl Demangle for Modifiers {
    fn demangle(&self, p: &mut Printer) {
        let color = Colors::qualifier();

        if self.contains(Modifiers::CONST) {
            p.space();
            p.push("const", color);
        }

        if self.contains(Modifiers::VOLATILE) {
            p.space();
            p.push("volatile", color);
        }

        if self.contains(Modifiers::UNALIGNED) {
            p.space();
            p.push("__unaligned", color);
        }

        if self.contains(Modifiers::RESTRICT) {
            p.space();
            p.push("__restrict", color);
        }
    }
}

/// Qualifiers of the implicit `this` of a member function.
fn demangle_this(quali: Modifiers, p: &mut Printer) {
    let color = Colors::qualifier();

    if quali.contains(Modifiers::CONST) {
        p.push(" const", color);
    }

    if quali.contains(Modifiers::VOLATILE) {
        p.push(" volatile", color);
    }

    if quali.contains(Modifiers::UNALIGNED) {
        p.push(" __unaligned", color);
    }

    if quali.contains(Modifiers::RESTRICT) {
        p.push(" __restrict", color);
    }

    if quali.contains(Modifiers::LVALUE) {
        p.push(" &", color);
    }

    if quali.contains(Modifiers::RVALUE) {
        p.push(" &&", color);
    }
}

impl CallingConv {
    pub fn literal(self) -> &'static str {
        match self {
            CallingConv::Cdecl => "__cdecl",
            CallingConv::Pascal => "__pascal",
            CallingConv::Thiscall => "__thiscall",
            CallingConv::Stdcall => "__stdcall",
            CallingConv::Fastcall => "__fastcall",
            CallingConv::Clrcall => "__clrcall",
            CallingConv::Eabi => "__eabi",
            CallingConv::Vectorcall => "__vectorcall",
            CallingConv::Swift1 => "__swift_1",
            CallingConv::Swift2 => "__swift_2",
            CallingConv::Swift3 => "__swift_3",
            CallingConv::Regcall => "__regcall",
            CallingConv::Anonymous => "",
        }
    }
}

impl Demangle for CallingConv {
    fn demangle(&self, p: &mut Printer) {
        let literal = self.literal();
        if literal.is_empty() {
            return;
        }

        p.separate();
        p.push(literal, Colors::storage());
    }
}

impl Demangle for StorageClass {
    fn demangle(&self, p: &mut Printer) {
        let literal = match self {
            StorageClass::PrivateStatic => "private: static ",
            StorageClass::ProtectedStatic => "protected: static ",
            StorageClass::PublicStatic => "public: static ",
            StorageClass::Global | StorageClass::FunctionLocalStatic => return,
        };

        p.push(literal, Colors::storage());
    }
}

impl Demangle for StorageScope {
    fn demangle(&self, p: &mut Printer) {
        let color = Colors::storage();

        if self.contains(StorageScope::PUBLIC) {
            p.push("public: ", color);
        }

        if self.contains(StorageScope::PRIVATE) {
            p.push("private: ", color);
        }

        if self.contains(StorageScope::PROTECTED) {
            p.push("protected: ", color);
        }

        if self.contains(StorageScope::STATIC) {
            p.push("static ", color);
        }

        if self.contains(StorageScope::VIRTUAL) {
            p.push("virtual ", color);
        }
    }
}

impl EnumBase {
    /// Underlying type as written, `int` is implied.
    fn literal(self) -> Option<&'static str> {
        Some(match self {
            EnumBase::Char => "char",
            EnumBase::UnsignedChar => "unsigned char",
            EnumBase::Short => "short",
            EnumBase::UnsignedShort => "unsigned short",
            EnumBase::Int => return None,
            EnumBase::UnsignedInt => "unsigned int",
            EnumBase::Long => "long",
            EnumBase::UnsignedLong => "unsigned long",
        })
    }
}

impl ClassKind {
    fn literal(self) -> &'static str {
        match self {
            ClassKind::Class => "class ",
            ClassKind::Struct => "struct ",
            ClassKind::Union => "union ",
            ClassKind::Coclass => "coclass ",
            ClassKind::Cointerface => "cointerface ",
        }
    }
}

impl Demangle for TypeNode {
    fn demangle(&self, p: &mut Printer) {
        self.demangle_pre(p);
        self.demangle_post(p);
    }
}

impl PositionalDemangle for TypeNode {
    fn demangle_pre(&self, p: &mut Printer) {
        match self {
            TypeNode::Basic { kind, cv } => {
                p.push(kind.literal(), Colors::keyword());
                cv.demangle(p);
            }
            TypeNode::Class { kind, name, cv } => {
                p.push(kind.literal(), Colors::keyword());
                name.demangle(p);
                cv.demangle(p);
            }
            TypeNode::Enum { base, name, cv } => {
                p.push("enum ", Colors::keyword());
                if let Some(base) = base.literal() {
                    p.push(base, Colors::keyword());
                    p.push(" ", Colors::spacing());
                }

                name.demangle(p);
                cv.demangle(p);
            }
            TypeNode::Pointer(ptr) => {
                demangle_pointee_pre(&ptr.pointee, p);

                if let Some(class) = &ptr.class {
                    class.demangle(p);
                    p.push("::", Colors::separator());
                }

                p.push("*", Colors::generated());
                ptr.cv.demangle(p);
            }
            TypeNode::Reference(reference) => {
                demangle_pointee_pre(&reference.referent, p);

                match reference.rvalue {
                    true => p.push("&&", Colors::generated()),
                    false => p.push("&", Colors::generated()),
                }

                reference.cv.demangle(p);
            }
            TypeNode::Array(array) => array.element.demangle_pre(p),
            TypeNode::Function(func) => {
                if let Some(ret) = &func.return_type {
                    ret.demangle_pre(p);
                }

                func.calling_convention.demangle(p);
            }
            TypeNode::TemplateParam(idx) => demangle_template_param(*idx, p),
            TypeNode::W64(inner) => {
                p.push("__w64 ", Colors::keyword());
                inner.demangle_pre(p);
            }
        }
    }

    fn demangle_post(&self, p: &mut Printer) {
        match self {
            TypeNode::Pointer(ptr) => demangle_pointee_post(&ptr.pointee, p),
            TypeNode::Reference(reference) => demangle_pointee_post(&reference.referent, p),
            TypeNode::Array(array) => {
                for len in array.dims.iter() {
                    p.push("[", Colors::brackets());
                    if let Some(len) = len {
                        p.push_string(len.to_string(), Colors::qualifier());
                    }
                    p.push("]", Colors::brackets());
                }

                array.element.demangle_post(p);
            }
            TypeNode::Function(func) => func.demangle_post(p),
            TypeNode::W64(inner) => inner.demangle_post(p),
            TypeNode::Basic { .. }
            | TypeNode::Class { .. }
            | TypeNode::Enum { .. }
            | TypeNode::TemplateParam(_) => {}
        }
    }
}

/// First half of whatever a pointer or reference points at, up to the `*` or `&`.
fn demangle_pointee_pre(pointee: &TypeNode, p: &mut Printer) {
    // "[]" and "()" (for function parameters) take precedence over "*",
    // so "int *x(int)" means "x is a function returning int *". We need
    // parentheses to supercede the default precedence. (e.g. we want to
    // emit something like "int (*x)(int)".)
    match pointee {
        TypeNode::Function(func) => {
            if let Some(ret) = &func.return_type {
                ret.demangle_pre(p);
            }

            p.space();
            p.push("(", Colors::brackets());

            let literal = func.calling_convention.literal();
            if !literal.is_empty() {
                p.push(literal, Colors::storage());
                p.push(" ", Colors::spacing());
            }
        }
        TypeNode::Array(..) => {
            pointee.demangle_pre(p);
            p.space();
            p.push("(", Colors::brackets());
        }
        _ => {
            pointee.demangle_pre(p);
            p.space();
        }
    }
}

fn demangle_pointee_post(pointee: &TypeNode, p: &mut Printer) {
    match pointee {
        TypeNode::Function(func) => {
            p.push(")", Colors::brackets());
            func.demangle_post(p);
        }
        TypeNode::Array(..) => {
            p.push(")", Colors::brackets());
            pointee.demangle_post(p);
        }
        _ => pointee.demangle_post(p),
    }
}

fn demangle_template_param(idx: i64, p: &mut Printer) {
    p.push("`", Colors::brackets());
    p.push("template-parameter", Colors::keyword());
    p.push("-", Colors::separator());
    p.push_string(idx.to_string(), Colors::identifier());
    p.push("'", Colors::brackets());
}

impl FunctionType {
    /// Parameter list, qualifiers and whatever trails the return type.
    fn demangle_post(&self, p: &mut Printer) {
        self.params.demangle(p);
        demangle_this(self.this_cv, p);

        if self.noexcept {
            p.push(" noexcept", Colors::qualifier());
        }

        if let Some(ret) = &self.return_type {
            ret.demangle_post(p);
        }
    }
}

impl Demangle for Params {
    fn demangle(&self, p: &mut Printer) {
        p.push("(", Colors::brackets());

        for (idx, tipe) in self.types.iter().enumerate() {
            if idx != 0 {
                p.push(", ", Colors::separator());
            }

            tipe.demangle(p);
        }

        match (self.types.is_empty(), self.variadic) {
            (true, false) => p.push("void", Colors::keyword()),
            (true, true) => p.push("...", Colors::identifier()),
            (false, true) => p.push(", ...", Colors::identifier()),
            (false, false) => {}
        }

        p.push(")", Colors::brackets());
    }
}

impl Demangle for TemplateArg {
    fn demangle(&self, p: &mut Printer) {
        match self {
            TemplateArg::Type(tipe) => tipe.demangle(p),
            TemplateArg::Integer(val) => p.push_string(val.to_string(), Colors::identifier()),
            TemplateArg::Address(object) => {
                p.push("&", Colors::generated());
                object.qualification.demangle(p);
            }
            TemplateArg::Reference(object) => object.qualification.demangle(p),
            TemplateArg::Param(idx) => demangle_template_param(*idx, p),
            TemplateArg::EmptyPack => {}
        }
    }
}

impl Template {
    fn demangle_args(&self, p: &mut Printer) {
        p.push("<", Colors::qualifier());

        let args = self.args.iter().filter(|arg| **arg != TemplateArg::EmptyPack);
        for (idx, arg) in args.enumerate() {
            if idx != 0 {
                p.push(", ", Colors::separator());
            }

            arg.demangle(p);
        }

        // "> >" so the closing brackets aren't read as a shift
        if p.stream.last_char() == Some('>') {
            p.push(" ", Colors::spacing());
        }

        p.push(">", Colors::qualifier());
    }
}

impl NameComponent {
    /// Renders a component, `parent` is the scope directly enclosing it.
    fn demangle_in(&self, parent: Option<&NameComponent>, p: &mut Printer) {
        match self {
            NameComponent::Identifier(ident) => p.push_string(ident.clone(), Colors::identifier()),
            NameComponent::Template(template) => {
                template.name.demangle_in(parent, p);
                template.demangle_args(p);
            }
            NameComponent::Operator(op) => op.demangle_in(parent, p),
            NameComponent::AnonymousScope(ordinal) => {
                p.push("`", Colors::brackets());
                p.push_string(ordinal.to_string(), Colors::identifier());
                p.push("'", Colors::brackets());
            }
            NameComponent::AnonymousNamespace(_) => {
                p.push("`anonymous namespace'", Colors::generated());
            }
            NameComponent::Nested(object) => {
                p.push("`", Colors::brackets());
                object.demangle(p);
                p.push("'", Colors::brackets());
            }
            NameComponent::Md5(hash) => {
                p.push("??@", Colors::brackets());
                p.push_string(hash.clone(), Colors::identifier());
                p.push("@", Colors::brackets());
            }
        }
    }
}

impl Demangle for NameComponent {
    fn demangle(&self, p: &mut Printer) {
        self.demangle_in(None, p);
    }
}

impl Operator {
    fn demangle_in(&self, parent: Option<&NameComponent>, p: &mut Printer) {
        match self {
            Operator::Ctor | Operator::Dtor => {
                if let Operator::Dtor = self {
                    p.push("~", Colors::identifier());
                }

                match parent {
                    Some(class) => class.demangle(p),
                    None => p.push("`structor'", Colors::generated()),
                }
            }
            Operator::DynamicInitializer(target) => {
                p.push("`dynamic initializer for '", Colors::generated());
                demangle_target(target, p);
                p.push("''", Colors::generated());
            }
            Operator::DynamicAtexitDestructor(target) => {
                p.push("`dynamic atexit destructor for '", Colors::generated());
                demangle_target(target, p);
                p.push("''", Colors::generated());
            }
            Operator::LiteralOperator(suffix) => {
                p.push("operator \"\" ", Colors::keyword());
                p.push_string(suffix.clone(), Colors::identifier());
            }
            Operator::RttiTypeDescriptor(tipe) => {
                tipe.demangle(p);
                p.push(" ", Colors::spacing());
                p.push("`RTTI Type Descriptor'", Colors::generated());
            }
            Operator::RttiBaseClassDescriptor {
                nv_offset,
                ptr_offset,
                vbtable_offset,
                flags,
            } => {
                p.push("`RTTI Base Class Descriptor at (", Colors::generated());
                p.push_string(
                    format!("{nv_offset}, {ptr_offset}, {vbtable_offset}, {flags}"),
                    Colors::identifier(),
                );
                p.push(")'", Colors::generated());
            }
            op => {
                let color = match op.literal().starts_with('`') {
                    true => Colors::generated(),
                    false => Colors::keyword(),
                };

                p.push(op.literal(), color);
            }
        }
    }
}

/// Subject of a dynamic initializer, a symbol is rendered in full.
fn demangle_target(target: &NameComponent, p: &mut Printer) {
    match target {
        NameComponent::Nested(object) => object.demangle(p),
        component => component.demangle(p),
    }
}

impl Qualification {
    /// Renders the scopes outer to inner, a cast operator as the name is written
    /// as `operator <target>`.
    fn demangle_with(&self, cast_target: Option<&TypeNode>, p: &mut Printer) {
        let components = &self.0;

        for (idx, component) in components.iter().enumerate().rev() {
            let parent = components.get(idx + 1);

            match (idx, cast_target) {
                (0, Some(target)) if component.is_cast() => {
                    p.push("operator", Colors::keyword());
                    if let NameComponent::Template(template) = component {
                        template.demangle_args(p);
                    }

                    p.push(" ", Colors::spacing());
                    target.demangle(p);
                }
                _ => component.demangle_in(parent, p),
            }

            if idx != 0 {
                p.push("::", Colors::separator());
            }
        }
    }
}

impl Demangle for Qualification {
    fn demangle(&self, p: &mut Printer) {
        self.demangle_with(None, p);
    }
}

impl Demangle for Thunk {
    fn demangle(&self, p: &mut Printer) {
        let text = match self {
            Thunk::Adjustor { offset } => format!("`adjustor{{{offset}}}'"),
            Thunk::VtorDisp { vtordisp, offset } => format!("`vtordisp{{{vtordisp}, {offset}}}'"),
            Thunk::VtorDispEx {
                vbptr,
                vboffset,
                vtordisp,
                offset,
            } => format!("`vtordispex{{{vbptr}, {vboffset}, {vtordisp}, {offset}}}'"),
            Thunk::VCall { offset, .. } => format!("{{{offset}, {{flat}}}}"),
        };

        p.push_string(text, Colors::generated());
    }
}

impl ParsedObject {
    fn demangle_function(&self, func: &FunctionSymbol, p: &mut Printer) {
        if func.thunk.is_some() {
            p.push("[thunk]: ", Colors::generated());
        }

        func.scope.demangle(p);

        let tipe = match &self.ty {
            Some(TypeNode::Function(tipe)) => tipe,
            // vcall thunks only carry a calling convention
            _ => {
                if let Some(Thunk::VCall {
                    calling_convention, ..
                }) = &func.thunk
                {
                    calling_convention.demangle(p);
                }

                p.space();
                self.qualification.demangle(p);

                if let Some(thunk) = &func.thunk {
                    thunk.demangle(p);
                }

                return;
            }
        };

        let is_cast = self.name().map_or(false, NameComponent::is_cast);
        let cast_target = tipe.return_type.as_ref().filter(|_| is_cast);

        if cast_target.is_none() {
            if let Some(ret) = &tipe.return_type {
                ret.demangle_pre(p);
            }
        }

        tipe.calling_convention.demangle(p);
        p.space();
        self.qualification.demangle_with(cast_target, p);

        if let Some(thunk) = &func.thunk {
            thunk.demangle(p);
        }

        tipe.params.demangle(p);
        demangle_this(tipe.this_cv, p);

        if tipe.noexcept {
            p.push(" noexcept", Colors::qualifier());
        }

        if cast_target.is_none() {
            if let Some(ret) = &tipe.return_type {
                ret.demangle_post(p);
            }
        }
    }

    fn demangle_special(&self, special: &SpecialName, p: &mut Printer) {
        match special {
            SpecialName::VFTable { cv, chain } | SpecialName::VBTable { cv, chain } => {
                if cv.contains(Modifiers::CONST) {
                    p.push("const ", Colors::qualifier());
                }

                if cv.contains(Modifiers::VOLATILE) {
                    p.push("volatile ", Colors::qualifier());
                }

                self.qualification.demangle(p);

                if chain.is_empty() {
                    return;
                }

                p.push("{for ", Colors::brackets());
                for (idx, base) in chain.iter().enumerate() {
                    if idx != 0 {
                        p.push("s ", Colors::brackets());
                    }

                    p.push("`", Colors::brackets());
                    base.demangle(p);
                    p.push("'", Colors::brackets());
                }
                p.push("}", Colors::brackets());
            }
            SpecialName::LocalStaticGuard { index } => {
                self.qualification.demangle(p);

                if let Some(index) = index {
                    p.push("{", Colors::brackets());
                    p.push_string(index.to_string(), Colors::identifier());
                    p.push("}", Colors::brackets());
                }
            }
            SpecialName::RttiDescriptor => self.qualification.demangle(p),
        }
    }
}

impl Demangle for ParsedObject {
    fn demangle(&self, p: &mut Printer) {
        if self.extern_c {
            p.push("extern ", Colors::generated());
            p.push("\"", Colors::brackets());
            p.push("C", Colors::identifier());
            p.push("\" ", Colors::brackets());
        }

        match &self.kind {
            ObjectKind::Function(func) => self.demangle_function(func, p),
            ObjectKind::Data(storage) => {
                storage.demangle(p);

                match &self.ty {
                    Some(tipe) => {
                        tipe.demangle_pre(p);
                        p.space();
                        self.qualification.demangle(p);
                        tipe.demangle_post(p);
                    }
                    None => self.qualification.demangle(p),
                }
            }
            ObjectKind::Special(special) => self.demangle_special(special, p),
            ObjectKind::Untyped => self.qualification.demangle(p),
        }
    }
}

impl ParsedObject {
    /// Colored rendering of the symbol.
    pub fn to_tokens(&self) -> TokenStream {
        tokens(self)
    }
}

impl TypeNode {
    /// Colored rendering of the type.
    pub fn to_tokens(&self) -> TokenStream {
        tokens(self)
    }
}

impl Qualification {
    pub fn to_tokens(&self) -> TokenStream {
        tokens(self)
    }
}

impl NameComponent {
    pub fn to_tokens(&self) -> TokenStream {
        tokens(self)
    }
}

macro_rules! display_via_tokens {
    ($($node:ty),*) => {
        $(
            impl fmt::Display for $node {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(&self.to_tokens(), f)
                }
            }
        )*
    };
}

display_via_tokens!(ParsedObject, TypeNode, Qualification, NameComponent);
