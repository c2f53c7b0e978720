#![cfg(test)]

use super::context::{Backrefs, Cursor};
use super::*;
use crate::{Error, ErrorKind};

macro_rules! eq {
    ($mangled:literal => $demangled:literal) => {
        let symbol = parse($mangled)
            .unwrap_or_else(|err| panic!("Formatting '{}' failed: {}.", $mangled, err));

        assert_eq!(
            String::from_iter(symbol.tokens().iter().map(|t| &t.text[..])),
            $demangled
        )
    };
}

fn error_of(mangled: &str) -> Error {
    match demangle(mangled, Options::default()) {
        Ok(object) => panic!("'{mangled}' unexpectedly demangled to '{object}'"),
        Err(err) => err,
    }
}

fn basic(kind: BasicKind) -> TypeNode {
    TypeNode::Basic {
        kind,
        cv: Modifiers::empty(),
    }
}

#[test]
fn simple() {
    let mut cursor = Cursor::new("?x@@YAXMH@Z", Grammar::Primary, false);
    let mut backrefs = Backrefs::new();
    let tree = ParsedObject::parse(&mut cursor, &mut backrefs).unwrap();

    assert_eq!(
        tree,
        ParsedObject {
            qualification: Qualification(vec![NameComponent::Identifier("x".to_string())]),
            kind: ObjectKind::Function(FunctionSymbol {
                scope: StorageScope::GLOBAL,
                thunk: None,
            }),
            ty: Some(TypeNode::Function(Box::new(FunctionType {
                calling_convention: CallingConv::Cdecl,
                return_type: Some(basic(BasicKind::Void)),
                params: Params {
                    types: vec![basic(BasicKind::Float), basic(BasicKind::Int)],
                    variadic: false,
                },
                this_cv: Modifiers::empty(),
                noexcept: false,
            }))),
            extern_c: false,
            retained_mangled: None,
        }
    );

    eq!("?x@@YAXMH@Z" => "void __cdecl x(float, int)");
}

#[test]
fn constructor() {
    eq!("??0klass@@QEAA@XZ" => "public: __cdecl klass::klass(void)");
}

#[test]
fn destructor() {
    eq!("??1klass@@QEAA@XZ" => "public: __cdecl klass::~klass(void)");
}

#[test]
fn templated_constructor() {
    eq!("??0?$name0@$$CBUname1@@@name2@@QEAA@XZ" =>
        "public: __cdecl name2::name0<struct name1 const>::name0<struct name1 const>(void)");
}

#[test]
fn function_local_static() {
    eq!("?fn3@?2??Bar3@Foo2b@@SAHXZ@4HA" =>
        "int `public: static int __cdecl Foo2b::Bar3(void)'::`3'::fn3");
}

#[test]
fn function_local_static_retains_enclosing_symbol() {
    let object = demangle("?fn3@?2??Bar3@Foo2b@@SAHXZ@4HA", Options::default()).unwrap();

    assert_eq!(object.scope().len(), 2);
    assert_eq!(object.scope()[0], NameComponent::AnonymousScope(3));
    assert_eq!(object.function_namespace(), Some("?Bar3@Foo2b@@SAHXZ"));

    let enclosing = demangle("?Bar3@Foo2b@@SAHXZ", Options::default()).unwrap();
    assert_eq!(
        enclosing.to_string(),
        "public: static int __cdecl Foo2b::Bar3(void)"
    );

    match &object.scope()[1] {
        NameComponent::Nested(nested) => {
            assert_eq!(nested.retained_mangled.as_deref(), Some("?Bar3@Foo2b@@SAHXZ"));
            assert_eq!(nested.qualification, enclosing.qualification);
            assert_eq!(nested.ty, enclosing.ty);
        }
        other => panic!("expected an enclosing function, found {other:?}"),
    }
}

#[test]
fn vftable_for_bases() {
    eq!("??_7a@b@@6Bc@d@e@@f@g@h@@i@j@k@@@" =>
        "const b::a::`vftable'{for `e::d::c's `h::g::f's `k::j::i'}");

    let object = demangle("??_7a@b@@6Bc@d@e@@f@g@h@@i@j@k@@@", Options::default()).unwrap();
    let chain: Vec<String> = object
        .vtable_chain()
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();

    assert_eq!(chain, ["e::d::c", "h::g::f", "k::j::i"]);
}

#[test]
fn vftable() {
    eq!("??_7name0@name1@@6B@" => "const name1::name0::`vftable'");
    eq!("??_7name0@name1@@6B" => "const name1::name0::`vftable'");
    eq!("??_7name0@name1@@6Baaa@@@" => "const name1::name0::`vftable'{for `aaa'}");
    eq!("??_8name0@@7B@" => "const name0::`vbtable'");
}

#[test]
fn alternate_grammar_type() {
    eq!(".?AW4name0@?name1@name2@@YAX_N@Z@" =>
        "enum `void __cdecl name2::name1(bool)'::name0");
}

#[test]
fn explicit_type() {
    eq!(".?AVfoo@@" => "class foo");
    eq!(".?AUbar@ns@@" => "struct ns::bar");
    eq!(".?AW4color@@" => "enum color");
}

#[test]
fn function_pointers() {
    eq!("?fn@@3P6AHH@ZA" => "int (__cdecl *fn)(int)");
    eq!("?fn@@3PAP6AHH@ZA" => "int (__cdecl **fn)(int)");
    eq!("?fn@@3A6AHH@ZA" => "int (__cdecl &fn)(int)");
    eq!("?name0@@YAP6AXXZXZ" => "void (__cdecl * __cdecl name0(void))(void)");
    eq!("?f@@YAXP8C@@AEXXZ@Z" => "void __cdecl f(void (__thiscall C::*)(void))");
}

#[test]
fn pointers() {
    eq!("?var@@3PBHA" => "int const *var");
    eq!("?var@@3QAHA" => "int *const var");
    eq!("?var@@3PAHC" => "int volatile *var");
    eq!("?var@@3ABHA" => "int const &var");
    eq!("?FnName@@YAXPAH@Z" => "void __cdecl FnName(int *)");
    eq!("?FnName@@YAXQAH@Z" => "void __cdecl FnName(int *const)");
    eq!("?FnName@@YAXSDH@Z" => "void __cdecl FnName(int const volatile *const volatile)");
    eq!("?FnName@@YAXAAH@Z" => "void __cdecl FnName(int &)");
    eq!("?f@@YAX$$QAH@Z" => "void __cdecl f(int &&)");
}

#[test]
fn member_pointer() {
    eq!("?VarName@VarSpace@@3PEQClassName@@HA" => "int ClassName::*VarSpace::VarName");
}

#[test]
fn arrays() {
    eq!("?x@@3PEAY01HA" => "int (*x)[2]");
    eq!("?x@@3PAY123HA" => "int (*x)[3][4]");
}

#[test]
fn basic_types() {
    eq!("?Name@@3CA" => "signed char Name");
    eq!("?Name@@3DA" => "char Name");
    eq!("?Name@@3EA" => "unsigned char Name");
    eq!("?Name@@3FA" => "short Name");
    eq!("?Name@@3GA" => "unsigned short Name");
    eq!("?Name@@3HA" => "int Name");
    eq!("?Name@@3IA" => "unsigned int Name");
    eq!("?Name@@3JA" => "long Name");
    eq!("?Name@@3KA" => "unsigned long Name");
    eq!("?Name@@3MA" => "float Name");
    eq!("?Name@@3NA" => "double Name");
    eq!("?Name@@3OA" => "long double Name");
    eq!("?Name@@3_DA" => "__int8 Name");
    eq!("?Name@@3_JA" => "__int64 Name");
    eq!("?Name@@3_KA" => "unsigned __int64 Name");
    eq!("?Name@@3_NA" => "bool Name");
    eq!("?Name@@3_QA" => "char8_t Name");
    eq!("?Name@@3_SA" => "char16_t Name");
    eq!("?Name@@3_UA" => "char32_t Name");
    eq!("?Name@@3_WA" => "wchar_t Name");
    eq!("?Name@@3_$HA" => "__w64 int Name");
    eq!("?VarName@@3HB" => "int const VarName");
    eq!("?VarName@@3HD" => "int const volatile VarName");
    eq!("?fn@@YAH$$T@Z" => "int __cdecl fn(std::nullptr_t)");
}

#[test]
fn class_kinds() {
    eq!("?FnName@@YA_YRet@@_YParam@@@Z" => "cointerface Ret __cdecl FnName(cointerface Param)");
    eq!("?FnName@@YA_XRet@@_XParam@@@Z" => "coclass Ret __cdecl FnName(coclass Param)");
    eq!("?x@@3TU@@A" => "union U x");
    eq!("?x@@3W0E@@A" => "enum char E x");
}

#[test]
fn storage() {
    eq!("?x@@0HA" => "private: static int x");
    eq!("?x@@1HA" => "protected: static int x");
    eq!("?x@@2HA" => "public: static int x");
    eq!("?x@C@@QAEXXZ" => "public: void __thiscall C::x(void)");
    eq!("?x@C@@AAEXXZ" => "private: void __thiscall C::x(void)");
    eq!("?x@C@@IAEXXZ" => "protected: void __thiscall C::x(void)");
    eq!("?x@C@@SAXXZ" => "public: static void __cdecl C::x(void)");
    eq!("?x@C@@UAEXXZ" => "public: virtual void __thiscall C::x(void)");
}

#[test]
fn this_qualifiers() {
    eq!("?f@C@@QBEXXZ" => "public: void __thiscall C::f(void) const");
    eq!("?f@C@@QGAEXXZ" => "public: void __thiscall C::f(void) &");
    eq!("?f@C@@QHAEXXZ" => "public: void __thiscall C::f(void) &&");
    eq!("?f@@YAXX_E" => "void __cdecl f(void) noexcept");
}

#[test]
fn extern_c() {
    eq!("?abort@@$$J0YAXXZ" => "extern \"C\" void __cdecl abort(void)");
    eq!("?xyz@@$$J00HA" => "extern \"C\" private: static int xyz");
    eq!("?xyz@@$$J110HA" => "extern \"C\" private: static int xyz");
    eq!("?var@@$$FYMXXZ" => "void __clrcall var(void)");
}

#[test]
fn cast_operator() {
    eq!("??Bname0@@QEBAIXZ" => "public: __cdecl name0::operator unsigned int(void) const");
    eq!("??Bname0@@QEBAPEBVname1@@XZ" =>
        "public: __cdecl name0::operator class name1 const *(void) const");
}

#[test]
fn operators() {
    eq!("??2@YAPAXI@Z" => "void * __cdecl operator new(unsigned int)");
    eq!("??4C@@QAEAAV0@ABV0@@Z" => "public: class C & __thiscall C::operator=(class C const &)");
    eq!("??HC@@QBE?AV0@ABV0@@Z" => "public: class C __thiscall C::operator+(class C const &) const");
    eq!("??__K_km@@YAHI@Z" => "int __cdecl operator \"\" _km(unsigned int)");
    eq!("??__MC@@QBEHABV0@@Z" => "public: int __thiscall C::operator<=>(class C const &) const");
}

#[test]
fn templates() {
    eq!("??$foo@$0A@@@YAXXZ" => "void __cdecl foo<0>(void)");
    eq!("??$foo@$0?0@@YAXXZ" => "void __cdecl foo<-1>(void)");
    eq!("?x@@3V?$a@V?$b@H@@@@A" => "class a<class b<int> > x");
    eq!("??$f@H$$V@@YAXXZ" => "void __cdecl f<int>(void)");
    eq!("??$g@$1?x@@3HA@@YAXXZ" => "void __cdecl g<&x>(void)");
}

#[test]
fn back_references() {
    eq!("?f@C@@QAEXV1@@Z" => "public: void __thiscall C::f(class C)");
    eq!("?x@@YAXPAH0@Z" => "void __cdecl x(int *, int *)");
    eq!("?x@@YAXHH@Z" => "void __cdecl x(int, int)");
}

#[test]
fn embedded_symbols_share_back_references() {
    // the address argument reads the parameter registered by the argument before it
    eq!("??$f@PEAX$1?g@@YAX0@Z@@YAXXZ" => "void __cdecl f<void *, &g>(void)");
    eq!("??1?$name0@PEAXV?$name1@PEAX$1??$name2@PEAX@@YAXPEAX@Z$1?name3@@YAX0@Z$01@@$0?0$1??$name4@PEAX@@YAHPEAX0@Z$01@@QEAA@XZ" =>
        "public: __cdecl name0<void *, class name1<void *, &name2<void *>, &name3, 2>, -1, &name4<void *>, 2>::~name0<void *, class name1<void *, &name2<void *>, &name3, 2>, -1, &name4<void *>, 2>(void)");

    // the enclosing function continues the names table of the local symbol
    eq!("?x@?1??f@C@@QAEXV2@@Z@4HA" =>
        "int `public: void __thiscall C::f(class C)'::`2'::x");
    eq!("??__Fname0@?1??name1@name2@name3@name4@@CAXPEAUname5@@P84@EAAJPEAPEAG@ZW4name6@@PEAUname7@@@Z@YAXXZ" =>
        "void __cdecl `private: static void __cdecl name4::name3::name2::name1(struct name5 *, long (__cdecl name4::*)(unsigned short **), enum name6, struct name7 *)'::`2'::`dynamic atexit destructor for 'name0''(void)");
}

#[test]
fn embedded_symbol_tables_grow_the_enclosing_ones() {
    let mut cursor = Cursor::new("?x@?1??f@C@@QAEXV2@@Z@4HA", Grammar::Primary, false);
    let mut backrefs = Backrefs::new();
    ParsedObject::parse(&mut cursor, &mut backrefs).unwrap();

    // 'x', 'f' and 'C' as names, 'class C' as a parameter
    assert_eq!(backrefs.counts(), (3, 1));
}

#[test]
fn operator_templates_are_not_memorized() {
    eq!("??$?BPEAE@?$name0@PEAE@name1@@QEAA?AU?$name2@PEAE@1@XZ" =>
        "public: __cdecl name1::name0<unsigned char *>::operator<unsigned char *> struct name1::name2<unsigned char *>(void)");
    eq!("??$?8GU?$name0@G@name1@@V?$name2@G@1@@name1@@YA_NAEBV?$name3@GU?$name0@G@name1@@V?$name2@G@2@Vname4@@@0@0@Z" =>
        "bool __cdecl name1::operator==<unsigned short, struct name1::name0<unsigned short>, class name1::name2<unsigned short> >(class name1::name3<unsigned short, struct name1::name0<unsigned short>, class name1::name2<unsigned short>, class name4> const &, class name1::name3<unsigned short, struct name1::name0<unsigned short>, class name1::name2<unsigned short>, class name4> const &)");

    let mut cursor = Cursor::new("??$?BH@C@@QAEHXZ", Grammar::Primary, false);
    let mut backrefs = Backrefs::new();
    ParsedObject::parse(&mut cursor, &mut backrefs).unwrap();

    // only 'C'
    assert_eq!(backrefs.counts(), (1, 0));
}

#[test]
fn template_address_arguments() {
    eq!("??0?$name0@Vname1@@$1?name2@@3Uname3@@B$1?name4@@3QBGB@@QEAA@XZ" =>
        "public: __cdecl name0<class name1, &name2, &name4>::name0<class name1, &name2, &name4>(void)");
    eq!("??_7?$name0@V?$name1@PAVname2@name3@@@name4@@$0A@V?$name5@$1?name6@?$name7@PAVname2@name3@@@name8@name4@@SGPAUname9@4@XZ@2@@name4@@6Bname9@1@@" =>
        "const name4::name0<class name4::name1<class name3::name2 *>, 0, class name4::name5<&name4::name8::name7<class name3::name2 *>::name6> >::`vftable'{for `name4::name9'}");
}

#[test]
fn trailing_qualifiers() {
    eq!("?VarName@@3P6AHH@ZEA" => "int (__cdecl *VarName)(int)");
    eq!("?VarName@@3P6AHH@ZED" => "int (__cdecl *const volatile VarName)(int)");
    eq!("?VarName@@3P8ClassName@@EDAHXZED" =>
        "int (__cdecl ClassName::*const volatile VarName)(void) const volatile");
    eq!("?VarName@SpaceName@@3VTypeName@TypeSpace@@FEIA" =>
        "class TypeSpace::TypeName __unaligned __restrict SpaceName::VarName");
    eq!("?VarName@SpaceName@@3UTypeName@TypeSpace@@FEIA" =>
        "struct TypeSpace::TypeName __unaligned __restrict SpaceName::VarName");
    eq!("?VarName@SpaceName@@3_YTypeName@TypeSpace@@FEIA" =>
        "cointerface TypeSpace::TypeName __unaligned __restrict SpaceName::VarName");
    eq!("?var@@3PBHC" => "int const volatile *var");

    // far qualifier without a cv qualifier following it
    eq!("?x@@3HE" => "int x");
}

#[test]
fn unbounded_arrays() {
    eq!("?name0@name1@@0_OBHB" => "private: static int const name1::name0[]");
    eq!("?name0@name1@@0_OBQEBGB" => "private: static unsigned short const name1::name0[]");
    eq!("?name0@@3_OAPEBUname1@@B" => "struct name1 const name0[]");
    eq!("?Var@@0_OBY01QEBHB" => "private: static int const Var[][2]");
    eq!("?Var@@0_OBY00QEBY01HB" => "private: static int const Var[][1][][2]");
    eq!("?Var@@0_OBY00QEBY01QEBY02HB" => "private: static int const Var[][1][][2][][3]");
    eq!("?name0@@3PEBY01_OAPEBUname1@@B" => "struct name1 const (*name0)[2][]");
    eq!("?fn@@YAH_K_L_M_N_OAH_W_Xstu@@_Yvwx@@01234567@Z" =>
        "int __cdecl fn(unsigned __int64, __int128, unsigned __int128, bool, int[], wchar_t, coclass stu, cointerface vwx, unsigned __int64, __int128, unsigned __int128, bool, int[], wchar_t, coclass stu, cointerface vwx)");
}

#[test]
fn unbounded_array_dimensions() {
    let object = demangle("?Var@@0_OBY01QEBHB", Options::default()).unwrap();

    match object.type_node() {
        Some(TypeNode::Array(array)) => {
            assert_eq!(array.dims, [None, Some(2)]);
            assert_eq!(array.element.cv(), Modifiers::CONST);
        }
        other => panic!("expected an array, found {other:?}"),
    }
}

#[test]
fn function_pointer_back_references() {
    eq!("?name0@name1@@QEAAKP6AKPEAXKZZP6AKPEBGZZ1@Z" =>
        "public: unsigned long __cdecl name1::name0(unsigned long (__cdecl *)(void *, unsigned long, ...), unsigned long (__cdecl *)(unsigned short const *, ...), unsigned long (__cdecl *)(void *, unsigned long, ...))");
    eq!("?enumvar@@3W2enumname@enumspace@@A" => "enum short enumspace::enumname enumvar");
    eq!("?fnii@@YGHH@Z" => "int __stdcall fnii(int)");
    eq!("?fnii@@YMHH@Z" => "int __clrcall fnii(int)");
}

#[test]
fn back_reference_tables() {
    let mut cursor = Cursor::new("?f@C@@QAEXV1@@Z", Grammar::Primary, false);
    let mut backrefs = Backrefs::new();
    ParsedObject::parse(&mut cursor, &mut backrefs).unwrap();

    // 'f' and 'C' as names, 'class C' as the only multi-character parameter
    assert_eq!(backrefs.counts(), (2, 1));
}

#[test]
fn back_reference_capacity() {
    let mut backrefs = Backrefs::new();

    for idx in 0..12 {
        backrefs.memorize_name(&NameComponent::Identifier(format!("n{idx}")));
    }

    // duplicates aren't registered twice
    backrefs.memorize_name(&NameComponent::Identifier("n0".to_string()));

    assert_eq!(backrefs.counts().0, 10);
    assert_eq!(
        backrefs.get_memorized_name(9, 0),
        Ok(NameComponent::Identifier("n9".to_string()))
    );
    assert_eq!(
        backrefs.get_memorized_name(10, 4),
        Err(Error::InvalidBackReference {
            index: 10,
            offset: 4
        })
    );
}

#[test]
fn variadic() {
    eq!("?printf@@YAHPBDZZ" => "int __cdecl printf(char const *, ...)");
    eq!("?f@@YAXZZ" => "void __cdecl f(...)");
}

#[test]
fn anonymous_namespace() {
    eq!("?var@?A0x647dec29@@3HA" => "int `anonymous namespace'::var");
    eq!("?var@?A@@3HA" => "int `anonymous namespace'::var");
}

#[test]
fn thunks() {
    eq!("?f@C@@WBA@AEXXZ" => "[thunk]: public: virtual void __thiscall C::f`adjustor{16}'(void)");
    eq!("?f@C@@$4?3A@AEXXZ" =>
        "[thunk]: public: virtual void __thiscall C::f`vtordisp{-4, 0}'(void)");
    eq!("?f@C@@$R4A@BA@?3A@AEXXZ" =>
        "[thunk]: public: virtual void __thiscall C::f`vtordispex{0, 16, -4, 0}'(void)");
    eq!("??_9name0@@$BBII@AA" => "[thunk]: __cdecl name0::`vcall'{392, {flat}}");
}

#[test]
fn rtti() {
    eq!("??_R0?AVfoo@@@8" => "class foo `RTTI Type Descriptor'");
    eq!("??_R1A@?0A@EA@B@@8" => "B::`RTTI Base Class Descriptor at (0, -1, 0, 64)'");
    eq!("??_R2B@@8" => "B::`RTTI Base Class Array'");
    eq!("??_R3B@@8" => "B::`RTTI Class Hierarchy Descriptor'");
    eq!("??_R4B@@6B@" => "const B::`RTTI Complete Object Locator'");
}

#[test]
fn guards() {
    eq!("??_B?1??getS@@YAAAUS@@XZ@51" =>
        "`struct S & __cdecl getS(void)'::`2'::`local static guard'{2}");
    eq!("?$TSS0@?1??foo@@YAXXZ@4HA" => "int `void __cdecl foo(void)'::`2'::$TSS0");
}

#[test]
fn dynamic_initializers() {
    eq!("??__Evar@@YAXXZ" => "void __cdecl `dynamic initializer for 'var''(void)");
    eq!("??__E?x@@3HA@@YAXXZ" => "void __cdecl `dynamic initializer for 'int x''(void)");
    eq!("??__Fvar@@YAXXZ" => "void __cdecl `dynamic atexit destructor for 'var''(void)");
}

#[test]
fn special_operators() {
    eq!("??_GC@@UAEPAXI@Z" => "public: virtual void * __thiscall C::`scalar deleting destructor'(unsigned int)");
    eq!("??_EC@@UAEPAXI@Z" => "public: virtual void * __thiscall C::`vector deleting destructor'(unsigned int)");
}

#[test]
fn md5() {
    eq!("??@0123456789abcdef0123456789abcdef@" => "??@0123456789abcdef0123456789abcdef@");
}

#[test]
fn untyped() {
    eq!("?x@@" => "x");
    eq!("?x@y@@9" => "y::x");
}

#[test]
fn invalid_back_reference() {
    assert_eq!(
        error_of("?0@@3HA"),
        Error::InvalidBackReference {
            index: 0,
            offset: 1
        }
    );

    assert_eq!(
        error_of("?x@@YAX0@Z"),
        Error::InvalidBackReference {
            index: 0,
            offset: 7
        }
    );
}

#[test]
fn premature_end() {
    assert_eq!(error_of("?x@@3PEBH"), Error::PrematureEnd { offset: 9 });
    assert_eq!(error_of("?A@@3"), Error::PrematureEnd { offset: 5 });
    assert_eq!(error_of("?x@@YAX"), Error::PrematureEnd { offset: 7 });
    assert_eq!(error_of("?abc"), Error::PrematureEnd { offset: 4 });
}

#[test]
fn syntax_error() {
    match error_of("?x@@3ZA") {
        Error::Syntax { offset, found, .. } => {
            assert_eq!(offset, 5);
            assert_eq!(found, 'Z');
        }
        err => panic!("expected a syntax error, found {err:?}"),
    }
}

#[test]
fn unsupported() {
    assert_eq!(
        error_of("??_C@_02DPKJAMEF@?$AA@"),
        Error::UnsupportedConstruct {
            code: "_".to_string(),
            offset: 5
        }
    );

    assert_eq!(
        error_of("??_Q@@YAXXZ"),
        Error::UnsupportedConstruct {
            code: "_Q".to_string(),
            offset: 2
        }
    );
}

#[test]
fn trailing_input() {
    let strict = Options::new().error_on_trailing_input(true);

    assert!(demangle("?x@@3HAjunk", Options::default()).is_ok());
    assert_eq!(
        demangle("?x@@3HAjunk", strict),
        Err(Error::TrailingInput { offset: 7 })
    );
}

fn nested_pointers(depth: usize) -> String {
    let mut mangled = String::from("?x@@3");
    for _ in 0..depth {
        mangled.push_str("PA");
    }
    mangled.push_str("HA");
    mangled
}

#[test]
fn recursion_limit() {
    // runs on the test thread's own stack
    let err = demangle(&nested_pointers(300), Options::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RecursionLimit);

    let err = demangle(&nested_pointers(10_000), Options::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RecursionLimit);
}

#[test]
fn nesting_below_recursion_limit() {
    let demangled = demangle(&nested_pointers(40), Options::default()).unwrap();
    let expected = format!("int {}x", "*".repeat(40));
    assert_eq!(demangled.to_string(), expected);
}

#[test]
fn retry_exhausted() {
    let err = demangle_type(".?AW4x@?y", Options::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AmbiguousRetryExhausted);
    assert_eq!(err.offset(), 8);
    assert_eq!(err.primary().kind(), ErrorKind::Syntax);
}

#[test]
fn retry_only_for_explicit_types() {
    let err = demangle_type("?AW4x@?y", Options::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.offset(), 7);

    let err = demangle_type(".?AW4x@", Options::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PrematureEnd);
}

#[test]
fn number_encoding() {
    let mut cursor = Cursor::new("0", Grammar::Primary, false);
    assert_eq!(cursor.number(), Ok(1));

    let mut cursor = Cursor::new("9", Grammar::Primary, false);
    assert_eq!(cursor.number(), Ok(10));

    let mut cursor = Cursor::new("BA@", Grammar::Primary, false);
    assert_eq!(cursor.number(), Ok(16));

    let mut cursor = Cursor::new("?3", Grammar::Primary, false);
    assert_eq!(cursor.number(), Ok(-4));

    let mut cursor = Cursor::new("@", Grammar::Primary, false);
    assert_eq!(cursor.number(), Ok(0));

    let mut cursor = Cursor::new("BZ", Grammar::Primary, false);
    assert!(matches!(cursor.number(), Err(Error::Syntax { offset: 1, .. })));
}
