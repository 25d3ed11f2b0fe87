//! The builtin prelude: ZRM source parsed into the global scope before
//! the user program. It declares the primitive types and their operator
//! functions on top of raw C++ spliced in through the metafunctions.

/// `#__` expands to the name prefix of the generated C++, so the prelude
/// stays agnostic of the concrete mangling.
pub const PRELUDE: &str = r##"
// Primitive carriers. Each wraps a single raw C++ value named `v`
// (except Rat) so the emitter can reach into conditions with `.v`.

type Bool {
    #cpp_forward("bool v = false;");
    #cpp_forward("#__Bool() = default;");
    #cpp_forward("explicit #__Bool(bool raw) : v(raw) {}");
}

type Int {
    #cpp_forward("long long v = 0;");
    #cpp_forward("#__Int() = default;");
    #cpp_forward("explicit #__Int(long long raw) : v(raw) {}");
    #cpp_forward("#__Int(const char* digits, int base) : v(strtoll(digits, nullptr, base)) {}");
}

type Rat {
    #cpp_forward("#__Int num;");
    #cpp_forward("#__Int den = #__Int(1LL);");
    #cpp_forward("#__Rat() = default;");
    #cpp_forward("#__Rat(#__Int n, #__Int d) : num(n), den(d) {}");
}

type Flt {
    #cpp_forward("float v = 0.0f;");
    #cpp_forward("#__Flt() = default;");
    #cpp_forward("explicit #__Flt(float raw) : v(raw) {}");
}

type Str {
    #cpp_forward("std::string v;");
    #cpp_forward("#__Str() = default;");
    #cpp_forward("explicit #__Str(const char* raw) : v(raw) {}");
}

// Int arithmetic and comparisons.

fn +(Int a, Int b) -> Int { #cpp("return #__Int(#__a.v + #__b.v);"); }
fn -(Int a, Int b) -> Int { #cpp("return #__Int(#__a.v - #__b.v);"); }
fn -(Int a) -> Int { #cpp("return #__Int(-#__a.v);"); }
fn *(Int a, Int b) -> Int { #cpp("return #__Int(#__a.v * #__b.v);"); }
fn /(Int a, Int b) -> Int { #cpp("return #__Int(#__a.v / #__b.v);"); }
fn ^(Int a, Int b) -> Int {
    #cpp("long long r = 1;");
    #cpp("for (long long e = 0; e < #__b.v; e++) r *= #__a.v;");
    #cpp("return #__Int(r);");
}
fn ==(Int a, Int b) -> Bool { #cpp("return #__Bool(#__a.v == #__b.v);"); }
fn !=(Int a, Int b) -> Bool { #cpp("return #__Bool(#__a.v != #__b.v);"); }
fn <(Int a, Int b) -> Bool { #cpp("return #__Bool(#__a.v < #__b.v);"); }
fn >(Int a, Int b) -> Bool { #cpp("return #__Bool(#__a.v > #__b.v);"); }
fn <=(Int a, Int b) -> Bool { #cpp("return #__Bool(#__a.v <= #__b.v);"); }
fn >=(Int a, Int b) -> Bool { #cpp("return #__Bool(#__a.v >= #__b.v);"); }

// Rat arithmetic works on cross products; results are not normalized.

fn +(Rat a, Rat b) -> Rat { #cpp("return #__Rat(#__Int(#__a.num.v * #__b.den.v + #__b.num.v * #__a.den.v), #__Int(#__a.den.v * #__b.den.v));"); }
fn -(Rat a, Rat b) -> Rat { #cpp("return #__Rat(#__Int(#__a.num.v * #__b.den.v - #__b.num.v * #__a.den.v), #__Int(#__a.den.v * #__b.den.v));"); }
fn -(Rat a) -> Rat { #cpp("return #__Rat(#__Int(-#__a.num.v), #__a.den);"); }
fn *(Rat a, Rat b) -> Rat { #cpp("return #__Rat(#__Int(#__a.num.v * #__b.num.v), #__Int(#__a.den.v * #__b.den.v));"); }
fn /(Rat a, Rat b) -> Rat { #cpp("return #__Rat(#__Int(#__a.num.v * #__b.den.v), #__Int(#__a.den.v * #__b.num.v));"); }
fn ==(Rat a, Rat b) -> Bool { #cpp("return #__Bool(#__a.num.v * #__b.den.v == #__b.num.v * #__a.den.v);"); }
fn !=(Rat a, Rat b) -> Bool { #cpp("return #__Bool(#__a.num.v * #__b.den.v != #__b.num.v * #__a.den.v);"); }
fn <(Rat a, Rat b) -> Bool { #cpp("return #__Bool(#__a.num.v * #__b.den.v < #__b.num.v * #__a.den.v);"); }
fn >(Rat a, Rat b) -> Bool { #cpp("return #__Bool(#__a.num.v * #__b.den.v > #__b.num.v * #__a.den.v);"); }

// Flt arithmetic and comparisons.

fn +(Flt a, Flt b) -> Flt { #cpp("return #__Flt(#__a.v + #__b.v);"); }
fn -(Flt a, Flt b) -> Flt { #cpp("return #__Flt(#__a.v - #__b.v);"); }
fn -(Flt a) -> Flt { #cpp("return #__Flt(-#__a.v);"); }
fn *(Flt a, Flt b) -> Flt { #cpp("return #__Flt(#__a.v * #__b.v);"); }
fn /(Flt a, Flt b) -> Flt { #cpp("return #__Flt(#__a.v / #__b.v);"); }
fn ==(Flt a, Flt b) -> Bool { #cpp("return #__Bool(#__a.v == #__b.v);"); }
fn !=(Flt a, Flt b) -> Bool { #cpp("return #__Bool(#__a.v != #__b.v);"); }
fn <(Flt a, Flt b) -> Bool { #cpp("return #__Bool(#__a.v < #__b.v);"); }
fn >(Flt a, Flt b) -> Bool { #cpp("return #__Bool(#__a.v > #__b.v);"); }
fn <=(Flt a, Flt b) -> Bool { #cpp("return #__Bool(#__a.v <= #__b.v);"); }
fn >=(Flt a, Flt b) -> Bool { #cpp("return #__Bool(#__a.v >= #__b.v);"); }

// Bool equality; the connectives `&&`, `||` and `!` are built into the
// language itself.

fn ==(Bool a, Bool b) -> Bool { #cpp("return #__Bool(#__a.v == #__b.v);"); }
fn !=(Bool a, Bool b) -> Bool { #cpp("return #__Bool(#__a.v != #__b.v);"); }

// Str concatenation and equality.

fn +(Str a, Str b) -> Str {
    #cpp("#__Str r;");
    #cpp("r.v = #__a.v + #__b.v;");
    #cpp("return r;");
}
fn ==(Str a, Str b) -> Bool { #cpp("return #__Bool(#__a.v == #__b.v);"); }
fn !=(Str a, Str b) -> Bool { #cpp("return #__Bool(#__a.v != #__b.v);"); }
fn Length(Str s) -> Int { #cpp("return #__Int((long long)#__s.v.size());"); }

// Console output, one overload per primitive.

fn Print(Str s) { #cpp("printf(\"%s\\n\", #__s.v.c_str());"); }
fn Print(Int n) { #cpp("printf(\"%lld\\n\", #__n.v);"); }
fn Print(Rat r) { #cpp("printf(\"%lld/%lld\\n\", #__r.num.v, #__r.den.v);"); }
fn Print(Flt f) { #cpp("printf(\"%g\\n\", (double)#__f.v);"); }
fn Print(Bool b) { #cpp("printf(\"%s\\n\", #__b.v ? \"True\" : \"False\");"); }
"##;

#[cfg(test)]
mod tests {
    use crate::{ast::Program, parser, resolve::well_known};

    use super::*;

    #[test]
    fn prelude_parses_into_the_global_scope() {
        let mut program = Program::new();
        parser::parse_into(&mut program, Program::GLOBAL, PRELUDE)
            .expect("the prelude should always parse");

        for name in [
            well_known::BOOL,
            well_known::INT,
            well_known::RAT,
            well_known::FLT,
            well_known::STR,
        ] {
            assert!(
                program.lookup_type(Program::GLOBAL, name).is_some(),
                "prelude should declare `{name}`"
            );
        }
    }

    #[test]
    fn prelude_adds_no_global_statements() {
        let mut program = Program::new();
        parser::parse_into(&mut program, Program::GLOBAL, PRELUDE)
            .expect("the prelude should always parse");
        assert!(program.scope(Program::GLOBAL).stmts.is_empty());
    }
}
