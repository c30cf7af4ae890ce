//! Symbol mangling and demangling.
//!
//! The encoding is deterministic and injective: equal prototypes produce
//! equal symbols, distinct fully-qualified prototypes produce distinct
//! symbols, and separately compiled units can rely on byte-for-byte
//! identical symbols for linking.
//!
//! Grammar sketch (`«n»` is the decimal length of the following segment):
//!
//! ```text
//! symbol  := "_G" module_prefix kind
//! kind    := "F" name throws params "E" type    (function)
//!          | "C" name type                      (constant)
//! type    := builtin letter
//!          | "R"/"S" type                       (&T, &mut T)
//!          | "P"/"Q" type                       (*const T, *mut T)
//!          | "B"/"C" type                       ([T], [mut T])
//!          | "A" type n "_"                     ([T; n])
//!          | "F" throws params "E" type         (fn pointer)
//!          | module_prefix "U"/"D" name         (user-defined / dyn)
//!          | "Z" k "_"                          (substitution #k)
//! ```
//!
//! Every user-defined or dyn-interface encoding is recorded in an indexed
//! substitution table as it is first emitted; later occurrences of the
//! identical encoding collapse to `Z<k>_`.

use std::collections::HashMap;

use log::trace;

use crate::ast::{Declaration, FloatWidth, FullyQualifiedId, IntegerWidth, Program, Type, TypeKind};

/// The linker name of the user's `main`, kept apart from the runtime's own
/// linker-visible `main`.
const USER_MAIN: &str = "__gallium_user_main";
const VOID_MAIN_SYMBOL: &str = "_GF4mainNEv";

/// Mangles a function or constant declaration into its linker symbol.
///
/// External functions are not mangled: their prototype name is their
/// symbol, so they stay visible over FFI.
///
/// Panics if the declaration is not mangle-capable or has no stamped
/// fully-qualified id.
pub fn mangle(decl: &Declaration) -> String {
    Mangler::default().mangle_decl(decl)
}

/// Demangles a symbol into a human-readable prototype. Any string without
/// the `_G` prefix demangles to itself.
pub fn demangle(mangled: &str) -> String {
    if mangled == USER_MAIN {
        return "fn ::main() -> void".into();
    }

    if mangled.len() < 3 || !mangled.starts_with("_G") {
        return mangled.to_string();
    }

    Demangler::new(mangled)
        .demangle()
        .unwrap_or_else(|| mangled.to_string())
}

/// Stamps every mangle-capable declaration in the program with its symbol.
pub fn mangle_program(program: &mut Program) {
    trace!("mangling {} declarations", program.decls().len());

    for decl in program.decls_mut() {
        mangle_decl_in_place(decl);
    }
}

fn mangle_decl_in_place(decl: &mut Declaration) {
    match decl {
        Declaration::Fn(_) | Declaration::Constant(_) => {
            let symbol = mangle(decl);
            decl.set_mangled(symbol);
        }
        Declaration::ExternalFn(d) => {
            let symbol = d.proto.name.clone();
            decl.set_mangled(symbol);
        }
        Declaration::External(d) => {
            for member in &mut d.externals {
                mangle_decl_in_place(member);
            }
        }
        _ => {}
    }
}

#[derive(Default)]
struct Mangler {
    builder: String,
    code: i64,
    substitutions: HashMap<String, i64>,
}

impl Mangler {
    fn mangle_decl(mut self, decl: &Declaration) -> String {
        self.builder.push_str("_G");

        match decl {
            Declaration::Fn(decl) => {
                // extern functions keep their name for FFI visibility
                if decl.external {
                    return decl.proto.name.clone();
                }

                self.module_prefix(stamped_id(decl.id.as_ref()));
                self.builder.push('F');
                self.push_segment(&decl.proto.name);
                self.builder.push(if decl.proto.throws() { 'T' } else { 'N' });

                for arg in &decl.proto.args {
                    self.mangle_type(&arg.ty);
                }

                self.builder.push('E');
                self.mangle_type(&decl.proto.return_type);

                if self.builder == VOID_MAIN_SYMBOL {
                    USER_MAIN.to_string()
                } else {
                    self.builder
                }
            }
            Declaration::ExternalFn(decl) => decl.proto.name.clone(),
            Declaration::Constant(decl) => {
                self.module_prefix(stamped_id(decl.id.as_ref()));
                self.builder.push('C');
                self.push_segment(&decl.name);
                self.mangle_type(&decl.hint);

                self.builder
            }
            other => unreachable!("cannot mangle a {:?} declaration", other.kind()),
        }
    }

    fn mangle_type(&mut self, ty: &Type) {
        let start = self.builder.len();

        match ty {
            Type::Reference {
                mutable,
                referenced,
                ..
            } => {
                self.builder.push(if *mutable { 'S' } else { 'R' });
                self.mangle_type(referenced);
            }
            Type::Slice {
                mutable, element, ..
            } => {
                self.builder.push(if *mutable { 'C' } else { 'B' });
                self.mangle_type(element);
            }
            Type::Pointer {
                mutable, pointed, ..
            } => {
                self.builder.push(if *mutable { 'Q' } else { 'P' });
                self.mangle_type(pointed);
            }
            Type::Integral { signed, width, .. } => {
                let letter = match (signed, width) {
                    (false, IntegerWidth::W8) => 'd',
                    (false, IntegerWidth::W16) => 'e',
                    (false, IntegerWidth::W32) => 'f',
                    (false, IntegerWidth::W64) => 'g',
                    (false, IntegerWidth::W128) => 'h',
                    (false, IntegerWidth::Native) => 'i',
                    (true, IntegerWidth::W8) => 'j',
                    (true, IntegerWidth::W16) => 'k',
                    (true, IntegerWidth::W32) => 'l',
                    (true, IntegerWidth::W64) => 'm',
                    (true, IntegerWidth::W128) => 'n',
                    (true, IntegerWidth::Native) => 'o',
                };

                self.builder.push(letter);
            }
            Type::Float { width, .. } => {
                self.builder.push(match width {
                    FloatWidth::Single => 'p',
                    FloatWidth::Double => 'q',
                    FloatWidth::Quadruple => 'r',
                });
            }
            Type::Byte { .. } => self.builder.push('a'),
            Type::Bool { .. } => self.builder.push('b'),
            Type::Char { .. } => self.builder.push('c'),
            Type::Void { .. } => self.builder.push('v'),
            Type::UserDefined { id, .. } => {
                self.module_prefix(id);
                self.builder.push('U');
                self.push_segment(id.name());
            }
            Type::DynInterface { id, .. } => {
                self.module_prefix(id);
                self.builder.push('D');
                self.push_segment(id.name());
            }
            Type::FnPointer { args, ret, .. } => {
                self.builder.push_str("FN");

                for arg in args {
                    self.mangle_type(arg);
                }

                self.builder.push('E');
                self.mangle_type(ret);
            }
            Type::Array { element, len, .. } => {
                self.builder.push('A');
                self.mangle_type(element);
                self.builder.push_str(&len.to_string());
                self.builder.push('_');
            }
            other => unreachable!("type {:?} cannot appear in a mangled symbol", other.kind()),
        }

        if matches!(ty.kind(), TypeKind::UserDefined | TypeKind::DynInterface) {
            let encoding = self.builder[start..].to_string();

            // an already-seen encoding collapses to its substitution index;
            // a fresh one claims the next index
            if let Some(&index) = self.substitutions.get(&encoding) {
                self.builder.truncate(start);
                self.builder.push('Z');
                self.builder.push_str(&index.to_string());
                self.builder.push('_');
            } else {
                self.substitutions.insert(encoding, self.code);
                self.code += 1;
            }
        }
    }

    fn module_prefix(&mut self, id: &FullyQualifiedId) {
        for part in id.module_string().split("::").filter(|part| !part.is_empty()) {
            self.push_segment(part);
        }
    }

    fn push_segment(&mut self, segment: &str) {
        self.builder.push_str(&segment.len().to_string());
        self.builder.push_str(segment);
    }
}

fn stamped_id(id: Option<&FullyQualifiedId>) -> &FullyQualifiedId {
    id.unwrap_or_else(|| unreachable!("mangling requires resolver-stamped fully-qualified ids"))
}

struct Demangler<'a> {
    mangled: &'a [u8],
    pos: usize,
    builder: String,
    substitutions: Vec<String>,
}

impl<'a> Demangler<'a> {
    fn new(mangled: &'a str) -> Demangler<'a> {
        Demangler {
            mangled: mangled.as_bytes(),
            pos: 2,
            builder: String::new(),
            substitutions: vec![],
        }
    }

    fn demangle(mut self) -> Option<String> {
        self.builder.push_str("::");

        while self.pos < self.mangled.len() {
            match self.peek()? {
                b'F' => return self.function(),
                b'C' => return self.constant(),
                c if c.is_ascii_digit() => self.module_part()?,
                _ => return None,
            }
        }

        None
    }

    fn function(mut self) -> Option<String> {
        self.pos += 1;
        self.part_with_len()?;

        let throws = self.next()? == b'T';

        self.builder.push('(');

        while self.peek()? != b'E' {
            self.ty()?;

            if self.peek()? != b'E' {
                self.builder.push_str(", ");
            }
        }

        self.pos += 1;
        self.builder.push(')');
        self.builder.push_str(if throws { " throws -> " } else { " -> " });
        self.ty()?;

        Some(format!("fn {}", self.builder))
    }

    fn constant(mut self) -> Option<String> {
        self.pos += 1;
        self.part_with_len()?;

        self.builder.push_str(": ");
        self.ty()?;

        Some(format!("const {}", self.builder))
    }

    fn ty(&mut self) -> Option<()> {
        let c = self.next()?;

        let builtin = match c {
            b'v' => Some("void"),
            b'a' => Some("byte"),
            b'b' => Some("bool"),
            b'c' => Some("char"),
            b'd' => Some("u8"),
            b'e' => Some("u16"),
            b'f' => Some("u32"),
            b'g' => Some("u64"),
            b'h' => Some("u128"),
            b'i' => Some("usize"),
            b'j' => Some("i8"),
            b'k' => Some("i16"),
            b'l' => Some("i32"),
            b'm' => Some("i64"),
            b'n' => Some("i128"),
            b'o' => Some("isize"),
            b'p' => Some("f32"),
            b'q' => Some("f64"),
            b'r' => Some("f128"),
            _ => None,
        };

        if let Some(name) = builtin {
            self.builder.push_str(name);
            return Some(());
        }

        match c {
            b'P' => {
                self.builder.push_str("*const ");
                self.ty()
            }
            b'Q' => {
                self.builder.push_str("*mut ");
                self.ty()
            }
            b'R' => {
                self.builder.push('&');
                self.ty()
            }
            b'S' => {
                self.builder.push_str("&mut ");
                self.ty()
            }
            b'A' => {
                self.builder.push('[');
                self.ty()?;
                let len = self.digits()?;
                self.builder.push_str(&format!("; {len}]"));
                self.pos += 1; // the `_`
                Some(())
            }
            b'B' => {
                self.builder.push('[');
                self.ty()?;
                self.builder.push(']');
                Some(())
            }
            b'C' => {
                self.builder.push_str("[mut ");
                self.ty()?;
                self.builder.push(']');
                Some(())
            }
            b'F' => {
                self.builder.push_str("fn(");

                let throws = self.next()? == b'T';

                while self.peek()? != b'E' {
                    self.ty()?;

                    if self.peek()? != b'E' {
                        self.builder.push_str(", ");
                    }
                }

                self.pos += 1;
                self.builder.push_str(") ");

                if throws {
                    self.builder.push_str("throws ");
                }

                self.builder.push_str("-> ");
                self.ty()
            }
            b'Z' => {
                let index = self.digits()? as usize;
                let substitution = self.substitutions.get(index)?.clone();

                self.builder.push_str(&substitution);
                self.pos += 1; // the `_`
                Some(())
            }
            c if c.is_ascii_digit() || c == b'U' || c == b'D' => {
                // a user-defined or dyn type: module prefix, then U/D + name
                self.pos -= 1;

                let start = self.builder.len();

                self.builder.push_str("::");
                self.module_part()?;

                match self.next()? {
                    b'D' => {
                        self.builder.insert_str(start, "dyn ");
                        self.part_with_len()?;
                    }
                    b'U' => self.part_with_len()?,
                    _ => return None,
                }

                let rendered = self.builder[start..].to_string();
                self.substitutions.push(rendered);

                Some(())
            }
            _ => None,
        }
    }

    /// Consumes `<len><segment>` pairs, appending `segment::` for each.
    /// The entity name itself always follows a kind marker (`F`/`C`/`U`/
    /// `D`), so every length-prefixed segment seen here is a module part.
    fn module_part(&mut self) -> Option<()> {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.part_with_len()?;
            self.builder.push_str("::");
        }

        Some(())
    }

    fn part_with_len(&mut self) -> Option<()> {
        let len = self.digits()? as usize;
        let start = self.pos;

        if start + len > self.mangled.len() {
            return None;
        }

        self.pos += len;
        self.builder
            .push_str(std::str::from_utf8(&self.mangled[start..self.pos]).ok()?);

        Some(())
    }

    fn digits(&mut self) -> Option<u64> {
        let start = self.pos;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }

        if start == self.pos {
            return None;
        }

        std::str::from_utf8(&self.mangled[start..self.pos])
            .ok()?
            .parse()
            .ok()
    }

    fn peek(&self) -> Option<u8> {
        self.mangled.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }
}
