//! Top-level declarations: `use`, `const`, `func`, `status`, `struct`.

use sable_ast::{
    Const, Field, File, Flags, Func, Node, Status, Struct, TypeExpr, Use, MAX_IMPLEMENTS,
};
use sable_token::{unescape, Id};

use super::error::ParseError;
use super::names::{contains_double_underscore, valid_const_name};
use super::Parser;

impl<'a> Parser<'a> {
    /// Drive the top-level grammar until the tokens are exhausted.
    pub(crate) fn parse_file(&mut self) -> Result<File, ParseError> {
        let mut decls = Vec::new();
        while !self.stream.at_end() {
            decls.push(self.parse_top_level_decl()?);
        }
        Ok(File::new(self.filename.clone(), decls))
    }

    fn parse_top_level_decl(&mut self) -> Result<Node, ParseError> {
        let mut flags = Flags::default();
        let line = self.stream.line();
        match self.stream.peek() {
            Id::USE => {
                self.stream.advance();
                let path = self.stream.peek();
                if !path.is_dq_str_literal(self.map) {
                    return Err(self.err(format!(
                        "expected \"-string literal, got {:?}",
                        self.spelling(path)
                    )));
                }
                self.stream.advance();
                self.expect_semicolon()?;
                Ok(Node::Use(Use::new(self.loc_at(line), path)))
            }

            x @ (Id::PUB | Id::PRI) => {
                if x == Id::PUB {
                    flags |= Flags::PUBLIC;
                }
                self.stream.advance();
                match self.stream.peek() {
                    Id::CONST => self.parse_const_decl(line, flags),
                    Id::FUNC => self.parse_func_decl(line, flags),
                    Id::STATUS => self.parse_status_decl(line, flags),
                    Id::STRUCT => self.parse_struct_decl(line, flags),
                    _ => Err(self.err_at("unrecognized top level declaration", line)),
                }
            }

            _ => Err(self.err_at("unrecognized top level declaration", line)),
        }
    }

    fn parse_const_decl(&mut self, line: u32, flags: Flags) -> Result<Node, ParseError> {
        self.stream.advance();
        let name = self.parse_ident()?;
        if !valid_const_name(self.spelling(name)) {
            return Err(self.err(format!("invalid const name {:?}", self.spelling(name))));
        }

        let x = self.stream.peek();
        if x != Id::COLON {
            return Err(self.err(format!("expected \":\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();

        let xtype = self.parse_type_expr()?;
        if self.stream.peek() != Id::EQ {
            return Err(self.err(format!("const {:?} has no value", self.spelling(name))));
        }
        self.stream.advance();
        let value = self.parse_possible_list_expr()?;
        self.expect_semicolon()?;
        Ok(Node::Const(Const::new(
            self.loc_at(line),
            flags,
            name,
            xtype,
            value,
        )))
    }

    fn parse_func_decl(&mut self, line: u32, mut flags: Flags) -> Result<Node, ParseError> {
        self.stream.advance();
        let (receiver, name) = self.parse_qualified_ident()?;
        if !self.opts.allow_builtin_names && matches!(name, Id::INITIALIZE | Id::RESET) {
            return Err(self.err(format!(
                "cannot have a method named {:?}",
                self.spelling(name)
            )));
        }
        if !self.opts.allow_double_underscore_names
            && contains_double_underscore(self.spelling(name))
        {
            return Err(self.err(format!(
                "double-underscore {:?} used for func name",
                self.spelling(name)
            )));
        }

        self.func_effect = self.parse_effect();
        flags |= self.func_effect.as_flags();
        let arg_fields = self.parse_list(Id::CLOSE_PAREN, Parser::parse_field_node)?;

        let mut out = None;
        let x = self.stream.peek();
        if x != Id::OPEN_CURLY && x != Id::COMMA {
            out = Some(self.parse_type_expr()?);
        }

        let mut asserts = Vec::new();
        if self.stream.peek() == Id::COMMA {
            self.stream.advance();
            if self.stream.peek() == Id::CHOOSY {
                self.stream.advance();
                if flags.contains(Flags::PUBLIC) {
                    return Err(self.err("choosy function cannot be pub"));
                } else if self.func_effect.is_coroutine() {
                    return Err(self.err("choosy function cannot be a coroutine"));
                }
                flags |= Flags::CHOOSY;
                if self.stream.peek() != Id::OPEN_CURLY {
                    let x = self.stream.peek();
                    if x != Id::COMMA {
                        return Err(
                            self.err(format!("expected \",\", got {:?}", self.spelling(x)))
                        );
                    }
                    self.stream.advance();
                }
            }

            asserts = self.parse_list(Id::OPEN_CURLY, Parser::parse_assert_node)?;
            self.asserts_sorted(&asserts, true)?;
            for o in &asserts {
                let Some(a) = o.as_assert() else { continue };
                if a.keyword != Id::CHOOSE {
                    continue;
                } else if a.is_choose_cpu_arch() {
                    flags |= Flags::HAS_CHOOSE_CPU_ARCH;
                } else {
                    return Err(self.err("invalid \"choose\" condition"));
                }
            }
        }

        self.allow_var = true;
        let body = self.parse_block(false)?;
        self.allow_var = false;
        self.expect_semicolon()?;

        if flags.contains(Flags::HAS_CHOOSE_CPU_ARCH) {
            if flags.contains(Flags::PUBLIC) {
                return Err(self.err("cpu_arch function cannot be public"));
            }
            if flags.contains(Flags::CHOOSY) {
                return Err(self.err("cpu_arch function cannot be choosy"));
            }
        }
        self.func_effect = sable_ast::Effect::Pure;

        let args = Struct::new(
            self.loc_at(line),
            Flags::default(),
            Id::ARGS,
            Vec::new(),
            arg_fields,
        );
        Ok(Node::Func(Func::new(
            self.loc_at(line),
            flags,
            receiver,
            name,
            args,
            out,
            asserts,
            body,
        )))
    }

    fn parse_status_decl(&mut self, line: u32, flags: Flags) -> Result<Node, ParseError> {
        self.stream.advance();
        let message = self.stream.peek();
        if !message.is_dq_str_literal(self.map) {
            return Err(self.err(format!(
                "expected \"-string literal, got {:?}",
                self.spelling(message)
            )));
        }
        let s = unescape(self.spelling(message)).unwrap_or_default();
        if !super::names::is_status_message(&s) {
            return Err(self.err(format!(
                "status message {:?} does not start with @, # or $",
                s
            )));
        }
        self.stream.advance();
        self.expect_semicolon()?;
        Ok(Node::Status(Status::new(self.loc_at(line), flags, message)))
    }

    fn parse_struct_decl(&mut self, line: u32, mut flags: Flags) -> Result<Node, ParseError> {
        self.stream.advance();
        let name = self.parse_ident()?;
        if !self.opts.allow_double_underscore_names
            && contains_double_underscore(self.spelling(name))
        {
            return Err(self.err(format!(
                "double-underscore {:?} used for struct name",
                self.spelling(name)
            )));
        }

        if self.stream.peek() == Id::QUESTION {
            flags |= Flags::CLASSY;
            self.stream.advance();
        }

        let mut implements = Vec::new();
        if self.stream.peek() == Id::IMPLEMENTS {
            self.stream.advance();
            // The list of implemented interfaces runs up to the `(` that
            // opens the field list, which stays unconsumed.
            implements =
                self.parse_list(Id::OPEN_PAREN, Parser::parse_qualified_ident_as_type_expr_node)?;
            if implements.len() > MAX_IMPLEMENTS {
                return Err(self.err("too many implements listed"));
            }
        }

        let mut fields = self.parse_list(Id::CLOSE_PAREN, Parser::parse_field_node)?;
        if self.stream.peek() == Id::PLUS {
            self.stream.advance();
            let x = self.stream.peek();
            if x != Id::OPEN_PAREN {
                return Err(self.err(format!("expected \"(\", got {:?}", self.spelling(x))));
            }
            let extra_fields = self.parse_list(Id::CLOSE_PAREN, Parser::parse_extra_field_node)?;
            fields.extend(extra_fields);
        }
        self.expect_semicolon()?;
        Ok(Node::Struct(Struct::new(
            self.loc_at(line),
            flags,
            name,
            implements,
            fields,
        )))
    }

    fn parse_qualified_ident_as_type_expr_node(&mut self) -> Result<Node, ParseError> {
        let line = self.stream.line();
        let (pkg, name) = self.parse_qualified_ident()?;
        Ok(Node::TypeExpr(TypeExpr::new(
            self.loc_at(line),
            Id::INVALID,
            pkg,
            name,
            None,
            None,
            None,
        )))
    }

    pub(crate) fn parse_field_node(&mut self) -> Result<Node, ParseError> {
        self.parse_field_node1(Flags::default())
    }

    /// Extra fields are always private data, and their types must be plain:
    /// array wrappers aside, neither decorated nor a refined-or-non-numeric
    /// base type.
    fn parse_extra_field_node(&mut self) -> Result<Node, ParseError> {
        let n = self.parse_field_node1(Flags::PRIVATE_DATA)?;
        let Some(field) = n.as_field() else {
            unreachable!("parse_field_node1 returns a field node");
        };
        let mut typ = &field.xtype;
        while typ.decorator == Id::ARRAY {
            match typ.inner.as_deref() {
                Some(inner) => typ = inner,
                None => break,
            }
        }
        if (typ.decorator != Id::INVALID)
            || (typ.qid().0 == Id::BASE && (!typ.is_num_type() || typ.is_refined()))
        {
            return Err(self.err(format!(
                "invalid extra-field type {:?}",
                field.xtype.str(self.map)
            )));
        }
        Ok(n)
    }

    fn parse_field_node1(&mut self, mut flags: Flags) -> Result<Node, ParseError> {
        let line = self.stream.line();
        let name = self.parse_ident()?;
        let x = self.stream.peek();
        if x != Id::COLON {
            return Err(self.err(format!("expected \":\", got {:?}", self.spelling(x))));
        }
        self.stream.advance();
        let xtype = self.parse_type_expr()?;

        // A field whose innermost type names a foreign package holds state
        // the package's own code manages.
        let pkg = xtype.innermost().qid().0;
        if pkg != Id::INVALID && pkg != Id::BASE {
            flags |= Flags::PRIVATE_DATA;
        }
        Ok(Node::Field(Field::new(self.loc_at(line), flags, name, xtype)))
    }
}
