//! Type expressions: decorators, qualified names, refinements.

use sable_ast::TypeExpr;
use sable_token::Id;

use super::error::ParseError;
use super::Parser;

impl<'a> Parser<'a> {
    /// Parse a type expression.
    ///
    /// ```text
    /// type      := ('nptr' | 'ptr') type
    ///            | ('array' | 'roarray') '[' expr ']' type
    ///            | ('slice' | 'roslice' | 'table' | 'rotable') type
    ///            | qualified_ident refinement?
    /// refinement := '[' expr? '..=' expr? ']'
    /// ```
    ///
    /// A refinement is only permitted on a numeric base type: either
    /// `base.<num>` or, under `allow_builtin_names`, an unqualified
    /// numeric name.
    pub(crate) fn parse_type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        let line = self.stream.line();

        let x = self.stream.peek();
        if x == Id::NPTR || x == Id::PTR {
            self.stream.advance();
            let inner = self.parse_type_expr()?;
            return Ok(TypeExpr::new(
                self.loc_at(line),
                x,
                Id::INVALID,
                Id::INVALID,
                None,
                None,
                Some(Box::new(inner)),
            ));
        }

        let mut decorator = Id::INVALID;
        let mut array_length = None;
        match self.stream.peek() {
            d @ (Id::ARRAY | Id::ROARRAY) => {
                decorator = d;
                self.stream.advance();

                let x = self.stream.peek();
                if x != Id::OPEN_BRACKET {
                    return Err(self.err(format!("expected \"[\", got {:?}", self.spelling(x))));
                }
                self.stream.advance();

                array_length = Some(Box::new(self.parse_expr()?));

                let x = self.stream.peek();
                if x != Id::CLOSE_BRACKET {
                    return Err(self.err(format!("expected \"]\", got {:?}", self.spelling(x))));
                }
                self.stream.advance();
            }
            d @ (Id::SLICE | Id::ROSLICE | Id::TABLE | Id::ROTABLE) => {
                decorator = d;
                self.stream.advance();
            }
            _ => {}
        }

        if decorator != Id::INVALID {
            let inner = self.parse_type_expr()?;
            return Ok(TypeExpr::new(
                self.loc_at(line),
                decorator,
                Id::INVALID,
                Id::INVALID,
                array_length,
                None,
                Some(Box::new(inner)),
            ));
        }

        let (pkg, name) = self.parse_qualified_ident()?;

        let (mut lhs, mut mhs) = (None, None);
        if self.stream.peek() == Id::OPEN_BRACKET {
            let (_, lo, hi) = self.parse_bracket(Id::DOT_DOT_EQ)?;
            let refinable = name.is_num_type()
                && ((pkg == Id::BASE) || (pkg == Id::INVALID && self.opts.allow_builtin_names));
            if !refinable {
                return Err(self.err("cannot refine non-numeric type"));
            }
            lhs = lo;
            mhs = hi;
        }

        Ok(TypeExpr::new(
            self.loc_at(line),
            Id::INVALID,
            pkg,
            name,
            lhs,
            mhs,
            None,
        ))
    }
}
