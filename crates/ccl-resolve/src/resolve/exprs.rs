//! Expression type checking.
//!
//! Every AST node receives a concrete type. Identifier classes decide how a
//! name may be indexed and composed; arrays carry index-domain tuples that
//! must match under pointwise operators, matrix products, and dot products.

use super::registry;
use super::scope::{Symbol, SymbolKind};
use super::Analyser;
use ccl_ast::{
    BinaryOp, Diagnostic, DiagnosticKind, Expr, Name, NumericKind, ObjectKind, Shape, Span, Type,
    TypedExpr, TypedKind, UntypedKind,
};

/// Scalar numeric or array-of-numeric: the operand domain of arithmetic.
fn is_operand(ty: &Type) -> bool {
    ty.is_numeric() || ty.is_array()
}

fn display_list(types: &[Type]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Analyser {
    /// Infer and check the type of an expression.
    pub(crate) fn check_expr(&mut self, expr: &Expr) -> Result<TypedExpr, Diagnostic> {
        let span = expr.span;
        match &expr.kind {
            UntypedKind::Number { value, kind } => Ok(TypedExpr::new(
                TypedKind::Number { value: *value },
                Type::scalar(*kind),
                span,
            )),

            UntypedKind::Str(text) => Ok(TypedExpr::new(
                TypedKind::Str(text.clone()),
                Type::String,
                span,
            )),

            UntypedKind::Name(name) => {
                let ty = self.check_name(name)?;
                Ok(TypedExpr::new(TypedKind::Name(name.clone()), ty, span))
            }

            UntypedKind::Subscript { name, indices } => self.check_subscript(name, indices, span),

            UntypedKind::Unary { op, operand } => {
                let operand = self.check_expr(operand)?;
                if !is_operand(&operand.ty) {
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!("Incompatible type for unary {op}."),
                    ));
                }
                let ty = operand.ty.clone();
                Ok(TypedExpr::new(
                    TypedKind::Unary {
                        op: *op,
                        operand: Box::new(operand),
                    },
                    ty,
                    span,
                ))
            }

            UntypedKind::Binary { op, left, right } => {
                let left = self.check_expr(left)?;
                let right = self.check_expr(right)?;
                let ty = self.binary_result(*op, &left.ty, &right.ty, span)?;
                Ok(TypedExpr::new(
                    TypedKind::Binary {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    ty,
                    span,
                ))
            }

            UntypedKind::Call { function, arg } => self.check_call(function, arg, span),

            UntypedKind::Sum { index, body } => self.check_sum(index, body, span),

            UntypedKind::Ee {
                row,
                col,
                diag,
                off,
                rhs,
                kind,
                radius,
            } => self.check_ee(row, col, diag, off, rhs, *kind, radius.as_deref(), span),
        }
    }

    /// Type of a bare name reference.
    pub(crate) fn check_name(&mut self, name: &Name) -> Result<Type, Diagnostic> {
        let Some(symbol) = self.scopes.resolve(&name.text) else {
            return Err(self.undefined(name));
        };

        match &symbol.kind {
            SymbolKind::Object { kind, .. } => {
                let kind = *kind;
                if !self.is_iterating(&name.text) {
                    return Err(self.error(
                        DiagnosticKind::ClassMisuse,
                        name.span,
                        format!("Object {} not bound to any For/ForEach/Sum.", name.text),
                    ));
                }
                Ok(Type::Object(kind))
            }
            SymbolKind::Formal { kind } => Ok(Type::Object(kind.unwrap_or(ObjectKind::Atom))),
            SymbolKind::Substitution(sub) => {
                let expected = sub.index_kinds.len();
                let result = sub.result.clone();
                if let Some(outer) = &self.current_substitution {
                    return Err(self.error(
                        DiagnosticKind::SubstitutionConsistency,
                        name.span,
                        format!(
                            "Cannot nest substitution {} in another substitution {outer}.",
                            name.text
                        ),
                    ));
                }
                if expected != 0 {
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        name.span,
                        format!(
                            "Bad number of indices for {}, got 0, expected {expected}.",
                            name.text
                        ),
                    ));
                }
                Ok(result.expect("zero-arity substitution has a result type"))
            }
            other => Ok(other
                .value_type()
                .expect("non-substitution symbols have a value type")),
        }
    }

    /// Type of a subscript `x[e(, e)]`, dispatched on the class of `x`.
    fn check_subscript(
        &mut self,
        name: &Name,
        indices: &[Expr],
        span: Span,
    ) -> Result<TypedExpr, Diagnostic> {
        let Some(symbol) = self.scopes.resolve(&name.text) else {
            return Err(self.undefined(name));
        };
        let kind = symbol.kind.clone();

        match kind {
            SymbolKind::Substitution(sub) => {
                if let Some(outer) = self.current_substitution.clone() {
                    return Err(self.error(
                        DiagnosticKind::SubstitutionConsistency,
                        span,
                        format!(
                            "Cannot nest substitution {} in another substitution {outer}.",
                            name.text
                        ),
                    ));
                }
                if indices.len() != sub.index_kinds.len() {
                    return Err(self.bad_arity(name, indices.len(), sub.index_kinds.len(), span));
                }

                let mut typed = Vec::with_capacity(indices.len());
                let mut use_kinds = Vec::with_capacity(indices.len());
                for (index, declared) in indices.iter().zip(&sub.index_kinds) {
                    if index.as_name().is_none() {
                        return Err(self.substitution_index_error(name, span));
                    }
                    if let Some(declared) = declared {
                        self.refine_formal_kind(index, *declared);
                    }
                    let index = self.check_expr(index)?;
                    match index.ty {
                        Type::Object(kind) => use_kinds.push(kind),
                        _ => return Err(self.substitution_index_error(name, span)),
                    }
                    typed.push(index);
                }

                // Agree with the kinds the clauses fixed; open kinds adopt
                // the use-site kind.
                let mismatch = sub
                    .index_kinds
                    .iter()
                    .zip(&use_kinds)
                    .any(|(declared, used)| matches!(declared, Some(k) if k != used));
                if mismatch {
                    let want: Vec<Type> = sub
                        .index_kinds
                        .iter()
                        .zip(&use_kinds)
                        .map(|(declared, used)| Type::Object(declared.unwrap_or(*used)))
                        .collect();
                    let got: Vec<Type> = use_kinds.iter().map(|k| Type::Object(*k)).collect();
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!(
                            "Cannot index {} with indices of type(s) {}, expected {}.",
                            name.text,
                            display_list(&got),
                            display_list(&want)
                        ),
                    ));
                }
                if sub.index_kinds.iter().any(Option::is_none) {
                    if let Some(symbol) = self.scopes.resolve_mut(&name.text) {
                        if let SymbolKind::Substitution(sub) = &mut symbol.kind {
                            for (declared, used) in sub.index_kinds.iter_mut().zip(&use_kinds) {
                                declared.get_or_insert(*used);
                            }
                        }
                    }
                }

                let ty = sub.result.clone().expect("substitution has a result type");
                Ok(TypedExpr::new(
                    TypedKind::Subscript {
                        name: name.clone(),
                        indices: typed,
                    },
                    ty,
                    span,
                ))
            }

            SymbolKind::Parameter(param) => {
                self.check_parameter_subscript(name, param, indices, span)
            }

            SymbolKind::Array { elem, shape } => {
                if indices.len() != shape.dim() {
                    return Err(self.bad_arity(name, indices.len(), shape.dim(), span));
                }
                for (index, kind) in indices.iter().zip(shape.kinds()) {
                    self.refine_formal_kind(index, *kind);
                }
                let typed = indices
                    .iter()
                    .map(|index| self.check_expr(index))
                    .collect::<Result<Vec<_>, _>>()?;
                let index_types: Vec<Type> = typed.iter().map(|t| t.ty.clone()).collect();
                let expected: Vec<Type> =
                    shape.kinds().iter().map(|k| Type::Object(*k)).collect();
                if index_types != expected {
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!(
                            "Cannot index Array of type {} using index/indices of type(s) {}.",
                            Type::Array(elem, shape.clone()),
                            display_list(&index_types)
                        ),
                    ));
                }
                Ok(TypedExpr::new(
                    TypedKind::Subscript {
                        name: name.clone(),
                        indices: typed,
                    },
                    Type::scalar(elem),
                    span,
                ))
            }

            SymbolKind::Property(sig) => {
                if indices.len() != sig.args.len() {
                    return Err(self.bad_arity(name, indices.len(), sig.args.len(), span));
                }
                for (index, kind) in indices.iter().zip(&sig.args) {
                    self.refine_formal_kind(index, *kind);
                }
                let typed = indices
                    .iter()
                    .map(|index| self.check_expr(index))
                    .collect::<Result<Vec<_>, _>>()?;
                let index_types: Vec<Type> = typed.iter().map(|t| t.ty.clone()).collect();
                let expected: Vec<Type> = sig.args.iter().map(|k| Type::Object(*k)).collect();
                if index_types != expected {
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!(
                            "Cannot index {} with indices of type(s) {}, expected {}.",
                            name.text,
                            display_list(&index_types),
                            display_list(&expected)
                        ),
                    ));
                }
                Ok(TypedExpr::new(
                    TypedKind::Subscript {
                        name: name.clone(),
                        indices: typed,
                    },
                    Type::Float,
                    span,
                ))
            }

            other => {
                let typed = indices
                    .iter()
                    .map(|index| self.check_expr(index))
                    .collect::<Result<Vec<_>, _>>()?;
                let index_types: Vec<Type> = typed.iter().map(|t| t.ty.clone()).collect();
                Err(self.error(
                    DiagnosticKind::TypeMismatch,
                    span,
                    format!(
                        "Cannot index type {} with indices of type(s) {}.",
                        other.describe(),
                        display_list(&index_types)
                    ),
                ))
            }
        }
    }

    /// Atom and bond parameter subscripts; common parameters cannot be
    /// subscripted at all.
    fn check_parameter_subscript(
        &mut self,
        name: &Name,
        param: ccl_ast::ParameterKind,
        indices: &[Expr],
        span: Span,
    ) -> Result<TypedExpr, Diagnostic> {
        use ccl_ast::ParameterKind;

        match param {
            ParameterKind::Common => Err(self.error(
                DiagnosticKind::ClassMisuse,
                span,
                "Cannot index common parameter.",
            )),
            ParameterKind::Atom => {
                if indices.len() != 1 {
                    return Err(self.bad_arity(name, indices.len(), 1, span));
                }
                self.refine_formal_kind(&indices[0], ObjectKind::Atom);
                let index = self.check_expr(&indices[0])?;
                if index.ty != Type::Object(ObjectKind::Atom) {
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!("Cannot index atom parameter with {}.", index.ty),
                    ));
                }
                Ok(TypedExpr::new(
                    TypedKind::Subscript {
                        name: name.clone(),
                        indices: vec![index],
                    },
                    Type::Float,
                    span,
                ))
            }
            ParameterKind::Bond => {
                match indices.len() {
                    1 => self.refine_formal_kind(&indices[0], ObjectKind::Bond),
                    2 => {
                        for index in indices {
                            self.refine_formal_kind(index, ObjectKind::Atom);
                        }
                    }
                    _ => {}
                }
                let typed = indices
                    .iter()
                    .map(|index| self.check_expr(index))
                    .collect::<Result<Vec<_>, _>>()?;
                match typed.as_slice() {
                    [single] => match single.ty {
                        Type::Object(ObjectKind::Bond) => {}
                        Type::Object(ObjectKind::Atom) => {
                            return Err(self.error(
                                DiagnosticKind::TypeMismatch,
                                span,
                                "Cannot index bond parameter with Atom.",
                            ));
                        }
                        _ => {
                            return Err(self.error(
                                DiagnosticKind::TypeMismatch,
                                span,
                                format!("Cannot index bond parameter with {}.", single.ty),
                            ));
                        }
                    },
                    [first, second] => {
                        let both_atoms = first.ty == Type::Object(ObjectKind::Atom)
                            && second.ty == Type::Object(ObjectKind::Atom);
                        if !both_atoms {
                            let types: Vec<Type> =
                                typed.iter().map(|t| t.ty.clone()).collect();
                            return Err(self.error(
                                DiagnosticKind::TypeMismatch,
                                span,
                                format!(
                                    "Cannot index bond parameter with {}.",
                                    display_list(&types)
                                ),
                            ));
                        }
                        let tied = match (indices[0].as_name(), indices[1].as_name()) {
                            (Some(a), Some(b)) => self.is_bonded(&a.text, &b.text),
                            _ => false,
                        };
                        if !tied {
                            return Err(self.error(
                                DiagnosticKind::TypeMismatch,
                                span,
                                "Cannot index bond parameter by two non-bonded atoms.",
                            ));
                        }
                    }
                    _ => return Err(self.bad_arity(name, indices.len(), 1, span)),
                }
                Ok(TypedExpr::new(
                    TypedKind::Subscript {
                        name: name.clone(),
                        indices: typed,
                    },
                    Type::Float,
                    span,
                ))
            }
        }
    }

    /// Result type of a binary arithmetic operation.
    fn binary_result(
        &self,
        op: BinaryOp,
        left: &Type,
        right: &Type,
        span: Span,
    ) -> Result<Type, Diagnostic> {
        let op_error = |msg: String| self.error(DiagnosticKind::TypeMismatch, span, msg);

        if !is_operand(left) || !is_operand(right) {
            return Err(op_error(format!(
                "Cannot perform {op} for types {left} and {right}."
            )));
        }

        match (left, right) {
            // Scalar op scalar: Float wins; Int op Int stays Int.
            (l, r) if l.is_numeric() && r.is_numeric() => {
                let lk = l.numeric_kind().expect("numeric");
                let rk = r.numeric_kind().expect("numeric");
                Ok(Type::scalar(lk.unify(rk)))
            }

            // Scalar and array broadcast only under * and /.
            (l, Type::Array(elem, shape)) if l.is_numeric() => match op {
                BinaryOp::Mul => {
                    let lk = l.numeric_kind().expect("numeric");
                    Ok(Type::Array(lk.unify(*elem), shape.clone()))
                }
                BinaryOp::Div => Err(op_error(format!(
                    "Cannot perform / for types {left} and {right}."
                ))),
                _ => Err(op_error(
                    "Cannot perform operation other than * or / between Number and Array."
                        .to_string(),
                )),
            },
            (Type::Array(elem, shape), r) if r.is_numeric() => match op {
                BinaryOp::Mul | BinaryOp::Div => {
                    let rk = r.numeric_kind().expect("numeric");
                    Ok(Type::Array(elem.unify(rk), shape.clone()))
                }
                _ => Err(op_error(
                    "Cannot perform operation other than * or / between Number and Array."
                        .to_string(),
                )),
            },

            (Type::Array(le, ls), Type::Array(re, rs)) => match op {
                BinaryOp::Add | BinaryOp::Sub => {
                    if ls == rs {
                        Ok(Type::Array(le.unify(*re), ls.clone()))
                    } else {
                        Err(op_error(format!(
                            "Cannot perform {op} for types {left} and {right}."
                        )))
                    }
                }
                BinaryOp::Mul => self.array_product(left, right, le, ls, re, rs, span),
                BinaryOp::Div | BinaryOp::Pow => Err(op_error(format!(
                    "Cannot perform {op} for types {left} and {right}."
                ))),
            },

            _ => unreachable!("operand domain covered above"),
        }
    }

    /// `*` between arrays, overloaded by shape: matrix product,
    /// matrix-vector, vector-matrix, or dot product.
    #[allow(clippy::too_many_arguments)]
    fn array_product(
        &self,
        left: &Type,
        right: &Type,
        le: &NumericKind,
        ls: &Shape,
        re: &NumericKind,
        rs: &Shape,
        span: Span,
    ) -> Result<Type, Diagnostic> {
        let elem = le.unify(*re);
        let lk = ls.kinds();
        let rk = rs.kinds();

        match (ls.dim(), rs.dim()) {
            (2, 2) => {
                if lk[1] == rk[0] {
                    Ok(Type::matrix(elem, lk[0], rk[1]))
                } else {
                    Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!("Cannot multiply matrices of types {left} and {right}."),
                    ))
                }
            }
            (2, 1) => {
                if lk[1] == rk[0] {
                    Ok(Type::vector(elem, lk[0]))
                } else {
                    Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!("Cannot multiply vector of type {right} with matrix of type {left}."),
                    ))
                }
            }
            (1, 2) => {
                if lk[0] == rk[0] {
                    Ok(Type::vector(elem, rk[1]))
                } else {
                    Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!("Cannot multiply vector of type {left} with matrix of type {right}."),
                    ))
                }
            }
            (1, 1) => {
                if lk[0] == rk[0] {
                    Ok(Type::scalar(elem))
                } else {
                    Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!("Cannot perform dot product for types {left} and {right}."),
                    ))
                }
            }
            _ => unreachable!("shapes have one or two dimensions"),
        }
    }

    /// `f(e)` against the mathematical function registry.
    fn check_call(&mut self, function: &Name, arg: &Expr, span: Span) -> Result<TypedExpr, Diagnostic> {
        let Some(sig) = registry::function(&function.text) else {
            return Err(self.error(
                DiagnosticKind::UndefinedSymbol,
                function.span,
                format!("Function {} is not known.", function.text),
            ));
        };
        let arg = self.check_expr(arg)?;
        if !arg.ty.assignable_to(&sig.arg) {
            return Err(self.error(
                DiagnosticKind::TypeMismatch,
                span,
                format!(
                    "Incompatible argument type for function {}. Got {}, expected {}.",
                    function.text, arg.ty, sig.arg
                ),
            ));
        }
        Ok(TypedExpr::new(
            TypedKind::Call {
                function: function.clone(),
                arg: Box::new(arg),
            },
            sig.result,
            span,
        ))
    }

    /// `sum[i](e)` - binds an annotated object template for the body.
    fn check_sum(&mut self, index: &Name, body: &Expr, span: Span) -> Result<TypedExpr, Diagnostic> {
        let Some(symbol) = self.scopes.resolve(&index.text) else {
            return Err(self.undefined(index));
        };

        let constraint = match &symbol.kind {
            SymbolKind::Object { constraint, .. } => constraint.clone(),
            SymbolKind::Formal { .. } => None,
            other => {
                return Err(self.error(
                    DiagnosticKind::TypeMismatch,
                    span,
                    format!(
                        "Sum has to iterate over Atom or Bond not {}.",
                        other.describe()
                    ),
                ));
            }
        };

        let newly_bound = self.mark_iterating(&index.text);
        let bonded_mark = self.bonded_mark();

        // An object template's constraint is validated when the object is
        // bound; its bonded pairs hold for the sum body.
        if let Some(constraint) = &constraint {
            self.check_constraint(constraint)?;
            self.collect_bonded(constraint);
        }

        let body = self.check_expr(body)?;

        self.restore_bonded(bonded_mark);
        if newly_bound {
            self.unmark_iterating(&index.text);
        }

        let ty = body.ty.clone();
        Ok(TypedExpr::new(
            TypedKind::Sum {
                index: index.clone(),
                body: Box::new(body),
            },
            ty,
            span,
        ))
    }

    /// `EE[i, j](diag, off, rhs [, cutoff|cover, r])` - the
    /// electronegativity-equalisation shorthand, checked for shape and
    /// element types only. Solves for the charge vector.
    #[allow(clippy::too_many_arguments)]
    fn check_ee(
        &mut self,
        row: &Name,
        col: &Name,
        diag: &Expr,
        off: &Expr,
        rhs: &Expr,
        kind: ccl_ast::EeKind,
        radius: Option<&Expr>,
        span: Span,
    ) -> Result<TypedExpr, Diagnostic> {
        if row.text == col.text
            || self.scopes.resolve(&row.text).is_some()
            || self.scopes.resolve(&col.text).is_some()
        {
            return Err(self.error(
                DiagnosticKind::Redefinition,
                span,
                "Index/indices for EE expression already defined.",
            ));
        }

        self.scopes.push();
        for name in [row, col] {
            self.scopes.insert(Symbol::new(
                name.text.clone(),
                SymbolKind::Object {
                    kind: ObjectKind::Atom,
                    constraint: None,
                },
                name.span,
            ));
            self.mark_iterating(&name.text);
        }

        let result = self.check_ee_parts(diag, off, rhs, radius, span);

        self.unmark_iterating(&row.text);
        self.unmark_iterating(&col.text);
        self.scopes.pop();

        let (diag, off, rhs, radius) = result?;
        Ok(TypedExpr::new(
            TypedKind::Ee {
                row: row.clone(),
                col: col.clone(),
                diag: Box::new(diag),
                off: Box::new(off),
                rhs: Box::new(rhs),
                kind,
                radius: radius.map(Box::new),
            },
            Type::vector(NumericKind::Float, ObjectKind::Atom),
            span,
        ))
    }

    #[allow(clippy::type_complexity)]
    fn check_ee_parts(
        &mut self,
        diag: &Expr,
        off: &Expr,
        rhs: &Expr,
        radius: Option<&Expr>,
        span: Span,
    ) -> Result<(TypedExpr, TypedExpr, TypedExpr, Option<TypedExpr>), Diagnostic> {
        let check_part = |analyser: &mut Self, part: &Expr| -> Result<TypedExpr, Diagnostic> {
            let part = analyser.check_expr(part)?;
            if !part.ty.is_numeric() {
                return Err(analyser.error(
                    DiagnosticKind::TypeMismatch,
                    span,
                    "EE expression has to have all parts with Float type.",
                ));
            }
            Ok(part)
        };

        let diag = check_part(self, diag)?;
        let off = check_part(self, off)?;
        let rhs = check_part(self, rhs)?;
        let radius = match radius {
            Some(radius) => Some(check_part(self, radius)?),
            None => None,
        };
        Ok((diag, off, rhs, radius))
    }

    /// An open substitution formal used where the subscript context expects
    /// a specific kind adopts that kind.
    fn refine_formal_kind(&mut self, index: &Expr, expected: ObjectKind) {
        if let Some(name) = index.as_name() {
            if let Some(symbol) = self.scopes.resolve_mut(&name.text) {
                if let SymbolKind::Formal { kind } = &mut symbol.kind {
                    if kind.is_none() {
                        *kind = Some(expected);
                    }
                }
            }
        }
    }

    fn bad_arity(&self, name: &Name, got: usize, expected: usize, span: Span) -> Diagnostic {
        self.error(
            DiagnosticKind::TypeMismatch,
            span,
            format!(
                "Bad number of indices for {}, got {got}, expected {expected}.",
                name.text
            ),
        )
    }

    fn substitution_index_error(&self, name: &Name, span: Span) -> Diagnostic {
        self.error(
            DiagnosticKind::TypeMismatch,
            span,
            format!(
                "Substitution indices for symbol {} must have type Atom or Bond.",
                name.text
            ),
        )
    }
}
