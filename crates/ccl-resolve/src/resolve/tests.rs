//! Analyser tests: one per diagnostic family plus the typing rules.

use super::{analyse, AnalysedMethod};
use crate::resolve::scope::SymbolKind;
use ccl_ast::{Diagnostic, NumericKind, ObjectKind, SourceFile, Type};

fn analyse_source(source: &str) -> Result<AnalysedMethod, Diagnostic> {
    let file = SourceFile::new(source.to_string());
    let tokens = ccl_lexer::lex(source).expect("test source lexes");
    let method = ccl_parser::parse_method(&tokens, &file).expect("test source parses");
    analyse(&method)
}

fn first_error(source: &str) -> String {
    analyse_source(source).expect_err("expected a diagnostic").message
}

fn assert_ok(source: &str) -> AnalysedMethod {
    match analyse_source(source) {
        Ok(analysed) => analysed,
        Err(err) => panic!("expected success, got: {}", err.message),
    }
}

// === Symbol table ===

#[test]
fn test_redefinition_across_annotations() {
    let err = first_error("q = 1\nwhere\na is atom\na is bond");
    assert_eq!(err, "Symbol a already defined.");
}

#[test]
fn test_builtin_q_cannot_be_reannotated() {
    let err = first_error("x = 1\nwhere\nq is atom parameter");
    assert_eq!(err, "Symbol q already defined.");
}

#[test]
fn test_undefined_symbol() {
    assert_eq!(first_error("x = y + 1"), "Symbol y not defined.");
}

#[test]
fn test_scalar_variable_created_then_reused() {
    let analysed = assert_ok("x = 1\ny = x + 2");
    assert!(matches!(
        analysed.symbol("x").unwrap().kind,
        SymbolKind::Scalar(NumericKind::Int)
    ));
    assert!(matches!(
        analysed.symbol("y").unwrap().kind,
        SymbolKind::Scalar(NumericKind::Int)
    ));
}

// === Assignments ===

#[test]
fn test_cannot_assign_to_loop_variable() {
    let err = first_error("for i = 0 to 10:\ni = 1\ndone");
    assert_eq!(err, "Cannot assign to loop variable i.");
}

#[test]
fn test_cannot_assign_to_bound_iterator() {
    let err = first_error("for each atom a:\na = 1\ndone");
    assert_eq!(err, "Cannot assign to loop variable a.");
}

#[test]
fn test_cannot_assign_to_parameter() {
    let err = first_error("p = 1\nwhere\np is common parameter");
    assert_eq!(err, "Cannot assign to a parameter symbol p.");
}

#[test]
fn test_cannot_assign_to_property() {
    let err = first_error("alpha = 1\nwhere\nalpha is electronegativity");
    assert_eq!(err, "Cannot assign to a property symbol alpha.");
}

#[test]
fn test_cannot_assign_to_substitution() {
    let err = first_error("d = 1\nwhere\nd = 2");
    assert_eq!(err, "Cannot assign to a substitution symbol d.");
}

#[test]
fn test_cannot_assign_nonnumeric() {
    let err = first_error("x = bp\nwhere\nbp is bond parameter");
    assert_eq!(err, "Only Numbers and Arrays can be assigned not Bond Parameter.");
}

#[test]
fn test_scalar_type_mismatch() {
    let err = first_error("x = 1\nx = 1.5");
    assert_eq!(err, "Cannot assign Float to the variable x of type Int.");
}

#[test]
fn test_int_promotes_into_float_slot() {
    assert_ok("x = 1.5\nx = 1");
}

#[test]
fn test_bare_assignment_adopts_array_type() {
    let analysed = assert_ok("v = 2 * q");
    match &analysed.symbol("v").unwrap().kind {
        SymbolKind::Array { elem, shape } => {
            assert_eq!(*elem, NumericKind::Float);
            assert_eq!(shape.kinds(), &[ObjectKind::Atom]);
        }
        other => panic!("expected array symbol, got {other:?}"),
    }
}

#[test]
fn test_array_rank_mismatch_on_assignment() {
    let err = first_error(
        "for each atom a:\nx[a, a] = 1.0\ndone\nfor each atom b:\nx[b] = 2.0\ndone",
    );
    assert_eq!(
        err,
        "Cannot assign Float[Atom] to the variable x of type Float[Atom, Atom]."
    );
}

#[test]
fn test_array_index_kind_mismatch() {
    let err = first_error(
        "for each atom a:\nq[a] = 1\ndone\nfor each bond b:\nq[b] = 1\ndone",
    );
    assert_eq!(
        err,
        "Cannot index Array of type Float[Atom] using index/indices of type(s) Bond."
    );
}

#[test]
fn test_subscripted_parameter_lhs() {
    let err = first_error("for each atom a:\np[a] = 1\ndone\nwhere\np is common parameter");
    assert_eq!(err, "Cannot assign to non-Array type Common Parameter.");
}

#[test]
fn test_indexing_scalar() {
    let err = first_error("x = 1\nfor each atom a:\ny = x[a]\ndone");
    assert_eq!(err, "Cannot index type Int with indices of type(s) Atom.");
}

#[test]
fn test_array_survives_its_loop() {
    // chi is created inside the atom loop but filled for every atom, so the
    // bond loop can still read it.
    assert_ok(
        "for each atom a:\nchi[a] = q[a] + 1\ndone\nfor each bond e = [i, j]:\nx = chi[i] - chi[j]\ndone",
    );
}

// === Loops ===

#[test]
fn test_for_bounds_must_be_int() {
    assert_eq!(
        first_error("for i = 1.5 to 2:\nx = 1\ndone"),
        "For loop lower bound not Int."
    );
    assert_eq!(
        first_error("for i = 1 to 2.5:\nx = 1\ndone"),
        "For loop upper bound not Int."
    );
}

#[test]
fn test_loop_variable_already_defined() {
    let err = first_error("for i = 0 to 2:\nfor i = 0 to 3:\nx = 1\ndone\ndone");
    assert_eq!(err, "Loop variable i already defined.");
}

#[test]
fn test_for_each_name_collides_with_annotation() {
    let err = first_error("for each atom a:\nx = 1\ndone\nwhere\na is atom");
    assert_eq!(err, "Loop variable a already defined.");
}

#[test]
fn test_decomposition_names_must_be_fresh() {
    let err = first_error("x = 1\nfor each bond b = [x, j]:\ny = 1\ndone");
    assert_eq!(err, "Decomposition of bond symbol b used already defined names.");
}

#[test]
fn test_loop_scope_closed_at_done() {
    let err = first_error("for i = 0 to 2:\nx = i\ndone\ny = i");
    assert_eq!(err, "Symbol i not defined.");
}

// === Objects and binding ===

#[test]
fn test_object_template_needs_binding() {
    let err = first_error("x = a\nwhere\na is atom");
    assert_eq!(err, "Object a not bound to any For/ForEach/Sum.");
}

#[test]
fn test_sum_binds_object_template() {
    let analysed = assert_ok("s = sum[a](q[a])\nwhere\na is atom");
    assert!(matches!(
        analysed.symbol("s").unwrap().kind,
        SymbolKind::Scalar(NumericKind::Float)
    ));
}

#[test]
fn test_sum_over_parameter() {
    let err = first_error("s = sum[p](1)\nwhere\np is common parameter");
    assert_eq!(err, "Sum has to iterate over Atom or Bond not Common Parameter.");
}

#[test]
fn test_sum_over_undefined() {
    assert_eq!(first_error("s = sum[z](1)"), "Symbol z not defined.");
}

#[test]
fn test_sum_validates_template_constraint_at_binding() {
    let err = first_error("s = sum[a](q[a])\nwhere\na is atom such that element(a, adamantine)");
    assert_eq!(err, "Unknown element adamantine.");
}

// === Parameters and properties ===

#[test]
fn test_atom_parameter_indexed_with_bond() {
    let err = first_error("for each bond b:\nx = ap[b]\ndone\nwhere\nap is atom parameter");
    assert_eq!(err, "Cannot index atom parameter with Bond.");
}

#[test]
fn test_bond_parameter_indexed_with_atom() {
    let err = first_error("for each atom a:\nx = bp[a]\ndone\nwhere\nbp is bond parameter");
    assert_eq!(err, "Cannot index bond parameter with Atom.");
}

#[test]
fn test_bond_parameter_by_non_bonded_atoms() {
    let err = first_error(
        "for each atom i:\nfor each atom j:\ns = B[i, j]\ndone\ndone\nwhere\nB is bond parameter",
    );
    assert_eq!(err, "Cannot index bond parameter by two non-bonded atoms.");
}

#[test]
fn test_bond_parameter_by_decomposed_atoms() {
    assert_ok("for each bond e = [i, j]:\ns = B[i, j]\ndone\nwhere\nB is bond parameter");
}

#[test]
fn test_bond_parameter_by_constraint_bonded_atoms() {
    assert_ok(
        "for each atom i:\nfor each atom j such that bonded(i, j):\ns = B[i, j]\ndone\ndone\nwhere\nB is bond parameter",
    );
}

#[test]
fn test_common_parameter_cannot_be_indexed() {
    let err = first_error("for each atom a:\nx = p[a]\ndone\nwhere\np is common parameter");
    assert_eq!(err, "Cannot index common parameter.");
}

#[test]
fn test_common_parameter_reads_as_float() {
    assert_ok("x = p + 1.0\nwhere\np is common parameter");
}

#[test]
fn test_unknown_property() {
    let err = first_error("x = 1\nwhere\nalpha is magnetism");
    assert_eq!(err, "Property magnetism is not known.");
}

#[test]
fn test_property_aliases() {
    assert_ok(
        "for each atom a:\nx = r1[a] + r2[a]\ndone\nwhere\nr1 is covradius\nr2 is vdwradius",
    );
}

#[test]
fn test_bare_property_reference_is_array() {
    let analysed = assert_ok("en = chi * 1.0\nwhere\nchi is electronegativity");
    match &analysed.symbol("en").unwrap().kind {
        SymbolKind::Array { shape, .. } => assert_eq!(shape.kinds(), &[ObjectKind::Atom]),
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn test_builtin_distance_matrix() {
    // R is the pre-defined distance property: Float[Atom, Atom] bare.
    assert_ok("minv = inv(R)\nv = R * q");
}

// === Constants ===

#[test]
fn test_constant_of_element() {
    let analysed = assert_ok("x = chi0 * 2.0\nwhere\nchi0 is electronegativity of hydrogen");
    assert!(matches!(
        analysed.symbol("chi0").unwrap().kind,
        SymbolKind::Constant
    ));
}

#[test]
fn test_constant_property_must_be_elemental() {
    let err = first_error("x = 1\nwhere\nr0 is distance of hydrogen");
    assert_eq!(err, "Function distance is not a property.");
}

#[test]
fn test_constant_unknown_element() {
    let err = first_error("x = 1\nwhere\nchi0 is electronegativity of adamantine");
    assert_eq!(err, "Element adamantine not known.");
}

// === Substitutions ===

#[test]
fn test_substitution_needs_default() {
    let err = first_error("q[a] = 1\nwhere\na is atom\nd[i] = 1 if element(i, hydrogen)");
    assert_eq!(err, "No default option specified for Substitution symbol d.");
}

#[test]
fn test_substitution_duplicate_constraint() {
    let err = first_error(
        "x = 1\nwhere\nd[i] = 1 if element(i, hydrogen)\nd[i] = 2 if element(i, hydrogen)",
    );
    assert_eq!(err, "Same constraint already defined for symbol d.");
}

#[test]
fn test_substitution_duplicate_default() {
    let err = first_error("x = 1\nwhere\nd = 1\nd = 2");
    assert_eq!(err, "Same constraint already defined for symbol d.");
}

#[test]
fn test_zero_arity_substitution_cannot_have_constraint() {
    let err = first_error("x = 1\nwhere\na is atom\nd = 1 if element(a, hydrogen)");
    assert_eq!(err, "Substitution symbol d cannot have a constraint.");
}

#[test]
fn test_substitution_arity_must_agree() {
    let err = first_error("x = 1\nwhere\nd[i] = 1 if element(i, hydrogen)\nd[i, j] = 2");
    assert_eq!(err, "Substitution symbol d has different indices defined.");
}

#[test]
fn test_substitution_kinds_must_agree() {
    // First clause forces a Bond index via the bond parameter, the second
    // forces Atom via the atom parameter.
    let err = first_error(
        "x = 1\nwhere\nbp is bond parameter\nap is atom parameter\nd[i] = bp[i] if near(i, i, 2.0)\nd[j] = ap[j]",
    );
    assert_eq!(err, "Substitution symbol d has different indices defined.");
}

#[test]
fn test_substitution_result_types_must_agree() {
    let err = first_error("x = 1\nwhere\na is atom\nd[i] = q if element(i, hydrogen)\nd[i] = 1");
    assert_eq!(
        err,
        "All expressions within a substitution symbol d must have same type."
    );
}

#[test]
fn test_substitution_results_unify_over_promotion() {
    assert_ok("x = 1\nwhere\nd[i] = 1 if element(i, hydrogen)\nd[i] = 2.5");
}

#[test]
fn test_substitution_cannot_nest() {
    let err = first_error("x = 1\nwhere\nm = 2\nd = m + 1");
    assert_eq!(err, "Cannot nest substitution m in another substitution d.");
}

#[test]
fn test_substitution_redefines_other_class() {
    let err = first_error("x = 1\nwhere\np is atom parameter\np[i] = 1");
    assert_eq!(err, "Symbol p already defined as something else.");
}

#[test]
fn test_substitution_bad_arity_at_use() {
    let err = first_error("x = d[a, b]\nwhere\nd[i] = 1\na is atom\nb is atom");
    assert_eq!(err, "Bad number of indices for d, got 2, expected 1.");
}

#[test]
fn test_substitution_bare_use_of_indexed() {
    let err = first_error("x = d\nwhere\nd[i] = 1");
    assert_eq!(err, "Bad number of indices for d, got 0, expected 1.");
}

#[test]
fn test_substitution_index_must_be_object() {
    let err = first_error("x = d[1]\nwhere\nd[i] = 2");
    assert_eq!(err, "Substitution indices for symbol d must have type Atom or Bond.");
}

#[test]
fn test_substitution_open_kind_adopts_use_site() {
    let analysed = assert_ok(
        "for each bond b:\nx[b] = w[b]\ndone\nwhere\nw[i] = 1.5",
    );
    match &analysed.symbol("x").unwrap().kind {
        SymbolKind::Array { shape, .. } => assert_eq!(shape.kinds(), &[ObjectKind::Bond]),
        other => panic!("expected array, got {other:?}"),
    }
}

// === Arithmetic and shapes ===

#[test]
fn test_scalar_promotion() {
    let analysed = assert_ok("x = 1 + 2\ny = 1 / 2\nz = x * 2.0\nw = 2 ^ 3");
    assert!(matches!(
        analysed.symbol("x").unwrap().kind,
        SymbolKind::Scalar(NumericKind::Int)
    ));
    assert!(matches!(
        analysed.symbol("y").unwrap().kind,
        SymbolKind::Scalar(NumericKind::Int)
    ));
    assert!(matches!(
        analysed.symbol("z").unwrap().kind,
        SymbolKind::Scalar(NumericKind::Float)
    ));
    assert!(matches!(
        analysed.symbol("w").unwrap().kind,
        SymbolKind::Scalar(NumericKind::Int)
    ));
}

#[test]
fn test_scalar_array_broadcast() {
    assert_ok("v = 2 * q\nw = q / 2\nu = 0.5 * q * 2");
}

#[test]
fn test_scalar_over_array_rejected() {
    let err = first_error("x = 1 / q");
    assert_eq!(err, "Cannot perform / for types Int and Float[Atom].");
}

#[test]
fn test_scalar_array_addition_rejected() {
    let err = first_error("x = 1 + q");
    assert_eq!(
        err,
        "Cannot perform operation other than * or / between Number and Array."
    );
}

#[test]
fn test_array_addition_shape_mismatch() {
    let err = first_error("for each bond b:\nw[b] = 1.0\ndone\nx = q + w");
    assert_eq!(err, "Cannot perform + for types Float[Atom] and Float[Bond].");
}

#[test]
fn test_array_power_rejected() {
    let err = first_error("x = q ^ q");
    assert_eq!(err, "Cannot perform ^ for types Float[Atom] and Float[Atom].");
}

#[test]
fn test_dot_product() {
    let analysed = assert_ok("s = q * q");
    assert!(matches!(
        analysed.symbol("s").unwrap().kind,
        SymbolKind::Scalar(NumericKind::Float)
    ));
}

#[test]
fn test_dot_product_mismatch() {
    let err = first_error("for each bond b:\nw[b] = 1.0\ndone\nx = q * w");
    assert_eq!(err, "Cannot perform dot product for types Float[Atom] and Float[Bond].");
}

#[test]
fn test_matrix_vector_product() {
    let analysed = assert_ok("v = R * q");
    match &analysed.symbol("v").unwrap().kind {
        SymbolKind::Array { shape, .. } => assert_eq!(shape.kinds(), &[ObjectKind::Atom]),
        other => panic!("expected vector, got {other:?}"),
    }
}

#[test]
fn test_matrix_vector_mismatch() {
    let err = first_error("for each bond b:\nw[b] = 1.0\ndone\nx = R * w");
    assert_eq!(
        err,
        "Cannot multiply vector of type Float[Bond] with matrix of type Float[Atom, Atom]."
    );
}

#[test]
fn test_matrix_product() {
    assert_ok("M = R * R");
}

#[test]
fn test_object_in_arithmetic() {
    let err = first_error("for each bond b:\nx = b + 1.0\ndone");
    assert_eq!(err, "Cannot perform + for types Bond and Float.");
}

// === Functions ===

#[test]
fn test_unknown_function() {
    assert_eq!(first_error("x = magic(1.0)"), "Function magic is not known.");
}

#[test]
fn test_function_argument_mismatch() {
    let err = first_error("for each atom a:\nx = sin(a)\ndone");
    assert_eq!(
        err,
        "Incompatible argument type for function sin. Got Atom, expected Float."
    );
}

#[test]
fn test_function_int_argument_promotes() {
    assert_ok("x = sqrt(2)");
}

#[test]
fn test_inv_requires_square_matrix() {
    let err = first_error("x = inv(q)");
    assert_eq!(
        err,
        "Incompatible argument type for function inv. Got Float[Atom], expected Float[Atom, Atom]."
    );
}

// === EE expressions ===

#[test]
fn test_ee_types_to_charge_vector() {
    let analysed = assert_ok(
        "q = EE[i, j](2.0 * hard[i], 1 / R[i, j], -en[i])\nwhere\nen is atom parameter\nhard is atom parameter",
    );
    let q = analysed.symbol("q").unwrap();
    assert_eq!(
        q.kind.value_type(),
        Some(Type::vector(NumericKind::Float, ObjectKind::Atom))
    );
}

#[test]
fn test_ee_cutoff_variant() {
    assert_ok(
        "q = EE[i, j](hard[i], 1 / R[i, j], -en[i], cutoff, 8.0)\nwhere\nen is atom parameter\nhard is atom parameter",
    );
}

#[test]
fn test_ee_indices_must_be_fresh() {
    let err = first_error("for each atom i:\nx = EE[i, j](1.0, 1.0, 1.0)\ndone");
    assert_eq!(err, "Index/indices for EE expression already defined.");
}

#[test]
fn test_ee_parts_must_be_float() {
    let err = first_error("x = EE[i, j](q, 1.0, 1.0)");
    assert_eq!(err, "EE expression has to have all parts with Float type.");
}

// === Constraints and predicates ===

#[test]
fn test_unknown_predicate() {
    let err = first_error("for each atom a such that love(a):\nq[a] = 1.0\ndone");
    assert_eq!(err, "Predicate love not defined.");
}

#[test]
fn test_predicate_arity() {
    let err = first_error("for each atom a such that near(a):\nq[a] = 1.0\ndone");
    assert_eq!(err, "Predicate near should have 3 arguments but got 1 instead.");
}

#[test]
fn test_predicate_object_not_bound() {
    let err = first_error(
        "for each atom a such that bonded(a, c):\nq[a] = 1.0\ndone\nwhere\nc is atom",
    );
    assert_eq!(err, "Object c not bound to ForEach or Sum.");
}

#[test]
fn test_element_argument_must_be_atom() {
    let err = first_error("for each bond b such that element(b, hydrogen):\nx = 1\ndone");
    assert_eq!(err, "Predicate's element argument is not Atom.");
}

#[test]
fn test_bonded_argument_must_be_atom() {
    let err = first_error("for each bond b such that bonded(b, b):\nx = 1\ndone");
    assert_eq!(err, "Predicate's bonded argument is not Atom.");
}

#[test]
fn test_element_argument_must_be_string() {
    let err = first_error("for each atom a such that element(a, 1):\nx = 1\ndone");
    assert_eq!(err, "Predicate element expected string argument.");
}

#[test]
fn test_element_accepts_quoted_and_bare_names() {
    assert_ok("for each atom a such that element(a, \"oxygen\"):\nq[a] = 1.0\ndone");
    assert_ok("for each atom a such that element(a, O):\nq[a] = 1.0\ndone");
}

#[test]
fn test_unknown_element_in_predicate() {
    let err = first_error("x = 1\nwhere\nd[i] = 1 if element(i, adamantine)\nd[i] = 2");
    assert_eq!(err, "Unknown element adamantine.");
}

#[test]
fn test_near_numeric_argument() {
    let err = first_error("for each atom a such that near(a, a, a):\nx = 1\ndone");
    assert_eq!(err, "Predicate near expected numeric argument.");
}

#[test]
fn test_near_accepts_bonds_and_atoms() {
    assert_ok("for each atom a:\nfor each bond b such that near(a, b, 3.0):\nx = 1\ndone\ndone");
}

#[test]
fn test_bond_distance_wants_int() {
    assert_ok(
        "for each atom a:\nfor each atom b such that bond_distance(a, b, 3):\nx = 1\ndone\ndone",
    );
    let err = first_error(
        "for each atom a:\nfor each atom b such that bond_distance(a, b, 3.0):\nx = 1\ndone\ndone",
    );
    assert_eq!(err, "Predicate bond_distance expected numeric argument.");
}

#[test]
fn test_comparison_requires_numeric() {
    let err = first_error("for each atom a such that a > 1:\nx = 1\ndone");
    assert_eq!(err, "Cannot perform > for types Atom and Int.");
}

#[test]
fn test_comparison_over_subscripts() {
    assert_ok("for each atom a such that q[a] > 0.5 and not q[a] > 1.5:\nq[a] = 0.0\ndone");
}

// === Whole methods ===

#[test]
fn test_peoe_style_method() {
    let source = "\
peoe
for k = 1 to 6:
    for each atom i:
        chi[i] = a[i] + b[i] * q[i] + c[i] * q[i] ^ 2
    done
    for each bond e = [i, j]:
        q[i] = q[i] + (chi[j] - chi[i]) * dp[i, j] * 0.5 ^ k
        q[j] = q[j] - (chi[j] - chi[i]) * dp[i, j] * 0.5 ^ k
    done
done
where
a is atom parameter
b is atom parameter
c is atom parameter
chi0 is electronegativity of hydrogen
dp[i, j] = 1 / chi0 if element(i, hydrogen)
dp[i, j] = 0.5
";
    let analysed = assert_ok(source);
    assert_eq!(analysed.name.as_deref(), Some("peoe"));
    assert_eq!(
        analysed.symbol("q").unwrap().kind.value_type(),
        Some(Type::vector(NumericKind::Float, ObjectKind::Atom))
    );
    // chi was created inside the outer for, so it is not a global
    assert!(analysed.symbol("chi").is_none());
}

#[test]
fn test_substitution_state_survives_unconstrained_only() {
    // A constant substitution needs no default clause machinery.
    assert_ok("x = d + 1\nwhere\nd = 42");
}
