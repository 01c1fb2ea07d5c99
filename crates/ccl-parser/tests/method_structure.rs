//! Method, statement, and annotation structure.

use ccl_ast::{
    Annotation, Constraint, LValue, LogicOp, Method, ObjectKind, ParameterKind, SourceFile,
    Statement, SubstitutionLhs,
};

fn parse(source: &str) -> Method {
    let file = SourceFile::new(source.to_string());
    let tokens = ccl_lexer::lex(source).expect("lexes");
    ccl_parser::parse_method(&tokens, &file).expect("parses")
}

fn parse_err(source: &str) -> String {
    let file = SourceFile::new(source.to_string());
    let tokens = ccl_lexer::lex(source).expect("lexes");
    ccl_parser::parse_method(&tokens, &file)
        .expect_err("expected parse error")
        .message
}

#[test]
fn test_optional_method_header() {
    let with_header = parse("mulliken\nx = 1");
    assert_eq!(with_header.name.as_ref().unwrap().text, "mulliken");
    assert_eq!(with_header.statements.len(), 1);

    let without_header = parse("x = 1");
    assert!(without_header.name.is_none());
}

#[test]
fn test_for_loop_structure() {
    let method = parse("for i = 0 to 10:\n x = i\ndone");
    let Statement::For { var, body, .. } = &method.statements[0] else {
        panic!("expected for loop");
    };
    assert_eq!(var.text, "i");
    assert_eq!(body.len(), 1);
}

#[test]
fn test_for_each_with_decomposition_and_constraint() {
    let method = parse(
        "for each bond b = [i, j] such that near(i, j, 3.0):\n x = 1\ndone",
    );
    let Statement::ForEach {
        name,
        kind,
        decomposition,
        constraint,
        ..
    } = &method.statements[0]
    else {
        panic!("expected for each");
    };
    assert_eq!(name.text, "b");
    assert_eq!(*kind, ObjectKind::Bond);
    let (first, second) = decomposition.as_ref().unwrap();
    assert_eq!((first.text.as_str(), second.text.as_str()), ("i", "j"));
    assert!(matches!(constraint, Some(Constraint::Predicate { .. })));
}

#[test]
fn test_only_bonds_can_be_decomposed() {
    let err = parse_err("for each atom a = [i, j]:\n x = 1\ndone");
    assert_eq!(err, "Only bonds can be decomposed.");
}

#[test]
fn test_subscripted_assignment_target() {
    let method = parse("w[i, j] = 1.0\nwhere\ni is atom");
    let Statement::Assign { lhs, .. } = &method.statements[0] else {
        panic!("expected assignment");
    };
    let LValue::Subscript { name, indices } = lhs else {
        panic!("expected subscript lhs");
    };
    assert_eq!(name.text, "w");
    assert_eq!(indices.len(), 2);
}

#[test]
fn test_parameter_annotations() {
    let method = parse("x = 1\nwhere\na is atom parameter\nb is bond parameter\nc is common parameter");
    let kinds: Vec<ParameterKind> = method
        .annotations
        .iter()
        .map(|annotation| match annotation {
            Annotation::Parameter { kind, .. } => *kind,
            other => panic!("expected parameter, got {other:?}"),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![ParameterKind::Atom, ParameterKind::Bond, ParameterKind::Common]
    );
}

#[test]
fn test_object_annotation_with_constraint() {
    let method = parse("x = 1\nwhere\nh is atom such that element(h, hydrogen)");
    let Annotation::Object {
        name,
        kind,
        constraint,
        decomposition,
        ..
    } = &method.annotations[0]
    else {
        panic!("expected object annotation");
    };
    assert_eq!(name.text, "h");
    assert_eq!(*kind, ObjectKind::Atom);
    assert!(constraint.is_some());
    assert!(decomposition.is_none());
}

#[test]
fn test_decomposed_object_annotation() {
    let method = parse("x = 1\nwhere\nb = [i, j] is bond");
    let Annotation::Object {
        name,
        kind,
        decomposition,
        ..
    } = &method.annotations[0]
    else {
        panic!("expected object annotation");
    };
    assert_eq!(name.text, "b");
    assert_eq!(*kind, ObjectKind::Bond);
    assert!(decomposition.is_some());
}

#[test]
fn test_property_annotation_phrases() {
    let method = parse(
        "x = 1\nwhere\nr is van der waals radius\ns is covalent radius\nt is bond order\nu is electronegativity",
    );
    let phrases: Vec<&str> = method
        .annotations
        .iter()
        .map(|annotation| match annotation {
            Annotation::Property { property, .. } => property.as_str(),
            other => panic!("expected property, got {other:?}"),
        })
        .collect();
    assert_eq!(
        phrases,
        vec![
            "van der waals radius",
            "covalent radius",
            "bond order",
            "electronegativity"
        ]
    );
}

#[test]
fn test_bare_bond_is_object_not_property() {
    let method = parse("x = 1\nwhere\nb is bond");
    assert!(matches!(
        method.annotations[0],
        Annotation::Object {
            kind: ObjectKind::Bond,
            ..
        }
    ));
}

#[test]
fn test_constant_annotation() {
    let method = parse("x = 1\nwhere\nchi0 is electronegativity of oxygen");
    let Annotation::Constant {
        name,
        property,
        element,
        ..
    } = &method.annotations[0]
    else {
        panic!("expected constant annotation");
    };
    assert_eq!(name.text, "chi0");
    assert_eq!(property, "electronegativity");
    assert_eq!(element, "oxygen");
}

#[test]
fn test_substitution_annotations() {
    let method = parse("x = 1\nwhere\nd[i] = 1 if element(i, hydrogen)\nd[i] = 2\ne = 3");
    match &method.annotations[0] {
        Annotation::Substitution {
            lhs: SubstitutionLhs::Indexed { name, indices },
            constraint,
            ..
        } => {
            assert_eq!(name.text, "d");
            assert_eq!(indices.len(), 1);
            assert!(constraint.is_some());
        }
        other => panic!("expected substitution, got {other:?}"),
    }
    match &method.annotations[2] {
        Annotation::Substitution {
            lhs: SubstitutionLhs::Name(name),
            constraint,
            ..
        } => {
            assert_eq!(name.text, "e");
            assert!(constraint.is_none());
        }
        other => panic!("expected substitution, got {other:?}"),
    }
}

#[test]
fn test_constraint_connectives() {
    let method = parse(
        "for each atom a such that w[a] > 0.5 and not element(a, hydrogen):\n x = 1\ndone",
    );
    let Statement::ForEach { constraint, .. } = &method.statements[0] else {
        panic!("expected for each");
    };
    let Some(Constraint::Logical { op, left, right, .. }) = constraint else {
        panic!("expected logical constraint");
    };
    assert_eq!(*op, LogicOp::And);
    assert!(matches!(**left, Constraint::Compare { .. }));
    assert!(matches!(**right, Constraint::Not { .. }));
}

#[test]
fn test_comparison_with_call_backtracks_from_predicate() {
    // `sin(...) < 1.0` must parse as a comparison, `bonded(i, j)` as a
    // predicate; both start with `name (`.
    let method = parse(
        "for each bond b = [i, j] such that sin(w[b]) < 1.0 or bonded(i, j):\n x = 1\ndone",
    );
    let Statement::ForEach { constraint, .. } = &method.statements[0] else {
        panic!("expected for each");
    };
    let Some(Constraint::Logical { op: LogicOp::Or, left, right, .. }) = constraint else {
        panic!("expected or constraint");
    };
    assert!(matches!(**left, Constraint::Compare { .. }));
    assert!(matches!(**right, Constraint::Predicate { .. }));
}

#[test]
fn test_trailing_tokens_rejected() {
    let err = parse_err("x = 1\ndone");
    assert_eq!(err, "Unexpected 'done' after method.");
}

#[test]
fn test_missing_done_rejected() {
    let err = parse_err("for i = 0 to 2:\n x = 1");
    assert_eq!(err, "Expected 'done', found end of input.");
}
