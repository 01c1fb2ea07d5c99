//! The immutable built-in registry: mathematical functions, predicates,
//! properties, and the element table.
//!
//! Shared read-only; the analyser never mutates it.

use ccl_ast::{NumericKind, ObjectKind, Type};

/// Signature of a built-in mathematical function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSig {
    pub name: &'static str,
    pub arg: Type,
    pub result: Type,
}

/// Argument slot of a built-in predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateArg {
    /// A bound `Atom` iterator
    Atom,
    /// A bound `Atom` or `Bond` iterator
    Object,
    /// A scalar numeric expression
    Numeric,
    /// A scalar `Int` expression
    Int,
    /// An element name (bare identifier or string literal)
    Element,
}

/// Signature of a built-in predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateSig {
    pub name: &'static str,
    pub args: &'static [PredicateArg],
}

/// Look up a mathematical function by name.
pub fn function(name: &str) -> Option<FunctionSig> {
    fn scalar(name: &'static str) -> FunctionSig {
        FunctionSig {
            name,
            arg: Type::Float,
            result: Type::Float,
        }
    }

    match name {
        "sin" => Some(scalar("sin")),
        "cos" => Some(scalar("cos")),
        "exp" => Some(scalar("exp")),
        "log" => Some(scalar("log")),
        "sqrt" => Some(scalar("sqrt")),
        "inv" => Some(FunctionSig {
            name: "inv",
            arg: Type::matrix(NumericKind::Float, ObjectKind::Atom, ObjectKind::Atom),
            result: Type::matrix(NumericKind::Float, ObjectKind::Atom, ObjectKind::Atom),
        }),
        _ => None,
    }
}

/// Look up a predicate by name.
pub fn predicate(name: &str) -> Option<PredicateSig> {
    match name {
        "bonded" => Some(PredicateSig {
            name: "bonded",
            args: &[PredicateArg::Atom, PredicateArg::Atom],
        }),
        "element" => Some(PredicateSig {
            name: "element",
            args: &[PredicateArg::Atom, PredicateArg::Element],
        }),
        "near" => Some(PredicateSig {
            name: "near",
            args: &[
                PredicateArg::Object,
                PredicateArg::Object,
                PredicateArg::Numeric,
            ],
        }),
        "bond_distance" => Some(PredicateSig {
            name: "bond_distance",
            args: &[PredicateArg::Atom, PredicateArg::Atom, PredicateArg::Int],
        }),
        _ => None,
    }
}

/// Index kinds of a property phrase, or `None` if the phrase is unknown.
///
/// All properties yield `Float` per index tuple; a bare reference to a
/// property symbol is the whole indexed array (see `PropertySig`).
pub fn property_args(phrase: &str) -> Option<Vec<ObjectKind>> {
    match phrase {
        "electronegativity"
        | "covalent radius"
        | "covradius"
        | "van der waals radius"
        | "vdwradius"
        | "formal charge" => Some(vec![ObjectKind::Atom]),
        "bond order" => Some(vec![ObjectKind::Bond]),
        "distance" | "bond distance" => Some(vec![ObjectKind::Atom, ObjectKind::Atom]),
        _ => None,
    }
}

/// Whether a property phrase can be taken `of <element>` in a constant
/// annotation. Geometry-dependent properties cannot.
pub fn is_element_property(phrase: &str) -> bool {
    matches!(
        phrase,
        "electronegativity"
            | "covalent radius"
            | "covradius"
            | "van der waals radius"
            | "vdwradius"
    )
}

/// `(symbol, lower-case English name)` for the 118 IUPAC elements.
const ELEMENTS: &[(&str, &str)] = &[
    ("H", "hydrogen"),
    ("He", "helium"),
    ("Li", "lithium"),
    ("Be", "beryllium"),
    ("B", "boron"),
    ("C", "carbon"),
    ("N", "nitrogen"),
    ("O", "oxygen"),
    ("F", "fluorine"),
    ("Ne", "neon"),
    ("Na", "sodium"),
    ("Mg", "magnesium"),
    ("Al", "aluminium"),
    ("Si", "silicon"),
    ("P", "phosphorus"),
    ("S", "sulfur"),
    ("Cl", "chlorine"),
    ("Ar", "argon"),
    ("K", "potassium"),
    ("Ca", "calcium"),
    ("Sc", "scandium"),
    ("Ti", "titanium"),
    ("V", "vanadium"),
    ("Cr", "chromium"),
    ("Mn", "manganese"),
    ("Fe", "iron"),
    ("Co", "cobalt"),
    ("Ni", "nickel"),
    ("Cu", "copper"),
    ("Zn", "zinc"),
    ("Ga", "gallium"),
    ("Ge", "germanium"),
    ("As", "arsenic"),
    ("Se", "selenium"),
    ("Br", "bromine"),
    ("Kr", "krypton"),
    ("Rb", "rubidium"),
    ("Sr", "strontium"),
    ("Y", "yttrium"),
    ("Zr", "zirconium"),
    ("Nb", "niobium"),
    ("Mo", "molybdenum"),
    ("Tc", "technetium"),
    ("Ru", "ruthenium"),
    ("Rh", "rhodium"),
    ("Pd", "palladium"),
    ("Ag", "silver"),
    ("Cd", "cadmium"),
    ("In", "indium"),
    ("Sn", "tin"),
    ("Sb", "antimony"),
    ("Te", "tellurium"),
    ("I", "iodine"),
    ("Xe", "xenon"),
    ("Cs", "caesium"),
    ("Ba", "barium"),
    ("La", "lanthanum"),
    ("Ce", "cerium"),
    ("Pr", "praseodymium"),
    ("Nd", "neodymium"),
    ("Pm", "promethium"),
    ("Sm", "samarium"),
    ("Eu", "europium"),
    ("Gd", "gadolinium"),
    ("Tb", "terbium"),
    ("Dy", "dysprosium"),
    ("Ho", "holmium"),
    ("Er", "erbium"),
    ("Tm", "thulium"),
    ("Yb", "ytterbium"),
    ("Lu", "lutetium"),
    ("Hf", "hafnium"),
    ("Ta", "tantalum"),
    ("W", "tungsten"),
    ("Re", "rhenium"),
    ("Os", "osmium"),
    ("Ir", "iridium"),
    ("Pt", "platinum"),
    ("Au", "gold"),
    ("Hg", "mercury"),
    ("Tl", "thallium"),
    ("Pb", "lead"),
    ("Bi", "bismuth"),
    ("Po", "polonium"),
    ("At", "astatine"),
    ("Rn", "radon"),
    ("Fr", "francium"),
    ("Ra", "radium"),
    ("Ac", "actinium"),
    ("Th", "thorium"),
    ("Pa", "protactinium"),
    ("U", "uranium"),
    ("Np", "neptunium"),
    ("Pu", "plutonium"),
    ("Am", "americium"),
    ("Cm", "curium"),
    ("Bk", "berkelium"),
    ("Cf", "californium"),
    ("Es", "einsteinium"),
    ("Fm", "fermium"),
    ("Md", "mendelevium"),
    ("No", "nobelium"),
    ("Lr", "lawrencium"),
    ("Rf", "rutherfordium"),
    ("Db", "dubnium"),
    ("Sg", "seaborgium"),
    ("Bh", "bohrium"),
    ("Hs", "hassium"),
    ("Mt", "meitnerium"),
    ("Ds", "darmstadtium"),
    ("Rg", "roentgenium"),
    ("Cn", "copernicium"),
    ("Nh", "nihonium"),
    ("Fl", "flerovium"),
    ("Mc", "moscovium"),
    ("Lv", "livermorium"),
    ("Ts", "tennessine"),
    ("Og", "oganesson"),
];

/// Whether a name matches an element symbol or lower-case name.
pub fn is_element(name: &str) -> bool {
    ELEMENTS
        .iter()
        .any(|(symbol, full)| *symbol == name || *full == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_lookup() {
        assert_eq!(function("sin").unwrap().arg, Type::Float);
        let inv = function("inv").unwrap();
        assert_eq!(inv.arg.to_string(), "Float[Atom, Atom]");
        assert!(function("magic").is_none());
    }

    #[test]
    fn test_predicate_arity() {
        assert_eq!(predicate("near").unwrap().args.len(), 3);
        assert_eq!(predicate("bonded").unwrap().args.len(), 2);
        assert!(predicate("love").is_none());
    }

    #[test]
    fn test_property_phrases() {
        assert_eq!(
            property_args("covradius"),
            Some(vec![ObjectKind::Atom])
        );
        assert_eq!(
            property_args("covalent radius"),
            property_args("covradius")
        );
        assert_eq!(
            property_args("distance"),
            Some(vec![ObjectKind::Atom, ObjectKind::Atom])
        );
        assert!(property_args("magnetism").is_none());
    }

    #[test]
    fn test_element_properties() {
        assert!(is_element_property("electronegativity"));
        assert!(!is_element_property("distance"));
        assert!(!is_element_property("bond order"));
    }

    #[test]
    fn test_elements() {
        assert!(is_element("H"));
        assert!(is_element("hydrogen"));
        assert!(is_element("oganesson"));
        assert!(!is_element("adamantine"));
        assert!(!is_element("Hydrogen"));
    }
}
