//! Formula behaviour through `ReportFormatField::exec_formula`

use crate::types::ReportFormatField;

fn field(name: &str, formula: &str) -> ReportFormatField {
    ReportFormatField::new(name, "A1", formula)
}

// =========================================================================
// Identity
// =========================================================================

#[test]
fn test_empty_formula_returns_row_value() {
    for value in ["", "test", "2025/04/07", "  spaced  "] {
        assert_eq!(field("f", "").exec_formula(value).unwrap(), value);
    }
}

#[test]
fn test_own_name_returns_row_value() {
    let f = field("作成日", "作成日");
    assert_eq!(f.exec_formula("2025/04/07").unwrap(), "2025/04/07");
    assert_eq!(f.exec_formula("").unwrap(), "");
}

#[test]
fn test_other_literal_returns_itself() {
    assert_eq!(field("a", "固定値").exec_formula("ignored").unwrap(), "固定値");
}

// =========================================================================
// Dates
// =========================================================================

#[test]
fn test_nengo_of_row_value() {
    let f = field("作成日", "NENGO(CTOD(作成日))");
    assert_eq!(f.exec_formula("2025/04/07").unwrap(), "令和7年");
    assert_eq!(f.exec_formula("2018/12/31").unwrap(), "平成30年");
}

#[test]
fn test_nengo_of_quoted_literal() {
    let f = field("x", "NENGO(CTOD(\"2025/04/07\"))");
    assert_eq!(f.exec_formula("unused").unwrap(), "令和7年");
}

#[test]
fn test_wyear_of_row_value() {
    let f = field("d", "WYEAR(CTOD(d))");
    assert_eq!(f.exec_formula("2025/04/07").unwrap(), "7");
}

#[test]
fn test_ctod_alone_renders_iso_date() {
    let f = field("d", "CTOD(d)");
    assert_eq!(f.exec_formula("2025/04/07").unwrap(), "2025-04-07");
}

#[test]
fn test_unparseable_date_surfaces_as_type_error() {
    let f = field("d", "NENGO(CTOD(d))");
    let err = f.exec_formula("2025-04-07").unwrap_err();
    assert_eq!(err.kind(), "type");

    let f = field("d", "WYEAR(CTOD(d))");
    assert_eq!(f.exec_formula("bad").unwrap_err().kind(), "type");
}

#[test]
fn test_ctod_of_bad_text_alone_is_empty() {
    let f = field("d", "CTOD(d)");
    assert_eq!(f.exec_formula("bad").unwrap(), "");
}

// =========================================================================
// FORMAT
// =========================================================================

#[test]
fn test_format_nested_year() {
    let f = field("作成日", "FORMAT(WYEAR(CTOD(作成日)),\"Z9\")");
    assert_eq!(f.exec_formula("2025/04/07").unwrap(), "7");
    let f = field("作成日", "FORMAT(WYEAR(CTOD(作成日)), \"99\")");
    assert_eq!(f.exec_formula("2025/04/07").unwrap(), "07");
}

#[test]
fn test_format_numeric_literal() {
    let f = field("x", "FORMAT(1234.56, \"Z,ZZ0.00\")");
    assert_eq!(f.exec_formula("").unwrap(), "1,234.56");
    let f = field("x", "FORMAT(-1234.56, \"Z,ZZZ.00\")");
    assert_eq!(f.exec_formula("").unwrap(), "-1,234.56");
    let f = field("x", "FORMAT(0, \"0.00\")");
    assert_eq!(f.exec_formula("").unwrap(), "0.00");
}

#[test]
fn test_format_of_text_is_type_error() {
    let f = field("金額", "FORMAT(金額, \"Z,ZZ9\")");
    assert_eq!(f.exec_formula("1000").unwrap_err().kind(), "type");
}

#[test]
fn test_format_bad_pattern_is_format_error() {
    let f = field("x", "FORMAT(5, \"9Z\")");
    assert_eq!(f.exec_formula("").unwrap_err().kind(), "format");
}

// =========================================================================
// Leniency and errors
// =========================================================================

#[test]
fn test_unknown_function_is_empty() {
    let f = field("x", "UNKNOWN(x)");
    assert_eq!(f.exec_formula("value").unwrap(), "");
}

#[test]
fn test_unknown_function_inside_ctod_is_absent() {
    let f = field("x", "CTOD(UNKNOWN(x))");
    assert_eq!(f.exec_formula("2025/04/07").unwrap(), "");
    let f = field("x", "NENGO(CTOD(UNKNOWN(x)))");
    assert_eq!(f.exec_formula("2025/04/07").unwrap_err().kind(), "type");
}

#[test]
fn test_unbalanced_parentheses_are_parse_errors() {
    for formula in ["NENGO(CTOD(x)", "NENGO(CTOD(x)))", "F(a))(b", "x)"] {
        let err = field("x", formula).exec_formula("2025/04/07").unwrap_err();
        assert_eq!(err.kind(), "parse", "{formula}");
    }
}

#[test]
fn test_evaluation_is_pure() {
    let f = field("d", "NENGO(CTOD(d))");
    let first = f.exec_formula("2025/04/07").unwrap();
    let second = f.exec_formula("2025/04/07").unwrap();
    assert_eq!(first, second);
    assert_eq!(f.formula, "NENGO(CTOD(d))");
}
