mod common;

use common::*;
use docxide_quiz::Error;
use docxide_quiz::latex::{fix_greek_spacing, omml_to_latex};

fn latex(inner: &str) -> String {
    omml_to_latex(&omml_fragment(inner)).expect("well-formed OMML")
}

fn fraction(num: &str, den: &str) -> String {
    format!("<m:f><m:num>{num}</m:num><m:den>{den}</m:den></m:f>")
}

fn delimited(props: &str, parts: &[&str]) -> String {
    let parts: String = parts.iter().map(|p| format!("<m:e>{}</m:e>", mr(p))).collect();
    format!("<m:d><m:dPr>{props}</m:dPr>{parts}</m:d>")
}

/// Braces balance, ignoring escaped `\{` / `\}`.
fn balanced(latex: &str) -> bool {
    let mut depth = 0i32;
    let mut chars = latex.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

#[test]
fn simple_fraction() {
    assert_eq!(latex(&fraction(&mr("1"), &mr("2"))), "\\frac{1}{2}");
}

#[test]
fn square_root_inside_fraction() {
    let rad = format!(
        r#"<m:rad><m:radPr><m:degHide m:val="1"/></m:radPr><m:deg/><m:e>{}</m:e></m:rad>"#,
        mr("x")
    );
    assert_eq!(latex(&fraction(&rad, &mr("2"))), "\\frac{\\sqrt{x}}{2}");
}

#[test]
fn cube_root_keeps_degree() {
    let rad = format!(
        "<m:rad><m:deg>{}</m:deg><m:e>{}</m:e></m:rad>",
        mr("3"),
        mr("8")
    );
    assert_eq!(latex(&rad), "\\sqrt[3]{8}");
}

#[test]
fn scripts() {
    let sup = format!(
        "<m:sSup><m:e>{}</m:e><m:sup>{}</m:sup></m:sSup>",
        mr("x"),
        mr("2")
    );
    assert_eq!(latex(&sup), "x^{2}");

    let sub = format!(
        "<m:sSub><m:e>{}</m:e><m:sub>{}</m:sub></m:sSub>",
        mr("a"),
        mr("n")
    );
    assert_eq!(latex(&sub), "a_{n}");

    let both = format!(
        "<m:sSubSup><m:sSubSupPr/><m:e>{}</m:e><m:sub>{}</m:sub><m:sup>{}</m:sup></m:sSubSup>",
        mr("x"),
        mr("i"),
        mr("2")
    );
    assert_eq!(latex(&both), "x_{i}^{2}");
}

#[test]
fn summation_with_limits() {
    let sum = format!(
        r#"<m:nary><m:naryPr><m:chr m:val="∑"/></m:naryPr><m:sub>{}</m:sub><m:sup>{}</m:sup><m:e>{}</m:e></m:nary>"#,
        mr("i=1"),
        mr("n"),
        mr("i")
    );
    assert_eq!(latex(&sum), "\\sum\\limits_{i=1}^{n} {i}");
}

#[test]
fn nary_without_glyph_is_an_integral() {
    let int = format!(
        r#"<m:nary><m:naryPr><m:limLoc m:val="subSup"/></m:naryPr><m:sub>{}</m:sub><m:sup>{}</m:sup><m:e>{}</m:e></m:nary>"#,
        mr("0"),
        mr("1"),
        mr("x dx")
    );
    assert_eq!(latex(&int), "\\int\\limits_{0}^{1} {x dx}");
}

#[test]
fn delimiters() {
    // No properties: parentheses
    assert_eq!(latex(&delimited("", &["x+1"])), "\\left( x+1 \\right)");

    // Evaluation bar: empty opener, bar closer
    assert_eq!(
        latex(&delimited(
            r#"<m:begChr m:val=""/><m:endChr m:val="|"/>"#,
            &["F(x)"]
        )),
        "\\left. F(x) \\right|"
    );

    // System of equations: brace opener, no closer
    assert_eq!(
        latex(&delimited(r#"<m:begChr m:val="{"/>"#, &["x=1"])),
        "\\left\\{ x=1 \\right."
    );
    assert_eq!(
        latex(&delimited(
            r#"<m:begChr m:val="{"/><m:endChr m:val=""/>"#,
            &["x=1"]
        )),
        "\\left\\{ x=1 \\right."
    );

    // Square brackets, braces and bars close themselves whatever endChr says
    assert_eq!(
        latex(&delimited(
            r#"<m:begChr m:val="["/><m:endChr m:val=")"/>"#,
            &["1;2"]
        )),
        "\\left[ 1;2 \\right]"
    );
    assert_eq!(
        latex(&delimited(
            r#"<m:begChr m:val="{"/><m:endChr m:val="}"/>"#,
            &["1;2"]
        )),
        "\\left\\{ 1;2 \\right."
    );
    assert_eq!(
        latex(&delimited(
            r#"<m:begChr m:val="|"/><m:endChr m:val=")"/>"#,
            &["x"]
        )),
        "\\left| x \\right|"
    );

    // Other openers keep their explicit closer
    assert_eq!(
        latex(&delimited(
            r#"<m:begChr m:val="("/><m:endChr m:val="]"/>"#,
            &["0;1"]
        )),
        "\\left( 0;1 \\right]"
    );
    assert_eq!(
        latex(&delimited(r#"<m:begChr m:val="⟨"/>"#, &["u,v"])),
        "\\left\\langle u,v \\right\\rangle"
    );
    assert_eq!(
        latex(&delimited(r#"<m:begChr m:val="["/>"#, &["1;2"])),
        "\\left[ 1;2 \\right]"
    );

    assert_eq!(
        latex(&delimited(
            r#"<m:begChr m:val="|"/><m:endChr m:val="|"/>"#,
            &["x"]
        )),
        "\\left| x \\right|"
    );
}

#[test]
fn delimiter_parts_are_separated() {
    assert_eq!(
        latex(&delimited(r#"<m:sepChr m:val=";"/>"#, &["a", "b"])),
        "\\left( a;b \\right)"
    );
    assert_eq!(
        latex(&delimited("", &["a", "b"])),
        "\\left( a|b \\right)"
    );
}

#[test]
fn unknown_construct_keeps_its_text() {
    let func = format!(
        "<m:func><m:fName>{}</m:fName><m:e>{}</m:e></m:func>",
        mr("sin"),
        mr("x")
    );
    assert_eq!(latex(&func), "sinx");
}

#[test]
fn empty_constructs_still_produce_output() {
    assert_eq!(latex("<m:f/>"), "\\frac{}{}");
    assert_eq!(latex("<m:rad/>"), "\\sqrt{}");
}

#[test]
fn greek_names_get_separated() {
    assert_eq!(latex(&mr("\\alphax")), "\\alpha x");

    assert_eq!(fix_greek_spacing("\\alphax+\\beta{1}"), "\\alpha x+\\beta{1}");
    assert_eq!(fix_greek_spacing("2\\pi"), "2\\pi ");
    assert_eq!(fix_greek_spacing("\\epsilon2"), "\\epsilon 2");
    assert_eq!(fix_greek_spacing("\\eta\\theta"), "\\eta \\theta ");
    assert_eq!(fix_greek_spacing("\\varepsilon"), "\\varepsilon");
    assert_eq!(fix_greek_spacing("\\frac{a}{b}"), "\\frac{a}{b}");
}

#[test]
fn greek_fix_is_idempotent() {
    for input in [
        "\\alphax",
        "\\pi",
        "\\beta \\gamma",
        "\\omega}{\\mu",
        "a\\lambda\\lambdab",
        "\\",
        "",
    ] {
        let once = fix_greek_spacing(input);
        assert_eq!(fix_greek_spacing(&once), once, "input {input:?}");
    }
}

#[test]
fn malformed_fragment_is_a_markup_error() {
    let result = omml_to_latex("<m:oMath><m:f>");
    assert!(matches!(result, Err(Error::Markup(_))));
}

fn wrap(kind: usize, inner: &str) -> String {
    match kind {
        0 => fraction(inner, &mr("2")),
        1 => format!("<m:rad><m:deg/><m:e>{inner}</m:e></m:rad>"),
        2 => format!(
            "<m:sSubSup><m:e>{inner}</m:e><m:sub>{}</m:sub><m:sup>{inner}</m:sup></m:sSubSup>",
            mr("i")
        ),
        3 => format!(
            r#"<m:nary><m:naryPr><m:chr m:val="∑"/></m:naryPr><m:sub>{}</m:sub><m:sup>{}</m:sup><m:e>{inner}</m:e></m:nary>"#,
            mr("k=0"),
            mr("n")
        ),
        _ => format!("<m:d><m:e>{inner}</m:e></m:d>"),
    }
}

#[test]
fn nested_constructs_convert_with_balanced_braces() {
    for a in 0..5 {
        for b in 0..5 {
            for c in 0..5 {
                let xml = wrap(a, &wrap(b, &wrap(c, &mr("x"))));
                let out = latex(&xml);
                assert!(!out.is_empty(), "{a}/{b}/{c}");
                assert!(out.contains('x'), "{a}/{b}/{c}: {out}");
                assert!(balanced(&out), "{a}/{b}/{c}: {out}");
            }
        }
    }
}
