pub(crate) const MATH_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";

const GREEK: [&str; 24] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "omicron", "pi", "rho", "sigma", "tau", "upsilon", "phi", "chi",
    "psi", "omega",
];

/// OMML mapped onto a closed set of constructs. Anything not understood
/// becomes `Unknown` and converts to the LaTeX of its children.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum MathNode {
    /// `m:oMath`, `m:oMathPara`, `m:e`.
    Group(Vec<MathNode>),
    /// `m:sSub`, `m:sSup`, `m:sSubSup`.
    Script {
        base: Vec<MathNode>,
        sub: Option<Vec<MathNode>>,
        sup: Option<Vec<MathNode>>,
    },
    Fraction {
        num: Vec<MathNode>,
        den: Vec<MathNode>,
    },
    Radical {
        degree: Option<Vec<MathNode>>,
        base: Vec<MathNode>,
    },
    /// Sums, integrals and friends. `op` is the raw `m:chr` glyph.
    Nary {
        op: Option<String>,
        lower: Option<Vec<MathNode>>,
        upper: Option<Vec<MathNode>>,
        operand: Vec<MathNode>,
    },
    /// `m:d`. Brackets are `None` when `m:dPr` does not set them.
    Delimited {
        open: Option<String>,
        close: Option<String>,
        separator: Option<String>,
        parts: Vec<Vec<MathNode>>,
    },
    Text(String),
    Unknown(Vec<MathNode>),
}

fn math<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(MATH_NS))
}

fn math_val(props: roxmltree::Node, name: &str) -> Option<String> {
    math(props, name)
        .and_then(|n| n.attribute((MATH_NS, "val")))
        .map(String::from)
}

fn children(node: roxmltree::Node) -> Vec<MathNode> {
    node.children()
        .filter(|n| n.is_element())
        .map(MathNode::from_xml)
        .collect()
}

fn part(node: roxmltree::Node, name: &str) -> Option<Vec<MathNode>> {
    math(node, name).map(children)
}

fn leaf_text(node: roxmltree::Node) -> String {
    let is_t = |n: &roxmltree::Node| {
        n.tag_name().name() == "t" && n.tag_name().namespace() == Some(MATH_NS)
    };
    if is_t(&node) || !node.descendants().any(|n| is_t(&n)) {
        return node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();
    }
    node.descendants()
        .filter(is_t)
        .filter_map(|n| n.text())
        .collect()
}

impl MathNode {
    pub(crate) fn from_xml(node: roxmltree::Node) -> MathNode {
        if node.tag_name().namespace() != Some(MATH_NS) {
            return MathNode::Unknown(children(node));
        }
        match node.tag_name().name() {
            "oMath" | "oMathPara" | "e" => MathNode::Group(children(node)),
            "sSub" | "sSup" | "sSubSup" => MathNode::Script {
                base: part(node, "e").unwrap_or_default(),
                sub: part(node, "sub"),
                sup: part(node, "sup"),
            },
            "f" => MathNode::Fraction {
                num: part(node, "num").unwrap_or_default(),
                den: part(node, "den").unwrap_or_default(),
            },
            "rad" => MathNode::Radical {
                degree: part(node, "deg"),
                base: part(node, "e").unwrap_or_default(),
            },
            "nary" => MathNode::Nary {
                op: math(node, "naryPr").and_then(|pr| math_val(pr, "chr")),
                lower: part(node, "sub"),
                upper: part(node, "sup"),
                operand: part(node, "e").unwrap_or_default(),
            },
            "d" => {
                let pr = math(node, "dPr");
                MathNode::Delimited {
                    open: pr.and_then(|pr| math_val(pr, "begChr")),
                    close: pr.and_then(|pr| math_val(pr, "endChr")),
                    separator: pr.and_then(|pr| math_val(pr, "sepChr")),
                    parts: node
                        .children()
                        .filter(|n| {
                            n.tag_name().name() == "e" && n.tag_name().namespace() == Some(MATH_NS)
                        })
                        .map(children)
                        .collect(),
                }
            }
            "r" | "t" => MathNode::Text(leaf_text(node)),
            _ => MathNode::Unknown(children(node)),
        }
    }
}

fn concat(nodes: &[MathNode]) -> String {
    nodes.iter().map(to_latex).collect()
}

fn concat_opt(nodes: &Option<Vec<MathNode>>) -> String {
    nodes.as_deref().map(concat).unwrap_or_default()
}

pub(crate) fn to_latex(node: &MathNode) -> String {
    match node {
        MathNode::Group(nodes) | MathNode::Unknown(nodes) => concat(nodes),
        MathNode::Script { base, sub, sup } => {
            let mut out = concat(base);
            let sub = concat_opt(sub);
            let sup = concat_opt(sup);
            if !sub.is_empty() {
                out.push_str(&format!("_{{{sub}}}"));
            }
            if !sup.is_empty() {
                out.push_str(&format!("^{{{sup}}}"));
            }
            out
        }
        MathNode::Fraction { num, den } => {
            format!("\\frac{{{}}}{{{}}}", concat(num), concat(den))
        }
        MathNode::Radical { degree, base } => {
            // Word writes an empty m:deg for plain square roots
            let degree = concat_opt(degree);
            if degree.trim().is_empty() {
                format!("\\sqrt{{{}}}", concat(base))
            } else {
                format!("\\sqrt[{}]{{{}}}", degree, concat(base))
            }
        }
        MathNode::Nary {
            op,
            lower,
            upper,
            operand,
        } => format!(
            "{}\\limits_{{{}}}^{{{}}} {{{}}}",
            nary_command(op.as_deref()),
            concat_opt(lower),
            concat_opt(upper),
            concat(operand)
        ),
        MathNode::Delimited {
            open,
            close,
            separator,
            parts,
        } => {
            let body = parts
                .iter()
                .map(|p| concat(p))
                .collect::<Vec<_>>()
                .join(separator.as_deref().unwrap_or("|"));
            let open = open.as_deref().unwrap_or("(");
            if open.trim().is_empty() && matches!(close.as_deref(), Some("|" | "｜")) {
                return format!("\\left. {body} \\right|");
            }
            // Braces, square brackets and bars fix both sides; the closer only
            // matters for other openers
            let (left, right) = match open.trim() {
                "{" => ("\\{".to_string(), ".".to_string()),
                "[" => ("[".to_string(), "]".to_string()),
                "|" | "｜" => ("|".to_string(), "|".to_string()),
                _ => {
                    let close = close.as_deref().unwrap_or_else(|| default_closer(open));
                    (bracket(open), bracket(close))
                }
            };
            format!("\\left{left} {body} \\right{right}")
        }
        MathNode::Text(text) => fix_greek_spacing(text),
    }
}

fn nary_command(op: Option<&str>) -> &str {
    match op.map(str::trim) {
        None | Some("") | Some("∫") => "\\int",
        Some("∑") => "\\sum",
        Some("∏") => "\\prod",
        Some("∐") => "\\coprod",
        Some("∬") => "\\iint",
        Some("∭") => "\\iiint",
        Some("∮") => "\\oint",
        Some("⋃") => "\\bigcup",
        Some("⋂") => "\\bigcap",
        Some("⋁") => "\\bigvee",
        Some("⋀") => "\\bigwedge",
        Some(other) => other,
    }
}

/// Closing bracket implied when `m:endChr` is absent.
fn default_closer(open: &str) -> &'static str {
    match open {
        "‖" => "‖",
        "⟨" | "〈" => "⟩",
        "⌊" => "⌋",
        "⌈" => "⌉",
        _ => ")",
    }
}

fn bracket(c: &str) -> String {
    match c.trim() {
        "" => ".".to_string(),
        "{" => "\\{".to_string(),
        "}" => "\\}".to_string(),
        "｜" => "|".to_string(),
        "‖" => "\\|".to_string(),
        "⟨" | "〈" => "\\langle".to_string(),
        "⟩" | "〉" => "\\rangle".to_string(),
        "⌊" => "\\lfloor".to_string(),
        "⌋" => "\\rfloor".to_string(),
        "⌈" => "\\lceil".to_string(),
        "⌉" => "\\rceil".to_string(),
        other => other.to_string(),
    }
}

/// Insert a space after `\alpha`, `\beta`, ... when the next character would
/// otherwise glue onto the command name (`\alphax` → `\alpha x`).
/// Applying it twice gives the same result as applying it once.
pub fn fix_greek_spacing(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut rest = text;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        out.push('\\');
        rest = &rest[pos + 1..];
        let Some(name) = GREEK.iter().find(|g| rest.starts_with(**g)) else {
            continue;
        };
        out.push_str(name);
        rest = &rest[name.len()..];
        let glued = rest
            .chars()
            .next()
            .is_none_or(|c| !c.is_whitespace() && c != '{' && c != '}');
        if glued {
            out.push(' ');
        }
    }
    out.push_str(rest);
    out
}
