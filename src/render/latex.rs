// Copyright 2024 Vladimir Kharchev

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Conversion of the LaTeX-like markup used in titles and annotations into plain text lines.
//!
//! Supported: `#splitline{first}{second}`, Greek letters and a few symbols written `#alpha`,
//! `#pm` and so on, and sub/superscripts `_{...}` and `^{...}`, whose braces are dropped. A `#`
//! that does not start a known command is kept as it is.

const SYMBOLS: [(&str, &str); 34] = [
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("zeta", "ζ"),
    ("eta", "η"),
    ("theta", "θ"),
    ("kappa", "κ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("nu", "ν"),
    ("xi", "ξ"),
    ("pi", "π"),
    ("rho", "ρ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("phi", "φ"),
    ("chi", "χ"),
    ("psi", "ψ"),
    ("omega", "ω"),
    ("Gamma", "Γ"),
    ("Delta", "Δ"),
    ("Theta", "Θ"),
    ("Lambda", "Λ"),
    ("Sigma", "Σ"),
    ("Phi", "Φ"),
    ("Omega", "Ω"),
    ("pm", "±"),
    ("times", "×"),
    ("infty", "∞"),
    ("circ", "°"),
    ("leq", "≤"),
    ("geq", "≥"),
];

/// Splits `text` at the closing brace matching the opening one at its start.
fn brace_group(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('{')?;
    let mut depth = 1;
    for (i, c) in rest.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&rest[..i], &rest[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Converts markup into the lines to draw.
#[must_use]
pub fn to_lines(text: &str) -> Vec<String> {
    if let Some(rest) = text.trim_start().strip_prefix("#splitline") {
        if let Some((first, rest)) = brace_group(rest) {
            if let Some((second, _)) = brace_group(rest) {
                let mut lines = to_lines(first);
                lines.extend(to_lines(second));
                return lines;
            }
        }
    }
    vec![to_plain(text)]
}

/// Converts single-line markup into plain text.
#[must_use]
pub fn to_plain(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        match c {
            '#' => {
                let word_len = rest[1..]
                    .find(|c: char| !c.is_ascii_alphabetic())
                    .unwrap_or(rest.len() - 1);
                let word = &rest[1..=word_len];
                if let Some((_, symbol)) = SYMBOLS.iter().find(|(name, _)| *name == word) {
                    out.push_str(symbol);
                    rest = &rest[1 + word_len..];
                } else {
                    out.push('#');
                    rest = &rest[1..];
                }
            }
            '_' | '^' if rest[1..].starts_with('{') => {
                if let Some((inner, after)) = brace_group(&rest[1..]) {
                    out.push_str(&to_plain(inner));
                    rest = after;
                } else {
                    out.push(c);
                    rest = &rest[1..];
                }
            }
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splitline() {
        assert_eq!(
            to_lines("#splitline{Maximum}{Deviation}"),
            vec!["Maximum".to_string(), "Deviation".to_string()]
        );
        assert_eq!(to_lines("#splitline{broken"), vec!["#splitline{broken".to_string()]);
    }

    #[test]
    fn symbols_and_scripts() {
        assert_eq!(to_plain("N_{Counts}"), "NCounts");
        assert_eq!(to_plain("x^{2} #pm #sigma"), "x2 ± σ");
        assert_eq!(to_plain("# occurrences"), "# occurrences");
        assert_eq!(to_plain("#unknown"), "#unknown");
        assert_eq!(to_plain("end#"), "end#");
        assert_eq!(to_plain("a_b"), "a_b");
    }
}
