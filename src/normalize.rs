//! Rewriting of shorthand math notation into text the parser accepts.
//!
//! Users type expressions the way they write them on paper: `3x`, `2(x+1)`, `(x+1)(x-1)`,
//! `pi`, `e^x`. The parser needs explicit multiplication and canonical constant names, so
//! [`normalize`] applies the following rules, in order:
//!
//! 1. `**` is rewritten to the power operator `^`
//! 2. digit followed by a letter: `3x` → `3*x`
//! 3. closing parenthesis followed by a digit: `)3` → `)*3`
//! 4. digit followed by an opening parenthesis: `3(` → `3*(`
//! 5. adjacent parenthesis pairs: `)(` → `)*(`
//! 6. the token `pi` in any case → `PI`
//! 7. the token `e` in any case → `E`, unless it is directly followed by a letter
//!    other than `e` (so `exp` and identifiers such as `eps` stay intact)
//!
//! No rule re-triggers on text produced by the rules, so normalizing twice is the same
//! as normalizing once. Parentheses are never balanced or repaired here; malformed input
//! is left for the parser to reject.
//!
//! Rule 7 is a lookahead heuristic rather than a tokenizer. Some inputs are rewritten
//! even though they were meant as identifiers or literals:
//!
//! - `e2` becomes `E2` (a digit is not a letter, so the lookahead allows it)
//! - `e_1` becomes `E_1`
//! - `1e-5` becomes `1*E-5` (rule 2 splits the literal first)
//! - `ee` becomes `Ee`

/// Normalizes raw expression text.
///
/// # Example
/// ```
/// use plotexpr::normalize::normalize;
///
/// assert_eq!(normalize("2pi + 3x"), "2*PI + 3*x");
/// assert_eq!(normalize("e^(2x)(x+1)"), "E^(2*x)*(x+1)");
/// assert_eq!(normalize("exp(x)"), "exp(x)");
/// ```
pub fn normalize(expr: &str) -> String {
    let text = expr.replace("**", "^");
    let text = insert_multiplication(&text, |prev, next| {
        prev.is_ascii_digit() && next.is_ascii_alphabetic()
    });
    let text = insert_multiplication(&text, |prev, next| prev == ')' && next.is_ascii_digit());
    let text = insert_multiplication(&text, |prev, next| prev.is_ascii_digit() && next == '(');
    let text = insert_multiplication(&text, |prev, next| prev == ')' && next == '(');
    let text = replace_pi(&text);
    replace_e(&text)
}

/// Inserts `*` between every pair of adjacent characters accepted by `adjacent`.
fn insert_multiplication(text: &str, adjacent: impl Fn(char, char) -> bool) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if let Some(&next) = chars.peek() {
            if adjacent(c, next) {
                out.push('*');
            }
        }
    }
    out
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn starts_token(chars: &[char], i: usize) -> bool {
    i == 0 || !is_ident_char(chars[i - 1])
}

fn replace_pi(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let is_pi = starts_token(&chars, i)
            && chars[i].eq_ignore_ascii_case(&'p')
            && chars.get(i + 1).is_some_and(|c| c.eq_ignore_ascii_case(&'i'))
            && !chars.get(i + 2).is_some_and(|&c| is_ident_char(c));
        if is_pi {
            out.push_str("PI");
            i += 2;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

fn replace_e(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        let blocked = chars
            .get(i + 1)
            .is_some_and(|n| n.is_ascii_alphabetic() && !n.eq_ignore_ascii_case(&'e'));
        if c.eq_ignore_ascii_case(&'e') && starts_token(&chars, i) && !blocked {
            out.push('E');
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_operator() {
        assert_eq!(normalize("x**2"), "x^2");
        assert_eq!(normalize("x^2"), "x^2");
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(normalize("3x"), "3*x");
        assert_eq!(normalize("(x+1)3"), "(x+1)*3");
        assert_eq!(normalize("3(x+1)"), "3*(x+1)");
        assert_eq!(normalize("(x+1)(x-1)"), "(x+1)*(x-1)");
        assert_eq!(normalize("2x(x+1)(x-1)4"), "2*x(x+1)*(x-1)*4");
    }

    #[test]
    fn test_juxtaposed_identifiers_are_left_alone() {
        assert_eq!(normalize("a b"), "a b");
        assert_eq!(normalize("(a+b)x"), "(a+b)x");
        assert_eq!(normalize("3 x"), "3 x");
    }

    #[test]
    fn test_pi() {
        assert_eq!(normalize("pi"), "PI");
        assert_eq!(normalize("Pi/2"), "PI/2");
        assert_eq!(normalize("2pi"), "2*PI");
        assert_eq!(normalize("spin + pix"), "spin + pix");
    }

    #[test]
    fn test_e() {
        assert_eq!(normalize("e"), "E");
        assert_eq!(normalize("e^x"), "E^x");
        assert_eq!(normalize("2e"), "2*E");
        assert_eq!(normalize("exp(x) + ceil(x)"), "exp(x) + ceil(x)");
        assert_eq!(normalize("eps*time"), "eps*time");
    }

    #[test]
    fn test_e_heuristic_limits() {
        assert_eq!(normalize("e2"), "E2");
        assert_eq!(normalize("1e-5"), "1*E-5");
        assert_eq!(normalize("ee"), "Ee");
    }

    #[test]
    fn test_malformed_parentheses_untouched() {
        assert_eq!(normalize("1/("), "1/(");
        assert_eq!(normalize(")x("), ")x(");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "2pi + 3x",
            "a*sin(b*x)+c",
            "e^(2x)(x+1)3",
            "x**2 + pi*e - exp(e2)",
            "f(x)^2 + 3(g(x))",
            "1e-5 + ee + E",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input}");
        }
    }
}
