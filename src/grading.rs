//! Submission grading: pass/fail check, line-diff hint, and the simulated run.
//!
//! Everything here is a pure function over the caller's text. Nothing logs,
//! nothing sleeps, nothing fails. The service layer (`logic`) owns the
//! side effects (points, progress, the cosmetic "running..." delay).

use std::fmt;

/// Hint returned when every line matches the reference.
pub const CLOSE_HINT: &str = "Your code is very close!";

/// Strip every whitespace character (spaces, tabs, newlines, unicode spaces).
pub fn normalize(code: &str) -> String {
  code.chars().filter(|c| !c.is_whitespace()).collect()
}

/// True iff both texts are identical once whitespace is removed.
/// Purely textual: a consistent rename still fails, any reformatting passes.
pub fn evaluate(submitted: &str, reference: &str) -> bool {
  normalize(submitted) == normalize(reference)
}

/// Lines that differ between a submission and its reference (1-based, ascending).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineComparison {
  pub differing: Vec<usize>,
}

impl LineComparison {
  pub fn is_match(&self) -> bool {
    self.differing.is_empty()
  }
}

/// Raw line-by-line comparison. A line missing on either side counts as different.
///
/// Lines are split on `'\n'`, so `""` is a single empty line and a trailing
/// newline yields a trailing empty line.
pub fn compare_lines(submitted: &str, reference: &str) -> LineComparison {
  let ours: Vec<&str> = submitted.split('\n').collect();
  let theirs: Vec<&str> = reference.split('\n').collect();
  let max_lines = ours.len().max(theirs.len());

  let differing = (0..max_lines)
    .filter(|&i| match (ours.get(i), theirs.get(i)) {
      (Some(a), Some(b)) => a != b,
      _ => true,
    })
    .map(|i| i + 1)
    .collect();

  LineComparison { differing }
}

/// Human readable pointer to the first lines that need attention.
pub fn diff_hint(submitted: &str, reference: &str) -> String {
  let cmp = compare_lines(submitted, reference);
  if cmp.is_match() {
    return CLOSE_HINT.to_string();
  }
  let plural = if cmp.differing.len() > 1 { "s" } else { "" };
  let joined = cmp.differing.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ");
  format!("Check line{} {}", plural, joined)
}

/// Canned result of a simulated run. Never derived from executing anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Diagnostic {
  UnexpectedEof,
  UndefinedPrinttt,
  ExpectedColon,
  InconsistentIndentation,
  Success { has_output: bool },
}

impl Diagnostic {
  pub fn is_error(&self) -> bool {
    !matches!(self, Diagnostic::Success { .. })
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Diagnostic::UnexpectedEof => f.write_str("SyntaxError: unexpected EOF while parsing"),
      Diagnostic::UndefinedPrinttt => f.write_str("NameError: name 'printtt' is not defined"),
      Diagnostic::ExpectedColon => f.write_str("SyntaxError: expected ':'"),
      Diagnostic::InconsistentIndentation => {
        f.write_str("IndentationError: inconsistent use of tabs and spaces in indentation")
      }
      Diagnostic::Success { has_output } => write!(
        f,
        "Program executed successfully!\nOutput: {}",
        if *has_output { "Expected output" } else { "No output" }
      ),
    }
  }
}

/// Pick a diagnostic by substring heuristics. First matching rule wins.
pub fn simulate_run(code: &str) -> Diagnostic {
  if code.contains("print(") && !code.contains(')') {
    Diagnostic::UnexpectedEof
  } else if code.contains("printtt") {
    Diagnostic::UndefinedPrinttt
  } else if code.contains("def") && !code.contains(':') {
    Diagnostic::ExpectedColon
  } else if code.contains("  ") && code.contains("    ") {
    Diagnostic::InconsistentIndentation
  } else {
    Diagnostic::Success { has_output: code.contains("print") }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn evaluate_is_reflexive_and_symmetric() {
    let samples = ["", "a", "fn main() {}", "x = 1\n  y = 2\n", "\t \n"];
    for a in samples {
      assert!(evaluate(a, a));
      for b in samples {
        assert_eq!(evaluate(a, b), evaluate(b, a), "{a:?} vs {b:?}");
      }
    }
  }

  #[test]
  fn evaluate_ignores_all_whitespace() {
    let reference = "function f(a, b) {\n  return a + b;\n}";
    assert!(evaluate("function f(a,b){return a+b;}", reference));
    assert!(evaluate("  function  f(a,\tb)\r\n{\n\nreturn a +b;}\n\n", reference));
    assert!(evaluate("", " \n\t "));
  }

  #[test]
  fn evaluate_rejects_character_changes() {
    let reference = "let result = a + b;";
    assert!(!evaluate("let result = a + b", reference));
    assert!(!evaluate("let res = a + b;", reference));
    // whitespace removal can glue tokens: still equal textually
    assert!(evaluate("letresult=a+b;", reference));
  }

  #[test]
  fn normalize_strips_whitespace_only() {
    assert_eq!(normalize(" a\tb\nc \u{00A0}d "), "abcd");
    assert_eq!(normalize(""), "");
  }

  #[test]
  fn hint_for_identical_text_is_close() {
    for a in ["", "one", "one\ntwo\n", "\n\n"] {
      assert_eq!(diff_hint(a, a), CLOSE_HINT);
    }
  }

  #[test]
  fn hint_names_single_line() {
    assert_eq!(diff_hint("line1\nline2", "line1\nLINE2"), "Check line 2");
  }

  #[test]
  fn hint_counts_missing_lines_on_either_side() {
    assert_eq!(diff_hint("a\nb\nc", "a"), "Check lines 2, 3");
    assert_eq!(diff_hint("a", "a\nb\nc"), "Check lines 2, 3");
  }

  #[test]
  fn hint_is_whitespace_sensitive_within_a_line() {
    assert_eq!(diff_hint("x =  1\ny", "x = 1\ny"), "Check line 1");
    // trailing newline adds an empty third line
    assert_eq!(diff_hint("a\nb\n", "a\nb"), "Check line 3");
  }

  #[test]
  fn empty_input_is_one_empty_line() {
    assert_eq!(compare_lines("", "").differing, Vec::<usize>::new());
    assert_eq!(diff_hint("", ""), CLOSE_HINT);
    assert_eq!(diff_hint("", "x"), "Check line 1");
    assert_eq!(diff_hint("x", ""), "Check line 1");
    assert_eq!(diff_hint("", "\n"), "Check line 2");
  }

  #[test]
  fn comparison_reports_every_differing_line() {
    let cmp = compare_lines("a\nX\nc\nY", "a\nb\nc\nd\ne");
    assert_eq!(cmp.differing, vec![2, 4, 5]);
    assert!(!cmp.is_match());
    assert_eq!(diff_hint("a\nX\nc\nY", "a\nb\nc\nd\ne"), "Check lines 2, 4, 5");
  }

  #[test]
  fn run_balanced_print_is_not_eof() {
    let d = simulate_run("print(\"hi\")");
    assert_ne!(d, Diagnostic::UnexpectedEof);
    assert_eq!(d, Diagnostic::Success { has_output: true });
    assert_eq!(d.to_string(), "Program executed successfully!\nOutput: Expected output");
  }

  #[test]
  fn run_unbalanced_print_is_eof() {
    assert_eq!(simulate_run("print(").to_string(), "SyntaxError: unexpected EOF while parsing");
  }

  #[test]
  fn run_first_rule_wins_over_printtt() {
    assert_eq!(simulate_run("printtt print("), Diagnostic::UnexpectedEof);
    assert_eq!(
      simulate_run("printtt(\"x\")").to_string(),
      "NameError: name 'printtt' is not defined"
    );
  }

  #[test]
  fn run_def_without_colon() {
    assert_eq!(simulate_run("def foo()").to_string(), "SyntaxError: expected ':'");
    assert_ne!(simulate_run("def foo():"), Diagnostic::ExpectedColon);
  }

  #[test]
  fn run_mixed_indentation() {
    let code = "def f():\n  x = 1\n    return x";
    assert_eq!(
      simulate_run(code).to_string(),
      "IndentationError: inconsistent use of tabs and spaces in indentation"
    );
    // a four-space run also contains a two-space run
    assert_eq!(simulate_run("if x:\n    y"), Diagnostic::InconsistentIndentation);
  }

  #[test]
  fn run_without_print_has_no_output() {
    let d = simulate_run("x = 1");
    assert!(!d.is_error());
    assert_eq!(d.to_string(), "Program executed successfully!\nOutput: No output");
    assert!(simulate_run("").to_string().ends_with("No output"));
  }
}
