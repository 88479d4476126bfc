//! Built-in challenge catalog. Guarantees the app is usable without a TOML bank.

use crate::domain::{Challenge, ChallengeSource, Level};

#[allow(clippy::too_many_arguments)]
fn seed(
  id: &str,
  title: &str,
  description: &str,
  level: Level,
  points: u32,
  time_limit_minutes: u32,
  initial_code: &str,
  correct_code: &str,
  hints: [&str; 2],
) -> Challenge {
  Challenge {
    id: id.into(),
    title: title.into(),
    description: description.into(),
    level,
    points,
    time_limit_minutes,
    language: "javascript".into(),
    source: ChallengeSource::Seed,
    initial_code: initial_code.into(),
    correct_code: correct_code.into(),
    hints: hints.iter().map(|h| h.to_string()).collect(),
  }
}

pub fn seed_challenges() -> Vec<Challenge> {
  vec![
    seed(
      "syntax-error",
      "Syntax Error Slayer",
      "Fix the syntax errors in this JavaScript function.",
      Level::Beginner,
      20,
      5,
      "function calculateSum(a, b) {\n  let result = a + b\n  console.log(\"The sum is: \" + result);\n  return result\n",
      "function calculateSum(a, b) {\n  let result = a + b;\n  console.log(\"The sum is: \" + result);\n  return result;\n}",
      ["Check for missing semicolons", "Are there any missing brackets?"],
    ),
    seed(
      "variable-typo",
      "Variable Typo Tracker",
      "Find and fix the typo in the variable name.",
      Level::Beginner,
      25,
      5,
      "function greetUser(name) {\n  const message = \"Hello, \" + name + \"!\";\n  \n  // Display welcome message\n  console.log(mesage);\n  \n  return message;\n}",
      "function greetUser(name) {\n  const message = \"Hello, \" + name + \"!\";\n  \n  // Display welcome message\n  console.log(message);\n  \n  return message;\n}",
      ["Variable names must match exactly", "Check the console.log statement"],
    ),
    seed(
      "logical-error",
      "Logical Loop Finder",
      "Fix the logical error in this loop that's causing incorrect output.",
      Level::Intermediate,
      40,
      10,
      "function sumEvenNumbers(numbers) {\n  let sum = 0;\n  \n  for (let i = 0; i <= numbers.length; i++) {\n    if (numbers[i] % 2 === 0) {\n      sum += numbers[i];\n    }\n  }\n  \n  return sum;\n}",
      "function sumEvenNumbers(numbers) {\n  let sum = 0;\n  \n  for (let i = 0; i < numbers.length; i++) {\n    if (numbers[i] % 2 === 0) {\n      sum += numbers[i];\n    }\n  }\n  \n  return sum;\n}",
      ["Check the loop condition", "Array indices start at 0 and end at length-1"],
    ),
    seed(
      "async-bug",
      "Async Function Fixer",
      "Fix the bug in this asynchronous JavaScript function.",
      Level::Pro,
      60,
      15,
      "async function fetchUserData(userId) {\n  try {\n    const response = await fetch('https://api.example.com/users/' + userId);\n    const data = response.json();\n    return data;\n  } catch (error) {\n    console.error('Error fetching user data:', error);\n    throw error;\n  }\n}",
      "async function fetchUserData(userId) {\n  try {\n    const response = await fetch('https://api.example.com/users/' + userId);\n    const data = await response.json();\n    return data;\n  } catch (error) {\n    console.error('Error fetching user data:', error);\n    throw error;\n  }\n}",
      ["The response.json() method returns a Promise", "You need to wait for the JSON parsing to complete"],
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grading::{diff_hint, evaluate};

  #[test]
  fn seeds_start_broken() {
    for c in seed_challenges() {
      assert!(!evaluate(&c.initial_code, &c.correct_code), "{} should start broken", c.id);
      assert!(evaluate(&c.correct_code, &c.correct_code));
    }
  }

  #[test]
  fn seed_hints_point_at_the_bug() {
    let all = seed_challenges();
    let typo = all.iter().find(|c| c.id == "variable-typo").unwrap();
    assert_eq!(diff_hint(&typo.initial_code, &typo.correct_code), "Check line 5");

    let syntax = all.iter().find(|c| c.id == "syntax-error").unwrap();
    assert_eq!(diff_hint(&syntax.initial_code, &syntax.correct_code), "Check lines 2, 4, 5");
  }
}
