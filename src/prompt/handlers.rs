use anyhow::{bail, Context, Result};
use regex::Regex;

use super::Session;
use crate::template::PlaceholderHandler;

const MESSAGE_PROMPT: &str = "Commit message: ";
const DEFAULT_INTEGER_LABEL: &str = "Number";
const DEFAULT_TEXT_LABEL: &str = "Value";
const DEFAULT_SEPARATOR: &str = ",";

/// Turns a `{s;Label}` style modifier into `Label`.
fn label(modifier: &str, fallback: &str) -> String {
  let label = modifier.trim_start_matches(';').trim();
  if label.is_empty() {
    fallback.to_string()
  } else {
    label.to_string()
  }
}

/// `{t}`: one entry from a fixed list of commit types.
pub struct CommitTypeHandler {
  types: Vec<String>
}

impl CommitTypeHandler {
  pub fn new(types: Vec<String>) -> Self {
    Self { types }
  }
}

impl<'a> PlaceholderHandler<Session<'a>> for CommitTypeHandler {
  fn resolve(&self, _modifier: &str, session: &mut Session<'a>) -> Result<String> {
    if self.types.is_empty() {
      bail!("No commit types configured");
    }

    Ok(session.console.choose("Select the commit type:", &self.types)?)
  }
}

/// `{p<sep>}`: directories touched by the staged changes.
///
/// A single package is taken without asking. Several are offered as a
/// multi-choice menu and the picks are joined with the modifier, `,` when the
/// modifier is empty.
pub struct PackagesHandler;

impl<'a> PlaceholderHandler<Session<'a>> for PackagesHandler {
  fn resolve(&self, modifier: &str, session: &mut Session<'a>) -> Result<String> {
    let packages = session
      .repo
      .staged_packages()
      .context("Failed to list staged files")?;

    match packages.as_slice() {
      [] => bail!("No staged files, nothing to derive the affected packages from"),
      [only] => {
        log::debug!("Only one package staged, selecting {}", only);
        Ok(only.clone())
      }
      _ => {
        let separator = if modifier.is_empty() { DEFAULT_SEPARATOR } else { modifier };
        let selected = session
          .console
          .choose_many("Select the affected package(s):", &packages)?;
        Ok(selected.join(separator))
      }
    }
  }
}

/// `{n}`: ticket number, offered from the branch name when it starts with one.
///
/// Declining the offered ticket leaves the placeholder empty. The ticket is only
/// typed in when the branch name has none.
pub struct TicketHandler {
  pattern: Regex,
  label:   String
}

impl TicketHandler {
  pub fn new(pattern: &str, label: &str) -> Result<Self> {
    let pattern = Regex::new(pattern).with_context(|| format!("Invalid ticket pattern {:?}", pattern))?;
    Ok(Self { pattern, label: label.to_string() })
  }

  /// The ticket the branch name starts with, uppercased.
  pub fn detect(&self, branch: &str) -> Option<String> {
    let branch = branch.trim().to_uppercase();
    let mut found = self.pattern.find_iter(&branch);

    match (found.next(), found.next()) {
      (Some(ticket), None) => Some(ticket.as_str().to_string()),
      _ => None
    }
  }
}

impl<'a> PlaceholderHandler<Session<'a>> for TicketHandler {
  fn resolve(&self, _modifier: &str, session: &mut Session<'a>) -> Result<String> {
    let branch = session
      .repo
      .branch_name()
      .context("Failed to read the current branch name")?;

    if let Some(ticket) = self.detect(&branch) {
      let question = format!("{} {} found, use it?", self.label, ticket);
      if session.console.confirm(&question)? {
        return Ok(ticket);
      }
      return Ok(String::new());
    }

    let answer = session.console.read_line(&format!("{}: ", self.label))?;
    Ok(answer.to_uppercase())
  }
}

/// `{m}`: free text, never empty.
pub struct MessageHandler;

impl<'a> PlaceholderHandler<Session<'a>> for MessageHandler {
  fn resolve(&self, _modifier: &str, session: &mut Session<'a>) -> Result<String> {
    Ok(session.console.read_non_empty(MESSAGE_PROMPT)?)
  }
}

/// `{i;Label}`: asks until the answer is an integer.
pub struct IntegerHandler;

impl<'a> PlaceholderHandler<Session<'a>> for IntegerHandler {
  fn resolve(&self, modifier: &str, session: &mut Session<'a>) -> Result<String> {
    let prompt = format!("{}: ", label(modifier, DEFAULT_INTEGER_LABEL));
    let answer = session
      .console
      .read_until(&prompt, |answer| answer.parse::<i64>().ok().map(|_| answer.to_string()))?;
    Ok(answer)
  }
}

/// `{s;Label}`: asks until the answer is not empty.
pub struct TextHandler;

impl<'a> PlaceholderHandler<Session<'a>> for TextHandler {
  fn resolve(&self, modifier: &str, session: &mut Session<'a>) -> Result<String> {
    let prompt = format!("{}: ", label(modifier, DEFAULT_TEXT_LABEL));
    Ok(session.console.read_non_empty(&prompt)?)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;
  use crate::git::{self, GitError, RepoContext};
  use crate::prompt::{Console, PromptError};

  struct FakeRepo {
    branch:   &'static str,
    packages: Vec<&'static str>
  }

  impl FakeRepo {
    fn new(branch: &'static str, packages: &[&'static str]) -> Self {
      Self { branch, packages: packages.to_vec() }
    }
  }

  impl RepoContext for FakeRepo {
    fn branch_name(&self) -> git::Result<String> {
      if self.branch.is_empty() {
        return Err(GitError::NoBranch);
      }
      Ok(self.branch.to_string())
    }

    fn staged_packages(&self) -> git::Result<Vec<String>> {
      Ok(self.packages.iter().map(|p| p.to_string()).collect())
    }
  }

  fn resolve_with<H>(handler: &H, modifier: &str, repo: &FakeRepo, input: &str) -> (Result<String>, String)
  where
    H: for<'s> PlaceholderHandler<Session<'s>>
  {
    let mut output = Vec::new();
    let result = {
      let console = Console::new(Cursor::new(input.to_string()), &mut output);
      let mut session = Session::new(console, repo);
      handler.resolve(modifier, &mut session)
    };
    (result, String::from_utf8(output).unwrap())
  }

  fn ticket_handler() -> TicketHandler {
    TicketHandler::new(r"^[A-Z]+-\d+", "Jira ticket").unwrap()
  }

  #[test]
  fn test_label() {
    assert_eq!(label(";Story points", "x"), "Story points");
    assert_eq!(label("; Reviewer", "x"), "Reviewer");
    assert_eq!(label("", "Number"), "Number");
  }

  #[test]
  fn test_commit_type() {
    let repo = FakeRepo::new("main", &[]);
    let handler = CommitTypeHandler::new(vec!["code".into(), "fix".into()]);
    let (result, output) = resolve_with(&handler, "", &repo, "3\n2\n");
    assert_eq!(result.unwrap(), "fix");
    assert!(output.contains("Select the commit type:"));
  }

  #[test]
  fn test_commit_type_without_types() {
    let repo = FakeRepo::new("main", &[]);
    let handler = CommitTypeHandler::new(Vec::new());
    let (result, _) = resolve_with(&handler, "", &repo, "1\n");
    assert!(result.is_err());
  }

  #[test]
  fn test_single_package_is_selected_without_prompt() {
    let repo = FakeRepo::new("main", &["utils"]);
    let (result, output) = resolve_with(&PackagesHandler, ",", &repo, "");
    assert_eq!(result.unwrap(), "utils");
    assert!(output.is_empty());
  }

  #[test]
  fn test_no_staged_packages_fails() {
    let repo = FakeRepo::new("main", &[]);
    let (result, _) = resolve_with(&PackagesHandler, ",", &repo, "1\n");
    assert!(result.unwrap_err().to_string().contains("No staged files"));
  }

  #[test]
  fn test_packages_joined_with_modifier() {
    let repo = FakeRepo::new("main", &["a", "b", "c"]);
    let (result, output) = resolve_with(&PackagesHandler, ",", &repo, "1 3\n");
    assert_eq!(result.unwrap(), "a,c");
    assert!(output.contains("Select the affected package(s):"));

    let (result, _) = resolve_with(&PackagesHandler, " + ", &repo, "3 2\n");
    assert_eq!(result.unwrap(), "c + b");

    let (result, _) = resolve_with(&PackagesHandler, "", &repo, "1 2\n");
    assert_eq!(result.unwrap(), "a,b");
  }

  #[test]
  fn test_ticket_detected_and_accepted() {
    let repo = FakeRepo::new("abc-123-fix-login", &[]);
    let (result, output) = resolve_with(&ticket_handler(), "", &repo, "y\n");
    assert_eq!(result.unwrap(), "ABC-123");
    assert!(output.contains("Jira ticket ABC-123 found, use it?"));
  }

  #[test]
  fn test_ticket_detected_and_rejected() {
    let repo = FakeRepo::new("ABC-123-x", &[]);
    let (result, output) = resolve_with(&ticket_handler(), "", &repo, "what\nno\n");
    assert_eq!(result.unwrap(), "");
    assert!(output.ends_with("(yes/no)> "));
    assert!(!output.contains("Jira ticket: "));
  }

  #[test]
  fn test_ticket_typed_when_branch_has_none() {
    let repo = FakeRepo::new("feature/login", &[]);
    let (result, output) = resolve_with(&ticket_handler(), "", &repo, "jira-1\n");
    assert_eq!(result.unwrap(), "JIRA-1");
    assert!(!output.contains("found"));

    let (result, _) = resolve_with(&ticket_handler(), "", &repo, "\n");
    assert_eq!(result.unwrap(), "");
  }

  #[test]
  fn test_ticket_branch_failure_propagates() {
    let repo = FakeRepo::new("", &[]);
    let (result, _) = resolve_with(&ticket_handler(), "", &repo, "ABC-1\n");
    assert!(result.unwrap_err().to_string().contains("branch name"));
  }

  #[test]
  fn test_detect() {
    let handler = ticket_handler();
    assert_eq!(handler.detect("proj-42/thing"), Some("PROJ-42".to_string()));
    assert_eq!(handler.detect("main"), None);
    assert_eq!(handler.detect("feature/ABC-1"), None);
  }

  #[test]
  fn test_message_reprompts_until_non_empty() {
    let repo = FakeRepo::new("main", &[]);
    let (result, output) = resolve_with(&MessageHandler, "", &repo, "\n  \nfixed the bug\n");
    assert_eq!(result.unwrap(), "fixed the bug");
    assert_eq!(output.matches("Commit message: ").count(), 3);
  }

  #[test]
  fn test_integer_reprompts_once() {
    let repo = FakeRepo::new("main", &[]);
    let (result, output) = resolve_with(&IntegerHandler, ";Story points", &repo, "lots\n42\n");
    assert_eq!(result.unwrap(), "42");
    assert_eq!(output, "Story points: Story points: ");
  }

  #[test]
  fn test_text_uses_modifier_as_label() {
    let repo = FakeRepo::new("main", &[]);
    let (result, output) = resolve_with(&TextHandler, "; Reviewer", &repo, "\nalice\n");
    assert_eq!(result.unwrap(), "alice");
    assert_eq!(output, "Reviewer: Reviewer: ");
  }

  #[test]
  fn test_closed_input_is_an_error() {
    let repo = FakeRepo::new("main", &[]);
    let (result, _) = resolve_with(&MessageHandler, "", &repo, "");
    let err = result.unwrap_err();
    assert!(matches!(err.downcast_ref::<PromptError>(), Some(PromptError::InputClosed)));
  }
}
