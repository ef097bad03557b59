//! Interactive placeholder handlers.
//!
//! Every placeholder kind is answered either by asking the user through a
//! [`Console`] or by looking at the repository through a [`RepoContext`]. Both are
//! carried in a [`Session`] so nothing here touches process globals.

mod console;
mod handlers;

use anyhow::Result;

pub use console::{Console, PromptError};
pub use handlers::{CommitTypeHandler, IntegerHandler, MessageHandler, PackagesHandler, TextHandler, TicketHandler};

use crate::config::Settings;
use crate::git::RepoContext;
use crate::template::{PlaceholderKind, Registry};

/// Everything a handler may talk to during one resolution.
pub struct Session<'a> {
  pub console: Console<'a>,
  pub repo:    &'a dyn RepoContext
}

impl<'a> Session<'a> {
  pub fn new(console: Console<'a>, repo: &'a dyn RepoContext) -> Self {
    Self { console, repo }
  }
}

/// Binds a handler to every placeholder kind.
pub fn registry<'a>(settings: &Settings) -> Result<Registry<'static, Session<'a>>> {
  Ok(
    Registry::new()
      .register(PlaceholderKind::Type, CommitTypeHandler::new(settings.commit_types()))
      .register(PlaceholderKind::Packages, PackagesHandler)
      .register(PlaceholderKind::Ticket, TicketHandler::new(&settings.ticket_pattern, &settings.ticket_label)?)
      .register(PlaceholderKind::Message, MessageHandler)
      .register(PlaceholderKind::Integer, IntegerHandler)
      .register(PlaceholderKind::Text, TextHandler)
  )
}
