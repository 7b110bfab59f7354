//! Line commands for the interactive shell.
//!
//! Each line is parsed with clap, so `help` and usage errors come for free.
//! Commands run against one shared `Client`; the cookie jar inside it is the
//! whole session, so the shell must stay a single process.

use befriend::net::types::{Invite, InviteStatus, RegisterRequest};
use befriend::{Client, IdentityStatus, Navigation};
use clap::{Parser, Subcommand};

use crate::CliError;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ReplLine {
    #[command(subcommand)]
    command: ReplCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Create an identity (does not sign in).
    Register { username: String, email: String, password: String },
    /// Sign in, then resume the location the guard saved.
    Login { identifier: String, password: String },
    /// Ask the provider who is signed in.
    Whoami,
    /// Sign out.
    Logout,
    /// Navigate to a location, e.g. `open /profile`.
    Open { location: String },
    /// Print the current location.
    Where,
    /// Invite a peer by username or email.
    Invite { identifier: String },
    /// List invites addressed to you.
    Invites,
    /// Accept an invite by id.
    Accept { invite_id: String },
    #[command(alias = "exit")]
    Quit,
}

/// `Ok(None)` for blank lines and `#` comments, `Err` with rendered usage
/// text for anything clap rejects (including `help`).
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    ReplLine::try_parse_from(line.split_whitespace())
        .map(|parsed| Some(parsed.command))
        .map_err(|e| e.render().to_string().trim_end().to_owned())
}

pub async fn execute(client: &Client, command: ReplCommand) -> Result<String, CliError> {
    match command {
        ReplCommand::Register { username, email, password } => {
            let request = RegisterRequest { username, password, email };
            let user = client.session.api().register(&request).await?;
            Ok(format!("registered {} ({})", user.username, user.id))
        }
        ReplCommand::Login { identifier, password } => {
            let navigation = client.navigator.login_and_resume(&identifier, &password).await?;
            Ok(describe(&navigation))
        }
        ReplCommand::Whoami => Ok(match client.session.identity_check().await? {
            IdentityStatus::Confirmed(identity) => format!("{} ({})", identity.display_name(), identity.id()),
            IdentityStatus::Unconfirmed | IdentityStatus::Superseded => "not signed in".to_owned(),
        }),
        ReplCommand::Logout => Ok(describe(&client.navigator.logout().await)),
        ReplCommand::Open { location } => Ok(describe(&client.navigator.navigate(&location).await?)),
        ReplCommand::Where => Ok(client.navigator.location()),
        ReplCommand::Invite { identifier } => {
            let identity = client.session.current().ok_or(CliError::NotSignedIn)?;
            let invite = client.invites.invite(identity.id(), &identifier).await?;
            Ok(format_invite(&invite))
        }
        ReplCommand::Invites => {
            let identity = client.session.current().ok_or(CliError::NotSignedIn)?;
            let invites = client.invites.list_invites(identity.id()).await?;
            if invites.is_empty() {
                return Ok("no invites".to_owned());
            }
            Ok(invites.iter().map(format_invite).collect::<Vec<_>>().join("\n"))
        }
        ReplCommand::Accept { invite_id } => {
            let identity = client.session.current().ok_or(CliError::NotSignedIn)?;
            let invite = client.invites.accept(&invite_id, identity.id()).await?;
            Ok(format_invite(&invite))
        }
        ReplCommand::Quit => Ok(String::new()),
    }
}

fn describe(navigation: &Navigation) -> String {
    match navigation {
        Navigation::Rendered { location, context: Some(context) } => {
            format!("{location} (signed in as {})", context.display_name())
        }
        Navigation::Rendered { location, context: None } => location.clone(),
        Navigation::Redirected(redirect) => format!("redirected to {}", redirect.location),
        Navigation::Superseded => "navigation superseded".to_owned(),
    }
}

fn format_invite(invite: &Invite) -> String {
    let status = match invite.status {
        InviteStatus::Pending => "pending",
        InviteStatus::Accepted => "accepted",
    };
    format!("{}  from {} to {}  [{status}]", invite.id, invite.inviter_id, invite.invitee_identifier)
}

#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;
