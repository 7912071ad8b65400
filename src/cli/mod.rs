//! Command-line surface.
//!
//! Each subcommand maps onto one client call or flow. Results go to the
//! writer passed in (stdout in the binary); logs go to stderr.

pub mod view;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::domain::MediaFile;
use crate::ports::{CredentialStore, DocumentStore};
use crate::usecases::session::{self, SessionState};
use crate::usecases::{BlogClient, Draft, publish};

#[derive(Parser, Debug)]
#[command(name = "repoblog")]
#[command(version, about = "Blog stored in a GitHub repository")]
pub struct Cli {
  /// Path to the configuration file
  #[arg(short, long, env = "REPOBLOG_CONFIG", default_value = "config.toml")]
  pub config: PathBuf,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Store an access token and check it against the API
  Login {
    #[arg(long, env = "REPOBLOG_TOKEN", hide_env_values = true)]
    token: String,
  },
  /// Forget the stored token
  Logout,
  /// Show the account of the stored token
  Whoami,
  /// List posts, newest first
  List,
  /// Show one post
  Show { id: String },
  /// Upload media and publish a new post
  Publish {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long)]
    content: String,
    /// Media file to attach; repeat for several
    #[arg(long = "media", value_name = "FILE")]
    media: Vec<PathBuf>,
  },
  /// Print the public URL of a stored file
  MediaUrl { path: String },
}

/// Execute `command` against `client`, writing output to `out`.
pub async fn run<S, C, W>(command: Command, client: &mut BlogClient<S, C>, out: &mut W) -> Result<()>
where
  S: DocumentStore,
  C: CredentialStore,
  W: Write,
{
  match command {
    Command::Login { token } => {
      let identity = session::connect(client, &token).await?;
      writeln!(out, "Signed in as {}", identity.login)?;
    }
    Command::Logout => {
      session::logout(client).await?;
      writeln!(out, "Signed out")?;
    }
    Command::Whoami => match session::resume(client).await? {
      SessionState::SignedIn(identity) => writeln!(out, "{}", identity.login)?,
      SessionState::SignedOut => writeln!(out, "Not signed in")?,
    },
    Command::List => {
      let listing = client.list_posts().await?;
      if listing.posts.is_empty() {
        writeln!(out, "No posts yet")?;
      }
      for post in &listing.posts {
        writeln!(out, "{}", view::list_line(post))?;
      }
    }
    Command::Show { id } => {
      let Some(post) = client.get_post(&id).await? else {
        bail!("Post not found: {id}");
      };
      write!(out, "{}", view::detail(&post, |path| client.media_url(path)))?;
    }
    Command::Publish {
      title,
      content,
      media,
    } => {
      let mut draft = Draft::new(title, content, client.max_file_size());
      for path in &media {
        let file = read_media(path).await?;
        let declared = view::guess_media_type(&file.name);
        draft
          .stage(file, declared)
          .with_context(|| format!("Cannot attach {}", path.display()))?;
      }

      let published = publish(&*client, draft).await?;
      writeln!(out, "Published post {}", published.post.id)?;
      for upload in &published.uploads {
        writeln!(out, "  {}", upload.public_url)?;
      }
    }
    Command::MediaUrl { path } => writeln!(out, "{}", client.media_url(&path))?,
  }
  Ok(())
}

async fn read_media(path: &Path) -> Result<MediaFile> {
  let bytes = tokio::fs::read(path)
    .await
    .with_context(|| format!("Failed to read {}", path.display()))?;
  let name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  Ok(MediaFile::new(name, bytes))
}
