//! skiff command surface and dispatch.
//!
//! Each subcommand resolves its operands, opens the store through the
//! staging coordinator, performs the index operation, and persists: every
//! mutating command writes the staging file only; `save` alone promotes the
//! staged index to the committed file.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use skiff_core::{
    Config, Error, StoreHandle, TransferKind, TransferMonitor,
    listing::DirectoryLister,
    resolve::{self, StoreReference},
};
use skiff_store::Entry;

/// Client for staged remote-backed file stores.
#[derive(Debug, Parser)]
#[command(name = "skiff", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output on stderr
    #[arg(short, long, global = true)]
    pub silent: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download a file; the data is piped to stdout
    ///
    /// Use shell redirection to write it to disk:
    /// `skiff download drive::/documents/file.txt > file.txt`
    Download { path: String },
    /// Upload a file read from stdin
    ///
    /// Pipe a file in with your shell:
    /// `cat file.txt | skiff upload drive::/documents/file.txt`
    Upload { path: String },
    /// List a directory
    Ls { path: String },
    /// Remove a file or a directory subtree
    Rm { path: String },
    /// Move an entry within one store
    Mv { from: String, to: String },
    /// Copy an entry within one store
    Cp { from: String, to: String },
    /// Commit a store's staged changes to its index
    Save { store: String },
}

/// Execute one parsed invocation.
pub async fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Command::Download { path } => download(config, &path).await,
        Command::Upload { path } => upload(config, &path).await,
        Command::Ls { path } => ls(config, &path).await,
        Command::Rm { path } => rm(config, &path).await,
        Command::Mv { from, to } => mv(config, &from, &to).await,
        Command::Cp { from, to } => cp(config, &from, &to).await,
        Command::Save { store } => save(config, &store).await,
    }
}

/// Pre-check an operand with the validator, then resolve it.
///
/// The pre-check exists so the usage message names the failing command; the
/// resolver's own error is generic.
fn parse_operand(config: &Config, cmd: &str, token: &str) -> Result<StoreReference> {
    let default = config.default_store.as_deref();
    if !resolve::is_valid_path(token, default) {
        match default {
            Some(_) => bail!("{cmd}: invalid path {token} (expected an absolute path)"),
            None => bail!("{cmd}: invalid remote path {token} (not in format store::/path/to/file)"),
        }
    }
    Ok(resolve::resolve(token, default)?)
}

async fn download(config: &Config, token: &str) -> Result<()> {
    let reference = parse_operand(config, "download", token)?;
    let handle = StoreHandle::open(&reference.store_id, &config.stores_dir()).await?;

    let entry = handle
        .index()
        .lookup(&reference.path)
        .ok_or_else(|| Error::PathNotFound(reference.to_string()))?;
    if entry.is_directory() {
        return Err(Error::IsADirectory(reference.to_string()).into());
    }

    let mut stream = handle.index().read_stream(&reference.path)?;
    let total = stream.len();
    let progress = stream.progress();
    let monitor = TransferMonitor::new(config.quiet);

    // Race the copy against the renderer: a broken stdout pipe must surface
    // as an error rather than leave the renderer polling forever.
    let copy = async move {
        let mut stdout = tokio::io::stdout();
        tokio::io::copy(&mut stream, &mut stdout).await?;
        stdout.flush().await?;
        Ok(())
    };
    monitor
        .watch(&progress, TransferKind::Download { total }, copy)
        .await?;
    Ok(())
}

async fn upload(config: &Config, token: &str) -> Result<()> {
    // A trailing slash names a directory; only the caller knows that an
    // upload target must be a file.
    if token.ends_with('/') {
        bail!("upload: invalid remote path {token} (is a directory)");
    }
    let reference = parse_operand(config, "upload", token)?;
    let mut handle = StoreHandle::open(&reference.store_id, &config.stores_dir()).await?;

    let mut stream = handle.index().write_stream(&reference.path)?;
    let progress = stream.progress();
    let monitor = TransferMonitor::new(config.quiet);

    let produce = async move {
        let mut stdin = tokio::io::stdin();
        tokio::io::copy(&mut stdin, &mut stream).await?;
        stream.shutdown().await?;
        Ok(stream)
    };
    let written = monitor
        .watch(&progress, TransferKind::Upload, produce)
        .await?;

    handle.index_mut().insert_written(written)?;
    handle.persist(false).await?;
    Ok(())
}

async fn ls(config: &Config, token: &str) -> Result<()> {
    let reference = parse_operand(config, "ls", token)?;
    let handle = StoreHandle::open(&reference.store_id, &config.stores_dir()).await?;

    match handle.index().lookup(&reference.path) {
        None => Err(Error::PathNotFound(reference.to_string()).into()),
        Some(Entry::File(_)) => Err(Error::NotADirectory(reference.to_string()).into()),
        Some(Entry::Directory(dir)) => {
            DirectoryLister::new(config.quiet).print(dir);
            Ok(())
        }
    }
}

async fn rm(config: &Config, token: &str) -> Result<()> {
    let reference = parse_operand(config, "rm", token)?;
    let mut handle = StoreHandle::open(&reference.store_id, &config.stores_dir()).await?;

    if !handle.index().exists(&reference.path) {
        return Err(Error::PathNotFound(reference.to_string()).into());
    }
    handle.index_mut().remove(&reference.path)?;
    handle.persist(false).await?;
    Ok(())
}

async fn mv(config: &Config, from: &str, to: &str) -> Result<()> {
    let (mut handle, from_ref, to_ref) = open_pair(config, "mv", from, to).await?;
    handle.index_mut().move_entry(&from_ref.path, &to_ref.path)?;
    handle.persist(false).await?;
    Ok(())
}

async fn cp(config: &Config, from: &str, to: &str) -> Result<()> {
    let (mut handle, from_ref, to_ref) = open_pair(config, "cp", from, to).await?;
    handle.index_mut().copy_entry(&from_ref.path, &to_ref.path)?;
    handle.persist(false).await?;
    Ok(())
}

/// Resolve both operands of a two-path command, rejecting cross-store pairs
/// before any file io, then open the (single) store and require the source.
async fn open_pair(
    config: &Config,
    cmd: &str,
    from: &str,
    to: &str,
) -> Result<(StoreHandle, StoreReference, StoreReference)> {
    let from_ref = parse_operand(config, cmd, from)?;
    let to_ref = parse_operand(config, cmd, to)?;
    if from_ref.store_id != to_ref.store_id {
        return Err(Error::CrossStoreOperation {
            from: from_ref.store_id,
            to: to_ref.store_id,
        }
        .into());
    }

    let handle = StoreHandle::open(&from_ref.store_id, &config.stores_dir()).await?;
    if !handle.index().exists(&from_ref.path) {
        return Err(Error::PathNotFound(from_ref.to_string()).into());
    }
    Ok((handle, from_ref, to_ref))
}

async fn save(config: &Config, store_id: &str) -> Result<()> {
    let mut handle = StoreHandle::open(store_id, &config.stores_dir()).await?;
    handle.persist(true).await?;
    debug!(store_id, "committed staged changes");
    Ok(())
}
