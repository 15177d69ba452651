mod cat_file;
mod interface;

use camino::Utf8PathBuf;
use color_eyre::eyre::Context;
pub use color_eyre::Result;

use lgit::blob::Blob;
use lgit::storable::Storable;
use lgit::{DigestProvider as _, Repo};

use crate::interface::*;

use clap::Parser;
use once_cell::sync::Lazy;
use tracing_subscriber::prelude::*;

static ARGS: Lazy<Opt> = Lazy::new(Opt::parse);

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    Lazy::force(&ARGS);

    let path = match ARGS.path {
        Some(ref path) => path
            .canonicalize_utf8()
            .wrap_err(format!("Directory not found: '{path}'"))?,
        None => Utf8PathBuf::try_from(std::env::current_dir()?.canonicalize()?)?,
    };

    match &ARGS.command {
        Command::Init => {
            Repo::init(&path)?;
            println!("Initialized empty lgit repository in {}", path.join(".lgit"));
            return Ok(());
        }
        Command::HashObject { write: false, path: file } => {
            let data = std::fs::read(path.join(file))
                .wrap_err(format!("Failed to read file: {file}"))?;
            let oid = ARGS.hash.provider().digest(&Blob::new(data).format());
            println!("{oid:x}");
            return Ok(());
        }
        _ => {}
    }

    let mut repo = Repo::open(path, ARGS.hash)?;

    match &ARGS.command {
        Command::Init | Command::HashObject { write: false, .. } => unreachable!(),
        Command::HashObject { write: true, path } => {
            let oid = repo
                .write_blob(path)
                .wrap_err(format!("Failed to store file: {path}"))?;
            println!("{oid:x}");
        }
        Command::WriteTree => {
            println!("{:x}", repo.write_tree()?);
        }
        Command::CommitTree {
            tree,
            parent,
            message,
            identity,
        } => {
            let (author, committer) = identity.signatures();
            let oid = repo.commit_tree(
                tree,
                parent.as_ref(),
                &author,
                &committer,
                &normalise_message(message),
            )?;
            println!("{oid:x}");
        }
        Command::Commit { message, identity } => {
            let (author, committer) = identity.signatures();
            let commit_id = repo.commit(&author, &committer, &normalise_message(message))?;
            println!("Created commit {}", commit_id.to_hex());
        }
        Command::CatFile(args) => cat_file::handle(&repo, args)?,
        Command::Log => match repo.log()? {
            None => eprintln!("No commits yet"),
            Some(history) => {
                for entry in history {
                    let (oid, commit) = entry?;
                    println!("commit {oid:x}");
                    println!("Author: {}", commit.author());
                    println!();
                    for line in commit.message().lines() {
                        println!("    {line}");
                    }
                    println!();
                }
            }
        },
    }
    Ok(())
}
