use std::io::Write;
use std::process::exit;

use color_eyre::eyre::Context;

use lgit::storable::ObjectKind;
use lgit::{Commit, DigestProvider as _, Error, Repo, Tree};

use crate::interface::CatFile;
use crate::Result;

pub fn handle(repo: &Repo, args: &CatFile) -> Result<()> {
    match args {
        CatFile::Exists { object } => match repo.database.load(object) {
            Ok(_) => Ok(()),
            Err(Error::NotFound(_)) => {
                eprintln!("Object does not exist: {object:x}");
                exit(1);
            }
            Err(e) => {
                eprintln!("Object is corrupt: {object:x}: {e}");
                exit(1);
            }
        },
        CatFile::PrettyPrint { object } => {
            let loaded = repo
                .database
                .load(object)
                .wrap_err_with(|| format!("Could not read object {object:x}"))?;

            let mut stdout = std::io::stdout().lock();
            match loaded.kind() {
                ObjectKind::Blob => stdout.write_all(loaded.data())?,
                ObjectKind::Tree => {
                    let oid_len = repo.database.digest_provider().output_len();
                    Tree::parse(object, loaded.data(), oid_len)?.pretty_print(&mut stdout)?
                }
                ObjectKind::Commit => {
                    Commit::parse(object, loaded.data())?.pretty_print(&mut stdout)?
                }
            };
            stdout.flush()?;
            Ok(())
        }
        CatFile::Type { object } => {
            println!("{}", repo.database.load(object)?.kind());
            Ok(())
        }
        CatFile::Size { object } => {
            println!("{}", repo.database.load(object)?.data().len());
            Ok(())
        }
    }
}
