use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

use lgit::signature::{Signature, Timestamp};
use lgit::{Algorithm, Digest};

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Create an empty repository
    Init,

    /// Compute the id of a file as a blob, optionally storing it
    HashObject {
        /// Store the blob in the object database
        #[arg(short)]
        write: bool,

        path: Utf8PathBuf,
    },

    /// Store the working directory as a tree and print its id
    WriteTree,

    /// Create a commit object for an existing tree
    CommitTree {
        tree: Digest,

        #[arg(short)]
        parent: Option<Digest>,

        #[arg(short, long, env = "LGIT_COMMIT_MESSAGE")]
        message: String,

        #[command(flatten)]
        identity: Identity,
    },

    /// Snapshot the working directory and advance HEAD
    Commit {
        #[arg(short, long, env = "LGIT_COMMIT_MESSAGE")]
        message: String,

        #[command(flatten)]
        identity: Identity,
    },

    #[command(subcommand)]
    CatFile(CatFile),

    /// Show the history reachable from HEAD
    Log,
}

#[derive(Clone, Debug, Subcommand)]
pub enum CatFile {
    /// Exit with status `ExitCode::SUCCESS` if `object` exists and is a valid object. If
    /// `object` is of an invalid format, exit with status `ExitCode::FAILURE`, and print an
    /// error to stderr.
    #[command(short_flag = 'e')]
    Exists {
        #[arg(value_name = "object")]
        object: Digest,
    },

    /// Pretty-print the contents of `object` based on its type
    #[command(short_flag = 'p')]
    PrettyPrint {
        #[arg(value_name = "object")]
        object: Digest,
    },

    /// Print the type of `object` to stdout
    #[command(short_flag = 't')]
    Type {
        #[arg(value_name = "object")]
        object: Digest,
    },

    /// Print the size of `object` to stdout
    #[command(short_flag = 's')]
    Size {
        #[arg(value_name = "object")]
        object: Digest,
    },
}

#[derive(Clone, Debug, Args)]
pub struct Identity {
    #[arg(long, env = "LGIT_AUTHOR_NAME")]
    pub author_name: String,

    #[arg(long, env = "LGIT_AUTHOR_EMAIL")]
    pub author_email: String,

    /// Defaults to the author name
    #[arg(long, env = "LGIT_COMMITTER_NAME")]
    pub committer_name: Option<String>,

    /// Defaults to the author email
    #[arg(long, env = "LGIT_COMMITTER_EMAIL")]
    pub committer_email: Option<String>,
}

impl Identity {
    /// The author and committer lines for a commit made now.
    pub fn signatures(&self) -> (String, String) {
        let when = Timestamp::now();
        let author = Signature::new(&self.author_name, &self.author_email, when.clone());
        let committer = Signature::new(
            self.committer_name.as_deref().unwrap_or(&self.author_name),
            self.committer_email.as_deref().unwrap_or(&self.author_email),
            when,
        );
        (author.to_string(), committer.to_string())
    }
}

#[derive(Debug, Parser)]
#[command(name = "lgit", version, about)]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,

    /// Run as if started in this directory
    #[arg(short = 'C', global = true)]
    pub path: Option<Utf8PathBuf>,

    /// Hash algorithm used for object ids
    #[arg(long, env = "LGIT_HASH", default_value = "sha1", global = true)]
    pub hash: Algorithm,
}

/// `-m` messages get the single trailing newline the object format requires.
pub fn normalise_message(message: &str) -> String {
    format!("{}\n", message.trim_end_matches('\n'))
}
