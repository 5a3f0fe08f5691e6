use gitlet::repository::Repository;
use gitlet::{add, branch, checkout, clone, commit, diff, error, fetch, merge, plumbing, remote, remove, status};

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gitlet")]
#[command(about = "A minimal content-addressed version control engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty repository
    Init {
        path: Option<PathBuf>,

        /// Lay the repository out without a working copy
        #[arg(long)]
        bare: bool,
    },
    /// Copy a repository from a local path
    Clone {
        remote: PathBuf,
        target: PathBuf,

        #[arg(long)]
        bare: bool,
    },
    /// Stage file contents
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Remove files from the working copy and the index
    Rm {
        path: PathBuf,

        /// Remove directories recursively
        #[arg(short = 'r')]
        recursive: bool,

        #[arg(short = 'f')]
        force: bool,
    },
    /// Record the staged tree as a commit
    Commit {
        #[arg(short = 'm')]
        message: String,

        #[arg(long, default_value = "Your Name")]
        author: String,
    },
    /// List branches (omit the name), or create one at HEAD
    Branch {
        name: Option<String>,

        /// Record the current branch's upstream as <remote>/<branch>
        #[arg(short = 'u', long = "set-upstream-to")]
        upstream: Option<String>,
    },
    /// Switch to a branch or commit
    Checkout {
        target: String,
    },
    /// Show changed paths between two trees, a tree and the index,
    /// or the index and the working copy
    Diff {
        h1: Option<String>,
        h2: Option<String>,

        #[arg(long = "name-status")]
        name_status: bool,
    },
    /// Join another line of development into the current branch
    Merge {
        target: String,
    },
    /// Bring objects and branch positions over from a peer repository
    Fetch {
        remote: String,
    },
    /// Fetch, then merge FETCH_HEAD
    Pull {
        remote: String,
    },
    Push,
    /// Manage peer repositories
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },
    /// Summarize working copy, index and merge state
    Status,
    /// Stage or unstage a single path directly
    UpdateIndex {
        path: PathBuf,

        #[arg(long)]
        add: bool,

        #[arg(long)]
        remove: bool,
    },
    /// Write the index as tree objects and print the root hash
    WriteTree,
    /// Point a ref at the commit another ref resolves to
    UpdateRef {
        ref_to_update: String,
        to: String,
    },
}

#[derive(Subcommand)]
enum RemoteCommands {
    Add { name: String, url: String },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cwd = PathBuf::from(".");

    match cli.command {
        Commands::Init { path, bare } => {
            let path = path.unwrap_or_else(|| PathBuf::from("."));
            match Repository::find(&path)? {
                Some(existing) => println!(
                    "Reinitialized existing gitlet repository in {}",
                    existing.repo_dir.display()
                ),
                None => {
                    let repo = Repository::init(&path, bare)?;
                    println!(
                        "Initialized empty gitlet repository in {}",
                        repo.repo_dir.display()
                    );
                }
            }
        }

        Commands::Clone { remote, target, bare } => {
            println!("{}", clone::clone(&remote, &target, bare)?);
        }

        Commands::Add { paths } => {
            let repo = Repository::open(&cwd)?;
            add::add(&repo, &paths)?;
        }

        Commands::Rm { path, recursive, force } => {
            let repo = Repository::open(&cwd)?;
            remove::rm(&repo, &path, recursive, force)?;
        }

        Commands::Commit { message, author } => {
            let repo = Repository::open(&cwd)?;
            println!("{}", commit::commit(&repo, &message, &author)?);
        }

        Commands::Branch { name, upstream } => {
            let mut repo = Repository::open(&cwd)?;
            if let Some(upstream) = upstream {
                println!("{}", branch::set_upstream(&mut repo, &upstream)?);
            } else if let Some(name) = name {
                branch::create(&repo, &name)?;
            } else {
                print!("{}", branch::list(&repo)?);
            }
        }

        Commands::Checkout { target } => {
            let repo = Repository::open(&cwd)?;
            println!("{}", checkout::checkout(&repo, &target)?);
        }

        Commands::Diff { h1, h2, name_status } => {
            let repo = Repository::open(&cwd)?;
            print!(
                "{}",
                diff::read_diff(&repo, h1.as_deref(), h2.as_deref(), name_status)?
            );
        }

        Commands::Merge { target } => {
            let repo = Repository::open(&cwd)?;
            println!("{}", merge::merge(&repo, &target)?);
        }

        Commands::Fetch { remote } => {
            let repo = Repository::open(&cwd)?;
            println!("{}", fetch::fetch(&repo, &remote)?);
        }

        Commands::Pull { remote } => {
            let repo = Repository::open(&cwd)?;
            println!("{}", fetch::pull(&repo, &remote)?);
        }

        Commands::Push => {
            return Err(error::Error::Unsupported("push").into());
        }

        Commands::Remote { command } => {
            let RemoteCommands::Add { name, url } = command;
            let mut repo = Repository::open(&cwd)?;
            remote::add(&mut repo, &name, &url)?;
        }

        Commands::Status => {
            let repo = Repository::open(&cwd)?;
            print!("{}", status::render(&status::collect_status(&repo)?));
        }

        Commands::UpdateIndex { path, add, remove } => {
            let repo = Repository::open(&cwd)?;
            plumbing::update_index(&repo, &path, add, remove)?;
        }

        Commands::WriteTree => {
            let repo = Repository::open(&cwd)?;
            println!("{}", plumbing::write_tree(&repo)?);
        }

        Commands::UpdateRef { ref_to_update, to } => {
            let repo = Repository::open(&cwd)?;
            plumbing::update_ref(&repo, &ref_to_update, &to)?;
        }
    }

    Ok(())
}
