//! Connect, status and grant command handlers.

use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, Write};
use std::path::Path;

use super::ConsoleReporter;
use crate::cli::{ConnectArgs, GrantArgs};
use crate::infra::{CapabilityStore, Permission, RootCapability};
use crate::store::TreeIndexer;

pub fn handle_connect(args: &ConnectArgs, store: &mut CapabilityStore, verbose: bool) -> Result<()> {
    let capability = RootCapability::new(&args.dir)
        .with_context(|| format!("cannot use {} as journal folder", args.dir.display()))?;

    if capability.query_permission() == Permission::Denied {
        bail!(
            "no read/write access to {}",
            capability.root().display()
        );
    }

    store.save(capability);
    let ctx = store.context();
    let Some(root) = ctx.capability().map(|c| c.root().display().to_string()) else {
        bail!("journal folder was not activated");
    };

    let mut reporter = ConsoleReporter::new(verbose);
    let result = TreeIndexer::new(&ctx).crawl_with_progress(&mut reporter);

    println!("Connected: {}", root);
    println!("{} note(s) found", result.index.len());
    Ok(())
}

pub fn handle_status(store: &mut CapabilityStore) -> Result<()> {
    match store.load() {
        Some(capability) => {
            println!("Folder: {}", capability.root().display());
            println!("Access: granted");
        }
        None => match store.candidate() {
            Some(capability) => {
                println!("Folder: {}", capability.root().display());
                println!("Access: denied (run `chronicle grant`)");
            }
            None => {
                println!("No journal folder connected. Run `chronicle connect <DIR>`.");
            }
        },
    }
    println!("State file: {}", store.state_path().display());
    Ok(())
}

pub fn handle_grant(args: &GrantArgs, store: &mut CapabilityStore) -> Result<()> {
    store.load();

    let granted = if args.yes {
        store.request_permission(&mut |_: &Path| true)
    } else {
        store.request_permission(&mut stdin_prompt)
    };

    if !granted {
        bail!("access to the journal folder was not granted");
    }

    if let Some(capability) = store.active() {
        println!("Access granted: {}", capability.root().display());
    }
    Ok(())
}

/// Asks on the terminal whether to use the folder.
fn stdin_prompt(root: &Path) -> bool {
    print!("Allow read/write access to {}? [y/N] ", root.display());
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes" | "Yes")
}
