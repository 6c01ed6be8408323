//! Show command handler.

use anyhow::{Result, bail};

use crate::cli::ShowArgs;
use crate::infra::StorageContext;
use crate::store::NoteRepository;

pub fn handle_show(args: &ShowArgs, ctx: &StorageContext) -> Result<()> {
    if ctx.capability().is_none() {
        bail!("no journal folder connected; run `chronicle connect <DIR>`");
    }

    let repo = NoteRepository::new(ctx);
    let note = if args.portable {
        repo.get_portable(&args.date)
    } else {
        repo.get(&args.date)
    };

    let Some(note) = note else {
        bail!("no note for {}", args.date);
    };

    println!(
        "# {}  (updated {})",
        args.date.to_naive_date().format("%A, %B %-d, %Y"),
        note.updated_at().format("%Y-%m-%d %H:%M")
    );
    println!();
    if note.is_blank() {
        println!("(empty)");
    } else {
        println!("{}", note.content());
    }
    Ok(())
}
