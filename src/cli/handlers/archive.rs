//! Archive command handler.

use anyhow::Result;

use super::{ConsoleReporter, truncate_str};
use crate::cli::ArchiveArgs;
use crate::cli::output::{ArchiveListing, Output, OutputFormat};
use crate::infra::StorageContext;
use crate::store::TreeIndexer;

pub fn handle_archive(args: &ArchiveArgs, ctx: &StorageContext, verbose: bool) -> Result<()> {
    let mut reporter = ConsoleReporter::new(verbose);
    let result = TreeIndexer::new(ctx).crawl_with_progress(&mut reporter);

    let entries: Vec<_> = result
        .index
        .sorted_descending()
        .into_iter()
        .filter(|(_, note)| args.all || !note.is_blank())
        .collect();

    match args.format {
        OutputFormat::Human => {
            if entries.is_empty() {
                println!("No notes found.");
                return Ok(());
            }

            println!("{:<10}  {}", "Date", "Preview");
            println!("{:<10}  {}", "----------", "-".repeat(args.width.min(60)));
            for (key, note) in &entries {
                let preview = note.preview(args.width);
                let preview = if preview.is_empty() {
                    "(empty)".to_string()
                } else {
                    truncate_str(&preview, args.width)
                };
                println!("{:<10}  {}", key, preview);
            }
            println!();
            println!("{} note(s)", entries.len());
        }
        OutputFormat::Json => {
            let listings: Vec<ArchiveListing> = entries
                .iter()
                .map(|(key, note)| ArchiveListing {
                    date: *key,
                    updated_at: note.updated_at(),
                    preview: note.preview(args.width),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&Output::new(listings))?);
        }
    }

    Ok(())
}
