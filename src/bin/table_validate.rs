use npcgen::tables::{TableSet, TABLE_DIR};
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let root = args.get(1).map(String::as_str).unwrap_or("data");
    let dir = Path::new(root).join(TABLE_DIR);
    if !dir.is_dir() {
        eprintln!("table_validate: {} is not a directory", dir.display());
        std::process::exit(1);
    }

    let tables = TableSet::load_from(&dir);
    print!("{}", tables.report);
    println!("tiers: {}", tables.tiers.len());
    println!("gear aliases: {}", tables.aliases.len());
    println!("archetypes: {}", tables.archetypes.len());
    println!(
        "names: first={}, last={}",
        tables.names.first_count(),
        tables.names.last_count()
    );
    println!("social replies: {}", tables.replies.len());
    println!("spawn configs: {}", tables.spawn.len());

    let skipped = tables.report.total_skipped();
    if skipped > 0 {
        eprintln!("table_validate: {} lines skipped", skipped);
        std::process::exit(1);
    }
}
