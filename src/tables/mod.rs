pub mod archetypes;
pub mod gear;
pub mod names;
pub mod parse;
pub mod replies;
pub mod spawn;
pub mod tiers;

use crate::tables::archetypes::{builtin_archetypes, parse_archetypes, Archetype};
use crate::tables::gear::{AliasTable, ClassGearTable};
use crate::tables::names::NamePool;
use crate::tables::parse::read_table;
use crate::tables::replies::ReplyBank;
use crate::tables::spawn::SpawnOverrides;
use crate::tables::tiers::TierTable;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

pub const TABLE_DIR: &str = "tables";
pub const DIFFICULTY_FILE: &str = "difficulty.txt";
pub const GEAR_MAP_FILE: &str = "gear_map.txt";
pub const CLASS_GEAR_FILE: &str = "class_gear.txt";
pub const FIRST_NAMES_FILE: &str = "first_names.txt";
pub const LAST_NAMES_FILE: &str = "last_names.txt";
pub const SOCIAL_REPLIES_FILE: &str = "social_replies.txt";
pub const ARCHETYPES_FILE: &str = "archetypes.yml";
pub const SPAWN_SUFFIX: &str = "_spawn.txt";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{} line {line}: {reason}", path.display())]
    Line {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("{} has no usable entries", path.display())]
    Empty { path: PathBuf },
}

impl TableError {
    pub fn line(path: &Path, line: usize, reason: &str) -> Self {
        TableError::Line {
            path: path.to_path_buf(),
            line,
            reason: reason.to_string(),
        }
    }
}

/// A parsed table together with the lines that were dropped.
#[derive(Debug)]
pub struct Parsed<T> {
    pub table: T,
    pub skipped: Vec<TableError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    File,
    Builtin,
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSource::File => f.pad("file"),
            TableSource::Builtin => f.pad("builtin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub name: String,
    pub source: TableSource,
    pub entries: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub tables: Vec<TableReport>,
}

impl LoadReport {
    fn record(&mut self, name: &str, source: TableSource, entries: usize, skipped: usize) {
        self.tables.push(TableReport {
            name: name.to_string(),
            source,
            entries,
            skipped,
        });
    }

    pub fn get(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn total_skipped(&self) -> usize {
        self.tables.iter().map(|table| table.skipped).sum()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in &self.tables {
            writeln!(
                f,
                "{:<22} {:<8} entries={:<5} skipped={}",
                table.name, table.source, table.entries, table.skipped
            )?;
        }
        Ok(())
    }
}

/// Every content table, parsed. Read-only once built.
#[derive(Debug)]
pub struct TableSet {
    pub tiers: TierTable,
    pub aliases: AliasTable,
    pub class_gear: ClassGearTable,
    pub names: NamePool,
    pub replies: ReplyBank,
    pub spawn: BTreeMap<String, SpawnOverrides>,
    pub archetypes: Vec<Archetype>,
    pub report: LoadReport,
}

impl Default for TableSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TableSet {
    pub fn builtin() -> Self {
        let mut report = LoadReport::default();
        let archetypes = builtin_archetypes();
        let set = Self {
            tiers: TierTable::default(),
            aliases: AliasTable::default(),
            class_gear: ClassGearTable::default(),
            names: NamePool::default(),
            replies: ReplyBank::default(),
            spawn: BTreeMap::new(),
            archetypes,
            report: LoadReport::default(),
        };
        for (name, entries) in set.counts() {
            report.record(name, TableSource::Builtin, entries, 0);
        }
        Self { report, ..set }
    }

    /// Loads `<dir>/*`, falling back to the builtin table for every file that is
    /// missing, unreadable or yields no entries.
    pub fn load_from(dir: &Path) -> Self {
        let mut report = LoadReport::default();

        let tiers = match load_lines(dir, DIFFICULTY_FILE, TierTable::parse, Vec::len) {
            Some((tiers, skipped)) => {
                report.record(DIFFICULTY_FILE, TableSource::File, tiers.len(), skipped);
                TierTable::new(tiers)
            }
            None => {
                report.record(DIFFICULTY_FILE, TableSource::Builtin, 1, 0);
                TierTable::default()
            }
        };

        let aliases = match load_lines(dir, GEAR_MAP_FILE, AliasTable::parse, AliasTable::len) {
            Some((aliases, skipped)) => {
                report.record(GEAR_MAP_FILE, TableSource::File, aliases.len(), skipped);
                aliases
            }
            None => {
                report.record(GEAR_MAP_FILE, TableSource::Builtin, 0, 0);
                AliasTable::default()
            }
        };

        let class_gear =
            match load_lines(dir, CLASS_GEAR_FILE, ClassGearTable::parse, ClassGearTable::len) {
                Some((classes, skipped)) => {
                    report.record(CLASS_GEAR_FILE, TableSource::File, classes.len(), skipped);
                    classes
                }
                None => {
                    report.record(CLASS_GEAR_FILE, TableSource::Builtin, 0, 0);
                    ClassGearTable::default()
                }
            };

        let first = load_names(dir, FIRST_NAMES_FILE, &mut report);
        let last = load_names(dir, LAST_NAMES_FILE, &mut report);
        let names = NamePool::new(first, last);

        let replies = match load_lines(dir, SOCIAL_REPLIES_FILE, ReplyBank::parse, ReplyBank::len)
        {
            Some((replies, skipped)) => {
                report.record(SOCIAL_REPLIES_FILE, TableSource::File, replies.len(), skipped);
                replies
            }
            None => {
                let replies = ReplyBank::default();
                report.record(SOCIAL_REPLIES_FILE, TableSource::Builtin, replies.len(), 0);
                replies
            }
        };

        let spawn = load_spawn_overrides(dir, &mut report);

        let archetypes = match load_archetypes(&dir.join(ARCHETYPES_FILE)) {
            Ok(archetypes) => {
                report.record(ARCHETYPES_FILE, TableSource::File, archetypes.len(), 0);
                archetypes
            }
            Err(err) => {
                warn_fallback(&err);
                let archetypes = builtin_archetypes();
                report.record(ARCHETYPES_FILE, TableSource::Builtin, archetypes.len(), 0);
                archetypes
            }
        };

        tracing::info!(
            target: "npcgen::tables",
            dir = %dir.display(),
            tiers = tiers.len(),
            aliases = aliases.len(),
            archetypes = archetypes.len(),
            skipped = report.total_skipped(),
            "content tables loaded"
        );

        Self {
            tiers,
            aliases,
            class_gear,
            names,
            replies,
            spawn,
            archetypes,
            report,
        }
    }

    pub fn spawn_overrides(&self, profile: &str) -> Option<&SpawnOverrides> {
        self.spawn.get(profile)
    }

    fn counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            (DIFFICULTY_FILE, self.tiers.len()),
            (GEAR_MAP_FILE, self.aliases.len()),
            (CLASS_GEAR_FILE, self.class_gear.len()),
            (FIRST_NAMES_FILE, self.names.first_count()),
            (LAST_NAMES_FILE, self.names.last_count()),
            (SOCIAL_REPLIES_FILE, self.replies.len()),
            (ARCHETYPES_FILE, self.archetypes.len()),
        ]
    }
}

fn warn_fallback(err: &TableError) {
    match err {
        TableError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound => {
            tracing::info!(target: "npcgen::tables", "{}; using builtin", err);
        }
        _ => tracing::warn!(target: "npcgen::tables", "{}; using builtin", err),
    }
}

fn warn_skipped(skipped: &[TableError]) {
    for err in skipped {
        tracing::warn!(target: "npcgen::tables", "skipping {}", err);
    }
}

fn load_lines<T>(
    dir: &Path,
    file: &str,
    parse: impl FnOnce(&str, &Path) -> Parsed<T>,
    entries: impl FnOnce(&T) -> usize,
) -> Option<(T, usize)> {
    let path = dir.join(file);
    let content = match read_table(&path) {
        Ok(content) => content,
        Err(err) => {
            warn_fallback(&err);
            return None;
        }
    };
    let parsed = parse(&content, &path);
    warn_skipped(&parsed.skipped);
    if entries(&parsed.table) == 0 {
        warn_fallback(&TableError::Empty { path });
        return None;
    }
    Some((parsed.table, parsed.skipped.len()))
}

fn load_names(dir: &Path, file: &str, report: &mut LoadReport) -> Vec<String> {
    let path = dir.join(file);
    let names = match read_table(&path) {
        Ok(content) => NamePool::parse_list(&content),
        Err(err) => {
            warn_fallback(&err);
            Vec::new()
        }
    };
    let source = if names.is_empty() {
        TableSource::Builtin
    } else {
        TableSource::File
    };
    report.record(file, source, names.len().max(1), 0);
    names
}

fn load_spawn_overrides(dir: &Path, report: &mut LoadReport) -> BTreeMap<String, SpawnOverrides> {
    let mut spawn = BTreeMap::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn_fallback(&TableError::Io {
                path: dir.to_path_buf(),
                source: err,
            });
            return spawn;
        }
    };
    let mut files: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let profile = file_name.strip_suffix(SPAWN_SUFFIX)?.to_string();
            if profile.is_empty() {
                return None;
            }
            Some((profile, entry.path()))
        })
        .collect();
    files.sort();
    for (profile, path) in files {
        let content = match read_table(&path) {
            Ok(content) => content,
            Err(err) => {
                warn_fallback(&err);
                continue;
            }
        };
        let parsed = SpawnOverrides::parse(&content, &path);
        warn_skipped(&parsed.skipped);
        let name = format!("{}{}", profile, SPAWN_SUFFIX);
        let entries = usize::from(!parsed.table.is_empty());
        report.record(&name, TableSource::File, entries, parsed.skipped.len());
        spawn.insert(profile, parsed.table);
    }
    spawn
}

fn load_archetypes(path: &Path) -> Result<Vec<Archetype>, TableError> {
    let content = read_table(path)?;
    let archetypes = parse_archetypes(&content).map_err(|source| TableError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    if archetypes.is_empty() {
        return Err(TableError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(archetypes)
}

/// Lazily loaded, shared view of the content tables under `<root>/tables/`.
#[derive(Debug)]
pub struct TableStore {
    root: Option<PathBuf>,
    loaded: OnceLock<TableSet>,
}

impl TableStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            loaded: OnceLock::new(),
        }
    }

    /// A store that never touches the filesystem.
    pub fn builtin() -> Self {
        Self {
            root: None,
            loaded: OnceLock::new(),
        }
    }

    pub fn from_tables(tables: TableSet) -> Self {
        Self {
            root: None,
            loaded: OnceLock::from(tables),
        }
    }

    pub fn table_dir(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(TABLE_DIR))
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Parses on first call; every later call returns the same tables.
    pub fn load(&self) -> &TableSet {
        self.loaded.get_or_init(|| match self.table_dir() {
            Some(dir) => TableSet::load_from(&dir),
            None => TableSet::builtin(),
        })
    }
}
