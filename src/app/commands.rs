//! `dstate` subcommands
//!
//! Every command reads a bitset file through
//! [`FileBitSetFactory::open_existing`] and only ever calls `recover` on it,
//! so inspecting a file never changes it. Reports serialise to JSON as is
//! and render to a prettytable for text output.

use crate::app::cli::OutputFormat;
use crate::app::error::{CliError, CliResult};
use crate::bitset::{BitSetFactory, FileBitSetFactory, MemoryBitSetFactory};
use crate::collections::OrderedIdQueue;
use crate::core::styles::StyleRole;
use crate::core::version;
use prettytable::{format, Cell, Row, Table};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Output of one command
pub trait Report: Serialize {
    fn table(&self, color: bool) -> Table;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerSummary {
    pub owner: u64,
    pub blocks: usize,
    pub identifiers: usize,
    pub first: Option<u64>,
    pub last: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub file: PathBuf,
    pub block_bits: u64,
    pub records: u64,
    pub free_records: usize,
    pub owners: Vec<OwnerSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpReport {
    pub file: PathBuf,
    pub owner: u64,
    pub identifiers: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketSummary {
    pub bucket: u64,
    pub size: usize,
    pub next: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketsReport {
    pub file: PathBuf,
    pub total: usize,
    pub buckets: Vec<BucketSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionReport {
    pub name: &'static str,
    pub version: &'static str,
    pub state_format_version: u32,
    pub build_time: &'static str,
    pub git_hash: &'static str,
}

/// Identifiers of one owner gathered into a scratch in-memory queue
struct OwnerContents {
    blocks: usize,
    ids: OrderedIdQueue,
}

/// Read every owner in the file without modifying it
fn read_owners(path: &Path, block_bits: u64) -> CliResult<(FileBitSetFactory, Vec<(u64, OwnerContents)>)> {
    let mut factory = FileBitSetFactory::open_existing(path, block_bits)?;
    let mut owners = Vec::new();
    for owner in factory.unique_ids() {
        let blocks = factory.recover(owner);
        let mut ids = OrderedIdQueue::new(owner, MemoryBitSetFactory::new(block_bits)?);
        for block in &blocks {
            for id in block.iter() {
                ids.offer(id);
            }
        }
        owners.push((
            owner,
            OwnerContents {
                blocks: blocks.len(),
                ids,
            },
        ));
    }
    log::debug!("Read {} owners from {}", owners.len(), path.display());
    Ok((factory, owners))
}

pub fn inspect(path: &Path, block_bits: u64) -> CliResult<InspectReport> {
    let (factory, owners) = read_owners(path, block_bits)?;
    Ok(InspectReport {
        file: path.to_path_buf(),
        block_bits,
        records: factory.record_count(),
        free_records: factory.free_records(),
        owners: owners
            .into_iter()
            .map(|(owner, contents)| OwnerSummary {
                owner,
                blocks: contents.blocks,
                identifiers: contents.ids.len(),
                first: contents.ids.peek(),
                last: contents.ids.iter().last(),
            })
            .collect(),
    })
}

pub fn dump(path: &Path, block_bits: u64, owner: u64) -> CliResult<DumpReport> {
    let (_, owners) = read_owners(path, block_bits)?;
    let contents = owners
        .into_iter()
        .find(|(candidate, _)| *candidate == owner)
        .map(|(_, contents)| contents)
        .filter(|contents| !contents.ids.is_empty())
        .ok_or_else(|| CliError::UnknownOwner {
            owner,
            path: path.to_path_buf(),
        })?;
    Ok(DumpReport {
        file: path.to_path_buf(),
        owner,
        identifiers: contents.ids.iter().collect(),
    })
}

/// Bucket view of a delayed or transactions file
///
/// Shows the buckets a `BucketManager` would recover from the file without
/// building one: its recovery releases empty blocks, which writes to the
/// file. Empty buckets are left out here the same way.
pub fn buckets(path: &Path, block_bits: u64) -> CliResult<BucketsReport> {
    let (_, owners) = read_owners(path, block_bits)?;
    let buckets: Vec<BucketSummary> = owners
        .into_iter()
        .filter(|(_, contents)| !contents.ids.is_empty())
        .map(|(bucket, contents)| BucketSummary {
            bucket,
            size: contents.ids.len(),
            next: contents.ids.peek(),
        })
        .collect();
    Ok(BucketsReport {
        file: path.to_path_buf(),
        total: buckets.iter().map(|bucket| bucket.size).sum(),
        buckets,
    })
}

pub fn version() -> VersionReport {
    VersionReport {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        state_format_version: version::state_format_version(),
        build_time: version::build_time(),
        git_hash: version::git_hash(),
    }
}

fn new_table(headers: &[&str], color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|header| Cell::new(header).style_spec(StyleRole::Header.table_spec(color)))
            .collect(),
    ));
    table
}

fn optional(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl Report for InspectReport {
    fn table(&self, color: bool) -> Table {
        let mut table = new_table(&["Owner", "Blocks", "Identifiers", "First", "Last"], color);
        for owner in &self.owners {
            table.add_row(Row::new(vec![
                Cell::new(&owner.owner.to_string()).style_spec(StyleRole::Key.table_spec(color)),
                Cell::new(&owner.blocks.to_string()),
                Cell::new(&owner.identifiers.to_string()),
                Cell::new(&optional(owner.first)),
                Cell::new(&optional(owner.last)),
            ]));
        }
        table
    }
}

impl Report for DumpReport {
    fn table(&self, color: bool) -> Table {
        let mut table = new_table(&["Identifier"], color);
        for id in &self.identifiers {
            table.add_row(Row::new(vec![Cell::new(&id.to_string())]));
        }
        table
    }
}

impl Report for BucketsReport {
    fn table(&self, color: bool) -> Table {
        let mut table = new_table(&["Bucket", "Size", "Next"], color);
        for bucket in &self.buckets {
            table.add_row(Row::new(vec![
                Cell::new(&bucket.bucket.to_string()).style_spec(StyleRole::Key.table_spec(color)),
                Cell::new(&bucket.size.to_string()),
                Cell::new(&optional(bucket.next)),
            ]));
        }
        table
    }
}

impl Report for VersionReport {
    fn table(&self, color: bool) -> Table {
        let mut table = new_table(&["Item", "Value"], color);
        let rows = [
            ("Name", self.name.to_string()),
            ("Version", self.version.to_string()),
            ("State format", self.state_format_version.to_string()),
            ("Build time", self.build_time.to_string()),
            ("Git hash", self.git_hash.to_string()),
        ];
        for (item, value) in rows {
            table.add_row(Row::new(vec![
                Cell::new(item).style_spec(StyleRole::Dim.table_spec(color)),
                Cell::new(&value),
            ]));
        }
        table
    }
}

/// Write a report to stdout in the requested format
pub fn emit(report: &impl Report, format: OutputFormat, color: bool) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => {
            report.table(color).print_tty(color)?;
        }
    }
    Ok(())
}
