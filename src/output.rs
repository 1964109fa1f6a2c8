use crate::cli::OutputFormat;
use rustami::model::Image;
use rustami::{ProtectedImageSet, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct CandidateRow<'a> {
    id: &'a str,
    name: Option<&'a str>,
    creation_date: Option<&'a str>,
    snapshots: Vec<&'a str>,
}

impl<'a> From<&'a Image> for CandidateRow<'a> {
    fn from(image: &'a Image) -> Self {
        Self {
            id: image.id.as_str(),
            name: image.name.as_deref(),
            creation_date: image.creation_date.as_deref(),
            snapshots: image.snapshot_ids().collect(),
        }
    }
}

pub fn print_protected(
    out: &mut impl Write,
    format: OutputFormat,
    protected: &ProtectedImageSet,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for id in protected.iter() {
                writeln!(out, "{id}")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, protected)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn print_candidates<'a>(
    out: &mut impl Write,
    format: OutputFormat,
    candidates: impl Iterator<Item = &'a Image>,
) -> Result<()> {
    let rows: Vec<CandidateRow<'_>> = candidates.map(CandidateRow::from).collect();

    match format {
        OutputFormat::Text => {
            if rows.is_empty() {
                writeln!(out, "No unused images found.")?;
                return Ok(());
            }
            for row in &rows {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    row.id,
                    row.name.unwrap_or("-"),
                    row.creation_date.unwrap_or("-"),
                    row.snapshots.join(",")
                )?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
