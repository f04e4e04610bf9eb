//! Guest-list import from delimited text (CSV exports of spreadsheets).
//!
//! # Contract
//! - The first non-empty line is the header; recognized columns are
//!   `household`, `first_name`, `last_name` and `email` (any case, with `_`,
//!   space or `-` as separator). Other columns are ignored.
//! - Blank lines are skipped and never reported.
//! - Rows without a first or last name are reported with their 1-based line
//!   number and create nothing.
//! - Households are deduplicated by trimmed name within one import call only:
//!   a second import creates a new household of the same name.
//! - Only unreadable input (no header, no name column) fails the whole import.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use weddingdesk_core::{EntityId, EntityStore, WeddingId};

use crate::directory::GuestDirectory;
use crate::guest::{Guest, NewGuest};
use crate::household::{Household, NewHousehold};

const MISSING_NAME: &str = "missing first or last name";

/// Parsing options of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    pub delimiter: char,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

/// Problem with a single source row; the rest of the import continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// 1-based line number in the source text.
    pub row: usize,
    pub message: String,
}

impl RowError {
    fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub guests_created: usize,
    pub households_created: usize,
    pub errors: Vec<RowError>,
}

/// The input cannot be read as a guest list at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("input has no header row")]
    MissingHeader,

    #[error("header row (line {line}) has no first_name or last_name column")]
    NoNameColumns { line: usize },
}

/// Column positions resolved from the header row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Columns {
    household: Option<usize>,
    first_name: Option<usize>,
    last_name: Option<usize>,
    email: Option<usize>,
}

impl Columns {
    fn from_header(fields: &[String]) -> Self {
        let mut columns = Self::default();
        for (index, raw) in fields.iter().enumerate() {
            let slot = match normalize_header(raw).as_str() {
                "household" | "household_name" => &mut columns.household,
                "first_name" | "firstname" => &mut columns.first_name,
                "last_name" | "lastname" => &mut columns.last_name,
                "email" | "email_address" => &mut columns.email,
                _ => continue,
            };
            // First occurrence wins when a column is repeated.
            slot.get_or_insert(index);
        }
        columns
    }

    fn has_name(&self) -> bool {
        self.first_name.is_some() || self.last_name.is_some()
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('"')
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Split one line into trimmed fields.
///
/// Double-quoted fields may contain the delimiter; `""` inside quotes is a
/// literal quote.
fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == delimiter {
            fields.push(std::mem::take(&mut current));
        } else if c == '"' && current.trim().is_empty() {
            current.clear();
            in_quotes = true;
        } else {
            current.push(c);
        }
    }
    fields.push(current);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

fn cell(fields: &[String], column: Option<usize>) -> Option<&str> {
    column
        .and_then(|index| fields.get(index))
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Imports guest lists into a [`GuestDirectory`].
#[derive(Debug)]
pub struct GuestImporter<H, G> {
    directory: Arc<GuestDirectory<H, G>>,
    options: ImportOptions,
}

impl<H, G> GuestImporter<H, G>
where
    H: EntityStore<Household>,
    G: EntityStore<Guest>,
{
    pub fn new(directory: Arc<GuestDirectory<H, G>>) -> Self {
        Self::with_options(directory, ImportOptions::default())
    }

    pub fn with_options(directory: Arc<GuestDirectory<H, G>>, options: ImportOptions) -> Self {
        Self { directory, options }
    }

    pub fn options(&self) -> ImportOptions {
        self.options
    }

    /// Import `text` into the wedding's guest list.
    pub fn import(&self, wedding_id: &WeddingId, text: &str) -> Result<ImportSummary, ImportError> {
        let delimiter = self.options.delimiter;
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim_start_matches('\u{feff}')));

        let (header_line, header) = lines
            .by_ref()
            .find(|(_, line)| !line.trim().is_empty())
            .ok_or(ImportError::MissingHeader)?;
        let columns = Columns::from_header(&split_fields(header, delimiter));
        if !columns.has_name() {
            return Err(ImportError::NoNameColumns { line: header_line });
        }

        let mut summary = ImportSummary::default();
        // Households created by this call, keyed by trimmed name.
        let mut created_households: HashMap<String, EntityId> = HashMap::new();

        for (row, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            if let Err(error) = self.import_row(
                wedding_id,
                row,
                &split_fields(line, delimiter),
                &columns,
                &mut created_households,
                &mut summary,
            ) {
                tracing::warn!(wedding_id = %wedding_id, row = error.row, reason = %error.message, "guest import row rejected");
                summary.errors.push(error);
            }
        }

        tracing::info!(
            wedding_id = %wedding_id,
            guests_created = summary.guests_created,
            households_created = summary.households_created,
            errors = summary.errors.len(),
            "guest import finished"
        );
        Ok(summary)
    }

    fn import_row(
        &self,
        wedding_id: &WeddingId,
        row: usize,
        fields: &[String],
        columns: &Columns,
        created_households: &mut HashMap<String, EntityId>,
        summary: &mut ImportSummary,
    ) -> Result<(), RowError> {
        let (first_name, last_name) = match (
            cell(fields, columns.first_name),
            cell(fields, columns.last_name),
        ) {
            (Some(first), last) => (first, last),
            (None, Some(last)) => (last, None),
            (None, None) => return Err(RowError::new(row, MISSING_NAME)),
        };

        let household_id = match cell(fields, columns.household) {
            Some(name) => Some(self.resolve_household(
                wedding_id,
                row,
                name,
                created_households,
                summary,
            )?),
            None => None,
        };

        let fields = NewGuest {
            household_id,
            first_name: first_name.to_string(),
            last_name: last_name.map(str::to_string),
            email: cell(fields, columns.email).map(str::to_string),
            ..NewGuest::default()
        };
        self.directory
            .add_guest(wedding_id, fields)
            .map_err(|err| RowError::new(row, err.to_string()))?;
        summary.guests_created += 1;
        Ok(())
    }

    fn resolve_household(
        &self,
        wedding_id: &WeddingId,
        row: usize,
        name: &str,
        created_households: &mut HashMap<String, EntityId>,
        summary: &mut ImportSummary,
    ) -> Result<EntityId, RowError> {
        if let Some(id) = created_households.get(name) {
            return Ok(id.clone());
        }

        let household = self
            .directory
            .add_household(wedding_id, NewHousehold::named(name))
            .map_err(|err| RowError::new(row, err.to_string()))?;
        summary.households_created += 1;
        created_households.insert(name.to_string(), household.id.clone());
        Ok(household.id)
    }
}
