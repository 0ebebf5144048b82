// File: trachub-core/src/tickets.rs
//! Readers for the CSV files exported from the Trac database.
//!
//! Three exports are understood: tickets (15 columns), ticket comments (4 columns) and
//! ticket attachments (4 columns). Every file starts with a header row, which is skipped.
//! Rows with the wrong number of columns are rejected with the file name and the
//! 1-based row number, header included.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::errors::TrachubError;

const TICKET_COLUMNS: usize = 15;
const COMMENT_COLUMNS: usize = 4;
const ATTACHMENT_COLUMNS: usize = 4;

/// One row of the ticket export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub id: u64,
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub owner: String,
    pub reporter: String,
    pub milestone: String,
    pub status: String,
    pub resolution: String,
    pub summary: String,
    pub description: String,
    pub created: NaiveDateTime,
    pub modified: NaiveDateTime,
    pub component: String,
    pub priority: String,
    pub keywords: Vec<String>,
    pub cc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketComment {
    pub ticket_id: u64,
    pub date: NaiveDateTime,
    pub author: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketAttachment {
    pub ticket_id: u64,
    pub filename: String,
    pub date: NaiveDateTime,
    pub author: String,
    /// `{attachments_prefix}/{ticket_id}/{filename}`
    pub full_path: String,
}

/// Comments per ticket, each list in file order.
pub type CommentsByTicket = BTreeMap<u64, Vec<TicketComment>>;
/// Attachments per ticket, each list in file order.
pub type AttachmentsByTicket = BTreeMap<u64, Vec<TicketAttachment>>;

/// Parses a Trac timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f][+HH:MM]`, `YYYY-MM-DDTHH:MM:SS[.f]` and
/// unix seconds. Offsets are dropped; the wall-clock time is kept as written.
pub fn parse_trac_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.naive_utc())
}

/// Row-level helper that knows where it is, for error messages.
struct Row<'a> {
    file: &'a str,
    number: usize,
    record: csv::StringRecord,
}

impl Row<'_> {
    fn error(&self, message: impl Into<String>) -> TrachubError {
        TrachubError::CsvData {
            file: self.file.to_string(),
            row: self.number,
            message: message.into(),
        }
    }

    fn field(&self, index: usize) -> &str {
        self.record.get(index).unwrap_or_default()
    }

    fn id(&self, index: usize) -> Result<u64, TrachubError> {
        let text = self.field(index).trim();
        text.parse()
            .map_err(|_| self.error(format!("ticket id must be an integer but is {:?}", text)))
    }

    fn date(&self, index: usize, column: &str) -> Result<NaiveDateTime, TrachubError> {
        let text = self.field(index);
        parse_trac_date(text)
            .ok_or_else(|| self.error(format!("{} must be a date but is {:?}", column, text)))
    }
}

/// Reads all data rows of a CSV export, checking the column count of every row.
fn read_rows<'a, R: Read>(
    reader: R,
    file: &'a str,
    kind: &str,
    expected_columns: usize,
) -> Result<Vec<Row<'a>>, TrachubError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        // Row 1 is the header.
        let number = index + 2;
        let record = record.map_err(|e| TrachubError::CsvData {
            file: file.to_string(),
            row: number,
            message: e.to_string(),
        })?;
        let row = Row { file, number, record };
        if row.record.len() != expected_columns {
            return Err(row.error(format!(
                "{} row must have {} columns but has {}",
                kind,
                expected_columns,
                row.record.len()
            )));
        }
        rows.push(row);
    }
    Ok(rows)
}

pub fn parse_tickets<R: Read>(reader: R, file: &str) -> Result<Vec<Ticket>, TrachubError> {
    read_rows(reader, file, "ticket", TICKET_COLUMNS)?
        .iter()
        .map(|row| -> Result<Ticket, TrachubError> {
            Ok(Ticket {
                id: row.id(0)?,
                ticket_type: row.field(1).to_string(),
                owner: row.field(2).to_string(),
                reporter: row.field(3).to_string(),
                milestone: row.field(4).to_string(),
                status: row.field(5).to_string(),
                resolution: row.field(6).to_string(),
                summary: row.field(7).to_string(),
                description: row.field(8).to_string(),
                created: row.date(9, "createdtime")?,
                modified: row.date(10, "modifiedtime")?,
                component: row.field(11).to_string(),
                priority: row.field(12).to_string(),
                keywords: row.field(13).split_whitespace().map(str::to_string).collect(),
                cc: row.field(14).to_string(),
            })
        })
        .collect()
}

pub fn parse_comments<R: Read>(reader: R, file: &str) -> Result<CommentsByTicket, TrachubError> {
    let mut comments = CommentsByTicket::new();
    for row in read_rows(reader, file, "comment", COMMENT_COLUMNS)? {
        let comment = TicketComment {
            ticket_id: row.id(0)?,
            date: row.date(1, "date")?,
            author: row.field(2).to_string(),
            body: row.field(3).to_string(),
        };
        comments.entry(comment.ticket_id).or_default().push(comment);
    }
    Ok(comments)
}

/// Parses the attachment export. Rows whose first column is not a ticket id belong to
/// wiki pages and are skipped.
pub fn parse_attachments<R: Read>(
    reader: R,
    file: &str,
    attachments_prefix: &str,
) -> Result<AttachmentsByTicket, TrachubError> {
    let mut attachments = AttachmentsByTicket::new();
    for row in read_rows(reader, file, "attachment", ATTACHMENT_COLUMNS)? {
        let Ok(ticket_id) = row.field(0).trim().parse::<u64>() else {
            debug!("{}:{}: skipping attachment of {:?}", file, row.number, row.field(0));
            continue;
        };
        let filename = row.field(1).to_string();
        let attachment = TicketAttachment {
            ticket_id,
            full_path: format!("{}/{}/{}", attachments_prefix, ticket_id, filename),
            filename,
            date: row.date(2, "date")?,
            author: row.field(3).to_string(),
        };
        attachments.entry(ticket_id).or_default().push(attachment);
    }
    Ok(attachments)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

pub fn read_tickets<P: AsRef<Path>>(path: P) -> Result<Vec<Ticket>> {
    let path = path.as_ref();
    info!("Reading ticket details from {}", path.display());
    let tickets = parse_tickets(open(path)?, &display_name(path))?;
    info!("Read {} tickets.", tickets.len());
    Ok(tickets)
}

pub fn read_comments<P: AsRef<Path>>(path: P) -> Result<CommentsByTicket> {
    let path = path.as_ref();
    info!("Reading ticket comments from {}", path.display());
    Ok(parse_comments(open(path)?, &display_name(path))?)
}

pub fn read_attachments<P: AsRef<Path>>(path: P, attachments_prefix: &str) -> Result<AttachmentsByTicket> {
    let path = path.as_ref();
    info!("Reading attachments from {}", path.display());
    Ok(parse_attachments(open(path)?, &display_name(path), attachments_prefix)?)
}
