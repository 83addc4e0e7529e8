//! Cursor pagination over limit-style listing endpoints
//!
//! Records are requested in ascending `id` order and the last seen id is fed
//! back as `id>{cursor}`, so a listing of any size is walked one bounded page
//! at a time without offsets.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use folio_domain::{FolioError, GetOptions, Record, Result};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::client::{json_kind, FolioClient};

/// Resumable position inside a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    last_seen_id: String,
    filter: Option<String>,
    page_size: u32,
}

impl PageCursor {
    /// Cursor positioned before the first record.
    ///
    /// # Errors
    /// Returns `FolioError::InvalidArgument` when `page_size` is zero.
    pub fn new(filter: Option<&str>, page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(FolioError::InvalidArgument(
                "page size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            // the nil UUID sorts before every real id
            last_seen_id: Uuid::nil().to_string(),
            filter: filter.map(str::trim).filter(|f| !f.is_empty()).map(str::to_string),
            page_size,
        })
    }

    /// CQL query selecting the page after the cursor.
    pub fn query(&self) -> String {
        match &self.filter {
            Some(filter) => format!("id>{} AND ({}) sortBy id", self.last_seen_id, filter),
            None => format!("id>{} sortBy id", self.last_seen_id),
        }
    }

    /// Move the cursor past `id`.
    pub fn advance(&mut self, id: impl Into<String>) {
        self.last_seen_id = id.into();
    }

    /// Id the next page starts after.
    pub fn last_seen_id(&self) -> &str {
        &self.last_seen_id
    }

    /// Records requested per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

/// Lazy iterator over every record of a listing.
///
/// Holds at most one page. A request error is yielded once, after which the
/// iterator is exhausted; dropping it stops the walk between pages.
pub struct Pages<'a> {
    client: &'a mut FolioClient,
    endpoint: String,
    key: String,
    cursor: PageCursor,
    buffer: VecDeque<Record>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<'a> Pages<'a> {
    pub(crate) fn new(
        client: &'a mut FolioClient,
        endpoint: &str,
        key: &str,
        cursor: PageCursor,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            key: key.to_string(),
            cursor,
            buffer: VecDeque::new(),
            exhausted: false,
            pages_fetched: 0,
        }
    }

    /// Number of page requests issued so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Position of the walk.
    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// Drain the remaining records, stopping at the first error.
    ///
    /// # Errors
    /// Returns the first error the walk runs into.
    pub fn collect_all(self) -> Result<Vec<Record>> {
        self.collect()
    }

    fn fetch_page(&mut self) -> Result<()> {
        let options = GetOptions {
            key: Some(self.key.clone()),
            query: Some(self.cursor.query()),
            limit: self.cursor.page_size(),
        };
        let page = self.client.get(&self.endpoint, &options)?;
        self.pages_fetched += 1;

        let records = match page {
            Value::Array(records) => records,
            other => {
                return Err(FolioError::Protocol(format!(
                    "'{}' from {} is {}, expected an array",
                    self.key,
                    self.endpoint,
                    json_kind(&other)
                )))
            }
        };

        debug!(
            endpoint = %self.endpoint,
            page = self.pages_fetched,
            records = records.len(),
            cursor = %self.cursor.last_seen_id(),
            "fetched page"
        );

        if records.is_empty() {
            self.exhausted = true;
            return Ok(());
        }

        match records.last().and_then(|record| record.get("id")).and_then(Value::as_str) {
            Some(id) => self.cursor.advance(id),
            None => {
                // no cursor to resume from: this page is the last one
                debug!(endpoint = %self.endpoint, "last record has no id, ending listing");
                self.exhausted = true;
            }
        }

        self.buffer.extend(records);
        Ok(())
    }
}

impl Iterator for Pages<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }
            if self.exhausted {
                return None;
            }
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                self.buffer.clear();
                return Some(Err(err));
            }
        }
    }
}

impl FusedIterator for Pages<'_> {}
