//! Loans: listing and open loans by due date

use chrono::NaiveDate;
use folio_domain::constants::DEFAULT_PAGE_SIZE;
use folio_domain::{FolioError, Record, Result};

use crate::client::FolioClient;
use crate::pagination::Pages;

/// Loan storage listing.
pub const LOANS_ENDPOINT: &str = "/loan-storage/loans";
const LOANS_KEY: &str = "loans";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Loan records (`/loan-storage/loans`).
pub trait LoansApi {
    /// Walk all loans matching an optional CQL filter.
    ///
    /// # Errors
    /// Request failures are yielded by the iterator.
    fn iter_loans(&mut self, filter: Option<&str>) -> Result<Pages<'_>>;

    /// # Errors
    /// Returns the first request failure.
    fn get_loans(&mut self, filter: Option<&str>) -> Result<Vec<Record>>;

    /// Walk open loans due on `start`, or between `start` and `end` inclusive.
    ///
    /// # Errors
    /// Returns `FolioError::InvalidArgument` for malformed dates or an
    /// interval ending before it starts.
    fn iter_open_loans_by_due_date(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<Pages<'_>>;

    /// # Errors
    /// See [`iter_open_loans_by_due_date`](Self::iter_open_loans_by_due_date).
    fn get_open_loans_by_due_date(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<Vec<Record>>;
}

impl LoansApi for FolioClient {
    fn iter_loans(&mut self, filter: Option<&str>) -> Result<Pages<'_>> {
        self.paginate(LOANS_ENDPOINT, LOANS_KEY, filter, DEFAULT_PAGE_SIZE)
    }

    fn get_loans(&mut self, filter: Option<&str>) -> Result<Vec<Record>> {
        self.iter_loans(filter)?.collect_all()
    }

    fn iter_open_loans_by_due_date(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<Pages<'_>> {
        let query = due_date_query(start, end)?;
        self.paginate(LOANS_ENDPOINT, LOANS_KEY, Some(query.as_str()), DEFAULT_PAGE_SIZE)
    }

    fn get_open_loans_by_due_date(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<Vec<Record>> {
        self.iter_open_loans_by_due_date(start, end)?.collect_all()
    }
}

/// CQL query for open loans due on a date or within an inclusive interval.
///
/// # Errors
/// Returns `FolioError::InvalidArgument` for dates not in `YYYY-MM-DD` form
/// or when `start` is after `end`.
pub fn due_date_query(start: &str, end: Option<&str>) -> Result<String> {
    let start = parse_date(start)?;
    let Some(end) = end.map(parse_date).transpose()? else {
        return Ok(format!("dueDate={} and status.name==Open", start.format(DATE_FORMAT)));
    };

    if start > end {
        return Err(FolioError::InvalidArgument(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }

    let (start, end) = (start.format(DATE_FORMAT), end.format(DATE_FORMAT));
    Ok(format!(
        "(((dueDate>{start} and dueDate<{end}) or dueDate={start} or dueDate={end}) \
         and status.name==Open)"
    ))
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        FolioError::InvalidArgument(format!("invalid date '{}', expected YYYY-MM-DD: {}", value, e))
    })
}
