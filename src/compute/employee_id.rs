//! Employee code generation.
//!
//! Codes look like `YYYYMM####`: the year and month of first save followed by
//! a zero padded, per-month sequence number starting at `0001`.

use std::fmt;

use chrono::{Datelike, Local};

const SEQUENCE_WIDTH: usize = 4;

/// `YYYYMM` prefix shared by every code assigned in the same month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeIdPrefix(String);

impl EmployeeIdPrefix {
    pub fn for_date(date: impl Datelike) -> Self {
        Self(format!("{:04}{:02}", date.year(), date.month()))
    }

    /// Prefix for the server's current local month.
    pub fn current() -> Self {
        Self::for_date(Local::now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sequence number encoded in `id`, if `id` belongs to this month.
    pub fn sequence_of(&self, id: &str) -> Option<u32> {
        let suffix = id.strip_prefix(self.0.as_str())?;
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        suffix.parse().ok()
    }

    pub fn format(&self, sequence: u32) -> String {
        format!("{}{:0width$}", self.0, sequence, width = SEQUENCE_WIDTH)
    }
}

impl fmt::Display for EmployeeIdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Next code for `prefix` given the codes already stored.
///
/// The sequence is `count + 1` where `count` is the number of stored codes
/// starting with the prefix. When rows of the month were deleted the count
/// falls behind the highest suffix in use, so the highest suffix wins and
/// the result never collides with a surviving code.
pub fn next_employee_id<'a, I>(prefix: &EmployeeIdPrefix, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut count: u32 = 0;
    let mut highest: u32 = 0;
    for id in existing {
        if !id.starts_with(prefix.as_str()) {
            continue;
        }
        count += 1;
        if let Some(seq) = prefix.sequence_of(id) {
            highest = highest.max(seq);
        }
    }
    prefix.format(count.max(highest) + 1)
}
