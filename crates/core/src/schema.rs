//! Declared column schema of the stockist master table.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Value stored in a status column once a document has been submitted.
pub const SUBMITTED: &str = "Submitted";

/// A declared column of the master table.
///
/// The discriminant order is the on-disk column order for freshly created tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Division,
    State,
    RbmHq,
    AbmHq,
    BmHq,
    StockistCode,
    StockistName,
    RbmEmail,
    AbmEmail,
    ZbmEmail,
    AwsStatus,
    SssStatus,
    SalesValue,
    AwsFile,
    SssFile,
    AwsSubmittedBy,
    SssSubmittedBy,
    SubmissionDate,
}

impl Column {
    /// Every declared column, in schema order.
    pub const ALL: [Column; 18] = [
        Column::Division,
        Column::State,
        Column::RbmHq,
        Column::AbmHq,
        Column::BmHq,
        Column::StockistCode,
        Column::StockistName,
        Column::RbmEmail,
        Column::AbmEmail,
        Column::ZbmEmail,
        Column::AwsStatus,
        Column::SssStatus,
        Column::SalesValue,
        Column::AwsFile,
        Column::SssFile,
        Column::AwsSubmittedBy,
        Column::SssSubmittedBy,
        Column::SubmissionDate,
    ];

    /// Columns whose (case-insensitive) email values grant dashboard access.
    pub const ROUTING_EMAILS: [Column; 3] = [Column::RbmEmail, Column::AbmEmail, Column::ZbmEmail];

    /// Header text as it appears in the spreadsheet.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Division => "Division",
            Self::State => "STATE",
            Self::RbmHq => "RBM_HQ",
            Self::AbmHq => "ABM_HQ",
            Self::BmHq => "BM_HQ",
            Self::StockistCode => "Stockist_Code",
            Self::StockistName => "Stockist_Name",
            Self::RbmEmail => "RBM_Email",
            Self::AbmEmail => "ABM_Email",
            Self::ZbmEmail => "ZBM_Email",
            Self::AwsStatus => "AWS_Status",
            Self::SssStatus => "SSS_Status",
            Self::SalesValue => "Sales_Value",
            Self::AwsFile => "AWS_File",
            Self::SssFile => "SSS_File",
            Self::AwsSubmittedBy => "AWS_Submitted_By",
            Self::SssSubmittedBy => "SSS_Submitted_By",
            Self::SubmissionDate => "Submission_Date",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| Error::UnknownColumn(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names_round_trip() {
        for column in Column::ALL {
            assert_eq!(column.as_str().parse::<Column>().unwrap(), column);
        }
    }

    #[test]
    fn test_header_names_are_case_sensitive() {
        assert!("state".parse::<Column>().is_err());
        assert_eq!("STATE".parse::<Column>().unwrap(), Column::State);
    }

    #[test]
    fn test_schema_order_matches_master_layout() {
        let names: Vec<_> = Column::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names[0], "Division");
        assert_eq!(names[5], "Stockist_Code");
        assert_eq!(names[17], "Submission_Date");
    }
}
