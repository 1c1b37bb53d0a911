use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::ResultFlag;

/// One parsed test row from a lab results table.
///
/// `current_result` and `previous_result` keep the report's original
/// formatting ("4.20" stays "4.20"); they are not normalized to numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_name: String,
    pub current_result: String,
    pub flag: Option<ResultFlag>,
    pub previous_result: Option<String>,
    pub previous_date: Option<NaiveDate>,
    pub units: Option<String>,
    pub reference_interval: Option<String>,
}

impl TestResult {
    pub fn new(test_name: impl Into<String>, current_result: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            current_result: current_result.into(),
            flag: None,
            previous_result: None,
            previous_date: None,
            units: None,
            reference_interval: None,
        }
    }

    /// Render this result as a table line:
    /// `<name> <num> [flag] [<prev> <D/M/YYYY>] [<units> [<ref...>]]`.
    pub fn to_row_line(&self) -> String {
        let mut parts: Vec<String> = vec![self.test_name.clone(), self.current_result.clone()];

        if let Some(flag) = self.flag {
            parts.push(flag.as_token().to_string());
        }
        if let Some(date) = self.previous_date {
            if let Some(prev) = &self.previous_result {
                parts.push(prev.clone());
            }
            parts.push(date.format("%d/%m/%Y").to_string());
        }
        if let Some(units) = &self.units {
            parts.push(units.clone());
            if let Some(reference) = &self.reference_interval {
                parts.push(reference.clone());
            }
        }

        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_full_row() {
        let result = TestResult {
            test_name: "Glucose".into(),
            current_result: "95".into(),
            flag: Some(ResultFlag::High),
            previous_result: Some("88".into()),
            previous_date: NaiveDate::from_ymd_opt(2023, 1, 1),
            units: Some("mg/dL".into()),
            reference_interval: Some("70-100".into()),
        };
        assert_eq!(result.to_row_line(), "Glucose 95 H 88 01/01/2023 mg/dL 70-100");
    }

    #[test]
    fn renders_minimal_row() {
        let result = TestResult::new("White Blood Cells", "6.1");
        assert_eq!(result.to_row_line(), "White Blood Cells 6.1");
    }

    #[test]
    fn previous_date_serializes_as_iso_date() {
        let mut result = TestResult::new("Sodium", "140");
        result.previous_date = NaiveDate::from_ymd_opt(2023, 3, 9);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["previous_date"], "2023-03-09");
        assert_eq!(json["flag"], serde_json::Value::Null);
    }
}
