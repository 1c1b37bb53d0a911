pub mod lab_report; // Lab report text -> sections + test results
