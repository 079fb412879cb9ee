use common::judge_job::TestCaseData;
use thiserror::Error;

use crate::store::RawTestCase;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TestCaseError {
    #[error("Problem has no test cases")]
    Empty,

    #[error("Test case {position} is missing its {field}")]
    MissingField {
        /// 1-based, as shown to problem setters.
        position: usize,
        field: &'static str,
    },
}

/// Check a problem's test cases before anything is dispatched.
///
/// Empty strings are valid input and expected output; only an absent field
/// is a configuration error. Order is preserved.
pub fn validate_test_cases(test_cases: &[RawTestCase]) -> Result<Vec<TestCaseData>, TestCaseError> {
    if test_cases.is_empty() {
        return Err(TestCaseError::Empty);
    }

    test_cases
        .iter()
        .enumerate()
        .map(|(index, tc)| {
            let missing = |field| TestCaseError::MissingField {
                position: index + 1,
                field,
            };
            Ok(TestCaseData {
                input: tc.input.clone().ok_or_else(|| missing("input"))?,
                expected_output: tc
                    .expected_output
                    .clone()
                    .ok_or_else(|| missing("expected output"))?,
            })
        })
        .collect()
}
