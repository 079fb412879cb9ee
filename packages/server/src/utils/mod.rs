pub mod contest;
pub mod eligibility;
