pub mod contest;
pub mod contest_problem;
pub mod contest_user;
pub mod problem;
pub mod submission;
pub mod test_case;
