pub mod delete_run;
pub mod get_run_history;
pub mod list_user_runs;

pub use delete_run::{DeleteRunError, DeleteRunUseCase};
pub use get_run_history::{GetRunHistoryError, GetRunHistoryResponse, GetRunHistoryUseCase};
pub use list_user_runs::{ListUserRunsError, ListUserRunsResponse, ListUserRunsUseCase};
