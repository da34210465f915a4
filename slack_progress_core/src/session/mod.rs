pub mod progress_session;
pub mod supervisor;
