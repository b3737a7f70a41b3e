// Job profiles: saved position definitions reused across submissions.

pub mod handlers;
