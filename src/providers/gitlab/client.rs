mod core;
mod pipelines;
mod projects;

pub use self::core::GitLabClient;
