mod client;
mod gateway;
mod types;

pub use client::GitLabClient;
pub use gateway::PipelineGateway;
pub use types::{CiStatus, Job, Pipeline, PipelineFilter, Project, ProjectRef};

#[cfg(test)]
pub use gateway::fake;
#[cfg(test)]
pub use types::{Commit, User};
