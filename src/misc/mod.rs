mod path_component;
mod repo_name;

pub use path_component::safe_component;
pub use repo_name::RepoName;
