mod cli;
mod client;

pub use cli::DockerCliSource;
pub use client::DockerAdapter;
