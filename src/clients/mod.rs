pub mod job_search_client;

pub use job_search_client::JobSearchClient;
