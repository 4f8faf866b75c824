pub mod add_qa;
pub mod health_route;
pub mod ingest;
pub mod query;
