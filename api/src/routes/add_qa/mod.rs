pub mod add_qa_request;
pub mod add_qa_route;
