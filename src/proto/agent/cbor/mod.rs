mod request;
mod response;

pub use request::AgentRequest;
pub use response::AgentResponse;
