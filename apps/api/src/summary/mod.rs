// Resume summary endpoint: request schema, prompt rendering, handlers.
// All completion calls go through llm_client.

pub mod handlers;
pub mod prompts;
pub mod request;
