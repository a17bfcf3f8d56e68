//! Request handlers of the hello API.
//!
//! The fragment below is indented with tabs on purpose.

use crate::models::Message;

/// @openapi
/// paths:
///	/:
///		get:
///			tags:
///				- hello
///			summary: Say Hello
///			description: Returns a hello message
///			operationId: sayHello
///			responses:
///				'200':
///					description: successful operation
///					content:
///						application/json:
///							schema:
///								$ref: '#/components/schemas/Message'
pub async fn say_hello() -> Message {
    Message {
        content: "Hello world!".to_string(),
    }
}

/// Mentions @openapi but is not annotated.
pub async fn health() -> &'static str {
    "ok"
}
