//! Data types of the hello API.

use serde::Serialize;

/// @openapi
/// components:
///   schemas:
///     Message:
///       type: object
///       properties:
///         content:
///           type: string
///           description: The contents of a message
///           example: Hello world!
#[derive(Serialize)]
pub struct Message {
    pub content: String,
}

/// @openapi
/// components:
///   responses:
///     NotFound:
///       description: The specified resource was not found
///       content:
///         application/json:
///           schema:
///             $ref: '#/components/schemas/Error'
///     Unauthorized:
///       description: Unauthorized
///       content:
///         application/json:
///           schema:
///             $ref: '#/components/schemas/Error'
///   schemas:
///     Error:
///       type: object
///       properties:
///         status:
///           type: string
///         error:
///           type: string
#[derive(Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
}

/// Internal bookkeeping, not part of the API.
struct Counter(u64);
