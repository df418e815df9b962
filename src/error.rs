use std::io::Cursor;

use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder, Response};
use rocket::serde::json::json;
use rocket::Request;
use thiserror::Error;



pub type Result<T> = std::result::Result<T, ControlError>;

#[derive(Error)]
#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
pub enum ControlError {
	#[error("unsupported {kind}: {name}")]
	UnsupportedCommand { kind: &'static str, name: String },

	#[error("{field} must be between {min} and {max}, got {value}")]
	InvalidRange { field: &'static str, min: i64, max: i64, value: i64 },

	#[error("{0}")]
	BadRequest(String),

	#[error("channel not found: {0}")]
	NotFound(String),

	#[error("media server unavailable: {0}")]
	Unavailable(String),

	#[error("{0}")]
	Server(String),
}

impl ControlError {
	pub fn status(&self) -> Status {
		match self {
			ControlError::UnsupportedCommand { .. } => Status::BadRequest,
			ControlError::InvalidRange { .. } => Status::BadRequest,
			ControlError::BadRequest(_) => Status::BadRequest,
			ControlError::NotFound(_) => Status::NotFound,
			ControlError::Unavailable(_) => Status::ServiceUnavailable,
			ControlError::Server(_) => Status::InternalServerError,
		}
	}

	#[cfg(test)]
	pub fn is_bad_request(&self) -> bool {
		self.status() == Status::BadRequest
	}

	// Engine failures keep the engine's own message.
	pub fn server(err: anyhow::Error) -> Self {
		ControlError::Server(err.to_string())
	}

	pub fn required(field: &str) -> Self {
		ControlError::BadRequest(format!("{} is required", field))
	}
}

impl<'r> Responder<'r, 'static> for ControlError {
	fn respond_to(self, _request: &'r Request<'_>) -> response::Result<'static> {
		let body = json!({
			"status": "error",
			"reason": self.to_string(),
		}).to_string();

		Response::build()
			.status(self.status())
			.header(ContentType::JSON)
			.sized_body(body.len(), Cursor::new(body))
			.ok()
	}
}
