//! Wire protocol spoken between the front-end bridge and Gosp worker
//! processes over a Unix-domain stream socket.
//!
//! The request side is a small fixed-format text message whose field names
//! are shared with the worker's decoder; the response side is a sequence of
//! newline-delimited header directives terminated by the `end-header`
//! sentinel, followed by opaque body bytes. Neither format is extensible:
//! an unrecognized directive is a protocol error, never something to skip.

pub mod errors;
pub mod request;
pub mod response;

pub use errors::WireError;
pub use request::{send_request, send_termination, termination_request, WorkerRequest};
pub use response::{
    parse_exit_ack, parse_response, receive_response, DecodedResponse, END_HEADER, HTTP_OK,
};

pub type Result<T> = std::result::Result<T, WireError>;
