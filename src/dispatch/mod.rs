//! Request dispatching: transport seam, response interpretation and the
//! single refresh-and-retry protocol.

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod transport;

pub use dispatcher::{HttpDispatcher, RequestDispatcher};
pub use request::{ApiRequest, RawResponse};
pub use transport::{HttpTransport, Transport};
